use serde::{Deserialize, Serialize};

use crate::domain::listing::Listing;

/// Why a parsed card did not become a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    NoTitleOrPrice,
    /// Year-less adverts are parts and accessories, not vehicles.
    NoYear,
    BelowPriceFloor,
    PriceOnRequest,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::NoTitleOrPrice => "neither title nor price",
            Self::NoYear => "no year",
            Self::BelowPriceFloor => "price below floor",
            Self::PriceOnRequest => "price upon request",
        };
        f.write_str(reason)
    }
}

/// Business rules applied to every parsed card, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceRules {
    pub min_price: f64,
}

impl AcceptanceRules {
    pub fn new(min_price: f64) -> Self {
        Self { min_price }
    }

    /// First failing predicate wins.
    pub fn check(&self, listing: &Listing) -> Result<(), Rejection> {
        if listing.title.is_empty() && listing.price.is_none() {
            return Err(Rejection::NoTitleOrPrice);
        }
        if listing.year.is_none() {
            return Err(Rejection::NoYear);
        }
        if listing.price.unwrap_or(0.0) < self.min_price {
            return Err(Rejection::BelowPriceFloor);
        }
        if listing
            .title
            .to_lowercase()
            .contains("price upon request")
        {
            return Err(Rejection::PriceOnRequest);
        }
        Ok(())
    }
}
