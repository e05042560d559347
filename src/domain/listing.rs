use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A used-vehicle advert normalized from a results card and, optionally, its
/// detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub external_id: String,
    pub url: String,
    pub title: String,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub mileage: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub drive: Option<String>,
    #[serde(default)]
    pub cylinders: Option<String>,
    #[serde(default)]
    pub steering: Option<String>,
    #[serde(default)]
    pub interior_color: Option<String>,
    #[serde(default)]
    pub doors: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// `None` means the page never said.
    #[serde(default)]
    pub on_island: Option<bool>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: bool,
}

impl Listing {
    /// An empty, active listing for the given advert.
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
            title: String::new(),
            make: String::new(),
            model: String::new(),
            year: None,
            mileage: None,
            price: None,
            currency: None,
            condition: None,
            transmission: None,
            fuel_type: None,
            color: None,
            body_type: None,
            drive: None,
            cylinders: None,
            steering: None,
            interior_color: None,
            doors: None,
            location: None,
            on_island: None,
            images: Vec::new(),
            is_active: true,
        }
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.external_id, self.title)?;
        if let Some(price) = self.price {
            write!(
                f,
                " ({}{price:.0})",
                self.currency.as_deref().unwrap_or_default()
            )?;
        }
        if let Some(year) = self.year {
            write!(f, " | {year}")?;
        }
        if let Some(mileage) = self.mileage {
            write!(f, " | {mileage} km")?;
        }
        if let Some(ref location) = self.location {
            write!(f, " | {location}")?;
        }
        Ok(())
    }
}

/// Result of handing one listing to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertOutcome {
    pub inserted: bool,
    pub price_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}

/// A listing as the store keeps it, with the observation timestamps the
/// scraper itself never sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredListing {
    pub listing: Listing,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub price_history: Vec<PricePoint>,
}
