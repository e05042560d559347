//! Text → structured listing. Every function here is pure.

pub mod fields;
pub mod patterns;
pub mod reconcile;
pub mod title;

use crate::domain::card::RawCard;
use crate::domain::listing::Listing;
use crate::error::CardError;

use fields::{extract_location, extract_mileage, extract_price, extract_year};
use patterns::AD_ID_RE;
use title::{extract_title, split_make_model};

/// Numeric advert id from a listing URL, e.g. `.../advert/12345` → `12345`.
pub fn extract_external_id(url: &str) -> Option<String> {
    AD_ID_RE.captures(url).map(|caps| caps[1].to_string())
}

/// Build a provisional listing from a result card's summary text.
pub fn parse_card(card: &RawCard) -> Result<Listing, CardError> {
    let external_id =
        extract_external_id(&card.url).ok_or_else(|| CardError::MissingExternalId {
            url: card.url.clone(),
        })?;

    let mut listing = Listing::new(external_id, card.url.clone());
    if let Some(image) = card.image_url.as_deref().filter(|src| !src.is_empty()) {
        listing.images.push(image.to_string());
    }

    let text = card.text.as_str();
    if let Some((price, currency)) = extract_price(text) {
        listing.price = Some(price);
        listing.currency = Some(currency);
    }
    listing.year = extract_year(text);
    listing.location = extract_location(text);
    listing.mileage = extract_mileage(text);
    listing.title = extract_title(text);
    (listing.make, listing.model) = split_make_model(&listing.title);

    Ok(listing)
}
