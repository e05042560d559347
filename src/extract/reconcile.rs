use tracing::debug;

use crate::domain::card::DetailPage;
use crate::domain::detail_field::{DetailAttributes, DetailField};
use crate::domain::listing::Listing;
use crate::extract::fields::{extract_mileage, parse_mileage_value, title_case};
use crate::extract::patterns::{CONTAMINATION_RE, YEAR_RE};

const MIN_DETAIL_YEAR: i32 = 1900;
const MAX_DETAIL_YEAR: i32 = 2100;

/// Fill the gaps in a card-derived listing from its detail page.
///
/// Fields already set are never touched. Mileage falls back to scanning the
/// whole body text when the attribute section has no usable value.
pub fn reconcile(listing: &mut Listing, detail: &DetailPage) {
    let attrs = DetailAttributes::from_pairs(detail.labels.iter().map(|(k, v)| (k, v)));
    reconcile_attributes(listing, &attrs, &detail.body_text);
}

pub fn reconcile_attributes(listing: &mut Listing, attrs: &DetailAttributes, body_text: &str) {
    if listing.mileage.is_none() {
        listing.mileage = lookup(attrs, DetailField::Mileage)
            .and_then(parse_mileage_value)
            .or_else(|| extract_mileage(body_text));
    }
    if listing.year.is_none() {
        listing.year = lookup(attrs, DetailField::Year).and_then(parse_detail_year);
    }
    if listing.location.is_none() {
        // Same casing as a location read from the card.
        listing.location = lookup(attrs, DetailField::Location).map(title_case);
    }
    if listing.on_island.is_none() {
        // Anything other than yes/true is a hard "no", not "unknown".
        listing.on_island = lookup(attrs, DetailField::OnIsland).map(|value| {
            matches!(value.trim().to_lowercase().as_str(), "yes" | "true")
        });
    }

    let slots = [
        (&mut listing.condition, DetailField::Condition),
        (&mut listing.transmission, DetailField::Transmission),
        (&mut listing.fuel_type, DetailField::FuelType),
        (&mut listing.color, DetailField::Color),
        (&mut listing.body_type, DetailField::BodyType),
        (&mut listing.drive, DetailField::Drive),
        (&mut listing.cylinders, DetailField::Cylinders),
        (&mut listing.steering, DetailField::Steering),
        (&mut listing.interior_color, DetailField::InteriorColor),
        (&mut listing.doors, DetailField::Doors),
    ];
    for (slot, field) in slots {
        if slot.is_none() {
            *slot = lookup(attrs, field).map(String::from);
        }
    }
}

/// First value recorded for `field` that does not carry another field's label.
fn lookup(attrs: &DetailAttributes, field: DetailField) -> Option<&str> {
    attrs.values(field).find(|value| {
        let contaminated = is_contaminated(field, value);
        if contaminated {
            debug!(?field, value, "Ignoring detail value holding another field's label");
        }
        !contaminated
    })
}

/// True when `value` looks like a `"Label: value"` pair for a field other than `field`.
pub fn is_contaminated(field: DetailField, value: &str) -> bool {
    CONTAMINATION_RE
        .captures_iter(value)
        .any(|caps| DetailField::from_label(&caps[1]) != Some(field))
}

fn parse_detail_year(value: &str) -> Option<i32> {
    YEAR_RE
        .find(value)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .or_else(|| value.trim().parse::<i32>().ok())
        .filter(|year| (MIN_DETAIL_YEAR..=MAX_DETAIL_YEAR).contains(year))
}
