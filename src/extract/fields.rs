use regex::Regex;

use crate::extract::patterns::{
    DIGITS_RE, LOCATION_RE, MILEAGE_APPROX_RE, MILEAGE_LABELED_RE, MILEAGE_UNIT_RE, PRICE_RE,
    YEAR_RE,
};

pub const MIN_MILEAGE: u32 = 100;
pub const MAX_MILEAGE: u32 = 2_000_000;

/// Amount and normalized currency of the first price marker in `text`.
///
/// Returns `None` when no marker matches or the amount does not parse; a
/// currency is never reported without its amount.
pub fn extract_price(text: &str) -> Option<(f64, String)> {
    let caps = PRICE_RE.captures(text)?;
    let amount = caps[2].replace(',', "").parse::<f64>().ok()?;
    Some((amount, normalize_currency(&caps[1])))
}

/// `CI…`/`KYD…` → `KYD`, `US…` → `USD`, anything else uppercased as-is.
pub fn normalize_currency(marker: &str) -> String {
    let marker = marker.trim().to_uppercase();
    if marker.starts_with("CI") || marker.starts_with("KYD") {
        "KYD".into()
    } else if marker.starts_with("US") {
        "USD".into()
    } else {
        marker
    }
}

/// The last 19xx/20xx token in reading order. Titles tend to lead with a
/// year while the model year proper is mentioned later.
pub fn extract_year(text: &str) -> Option<i32> {
    YEAR_RE
        .find_iter(text)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_location(text: &str) -> Option<String> {
    LOCATION_RE.find(text).map(|m| title_case(m.as_str()))
}

/// Mileage by tier: labeled value, then number with a distance unit, then
/// an approximate qualifier. Each tier contributes its first match only; a
/// value outside [`MIN_MILEAGE`, `MAX_MILEAGE`] drops to the next tier.
pub fn extract_mileage(text: &str) -> Option<u32> {
    [&*MILEAGE_LABELED_RE, &*MILEAGE_UNIT_RE, &*MILEAGE_APPROX_RE]
        .into_iter()
        .find_map(|tier| first_capture_in_band(tier, text))
}

/// Mileage from an attribute value such as `"85,600 km"` or `"85600"`.
pub fn parse_mileage_value(value: &str) -> Option<u32> {
    DIGITS_RE
        .find(value)
        .and_then(|m| parse_mileage_digits(m.as_str()))
}

fn first_capture_in_band(re: &Regex, text: &str) -> Option<u32> {
    let caps = re.captures(text)?;
    parse_mileage_digits(caps.get(1)?.as_str())
}

fn parse_mileage_digits(digits: &str) -> Option<u32> {
    digits
        .replace(',', "")
        .parse::<u32>()
        .ok()
        .filter(|miles| (MIN_MILEAGE..=MAX_MILEAGE).contains(miles))
}

pub(crate) fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
