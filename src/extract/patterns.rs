//! Compiled patterns shared by every extractor. Built once, never mutated.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::detail_field::DetailField;

/// `CI$ 5,000`, `KYD$6,000`, `US$ 16,000`, `ci 4500`.
pub static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b((?:CI|KYD|US)\$?)\s*(\d[\d,]*(?:\.\d+)?)").unwrap()
});

pub static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b((?:19|20)\d{2})\b").unwrap());

/// Numeric advert id at the end of a listing URL path.
pub static AD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/advert/(\d+)/?(?:[?#].*)?$").unwrap());

pub static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(on island|off island|grand cayman|cayman brac|little cayman|george town|bodden town|west bay|north side|east end)\b",
    )
    .unwrap()
});

const DISTANCE_UNIT: &str = r"(?:km|kms|kilometers|kilometres|miles|mi)";

/// Tier 1: `Mileage: 45,000`, `Odometer 85600 km`, `KM: 12000`.
/// Unit words only count as a label when followed by a colon.
pub static MILEAGE_LABELED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:(?:mileage|odometer)\s*[:\-]?|(?:kilometers|kilometres|kms|km|miles)\s*:)\s*(\d[\d,]*)(?:\s*{DISTANCE_UNIT}\b)?"
    ))
    .unwrap()
});

/// Tier 2: `17,000 km`, `60000 miles`.
pub static MILEAGE_UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d[\d,]*)\s*{DISTANCE_UNIT}\b")).unwrap()
});

/// Tier 3: `over 100,000`, `under 50000`, `approx. 80,000`.
pub static MILEAGE_APPROX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:over|under|approx\.?)\s*(\d[\d,]*)").unwrap()
});

pub static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d[\d,]*").unwrap());

/// Any recognized detail label directly followed by a colon.
pub static CONTAMINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let mut labels: Vec<&str> = DetailField::ALL
        .iter()
        .flat_map(|field| field.synonyms().iter().copied())
        .collect();
    // Longest first so "interior color" is preferred over "color".
    labels.sort_by_key(|label| std::cmp::Reverse(label.len()));
    let alternation = labels
        .iter()
        .map(|label| regex::escape(label).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\s*:")).unwrap()
});

/// Manufacturer names tried in order as a title prefix. Where one name is
/// a prefix of another, the longer one is listed first.
pub const KNOWN_MAKES: &[&str] = &[
    "Acura",
    "Alfa Romeo",
    "Aston Martin",
    "Audi",
    "Bentley",
    "BMW",
    "Bugatti",
    "Buick",
    "Cadillac",
    "Chevrolet",
    "Chrysler",
    "Citroën",
    "Daihatsu",
    "Dodge",
    "Ferrari",
    "Fiat",
    "Ford",
    "Genesis",
    "GMC",
    "Honda",
    "Hyundai",
    "Infiniti",
    "Isuzu",
    "Jaguar",
    "Jeep",
    "Kia",
    "Lamborghini",
    "Land Rover",
    "Lexus",
    "Lincoln",
    "Lotus",
    "Maserati",
    "Mazda",
    "McLaren",
    "Mercedes-Benz",
    "Mercedes",
    "MINI",
    "Mitsubishi",
    "Nissan",
    "Peugeot",
    "Pontiac",
    "Porsche",
    "Ram",
    "Rolls-Royce",
    "Subaru",
    "Suzuki",
    "Tesla",
    "Toyota",
    "Volkswagen",
    "Volvo",
];
