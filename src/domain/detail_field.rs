use std::collections::HashMap;

/// Attribute labels recognized on a listing's detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailField {
    Mileage,
    Year,
    Condition,
    Transmission,
    FuelType,
    Color,
    BodyType,
    Drive,
    Cylinders,
    Steering,
    InteriorColor,
    Doors,
    Location,
    OnIsland,
}

impl DetailField {
    pub const ALL: [Self; 14] = [
        Self::Mileage,
        Self::Year,
        Self::Condition,
        Self::Transmission,
        Self::FuelType,
        Self::Color,
        Self::BodyType,
        Self::Drive,
        Self::Cylinders,
        Self::Steering,
        Self::InteriorColor,
        Self::Doors,
        Self::Location,
        Self::OnIsland,
    ];

    /// Accepted label spellings, in lookup priority order. All lowercase.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Mileage => &["mileage", "odometer", "kilometers", "kilometres", "km"],
            Self::Year => &["year", "model year"],
            Self::Condition => &["condition"],
            Self::Transmission => &["transmission", "gearbox"],
            Self::FuelType => &["fuel type", "fuel"],
            Self::Color => &["color", "colour", "exterior color", "exterior colour"],
            Self::BodyType => &["body type", "body style", "body"],
            Self::Drive => &["drive", "drive type", "drivetrain"],
            Self::Cylinders => &["cylinders", "engine cylinders"],
            Self::Steering => &["steering", "steering side"],
            Self::InteriorColor => &["interior color", "interior colour"],
            Self::Doors => &["doors", "number of doors"],
            Self::Location => &["location", "area"],
            Self::OnIsland => &["on island", "on-island"],
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let key = normalize_label(label);
        Self::ALL
            .into_iter()
            .find(|field| field.synonyms().contains(&key.as_str()))
    }
}

/// Lowercase, collapse whitespace and drop a trailing colon: `" Fuel  Type:"` → `"fuel type"`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .trim_end_matches(':')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Detail-page label/value pairs restricted to recognized labels.
///
/// Unknown labels and blank values are dropped on construction. When the
/// same label appears twice, the first occurrence is kept.
#[derive(Debug, Clone, Default)]
pub struct DetailAttributes {
    entries: HashMap<String, String>,
}

impl DetailAttributes {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for (label, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() || DetailField::from_label(label.as_ref()).is_none() {
                continue;
            }
            entries
                .entry(normalize_label(label.as_ref()))
                .or_insert_with(|| value.to_string());
        }
        Self { entries }
    }

    /// Raw values recorded for `field`, in synonym priority order.
    pub fn values(&self, field: DetailField) -> impl Iterator<Item = &str> {
        field
            .synonyms()
            .iter()
            .filter_map(|synonym| self.entries.get(*synonym).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
