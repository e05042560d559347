use serde::{Deserialize, Serialize};

/// One result card as harvested from a rendered results page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub url: String,
    pub text: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RawCard {
    pub fn new(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}

/// What the browser harvested from one listing's own page: the attribute
/// section as raw label/value pairs, in document order, plus the body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailPage {
    pub labels: Vec<(String, String)>,
    pub body_text: String,
}
