use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Failed to parse page: {reason}")]
    Parse { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Listing store error: {reason}")]
    Store { reason: String },

    #[error("No listings were extracted")]
    NoListings,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

/// Failure to turn a single raw card into a listing. Never aborts a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("no external id in card url {url}")]
    MissingExternalId { url: String },
}
