use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub traversal: TraversalConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrowserBackend {
    /// Fetch server-rendered HTML with reqwest.
    #[default]
    Http,
    /// Drive a Chrome instance (requires the `chrome` feature).
    Chrome,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub backend: BrowserBackend,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_listings_path")]
    pub listings_path: String,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    #[serde(default = "default_card_wait")]
    pub card_wait_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            backend: BrowserBackend::default(),
            base_url: default_base_url(),
            listings_path: default_listings_path(),
            headless: true,
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
            max_retries: default_retries(),
            card_wait_secs: default_card_wait(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TraversalConfig {
    /// Stop after this many pages. `None` walks until the results run out.
    #[serde(default)]
    pub max_pages: Option<u32>,
    #[serde(default = "default_min_price")]
    pub min_price: f64,
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    #[serde(default)]
    pub pass_deadline_secs: Option<u64>,
    /// Open a card's own page when its summary has no mileage.
    #[serde(default = "default_true")]
    pub detail_fallback: bool,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            min_price: default_min_price(),
            navigation_timeout_secs: default_navigation_timeout(),
            pass_deadline_secs: None,
            detail_fallback: true,
        }
    }
}

/// Randomized pauses that keep request cadence human-like.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PacingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_before_extract")]
    pub before_extract: DelayRange,
    #[serde(default = "default_between_pages")]
    pub between_pages: DelayRange,
    #[serde(default = "default_after_detail")]
    pub after_detail: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            before_extract: default_before_extract(),
            between_pages: default_between_pages(),
            after_detail: default_after_detail(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://ecaytrade.com".into()
}

fn default_listings_path() -> String {
    "/autos-boats/autos".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_card_wait() -> u64 {
    30
}

fn default_min_price() -> f64 {
    4000.0
}

fn default_navigation_timeout() -> u64 {
    45
}

fn default_before_extract() -> DelayRange {
    DelayRange::new(1500, 2500)
}

fn default_between_pages() -> DelayRange {
    DelayRange::new(2000, 3500)
}

fn default_after_detail() -> DelayRange {
    DelayRange::new(400, 800)
}

fn default_store_path() -> String {
    "listings.json".into()
}
