pub mod parser;

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::types::BrowserConfig;
use crate::domain::card::{DetailPage, RawCard};
use crate::error::{Result, TrackerError};
use crate::ports::browser::ListingBrowser;

/// The results page currently "open" in the browser.
struct OpenPage {
    url: Url,
    html: String,
}

/// A [`ListingBrowser`] over plain HTTP for server-rendered result pages.
pub struct HtmlBrowser {
    http: Client,
    base_url: String,
    listings_path: String,
    min_price: f64,
    max_retries: u32,
    retry_backoff: Duration,
    current: Mutex<Option<OpenPage>>,
}

impl HtmlBrowser {
    pub fn new(config: &BrowserConfig, min_price: f64) -> Result<Self> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            listings_path: config.listings_path.clone(),
            min_price,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_secs(2),
            current: Mutex::new(None),
        })
    }

    /// Base delay between retries; attempt `n` waits `n * backoff`.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn results_url(&self, page: u32) -> Result<Url> {
        results_url(&self.base_url, &self.listings_path, self.min_price, page)
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!(url, "Fetching page");

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_backoff * attempt;
                debug!(attempt, ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.http.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(TrackerError::Http);
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(TrackerError::Navigation {
                            url: url.to_string(),
                            reason: "page not found (404)".into(),
                        });
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!(url, attempt, "Rate limited (429)");
                    }
                    last_error = Some(TrackerError::Navigation {
                        url: url.to_string(),
                        reason: format!("HTTP {status}"),
                    });
                }
                Err(e) => {
                    warn!(error = %e, attempt, "HTTP request failed");
                    last_error = Some(TrackerError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| TrackerError::Navigation {
            url: url.to_string(),
            reason: "all retries exhausted".into(),
        }))
    }

    fn with_open_page<T>(&self, f: impl FnOnce(&OpenPage) -> Result<T>) -> Result<T> {
        let current = self
            .current
            .lock()
            .map_err(|_| TrackerError::Browser("page state lock poisoned".into()))?;
        let page = current
            .as_ref()
            .ok_or_else(|| TrackerError::Browser("no results page is open".into()))?;
        f(page)
    }
}

/// Page 1 is `{base}{path}?minprice={floor}`; later pages add `&page=N`.
pub fn results_url(base_url: &str, listings_path: &str, min_price: f64, page: u32) -> Result<Url> {
    let mut url = Url::parse(base_url)?.join(listings_path)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("minprice", &format_price(min_price));
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
    }
    Ok(url)
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0}")
    } else {
        price.to_string()
    }
}

#[async_trait]
impl ListingBrowser for HtmlBrowser {
    async fn open_results(&self, page: u32) -> Result<()> {
        let url = self.results_url(page)?;
        let html = self.fetch_html(url.as_str()).await?;
        debug!(page, bytes = html.len(), "Results page loaded");
        let mut current = self
            .current
            .lock()
            .map_err(|_| TrackerError::Browser("page state lock poisoned".into()))?;
        *current = Some(OpenPage { url, html });
        Ok(())
    }

    async fn read_cards(&self) -> Result<Vec<RawCard>> {
        self.with_open_page(|page| parser::parse_cards(&page.html, &page.url))
    }

    async fn has_next_page(&self, current: u32) -> Result<bool> {
        self.with_open_page(|page| parser::has_next_page(&page.html, &page.url, current))
    }

    async fn fetch_detail(&self, url: &str) -> Result<DetailPage> {
        let html = self.fetch_html(url).await?;
        parser::parse_detail(&html)
    }
}
