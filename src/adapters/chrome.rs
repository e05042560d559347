use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info, warn};
use url::Url;

use crate::adapters::html::{parser, results_url};
use crate::config::types::BrowserConfig;
use crate::domain::card::{DetailPage, RawCard};
use crate::error::{Result, TrackerError};
use crate::ports::browser::ListingBrowser;

const CARD_SELECTOR: &str = r#"a[href*="/advert/"]"#;

fn browser_err(e: impl std::fmt::Display) -> TrackerError {
    TrackerError::Browser(e.to_string())
}

/// Run blocking CDP calls off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(browser_err)?
}

/// Run `work` on `tab`, then `close` it whatever the outcome.
fn close_after<R, T>(
    tab: &R,
    work: impl FnOnce(&R) -> Result<T>,
    close: impl FnOnce(&R),
) -> Result<T> {
    let result = work(tab);
    close(tab);
    result
}

/// A [`ListingBrowser`] that renders pages in Chrome, for result pages that
/// only fill in their cards client-side.
pub struct ChromeBrowser {
    browser: Browser,
    tab: Arc<Tab>,
    base_url: String,
    listings_path: String,
    min_price: f64,
    user_agent: String,
    card_wait: Duration,
    current: Mutex<Option<(Url, String)>>,
}

impl ChromeBrowser {
    pub fn launch(config: &BrowserConfig, min_price: f64) -> Result<Self> {
        info!(headless = config.headless, "Launching Chrome");
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .build()
            .map_err(browser_err)?;
        let browser = Browser::new(options).map_err(browser_err)?;
        let tab = browser.new_tab().map_err(browser_err)?;
        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(browser_err)?;

        Ok(Self {
            browser,
            tab,
            base_url: config.base_url.clone(),
            listings_path: config.listings_path.clone(),
            min_price,
            user_agent: config.user_agent.clone(),
            card_wait: Duration::from_secs(config.card_wait_secs),
            current: Mutex::new(None),
        })
    }

    fn with_open_page<T>(&self, f: impl FnOnce(&Url, &str) -> Result<T>) -> Result<T> {
        let current = self
            .current
            .lock()
            .map_err(|_| browser_err("page state lock poisoned"))?;
        let (url, html) = current
            .as_ref()
            .ok_or_else(|| browser_err("no results page is open"))?;
        f(url, html)
    }
}

#[async_trait]
impl ListingBrowser for ChromeBrowser {
    async fn open_results(&self, page: u32) -> Result<()> {
        let url = results_url(&self.base_url, &self.listings_path, self.min_price, page)?;
        let tab = Arc::clone(&self.tab);
        let card_wait = self.card_wait;
        let target = url.to_string();

        let html = blocking(move || {
            tab.navigate_to(&target)
                .and_then(|tab| tab.wait_until_navigated())
                .map_err(|e| TrackerError::Navigation {
                    url: target.clone(),
                    reason: e.to_string(),
                })?;
            // No cards within the wait means an empty page, not a failure.
            if let Err(e) = tab.wait_for_element_with_custom_timeout(CARD_SELECTOR, card_wait) {
                warn!(url = %target, error = %e, "Listing cards never appeared");
            }
            tab.get_content().map_err(browser_err)
        })
        .await?;

        debug!(page, bytes = html.len(), "Results page rendered");
        let mut current = self
            .current
            .lock()
            .map_err(|_| browser_err("page state lock poisoned"))?;
        *current = Some((url, html));
        Ok(())
    }

    async fn read_cards(&self) -> Result<Vec<RawCard>> {
        self.with_open_page(|url, html| parser::parse_cards(html, url))
    }

    async fn has_next_page(&self, current: u32) -> Result<bool> {
        self.with_open_page(|url, html| parser::has_next_page(html, url, current))
    }

    async fn fetch_detail(&self, url: &str) -> Result<DetailPage> {
        let browser = self.browser.clone();
        let user_agent = self.user_agent.clone();
        let target = url.to_string();

        let html = blocking(move || {
            let tab = browser.new_tab().map_err(browser_err)?;
            close_after(
                &tab,
                |tab| {
                    tab.set_user_agent(&user_agent, None, None)
                        .map_err(browser_err)?;
                    tab.navigate_to(&target)
                        .and_then(|tab| tab.wait_until_navigated())
                        .map_err(|e| TrackerError::Navigation {
                            url: target.clone(),
                            reason: e.to_string(),
                        })?;
                    tab.get_content().map_err(browser_err)
                },
                |tab| {
                    if let Err(e) = tab.close(false) {
                        debug!(url = %target, error = %e, "Closing detail tab failed");
                    }
                },
            )
        })
        .await?;

        parser::parse_detail(&html)
    }
}
