use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::types::TraversalConfig;
use crate::domain::card::{DetailPage, RawCard};
use crate::error::{Result, TrackerError};
use crate::ports::browser::ListingBrowser;
use crate::traversal::Crawler;
use crate::traversal::pacing::NoPacer;

pub struct ScriptedPage {
    pub cards: Vec<RawCard>,
    pub has_next: bool,
}

/// A browser that replays canned result pages and detail pages.
///
/// Pages past the scripted ones come back empty. Detail URLs without a
/// scripted page fail with a navigation error.
#[derive(Default)]
pub struct ScriptedBrowser {
    pages: Vec<ScriptedPage>,
    details: HashMap<String, DetailPage>,
    failing_page: Option<u32>,
    hanging_page: Option<u32>,
    current: Mutex<Option<u32>>,
    opened: Mutex<Vec<u32>>,
    detail_requests: Mutex<Vec<String>>,
}

impl ScriptedBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_page(mut self, cards: Vec<RawCard>, has_next: bool) -> Self {
        self.pages.push(ScriptedPage { cards, has_next });
        self
    }

    #[must_use]
    pub fn with_detail(mut self, url: &str, labels: &[(&str, &str)], body_text: &str) -> Self {
        self.details.insert(
            url.to_string(),
            DetailPage {
                labels: labels
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
                body_text: body_text.to_string(),
            },
        );
        self
    }

    /// Navigation to `page` fails.
    #[must_use]
    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Navigation to `page` never completes.
    #[must_use]
    pub fn hanging_on(mut self, page: u32) -> Self {
        self.hanging_page = Some(page);
        self
    }

    pub fn opened_pages(&self) -> Vec<u32> {
        self.opened.lock().unwrap().clone()
    }

    pub fn detail_requests(&self) -> Vec<String> {
        self.detail_requests.lock().unwrap().clone()
    }

    fn current_page(&self) -> Option<&ScriptedPage> {
        let current = (*self.current.lock().unwrap())?;
        self.pages.get(usize::try_from(current).ok()?.checked_sub(1)?)
    }
}

#[async_trait]
impl ListingBrowser for ScriptedBrowser {
    async fn open_results(&self, page: u32) -> Result<()> {
        self.opened.lock().unwrap().push(page);
        if self.hanging_page == Some(page) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing_page == Some(page) {
            return Err(TrackerError::Navigation {
                url: format!("scripted://results/{page}"),
                reason: "connection reset".into(),
            });
        }
        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn read_cards(&self) -> Result<Vec<RawCard>> {
        Ok(self
            .current_page()
            .map(|page| page.cards.clone())
            .unwrap_or_default())
    }

    async fn has_next_page(&self, _current: u32) -> Result<bool> {
        Ok(self.current_page().is_some_and(|page| page.has_next))
    }

    async fn fetch_detail(&self, url: &str) -> Result<DetailPage> {
        self.detail_requests.lock().unwrap().push(url.to_string());
        self.details
            .get(url)
            .cloned()
            .ok_or_else(|| TrackerError::Navigation {
                url: url.to_string(),
                reason: "no scripted detail page".into(),
            })
    }
}

/// A card whose text reads like the site's: price line, title, extra line.
pub fn advert_card(id: u32, title: &str, price: &str, extra: &str) -> RawCard {
    RawCard::new(
        format!("https://ecaytrade.com/advert/{id}"),
        format!("{price}\n{title}\n{extra}"),
    )
}

/// Crawler with default rules (4000 floor) and no pacing.
pub fn test_crawler(browser: Arc<ScriptedBrowser>) -> Crawler {
    Crawler::new(browser, Arc::new(NoPacer), &TraversalConfig::default())
}
