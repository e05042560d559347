pub mod pacing;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::types::TraversalConfig;
use crate::domain::acceptance::{AcceptanceRules, Rejection};
use crate::domain::card::RawCard;
use crate::domain::listing::Listing;
use crate::error::{CardError, Result, TrackerError};
use crate::extract::parse_card;
use crate::extract::reconcile::reconcile;
use crate::ports::browser::ListingBrowser;
use pacing::{Pacer, Pause};

/// Why a crawl ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StopReason {
    PageLimit { max_pages: u32 },
    /// The page held no result cards at all: the true end of results.
    EmptyPage { page: u32 },
    NoNextPage { page: u32 },
    PageFailed { page: u32, error: String },
    Deadline { page: u32 },
}

/// Fate of one raw card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardOutcome {
    Accepted {
        listing: Box<Listing>,
        /// Set when the detail page was needed but could not be read.
        detail_error: Option<String>,
    },
    Rejected(Rejection),
    Failed(CardError),
}

#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub listings: Vec<Listing>,
    pub pages_visited: u32,
    pub raw_cards: usize,
    pub rejected: usize,
    pub card_errors: usize,
    pub detail_failures: usize,
    pub stop: StopReason,
}

struct PageResult {
    raw_cards: usize,
    has_next: bool,
    outcomes: Vec<CardOutcome>,
}

/// Walks result pages in order, turning cards into accepted listings.
pub struct Crawler {
    browser: Arc<dyn ListingBrowser>,
    pacer: Arc<dyn Pacer>,
    rules: AcceptanceRules,
    max_pages: Option<u32>,
    navigation_timeout: Duration,
    pass_deadline: Option<Duration>,
    detail_fallback: bool,
}

impl Crawler {
    pub fn new(
        browser: Arc<dyn ListingBrowser>,
        pacer: Arc<dyn Pacer>,
        config: &TraversalConfig,
    ) -> Self {
        Self {
            browser,
            pacer,
            rules: AcceptanceRules::new(config.min_price),
            max_pages: config.max_pages,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            pass_deadline: config.pass_deadline_secs.map(Duration::from_secs),
            detail_fallback: config.detail_fallback,
        }
    }

    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_pass_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.pass_deadline = deadline;
        self
    }

    /// Crawl until a stop condition. Listings accepted before a page-level
    /// failure are kept.
    pub async fn run(&self) -> PassReport {
        let started = Instant::now();
        let mut listings = Vec::new();
        let mut pages_visited = 0;
        let mut raw_cards = 0;
        let mut rejected = 0;
        let mut card_errors = 0;
        let mut detail_failures = 0;
        let mut page = 1;

        let stop = loop {
            if let Some(max_pages) = self.max_pages
                && page > max_pages
            {
                info!(max_pages, "Reached page limit, stopping");
                break StopReason::PageLimit { max_pages };
            }
            if self.deadline_passed(started) {
                warn!(page, deadline = ?self.pass_deadline, "Pass deadline exceeded, stopping");
                break StopReason::Deadline { page };
            }

            let result = match self.crawl_page(page, started).await {
                Ok(result) => result,
                Err(e) => {
                    error!(page, error = %e, "Page failed, stopping pagination");
                    break StopReason::PageFailed {
                        page,
                        error: e.to_string(),
                    };
                }
            };
            pages_visited += 1;

            // Zero raw cards is the end of results; a page whose cards were
            // all rejected is not.
            if result.raw_cards == 0 {
                info!(page, "No raw cards found, end of listings");
                break StopReason::EmptyPage { page };
            }

            raw_cards += result.raw_cards;
            let mut accepted = 0;
            for outcome in result.outcomes {
                match outcome {
                    CardOutcome::Accepted {
                        listing,
                        detail_error,
                    } => {
                        accepted += 1;
                        if detail_error.is_some() {
                            detail_failures += 1;
                        }
                        listings.push(*listing);
                    }
                    CardOutcome::Rejected(_) => rejected += 1,
                    CardOutcome::Failed(_) => card_errors += 1,
                }
            }
            info!(page, accepted, total = listings.len(), "Page done");

            if !result.has_next {
                info!(page, "No next page, done");
                break StopReason::NoNextPage { page };
            }

            page += 1;
            self.pacer.pause(Pause::BetweenPages).await;
        };

        info!(
            pages = pages_visited,
            listings = listings.len(),
            stop = ?stop,
            "Crawl complete"
        );
        PassReport {
            listings,
            pages_visited,
            raw_cards,
            rejected,
            card_errors,
            detail_failures,
            stop,
        }
    }

    async fn crawl_page(&self, page: u32, started: Instant) -> Result<PageResult> {
        debug!(page, "Opening results page");
        self.bounded(&format!("results page {page}"), self.browser.open_results(page))
            .await?;

        self.pacer.pause(Pause::BeforeExtract).await;

        let mut cards = self
            .bounded(&format!("cards of page {page}"), self.browser.read_cards())
            .await?;
        let mut seen = HashSet::new();
        cards.retain(|card| seen.insert(card.url.clone()));
        info!(page, raw_cards = cards.len(), "Found raw cards");

        let has_next = match self.browser.has_next_page(page).await {
            Ok(has_next) => has_next,
            Err(e) => {
                warn!(page, error = %e, "Next-page check failed, assuming last page");
                false
            }
        };

        let mut outcomes = Vec::with_capacity(cards.len());
        for (idx, card) in cards.iter().enumerate() {
            outcomes.push(self.process_card(page, idx, card, started).await);
        }
        Ok(PageResult {
            raw_cards: cards.len(),
            has_next,
            outcomes,
        })
    }

    async fn process_card(
        &self,
        page: u32,
        idx: usize,
        card: &RawCard,
        started: Instant,
    ) -> CardOutcome {
        let mut listing = match parse_card(card) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(page, card = idx, error = %e, "Card extraction failed");
                return CardOutcome::Failed(e);
            }
        };

        if let Err(rejection) = self.rules.check(&listing) {
            debug!(page, card = idx, %rejection, title = %listing.title, "Skipping card");
            return CardOutcome::Rejected(rejection);
        }

        let mut detail_error = None;
        if listing.mileage.is_none() && self.detail_fallback {
            detail_error = self.escalate_to_detail(page, idx, &mut listing, started).await;
        }

        CardOutcome::Accepted {
            listing: Box::new(listing),
            detail_error,
        }
    }

    /// Fill gaps from the listing's own page. Returns why that failed, if it did.
    async fn escalate_to_detail(
        &self,
        page: u32,
        idx: usize,
        listing: &mut Listing,
        started: Instant,
    ) -> Option<String> {
        if self.deadline_passed(started) {
            warn!(page, card = idx, "Pass deadline exceeded, skipping detail fetch");
            return Some("pass deadline exceeded".to_string());
        }

        let mut detail_error = None;
        let fetched = self
            .bounded(&listing.url, self.browser.fetch_detail(&listing.url))
            .await;
        match fetched {
            Ok(detail) => {
                reconcile(listing, &detail);
                match listing.mileage {
                    Some(mileage) => debug!(page, card = idx, mileage, "Detail mileage"),
                    None => debug!(page, card = idx, "Detail mileage not found"),
                }
            }
            Err(e) => {
                warn!(page, card = idx, url = %listing.url, error = %e, "Detail fetch failed");
                detail_error = Some(e.to_string());
            }
        }
        self.pacer.pause(Pause::AfterDetail).await;
        detail_error
    }

    fn deadline_passed(&self, started: Instant) -> bool {
        self.pass_deadline
            .is_some_and(|deadline| started.elapsed() >= deadline)
    }

    async fn bounded<T>(&self, what: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.navigation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(TrackerError::Timeout {
                url: what.to_string(),
                secs: self.navigation_timeout.as_secs(),
            }),
        }
    }
}
