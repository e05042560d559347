use std::fmt;

use serde::Serialize;
use tracing::{error, info};

use crate::error::{Result, TrackerError};
use crate::ports::store::ListingStore;
use crate::traversal::{Crawler, PassReport, StopReason};

/// Counts from one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages_visited: u32,
    pub raw_cards: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub card_errors: usize,
    pub detail_failures: usize,
    pub stop: StopReason,
    pub inserted: usize,
    /// Existing listings seen again, including those whose price changed.
    pub updated: usize,
    pub price_changed: usize,
    /// Listings the store refused.
    pub errors: usize,
}

impl RunSummary {
    fn from_report(report: &PassReport) -> Self {
        Self {
            pages_visited: report.pages_visited,
            raw_cards: report.raw_cards,
            accepted: report.listings.len(),
            rejected: report.rejected,
            card_errors: report.card_errors,
            detail_failures: report.detail_failures,
            stop: report.stop.clone(),
            inserted: 0,
            updated: 0,
            price_changed: 0,
            errors: 0,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted: {} | updated: {} (price changed: {}) | errors: {} | pages: {} | accepted {} of {} cards",
            self.inserted,
            self.updated,
            self.price_changed,
            self.errors,
            self.pages_visited,
            self.accepted,
            self.raw_cards,
        )
    }
}

/// One pass: check the store, crawl, upsert every accepted listing, flush.
///
/// A pass that accepts no listings at all fails with
/// [`TrackerError::NoListings`]; a store error on one listing does not.
pub async fn run_once(crawler: &Crawler, store: &dyn ListingStore) -> Result<RunSummary> {
    store.health_check().await?;

    let report = crawler.run().await;
    if report.listings.is_empty() {
        error!(stop = ?report.stop, raw_cards = report.raw_cards, "No listings extracted");
        return Err(TrackerError::NoListings);
    }
    info!(count = report.listings.len(), "Upserting listings");

    let mut summary = RunSummary::from_report(&report);
    for listing in &report.listings {
        match store.upsert(listing).await {
            Ok(outcome) if outcome.inserted => summary.inserted += 1,
            Ok(outcome) => {
                summary.updated += 1;
                if outcome.price_changed {
                    summary.price_changed += 1;
                }
            }
            Err(e) => {
                error!(id = %listing.external_id, title = %listing.title, error = %e, "Upsert failed");
                summary.errors += 1;
            }
        }
    }
    store.flush().await?;

    info!(%summary, "Run complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::adapters::store::JsonStore;
    use crate::domain::listing::{Listing, UpsertOutcome};
    use crate::test_helpers::{ScriptedBrowser, advert_card, test_crawler};

    struct RefusingStore;

    #[async_trait]
    impl ListingStore for RefusingStore {
        async fn health_check(&self) -> Result<()> {
            Ok(())
        }

        async fn upsert(&self, listing: &Listing) -> Result<UpsertOutcome> {
            if listing.external_id == "2" {
                return Err(TrackerError::Store {
                    reason: "constraint violation".into(),
                });
            }
            Ok(UpsertOutcome::default())
        }
    }

    struct UnreachableStore;

    #[async_trait]
    impl ListingStore for UnreachableStore {
        async fn health_check(&self) -> Result<()> {
            Err(TrackerError::Store {
                reason: "connection refused".into(),
            })
        }

        async fn upsert(&self, _listing: &Listing) -> Result<UpsertOutcome> {
            unreachable!("upsert after failed health check")
        }
    }

    fn two_cars() -> ScriptedBrowser {
        ScriptedBrowser::new().with_page(
            vec![
                advert_card(1, "2018 Toyota Camry", "CI$ 12,000", "45,000 km"),
                advert_card(2, "2017 Mazda 3", "CI$ 8,500", "60,000 km"),
            ],
            false,
        )
    }

    #[tokio::test]
    async fn counts_inserts_then_updates() {
        let store = JsonStore::in_memory();
        let crawler = test_crawler(Arc::new(two_cars()));

        let first = run_once(&crawler, &store).await.unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.updated, 0);

        let second = run_once(&crawler, &store).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(second.price_changed, 0);
    }

    #[tokio::test]
    async fn price_change_is_counted_as_update() {
        let store = JsonStore::in_memory();
        run_once(&test_crawler(Arc::new(two_cars())), &store)
            .await
            .unwrap();

        let repriced = ScriptedBrowser::new().with_page(
            vec![advert_card(1, "2018 Toyota Camry", "CI$ 11,000", "45,000 km")],
            false,
        );
        let summary = run_once(&test_crawler(Arc::new(repriced)), &store)
            .await
            .unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.price_changed, 1);
    }

    #[tokio::test]
    async fn zero_listings_fails_the_run() {
        let browser = ScriptedBrowser::new().with_page(vec![], false);
        let err = run_once(&test_crawler(Arc::new(browser)), &JsonStore::in_memory())
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::NoListings));
    }

    #[tokio::test]
    async fn store_errors_are_counted_not_fatal() {
        let summary = run_once(&test_crawler(Arc::new(two_cars())), &RefusingStore)
            .await
            .unwrap();
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.updated, 1);
    }

    #[tokio::test]
    async fn unhealthy_store_stops_before_crawling() {
        let browser = Arc::new(two_cars());
        let err = run_once(&test_crawler(browser.clone()), &UnreachableStore)
            .await
            .unwrap_err();
        assert!(matches!(err, TrackerError::Store { .. }));
        assert!(browser.opened_pages().is_empty());
    }

    #[test]
    fn summary_display() {
        let summary = RunSummary {
            pages_visited: 3,
            raw_cards: 40,
            accepted: 31,
            rejected: 9,
            card_errors: 0,
            detail_failures: 2,
            stop: StopReason::EmptyPage { page: 3 },
            inserted: 5,
            updated: 26,
            price_changed: 2,
            errors: 0,
        };
        assert_eq!(
            summary.to_string(),
            "inserted: 5 | updated: 26 (price changed: 2) | errors: 0 | pages: 3 | accepted 31 of 40 cards"
        );
    }
}
