use async_trait::async_trait;

use crate::domain::listing::{Listing, UpsertOutcome};
use crate::error::Result;

#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Fail fast before any page is fetched when the store is unusable.
    async fn health_check(&self) -> Result<()>;

    /// Insert or update by external id. `price_changed` only when a prior
    /// price existed, differs, and the new price is positive.
    async fn upsert(&self, listing: &Listing) -> Result<UpsertOutcome>;

    /// Make buffered writes durable. No-op by default.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}
