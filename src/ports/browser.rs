use async_trait::async_trait;

use crate::domain::card::{DetailPage, RawCard};
use crate::error::Result;

/// The rendering collaborator the crawler drives: it owns a single page
/// session, so calls must not be interleaved across crawls.
#[async_trait]
pub trait ListingBrowser: Send + Sync {
    /// Navigate to results page `page` (1-based) and wait for result cards.
    /// A page on which cards never appear is not an error; `read_cards` then
    /// returns nothing.
    async fn open_results(&self, page: u32) -> Result<()>;

    /// Every result card on the open page, deduplicated by URL.
    async fn read_cards(&self) -> Result<Vec<RawCard>>;

    /// Whether the open page links to page `current + 1`.
    async fn has_next_page(&self, current: u32) -> Result<bool>;

    /// Load a listing's own page in a separate context.
    async fn fetch_detail(&self, url: &str) -> Result<DetailPage>;
}
