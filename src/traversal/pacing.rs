use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::config::types::{DelayRange, PacingConfig};

/// Points in a crawl where the crawler idles to look like a person browsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pause {
    /// After a results page rendered, before its cards are read.
    BeforeExtract,
    /// Between one results page and the next.
    BetweenPages,
    /// After a listing's detail page was read.
    AfterDetail,
}

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Sleeps a uniformly random duration from the configured range.
pub struct JitterPacer {
    before_extract: DelayRange,
    between_pages: DelayRange,
    after_detail: DelayRange,
}

impl JitterPacer {
    pub fn new(config: &PacingConfig) -> Self {
        Self {
            before_extract: config.before_extract,
            between_pages: config.between_pages,
            after_detail: config.after_detail,
        }
    }

    pub fn delay_for(&self, pause: Pause) -> Duration {
        let range = match pause {
            Pause::BeforeExtract => self.before_extract,
            Pause::BetweenPages => self.between_pages,
            Pause::AfterDetail => self.after_detail,
        };
        if range.max_ms <= range.min_ms {
            return Duration::from_millis(range.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(range.min_ms..=range.max_ms))
    }
}

#[async_trait]
impl Pacer for JitterPacer {
    async fn pause(&self, pause: Pause) {
        let delay = self.delay_for(pause);
        tracing::debug!(?pause, ?delay, "Pacing");
        tokio::time::sleep(delay).await;
    }
}

/// Never waits. For tests and trusted mirrors.
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _pause: Pause) {}
}

pub fn pacer_from_config(config: &PacingConfig) -> Arc<dyn Pacer> {
    if config.enabled {
        Arc::new(JitterPacer::new(config))
    } else {
        tracing::warn!("Request pacing disabled");
        Arc::new(NoPacer)
    }
}
