use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::listing::{Listing, PricePoint, StoredListing, UpsertOutcome};
use crate::error::{Result, TrackerError};
use crate::ports::store::ListingStore;

/// Listings keyed by external id, held in memory and written out as a JSON
/// array on [`ListingStore::flush`].
pub struct JsonStore {
    path: Option<PathBuf>,
    inner: RwLock<BTreeMap<String, StoredListing>>,
}

impl JsonStore {
    /// Open the store at `path`, loading whatever a previous run left there.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                let stored: Vec<StoredListing> = serde_json::from_str(&content)?;
                stored
                    .into_iter()
                    .map(|s| (s.listing.external_id.clone(), s))
                    .collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No listings file yet, starting empty");
                BTreeMap::new()
            }
            Err(e) => return Err(TrackerError::Io(e)),
        };
        tracing::debug!(path = %path.display(), count = entries.len(), "Loaded listings");
        Ok(Self {
            path: Some(path),
            inner: RwLock::new(entries),
        })
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, external_id: &str) -> Option<StoredListing> {
        self.inner.read().ok()?.get(external_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Result<Vec<StoredListing>> {
        let entries = self.inner.read().map_err(|_| TrackerError::Store {
            reason: "listing store lock poisoned".into(),
        })?;
        Ok(entries.values().cloned().collect())
    }
}

#[async_trait]
impl ListingStore for JsonStore {
    async fn health_check(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let meta = tokio::fs::metadata(dir).await.map_err(|e| TrackerError::Store {
            reason: format!("listings directory {} is unusable: {e}", dir.display()),
        })?;
        if !meta.is_dir() {
            return Err(TrackerError::Store {
                reason: format!("{} is not a directory", dir.display()),
            });
        }
        if meta.permissions().readonly() {
            return Err(TrackerError::Store {
                reason: format!("{} is read-only", dir.display()),
            });
        }
        Ok(())
    }

    async fn upsert(&self, listing: &Listing) -> Result<UpsertOutcome> {
        let mut entries = self.inner.write().map_err(|_| TrackerError::Store {
            reason: "listing store lock poisoned".into(),
        })?;
        let now = Utc::now();
        let new_price = listing.price.filter(|p| *p > 0.0);

        let Some(existing) = entries.get_mut(&listing.external_id) else {
            let price_history = new_price
                .map(|price| PricePoint {
                    price,
                    recorded_at: now,
                })
                .into_iter()
                .collect();
            let mut listing = listing.clone();
            listing.is_active = true;
            entries.insert(
                listing.external_id.clone(),
                StoredListing {
                    listing,
                    first_seen: now,
                    last_seen: now,
                    price_history,
                },
            );
            return Ok(UpsertOutcome {
                inserted: true,
                price_changed: false,
            });
        };

        let price_changed = matches!(
            (existing.listing.price, new_price),
            (Some(old), Some(new)) if (old - new).abs() > f64::EPSILON
        );
        if price_changed && let Some(price) = new_price {
            tracing::debug!(
                id = %listing.external_id,
                old = ?existing.listing.price,
                new = price,
                "Price changed"
            );
            existing.price_history.push(PricePoint {
                price,
                recorded_at: now,
            });
        }
        existing.listing = listing.clone();
        existing.listing.is_active = true;
        existing.last_seen = now;

        Ok(UpsertOutcome {
            inserted: false,
            price_changed,
        })
    }

    async fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let stored = self.snapshot()?;
        let json = serde_json::to_string_pretty(&stored)?;
        tokio::fs::write(path, json).await?;
        tracing::info!(path = %path.display(), count = stored.len(), "Listings written");
        Ok(())
    }
}
