//! Read-through cache for listing results.
//!
//! Holds one computed value with the instant it was computed. Callers hand
//! [`ListingCache::get_or_refresh`] the fetch to run on a miss; concurrent
//! misses are coalesced so a single fetch serves all of them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

/// Source of the current instant.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry<T> {
    value: Arc<T>,
    computed_at: Instant,
}

/// Single-value cache with a fixed freshness window.
pub struct ListingCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<CacheEntry<T>>>,
    /// Held for the duration of a refresh.
    refresh: Mutex<()>,
}

impl<T> fmt::Debug for ListingCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingCache")
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<T> ListingCache<T>
where
    T: Send + Sync,
{
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the stored value if still fresh, otherwise run `fetch` and
    /// store its result.
    ///
    /// A failed fetch leaves the previous entry in place.
    ///
    /// # Errors
    ///
    /// Returns whatever `fetch` returns.
    pub async fn get_or_refresh<F, Fut, E>(&self, fetch: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh().await {
            tracing::debug!("Listing cache hit");
            return Ok(value);
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have refreshed while we waited.
        if let Some(value) = self.fresh().await {
            tracing::debug!("Listing cache refreshed by concurrent caller");
            return Ok(value);
        }

        tracing::debug!("Listing cache miss, fetching");
        let value = Arc::new(fetch().await?);
        *self.entry.write().await = Some(CacheEntry {
            value: Arc::clone(&value),
            computed_at: self.clock.now(),
        });

        Ok(value)
    }

    /// Drop the stored value so the next call refetches.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }

    async fn fresh(&self) -> Option<Arc<T>> {
        let now = self.clock.now();
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.computed_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }
}
