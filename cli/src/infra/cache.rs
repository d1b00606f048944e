//! Caching decorator for describe-by-identity lookups.
//!
//! Resources behind a [`ResourceDescriber`] never change once created, so a
//! value is kept forever under its canonical identity. A lookup key that
//! differs from that identity is an alias which may later point somewhere
//! else; it is kept only for a bounded time.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{Identified, ResourceDescriber};

/// How long an alias entry is trusted.
pub const DEFAULT_ALIAS_TTL: Duration = Duration::from_secs(30 * 60);

/// How often expired alias entries are swept.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Floor for the sweep interval; `tokio::time::interval` rejects zero.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

enum Entry<V> {
    /// Keyed by canonical identity; never evicted.
    Permanent(V),
    /// Keyed by an alias; dropped once `ttl` has elapsed.
    Expiring { value: V, inserted_at: Instant },
}

impl<V: Clone> Entry<V> {
    fn live_value(&self, ttl: Duration) -> Option<V> {
        match self {
            Entry::Permanent(value) => Some(value.clone()),
            Entry::Expiring { value, inserted_at } if inserted_at.elapsed() < ttl => {
                Some(value.clone())
            }
            Entry::Expiring { .. } => None,
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        matches!(self, Entry::Expiring { inserted_at, .. } if inserted_at.elapsed() >= ttl)
    }

    fn is_permanent(&self) -> bool {
        matches!(self, Entry::Permanent(_))
    }
}

/// Wraps a [`ResourceDescriber`] and memoizes successful lookups.
///
/// Errors are never cached. Concurrent misses on one key may both reach the
/// remote side; the results are identical so the later write is harmless.
pub struct CachingDescriber<D: ResourceDescriber> {
    inner: D,
    entries: DashMap<String, Entry<D::Resource>>,
    ttl: Duration,
}

impl<D: ResourceDescriber> CachingDescriber<D> {
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self::with_ttl(inner, DEFAULT_ALIAS_TTL)
    }

    #[must_use]
    pub fn with_ttl(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl,
        }
    }

    /// The cached value for `key`, if present and not expired.
    #[must_use]
    pub fn cached(&self, key: &str) -> Option<D::Resource> {
        self.entries.get(key)?.live_value(self.ttl)
    }

    /// Drop every expired alias entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(self.ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired ones included until swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn store(&self, key: &str, resource: &D::Resource) {
        let id = resource.canonical_id();
        if id != key {
            let alias_is_permanent = self.entries.get(key).is_some_and(|e| e.is_permanent());
            if !alias_is_permanent {
                self.entries.insert(
                    key.to_owned(),
                    Entry::Expiring {
                        value: resource.clone(),
                        inserted_at: Instant::now(),
                    },
                );
            }
        }
        self.entries
            .insert(id.to_owned(), Entry::Permanent(resource.clone()));
    }
}

impl<D: ResourceDescriber + 'static> CachingDescriber<D> {
    /// Run [`sweep`](Self::sweep) every `interval` until `cancel` fires.
    ///
    /// Intervals shorter than 100ms are raised to 100ms.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = cache.sweep();
                        if removed > 0 {
                            tracing::debug!(removed, "swept expired cache entries");
                        }
                    }
                }
            }
        })
    }
}

#[async_trait]
impl<D: ResourceDescriber> ResourceDescriber for CachingDescriber<D> {
    type Resource = D::Resource;

    async fn describe(&self, key: &str) -> Result<Self::Resource> {
        if let Some(resource) = self.cached(key) {
            tracing::trace!(key, "cache hit");
            return Ok(resource);
        }

        let resource = self.inner.describe(key).await?;
        tracing::debug!(key, id = resource.canonical_id(), "cached resource");
        self.store(key, &resource);
        Ok(resource)
    }
}
