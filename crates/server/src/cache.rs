//! Read-through TTL cache over the content resources.
//!
//! Each resource owns one entry holding its full row set. A read either
//! returns the live entry or loads the rows from the [`ContentStore`] and
//! stores them for the configured TTL. Loads are coalesced per resource:
//! concurrent misses wait on a single database query.
//!
//! Failed loads are never cached.

use crate::metrics;
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use trustcenter_core::{Resource, Row};
use trustcenter_db::{ContentStore, DbError, DbResult};

/// Where a fetched row set came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

/// A resource's rows together with their origin.
#[derive(Clone, Debug)]
pub struct Fetched {
    pub data: Arc<Vec<Row>>,
    pub source: Source,
}

impl Fetched {
    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }
}

/// Cache counters and approximate sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Live (unexpired) entries.
    pub keys: u64,
    /// Reads served from the cache since construction.
    pub hits: u64,
    /// Reads that loaded from the database since construction.
    pub misses: u64,
    /// Approximate bytes of live keys.
    pub ksize: u64,
    /// Approximate bytes of live values.
    pub vsize: u64,
}

#[derive(Clone)]
struct CachedRows {
    rows: Arc<Vec<Row>>,
    approx_bytes: u64,
}

struct Inner {
    entries: Cache<Resource, CachedRows>,
    store: Arc<dyn ContentStore>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Shared read-through cache. Clones share the same entries and counters.
#[derive(Clone)]
pub struct CacheService {
    inner: Arc<Inner>,
}

impl CacheService {
    /// Create an empty cache in front of `store`. `ttl` must be non-zero.
    pub fn new(store: Arc<dyn ContentStore>, ttl: Duration) -> Self {
        let entries = Cache::builder().time_to_live(ttl).build();

        Self {
            inner: Arc::new(Inner {
                entries,
                store,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    /// Return the rows for `resource`, loading them on a miss.
    pub async fn fetch(&self, resource: Resource) -> DbResult<Fetched> {
        let store = Arc::clone(&self.inner.store);
        let entry = self
            .inner
            .entries
            .entry(resource)
            .or_try_insert_with(load(store, resource))
            .await
            .map_err(|source| DbError::Retrieval { resource, source })?;

        // Only the caller whose load populated the entry sees a fresh entry;
        // callers that waited on it read the shared value.
        let source = if entry.is_fresh() {
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_miss(resource);
            tracing::debug!(resource = %resource, "Cache miss, loaded from database");
            Source::Database
        } else {
            self.inner.hits.fetch_add(1, Ordering::Relaxed);
            metrics::record_cache_hit(resource);
            tracing::debug!(resource = %resource, "Cache hit");
            Source::Cache
        };

        Ok(Fetched {
            data: entry.into_value().rows,
            source,
        })
    }

    /// Drop one resource's entry, or every entry when `resource` is `None`.
    pub async fn invalidate(&self, resource: Option<Resource>) {
        match resource {
            Some(resource) => {
                self.inner.entries.invalidate(&resource).await;
                tracing::info!(resource = %resource, "Cache entry invalidated");
            }
            None => {
                for resource in Resource::ALL {
                    self.inner.entries.invalidate(&resource).await;
                }
                tracing::info!("All cache entries invalidated");
            }
        }
        metrics::CACHE_INVALIDATIONS.inc();
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            ..CacheStats::default()
        };

        for (resource, cached) in self.inner.entries.iter() {
            stats.keys += 1;
            stats.ksize += resource.cache_key().len() as u64;
            stats.vsize += cached.approx_bytes;
        }

        stats
    }

    /// Purge expired entries now instead of waiting for lazy cleanup.
    pub async fn run_pending_tasks(&self) {
        self.inner.entries.run_pending_tasks().await;
    }

    /// Spawn a background task that purges expired entries every `period`.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                cache.run_pending_tasks().await;
                tracing::trace!(
                    keys = cache.inner.entries.entry_count(),
                    "Cache sweep complete"
                );
            }
        })
    }
}

async fn load(store: Arc<dyn ContentStore>, resource: Resource) -> DbResult<CachedRows> {
    let timer = metrics::DB_QUERY_DURATION
        .with_label_values(&[resource.as_str()])
        .start_timer();
    let result = store.fetch_rows(resource).await;
    timer.observe_duration();

    match result {
        Ok(rows) => {
            let approx_bytes = rows.iter().map(|row| row.approx_size() as u64).sum();
            Ok(CachedRows {
                rows: Arc::new(rows),
                approx_bytes,
            })
        }
        Err(e) => {
            metrics::record_query_error(resource);
            Err(e)
        }
    }
}
