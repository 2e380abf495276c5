//! Sitemap cache implementation
//!
//! Maps a normalized sitemap URL to the page URLs extracted from it, with
//! expiration after a fixed TTL (24 hours by default). Staleness is checked at
//! read time; expired entries are never evicted, only replaced or cleared.

use crate::config::MAX_TTL_HOURS;
use crate::storage::{self, SharedStore, StorageResult, CACHE_KEY};
use crate::url::NormalizedUrl;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Page URLs extracted from one sitemap, with the time they were fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Extracted page URLs, in document order
    pub urls: Vec<String>,

    /// When the sitemap was resolved (epoch milliseconds)
    pub fetched_at: i64,
}

impl CacheEntry {
    /// Creates an entry stamped with the given time
    pub fn new(urls: Vec<String>, now: DateTime<Utc>) -> Self {
        Self {
            urls,
            fetched_at: now.timestamp_millis(),
        }
    }

    /// Returns how long ago the entry was fetched, relative to `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        Duration::milliseconds(now.timestamp_millis() - self.fetched_at)
    }

    /// Checks if the entry is no longer valid at `now`
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) >= ttl
    }
}

type CacheMap = HashMap<String, CacheEntry>;

/// Persistent cache of resolved sitemaps
///
/// The whole map lives under a single store key. It is read in full on every
/// lookup and rewritten in full on every insert.
#[derive(Clone)]
pub struct SitemapCache {
    store: SharedStore,
    ttl: Duration,
}

impl SitemapCache {
    /// Creates a cache over `store` whose entries live for `ttl`
    pub fn new(store: SharedStore, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Creates a cache with a TTL given in hours, capped at `MAX_TTL_HOURS`
    pub fn with_ttl_hours(store: SharedStore, hours: u64) -> Self {
        let hours = hours.min(MAX_TTL_HOURS) as i64;
        Self::new(store, Duration::hours(hours))
    }

    /// Looks up a fresh entry for `url`
    pub fn get(&self, url: &NormalizedUrl) -> StorageResult<Option<CacheEntry>> {
        self.get_at(url, Utc::now())
    }

    /// Looks up an entry for `url` as of `now`; stale entries read as absent
    pub fn get_at(&self, url: &NormalizedUrl, now: DateTime<Utc>) -> StorageResult<Option<CacheEntry>> {
        let mut map = self.load_map()?;
        Ok(map
            .remove(url.as_str())
            .filter(|entry| !entry.is_stale(self.ttl, now)))
    }

    /// Stores the URLs resolved for `url`, replacing any previous entry
    pub fn put(&self, url: &NormalizedUrl, urls: Vec<String>) -> StorageResult<()> {
        self.put_at(url, urls, Utc::now())
    }

    /// Stores the URLs resolved for `url` stamped with `now`
    pub fn put_at(&self, url: &NormalizedUrl, urls: Vec<String>, now: DateTime<Utc>) -> StorageResult<()> {
        let mut map = self.load_map()?;
        map.insert(url.as_str().to_string(), CacheEntry::new(urls, now));
        storage::save(&self.store, CACHE_KEY, &map)
    }

    /// Drops every cached sitemap
    pub fn clear(&self) -> StorageResult<()> {
        storage::remove(&self.store, CACHE_KEY)?;
        Ok(())
    }

    /// Number of entries held, fresh or stale
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.load_map()?.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    fn load_map(&self) -> StorageResult<CacheMap> {
        Ok(storage::load::<CacheMap>(&self.store, CACHE_KEY)?.unwrap_or_default())
    }
}
