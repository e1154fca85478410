//! Single-slot cache for the next match
//!
//! Provides a `MatchCache` that keeps the most recently fetched match under a
//! fixed storage key. An entry is trusted until the TTL runs out or the match
//! kicks off, whichever comes first; after that the next `get` refetches.

use chrono::serde::ts_milliseconds;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::storage::Storage;
use crate::clock::{Clock, SystemClock};
use crate::data::{FetchError, MatchFetcher, MatchRecord};

/// Storage key of the single cache slot
pub const CACHE_KEY: &str = "next_match";

/// Default time-to-live for a cached match
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 6;

/// Persisted form of the cached match
///
/// Serialized as `{ "match": {...}, "cachedAt": <ms>, "expiresAt": <ms> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached fixture
    #[serde(rename = "match")]
    pub match_record: MatchRecord,
    /// When the fixture was fetched
    #[serde(with = "ts_milliseconds")]
    pub cached_at: DateTime<Utc>,
    /// When the entry stops being trusted
    #[serde(with = "ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wraps a freshly fetched match
    ///
    /// The entry expires after `ttl` or at kickoff, whichever is sooner.
    pub fn new(match_record: MatchRecord, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = cached_at
            .checked_add_signed(ttl)
            .map_or(match_record.utc_date, |by_ttl| by_ttl.min(match_record.utc_date));
        Self {
            match_record,
            cached_at,
            expires_at,
        }
    }

    /// Whether the entry can still be served at `now`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.invalid_reason(now).is_none()
    }

    /// Why the entry can no longer be served, if it can't
    ///
    /// Both checks are made: an entry persisted with a longer TTL than the
    /// current one can carry an `expires_at` past kickoff.
    fn invalid_reason(&self, now: DateTime<Utc>) -> Option<&'static str> {
        if now > self.expires_at {
            return Some("expired by time");
        }
        if now > self.match_record.utc_date {
            return Some("match time has passed");
        }
        None
    }
}

/// Cache in front of a [`MatchFetcher`]
pub struct MatchCache<S, F> {
    storage: S,
    fetcher: F,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<S: Storage, F: MatchFetcher> MatchCache<S, F> {
    /// Creates a cache with the default 6 hour TTL and the system clock
    pub fn new(storage: S, fetcher: F) -> Self {
        Self {
            storage,
            fetcher,
            clock: Arc::new(SystemClock),
            ttl: Duration::hours(DEFAULT_CACHE_TTL_HOURS as i64),
        }
    }

    /// Sets how long a fetched match is trusted (capped by kickoff)
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the clock used for expiry decisions
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the next match, fetching only when the cached one can't be trusted
    ///
    /// # Returns
    /// * `Ok(MatchRecord)` - The cached match if still valid, otherwise a freshly fetched one
    /// * `Err(FetchError)` - The fetcher failed; nothing was written
    pub async fn get(&self) -> Result<MatchRecord, FetchError> {
        if let Some(entry) = self.peek() {
            match entry.invalid_reason(self.clock.now()) {
                None => {
                    debug!(expires_at = %entry.expires_at, "using cached match data");
                    return Ok(entry.match_record);
                }
                Some(reason) => info!(reason, "cached match data is stale"),
            }
        }

        info!("fetching fresh match data");
        self.fetch_and_store().await
    }

    /// Fetches the next match regardless of what is cached and replaces the entry
    pub async fn force_refresh(&self) -> Result<MatchRecord, FetchError> {
        info!("force refreshing match data");
        self.fetch_and_store().await
    }

    /// Removes the cached entry
    ///
    /// Storage failures are logged and swallowed.
    pub fn clear(&self) {
        match self.storage.remove(CACHE_KEY) {
            Ok(()) => info!("cache cleared"),
            Err(e) => warn!(error = %e, "failed to clear cache"),
        }
    }

    /// Reads and decodes the persisted entry without judging its validity
    ///
    /// Unreadable or undecodable data is reported as `None`.
    pub fn peek(&self) -> Option<CacheEntry> {
        let raw = match self.storage.read(CACHE_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read cache");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<MatchRecord, FetchError> {
        let match_record = self.fetcher.fetch_next_match().await.map_err(|e| {
            warn!(error = %e, "failed to fetch match data");
            e
        })?;

        self.store(&match_record);
        Ok(match_record)
    }

    /// Persists a new entry; failures only cost us the cache
    fn store(&self, match_record: &MatchRecord) {
        let entry = CacheEntry::new(match_record.clone(), self.clock.now(), self.ttl);

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to encode cache entry");
                return;
            }
        };

        match self.storage.write(CACHE_KEY, &json) {
            Ok(()) => info!(expires_at = %entry.expires_at, "match data cached"),
            Err(e) => warn!(error = %e, "failed to cache match data"),
        }
    }
}
