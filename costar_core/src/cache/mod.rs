//! Time-bounded lookup caching
//!
//! A single generic [`TtlCache`] backs every cached lookup. [`LookupCache`]
//! groups one instance per record type and decides which TTL class applies.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::time::Duration;
use tokio::time::Instant;

pub mod keys;
pub mod lookup;
pub mod ttl_cache;

pub use keys::{PathKey, normalize_query};
pub use lookup::LookupCache;
pub use ttl_cache::TtlCache;

/// A cached value with its absolute expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
    pub last_accessed: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: now + ttl,
            last_accessed: now,
        }
    }

    /// An entry is logically gone once now passes its expiry
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
}

impl CacheStats {
    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

impl Sum for CacheStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, stats| Self {
            entry_count: acc.entry_count + stats.entry_count,
            hit_count: acc.hit_count + stats.hit_count,
            miss_count: acc.miss_count + stats.miss_count,
            eviction_count: acc.eviction_count + stats.eviction_count,
        })
    }
}

/// How long a kind of cached data stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlClass {
    /// Actor and movie details, which almost never change
    Identity,
    /// Filmographies and cast lists
    Listing,
    /// Computed connection paths
    Path,
    /// Free-text search results
    Search,
}

/// Configuration for the lookup cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub identity_ttl_secs: u64,
    pub listing_ttl_secs: u64,
    pub path_ttl_secs: u64,
    pub search_ttl_secs: u64,
    /// Maximum entries per record store, unbounded when `None`
    pub max_entries: Option<usize>,
    /// Interval of the background expiry sweep
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            identity_ttl_secs: 86400, // 24 hours
            listing_ttl_secs: 21600,  // 6 hours
            path_ttl_secs: 3600,      // 1 hour
            search_ttl_secs: 300,     // 5 minutes
            max_entries: Some(50_000),
            sweep_interval_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self, class: TtlClass) -> Duration {
        let secs = match class {
            TtlClass::Identity => self.identity_ttl_secs,
            TtlClass::Listing => self.listing_ttl_secs,
            TtlClass::Path => self.path_ttl_secs,
            TtlClass::Search => self.search_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Reject zero TTLs, a zero sweep interval and a zero-capacity store
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("identity_ttl_secs", self.identity_ttl_secs),
            ("listing_ttl_secs", self.listing_ttl_secs),
            ("path_ttl_secs", self.path_ttl_secs),
            ("search_ttl_secs", self.search_ttl_secs),
            ("sweep_interval_secs", self.sweep_interval_secs),
        ] {
            if value == 0 {
                return Err(ValidationError::invalid_parameter(
                    &format!("cache.{field}"),
                    "must be greater than zero",
                )
                .into());
            }
        }
        if self.max_entries == Some(0) {
            return Err(ValidationError::invalid_parameter(
                "cache.max_entries",
                "must be greater than zero when set",
            )
            .into());
        }
        Ok(())
    }
}
