//! Typed lookup cache shared by every search

use crate::cache::{CacheConfig, CacheStats, PathKey, TtlCache, TtlClass};
use crate::model::{Actor, CastMember, Movie, PathResult};
use log::debug;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Shortest period the background sweeper runs at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// One TTL cache per record type, plus the computed path store
///
/// Constructed once and shared as `Arc<LookupCache>`; every provider fetch
/// made during a search goes through it.
pub struct LookupCache {
    config: CacheConfig,
    actors: TtlCache<u64, Actor>,
    movies: TtlCache<u64, Movie>,
    filmographies: TtlCache<u64, Arc<Vec<Movie>>>,
    casts: TtlCache<u64, Arc<Vec<CastMember>>>,
    searches: TtlCache<String, Arc<Vec<Actor>>>,
    paths: TtlCache<PathKey, PathResult>,
}

impl LookupCache {
    pub fn new(config: CacheConfig) -> Self {
        let max = config.max_entries;
        Self {
            config,
            actors: TtlCache::with_max_entries(max),
            movies: TtlCache::with_max_entries(max),
            filmographies: TtlCache::with_max_entries(max),
            casts: TtlCache::with_max_entries(max),
            searches: TtlCache::with_max_entries(max),
            paths: TtlCache::with_max_entries(max),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn actor<F, Fut, E>(&self, id: u64, producer: F) -> Result<Actor, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Actor, E>>,
    {
        let ttl = self.config.ttl(TtlClass::Identity);
        self.actors.get_or_compute(id, ttl, producer).await
    }

    pub async fn movie<F, Fut, E>(&self, id: u64, producer: F) -> Result<Movie, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Movie, E>>,
    {
        let ttl = self.config.ttl(TtlClass::Identity);
        self.movies.get_or_compute(id, ttl, producer).await
    }

    pub async fn filmography<F, Fut, E>(&self, actor_id: u64, producer: F) -> Result<Arc<Vec<Movie>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Vec<Movie>>, E>>,
    {
        let ttl = self.config.ttl(TtlClass::Listing);
        self.filmographies
            .get_or_compute(actor_id, ttl, producer)
            .await
    }

    pub async fn cast<F, Fut, E>(&self, movie_id: u64, producer: F) -> Result<Arc<Vec<CastMember>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Vec<CastMember>>, E>>,
    {
        let ttl = self.config.ttl(TtlClass::Listing);
        self.casts.get_or_compute(movie_id, ttl, producer).await
    }

    /// Search results keyed by the already-normalized query
    pub async fn search<F, Fut, E>(&self, query: String, producer: F) -> Result<Arc<Vec<Actor>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Vec<Actor>>, E>>,
    {
        let ttl = self.config.ttl(TtlClass::Search);
        self.searches.get_or_compute(query, ttl, producer).await
    }

    /// A previously computed path for this pair, in whichever order it was stored
    pub async fn cached_path(&self, key: &PathKey) -> Option<PathResult> {
        self.paths.get(key).await
    }

    pub async fn store_path(&self, key: PathKey, result: PathResult) {
        let ttl = self.config.ttl(TtlClass::Path);
        self.paths.set(key, result, ttl).await;
    }

    /// Drop every cached record and computed path
    pub async fn clear(&self) {
        self.actors.clear().await;
        self.movies.clear().await;
        self.filmographies.clear().await;
        self.casts.clear().await;
        self.searches.clear().await;
        self.paths.clear().await;
    }

    /// Totals across every store
    pub async fn stats(&self) -> CacheStats {
        self.stats_by_store()
            .await
            .into_iter()
            .map(|(_, stats)| stats)
            .sum()
    }

    pub async fn stats_by_store(&self) -> Vec<(&'static str, CacheStats)> {
        vec![
            ("actors", self.actors.stats().await),
            ("movies", self.movies.stats().await),
            ("filmographies", self.filmographies.stats().await),
            ("casts", self.casts.stats().await),
            ("searches", self.searches.stats().await),
            ("paths", self.paths.stats().await),
        ]
    }

    /// Remove expired entries from every store
    pub async fn purge_expired(&self) -> usize {
        self.actors.purge_expired().await
            + self.movies.purge_expired().await
            + self.filmographies.purge_expired().await
            + self.casts.purge_expired().await
            + self.searches.purge_expired().await
            + self.paths.purge_expired().await
    }

    /// Start a background task that purges expired entries every `interval`
    ///
    /// The task only holds a weak reference and exits once the cache is dropped.
    /// A zero `interval` is raised to [`MIN_SWEEP_INTERVAL`].
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    debug!("Lookup cache dropped, stopping sweeper");
                    break;
                };
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!("Sweeper purged {purged} expired cache entries");
                }
            }
        })
    }
}

impl Default for LookupCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
