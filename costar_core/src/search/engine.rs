//! Connection search orchestration

use crate::cache::{CacheStats, LookupCache, PathKey};
use crate::error::{Error, Result};
use crate::model::{Actor, FoundBy, PathResult};
use crate::provider::{CachingProvider, MetadataProvider};
use crate::search::bfs::{PhasedSearch, SearchStats};
use crate::search::direct::find_direct;
use crate::search::SearchConfig;
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Finds the shortest shared-movie chain between two actors
///
/// Every provider fetch goes through the injected [`LookupCache`], and
/// finished paths are cached under an order-independent pair key, so
/// `find_path(a, b)` and `find_path(b, a)` share work.
pub struct ConnectionEngine {
    provider: CachingProvider,
    config: SearchConfig,
}

impl ConnectionEngine {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        cache: Arc<LookupCache>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            provider: CachingProvider::new(provider, cache),
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The caching provider used for every lookup
    pub fn provider(&self) -> &CachingProvider {
        &self.provider
    }

    pub fn lookup(&self) -> &Arc<LookupCache> {
        self.provider.cache()
    }

    /// Find a path that starts at `actor1` and ends at `actor2`
    ///
    /// Fails with `Upstream` when either endpoint cannot be resolved and with
    /// `NotFound` when every phase runs out of budget.
    pub async fn find_path(&self, actor1: u64, actor2: u64) -> Result<PathResult> {
        let key = PathKey::new(actor1, actor2);

        if let Some(cached) = self.lookup().cached_path(&key).await {
            debug!("Path cache hit for {key}");
            return Ok(orient(cached, actor1));
        }

        let started = Instant::now();
        let result = if actor1 == actor2 {
            PathResult::trivial(self.provider.actor(actor1).await?)
        } else {
            let (from, to) =
                tokio::try_join!(self.provider.actor(actor1), self.provider.actor(actor2))?;
            self.search(&from, &to).await?
        };
        debug!(
            "Found {}-degree path {key} via {:?} in {:?}",
            result.degrees(),
            result.found_by(),
            started.elapsed()
        );

        self.lookup().store_path(key, result.clone()).await;
        Ok(result)
    }

    async fn search(&self, from: &Actor, to: &Actor) -> Result<PathResult> {
        if let Some(result) = find_direct(
            &self.provider,
            from,
            to,
            self.config.direct_prefix,
            self.config.direct_batch_size,
        )
        .await
        {
            return Ok(result);
        }

        let mut totals = SearchStats::default();
        for budget in &self.config.phases {
            debug!("Starting phase {} for {} -> {}", budget.name, from.id, to.id);
            let outcome = PhasedSearch::new(
                &self.provider,
                budget,
                self.config.batch_size,
                self.config.bidirectional,
            )
            .run(from, to)
            .await;
            totals += outcome.stats;

            if let Some(path) = outcome.path {
                log_totals(from, to, &totals);
                return PathResult::from_steps(path, FoundBy::Phase(budget.name.clone()));
            }
        }

        log_totals(from, to, &totals);
        Err(Error::not_found(from.id, to.id))
    }

    /// Resolve a free-text query to candidate actors, best match first
    pub async fn search_actors(&self, query: &str) -> Result<Vec<Actor>> {
        Ok(self.provider.search(query).await?.as_ref().clone())
    }

    /// Drop every cached lookup and computed path
    pub async fn clear_cache(&self) {
        self.lookup().clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.lookup().stats().await
    }
}

fn log_totals(from: &Actor, to: &Actor, totals: &SearchStats) {
    debug!(
        "Search {} -> {} totals: iterations={} actors_visited={} movies_scanned={} skipped_fetches={}",
        from.id,
        to.id,
        totals.iterations,
        totals.actors_visited,
        totals.movies_scanned,
        totals.skipped_fetches
    );
}

/// A cached path may have been stored for the reverse query
fn orient(result: PathResult, start: u64) -> PathResult {
    if result.start().is_some_and(|actor| actor.id == start) {
        result
    } else {
        result.reversed()
    }
}
