//! costar core library
//!
//! Finds the shortest chain of shared movies between two actors: a cached
//! metadata provider layer, a generic TTL cache, and a phased breadth-first
//! connection search.

pub mod cache;
pub mod error;
pub mod model;
pub mod provider;
pub mod search;

// Re-export main types
pub use cache::{CacheConfig, CacheStats, LookupCache, PathKey, TtlCache, TtlClass};
pub use error::{Error, Result};
pub use model::{Actor, CastMember, FoundBy, Movie, PathResult, PathStep};
pub use provider::{
    CachingProvider, FixtureProvider, GraphFixture, MetadataProvider, TmdbConfig, TmdbProvider,
};
pub use search::{ConnectionEngine, PhaseBudget, SearchConfig};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Core configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

impl CoreConfig {
    /// Create a test configuration
    pub fn test() -> Self {
        Self {
            cache: CacheConfig {
                max_entries: Some(1_000),
                sweep_interval_secs: 1,
                ..Default::default()
            },
            search: SearchConfig {
                direct_batch_size: 4,
                batch_size: 2,
                phases: vec![
                    PhaseBudget {
                        name: "fast".to_string(),
                        max_movies_per_actor: 5,
                        max_cast_per_movie: 5,
                        max_depth: 3,
                        max_iterations: 10,
                    },
                    PhaseBudget::exhaustive(),
                ],
                ..Default::default()
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.search.validate()
    }

    /// Build an engine over `provider` with a fresh lookup cache
    pub fn build_engine(&self, provider: Arc<dyn MetadataProvider>) -> Result<ConnectionEngine> {
        let cache = Arc::new(LookupCache::new(self.cache.clone()));
        ConnectionEngine::new(provider, cache, self.search.clone())
    }
}
