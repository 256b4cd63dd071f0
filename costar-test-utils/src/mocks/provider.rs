//! Instrumented in-memory metadata provider

use async_trait::async_trait;
use costar_core::error::UpstreamError;
use costar_core::{
    Actor, CastMember, FixtureProvider, GraphFixture, MetadataProvider, Movie, Result,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Number of provider calls per method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub actor_details: usize,
    pub filmography: usize,
    pub cast: usize,
    pub movie_details: usize,
    pub search: usize,
}

impl CallCounts {
    /// Filmography and cast calls, the ones a search makes
    pub fn listings(&self) -> usize {
        self.filmography + self.cast
    }

    pub fn total(&self) -> usize {
        self.actor_details + self.filmography + self.cast + self.movie_details + self.search
    }
}

#[derive(Debug, Default)]
struct MockBehavior {
    failing_actor_details: HashSet<u64>,
    failing_filmographies: HashSet<u64>,
    failing_casts: HashSet<u64>,
    latency: Duration,
}

#[derive(Debug, Default)]
struct CallLog {
    counts: CallCounts,
    filmography_by_actor: HashMap<u64, usize>,
    cast_by_movie: HashMap<u64, usize>,
}

/// Mock [`MetadataProvider`] over an in-memory graph
///
/// Counts every call, can fail chosen lookups with a transient upstream
/// error, and can add latency to every call to widen race windows.
///
/// # Examples
///
/// ```rust,no_run
/// use costar_test_utils::{GraphBuilder, MockProvider};
///
/// let mock = MockProvider::new(GraphBuilder::chain(2).build());
/// mock.fail_cast_for(101);
/// assert_eq!(mock.calls().total(), 0);
/// ```
pub struct MockProvider {
    graph: FixtureProvider,
    behavior: Mutex<MockBehavior>,
    log: Mutex<CallLog>,
}

impl MockProvider {
    /// Create a mock over `fixture`
    ///
    /// # Panics
    ///
    /// Panics if the fixture contains duplicate ids.
    pub fn new(fixture: GraphFixture) -> Self {
        let graph = FixtureProvider::from_fixture(fixture).expect("valid test fixture");
        Self::from_provider(graph)
    }

    pub fn from_provider(graph: FixtureProvider) -> Self {
        Self {
            graph,
            behavior: Mutex::new(MockBehavior::default()),
            log: Mutex::new(CallLog::default()),
        }
    }

    /// Delay every call by `latency`
    pub fn with_latency(self, latency: Duration) -> Self {
        self.behavior.lock().unwrap().latency = latency;
        self
    }

    pub fn fail_actor_details_for(&self, actor_id: u64) {
        self.behavior
            .lock()
            .unwrap()
            .failing_actor_details
            .insert(actor_id);
    }

    pub fn fail_filmography_for(&self, actor_id: u64) {
        self.behavior
            .lock()
            .unwrap()
            .failing_filmographies
            .insert(actor_id);
    }

    pub fn fail_cast_for(&self, movie_id: u64) {
        self.behavior.lock().unwrap().failing_casts.insert(movie_id);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        let mut behavior = self.behavior.lock().unwrap();
        behavior.failing_actor_details.clear();
        behavior.failing_filmographies.clear();
        behavior.failing_casts.clear();
    }

    pub fn calls(&self) -> CallCounts {
        self.log.lock().unwrap().counts
    }

    pub fn filmography_calls_for(&self, actor_id: u64) -> usize {
        self.log
            .lock()
            .unwrap()
            .filmography_by_actor
            .get(&actor_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn cast_calls_for(&self, movie_id: u64) -> usize {
        self.log
            .lock()
            .unwrap()
            .cast_by_movie
            .get(&movie_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn reset_calls(&self) {
        *self.log.lock().unwrap() = CallLog::default();
    }

    async fn simulate_latency(&self) {
        let latency = self.behavior.lock().unwrap().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn injected_failure() -> costar_core::Error {
        UpstreamError::http(503, "Service Unavailable").into()
    }
}

#[async_trait]
impl MetadataProvider for MockProvider {
    async fn actor_details(&self, actor_id: u64) -> Result<Actor> {
        self.log.lock().unwrap().counts.actor_details += 1;
        self.simulate_latency().await;

        if self
            .behavior
            .lock()
            .unwrap()
            .failing_actor_details
            .contains(&actor_id)
        {
            return Err(Self::injected_failure());
        }
        self.graph.actor_details(actor_id).await
    }

    async fn actor_filmography(&self, actor_id: u64) -> Result<Vec<Movie>> {
        {
            let mut log = self.log.lock().unwrap();
            log.counts.filmography += 1;
            *log.filmography_by_actor.entry(actor_id).or_default() += 1;
        }
        self.simulate_latency().await;

        if self
            .behavior
            .lock()
            .unwrap()
            .failing_filmographies
            .contains(&actor_id)
        {
            return Err(Self::injected_failure());
        }
        self.graph.actor_filmography(actor_id).await
    }

    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<CastMember>> {
        {
            let mut log = self.log.lock().unwrap();
            log.counts.cast += 1;
            *log.cast_by_movie.entry(movie_id).or_default() += 1;
        }
        self.simulate_latency().await;

        if self.behavior.lock().unwrap().failing_casts.contains(&movie_id) {
            return Err(Self::injected_failure());
        }
        self.graph.movie_cast(movie_id).await
    }

    async fn movie_details(&self, movie_id: u64) -> Result<Movie> {
        self.log.lock().unwrap().counts.movie_details += 1;
        self.simulate_latency().await;
        self.graph.movie_details(movie_id).await
    }

    async fn search_actors(&self, query: &str) -> Result<Vec<Actor>> {
        self.log.lock().unwrap().counts.search += 1;
        self.simulate_latency().await;
        self.graph.search_actors(query).await
    }
}
