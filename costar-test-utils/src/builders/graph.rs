//! Builder for small actor/movie graphs

use crate::MockProvider;
use costar_core::provider::FixtureMovie;
use costar_core::{Actor, CastMember, FixtureProvider, GraphFixture, Movie};
use std::collections::HashMap;

/// Builds [`GraphFixture`]s for tests
///
/// Actors referenced in a cast list but never registered with
/// [`GraphBuilder::actor`] are named `Actor {id}`. Cast billing order follows
/// the order of the ids passed to [`GraphBuilder::movie`].
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    actors: Vec<Actor>,
    names: HashMap<u64, String>,
    movies: Vec<FixtureMovie>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A path graph `1 -101- 2 -102- 3 ...` with `hops` movies
    pub fn chain(hops: u64) -> Self {
        Self::new().link_chain(1, 101, hops)
    }

    /// Register a named actor
    pub fn actor(mut self, id: u64, name: &str) -> Self {
        self.names.insert(id, name.to_string());
        self.actors.push(Actor::new(id, name));
        self
    }

    /// Add a movie whose cast is `cast`, top billed first
    pub fn movie(mut self, id: u64, title: &str, cast: &[u64]) -> Self {
        let cast = cast
            .iter()
            .enumerate()
            .map(|(order, actor_id)| CastMember::new(*actor_id, self.name_of(*actor_id), order as u32))
            .collect();
        self.movies.push(FixtureMovie {
            movie: Movie::new(id, title),
            cast,
        });
        self
    }

    /// Append a chain of `hops` movies, each shared by consecutive actors
    /// starting at `first_actor`
    pub fn link_chain(mut self, first_actor: u64, first_movie: u64, hops: u64) -> Self {
        for hop in 0..hops {
            let movie_id = first_movie + hop;
            let from = first_actor + hop;
            self = self.movie(movie_id, &format!("Movie {movie_id}"), &[from, from + 1]);
        }
        self
    }

    fn name_of(&self, actor_id: u64) -> String {
        self.names
            .get(&actor_id)
            .cloned()
            .unwrap_or_else(|| format!("Actor {actor_id}"))
    }

    pub fn build(self) -> GraphFixture {
        GraphFixture {
            actors: self.actors,
            movies: self.movies,
        }
    }

    /// Serialize the graph in the fixture file format
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.clone().build()).expect("fixture serializes")
    }

    pub fn into_fixture_provider(self) -> FixtureProvider {
        FixtureProvider::from_fixture(self.build()).expect("valid test fixture")
    }

    pub fn into_mock(self) -> MockProvider {
        MockProvider::new(self.build())
    }
}
