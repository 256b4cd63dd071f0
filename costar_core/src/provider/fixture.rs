//! Offline provider backed by a JSON graph fixture
//!
//! A fixture lists actors and movies; each movie carries its cast. Actor
//! filmographies are derived from the cast lists, in the order the movies
//! appear in the file. Actors that only appear in a cast list are still
//! resolvable by id.
//!
//! ```json
//! {
//!   "actors": [{"id": 1, "name": "Robert De Niro"}],
//!   "movies": [
//!     {"id": 10, "title": "Heat", "release_date": "1995-12-15",
//!      "cast": [{"id": 1, "name": "Robert De Niro", "order": 1}]}
//!   ]
//! }
//! ```

use crate::error::{Result, UpstreamError, ValidationError};
use crate::model::{Actor, CastMember, Movie};
use crate::provider::MetadataProvider;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// On-disk graph description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFixture {
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub movies: Vec<FixtureMovie>,
}

/// A movie record together with its credited cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureMovie {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

/// In-memory [`MetadataProvider`] built from a [`GraphFixture`]
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    actors: HashMap<u64, Actor>,
    /// Actor ids in first-seen order, for deterministic search results
    actor_order: Vec<u64>,
    movies: HashMap<u64, Movie>,
    casts: HashMap<u64, Vec<CastMember>>,
    filmographies: HashMap<u64, Vec<u64>>,
}

impl FixtureProvider {
    /// Index a fixture, rejecting duplicate ids
    pub fn from_fixture(fixture: GraphFixture) -> Result<Self> {
        Self::index(fixture)
            .map_err(|reason| ValidationError::invalid_parameter("fixture", &reason).into())
    }

    /// Parse and index a JSON fixture
    pub fn from_json(json: &str) -> Result<Self> {
        let fixture: GraphFixture = serde_json::from_str(json).map_err(|e| {
            ValidationError::invalid_parameter("fixture", &format!("malformed JSON: {e}"))
        })?;
        Self::from_fixture(fixture)
    }

    /// Load a JSON fixture from disk
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::invalid_fixture(path, e.to_string()))?;
        let fixture: GraphFixture = serde_json::from_str(&json)
            .map_err(|e| ValidationError::invalid_fixture(path, format!("malformed JSON: {e}")))?;
        let provider =
            Self::index(fixture).map_err(|reason| ValidationError::invalid_fixture(path, reason))?;

        debug!(
            "Loaded fixture {} with {} actors and {} movies",
            path.display(),
            provider.actors.len(),
            provider.movies.len()
        );
        Ok(provider)
    }

    fn index(fixture: GraphFixture) -> std::result::Result<Self, String> {
        let mut provider = Self {
            actors: HashMap::new(),
            actor_order: Vec::new(),
            movies: HashMap::new(),
            casts: HashMap::new(),
            filmographies: HashMap::new(),
        };

        for actor in fixture.actors {
            if provider.actors.contains_key(&actor.id) {
                return Err(format!("duplicate actor id {}", actor.id));
            }
            provider.actor_order.push(actor.id);
            provider.actors.insert(actor.id, actor);
        }

        for FixtureMovie { movie, mut cast } in fixture.movies {
            if provider.movies.contains_key(&movie.id) {
                return Err(format!("duplicate movie id {}", movie.id));
            }

            cast.sort_by_key(|member| member.order);
            for member in &cast {
                if !provider.actors.contains_key(&member.id) {
                    provider.actor_order.push(member.id);
                    provider.actors.insert(member.id, Actor::from(member));
                }
                let films = provider.filmographies.entry(member.id).or_default();
                if !films.contains(&movie.id) {
                    films.push(movie.id);
                }
            }

            provider.casts.insert(movie.id, cast);
            provider.movies.insert(movie.id, movie);
        }

        Ok(provider)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }
}

#[async_trait]
impl MetadataProvider for FixtureProvider {
    async fn actor_details(&self, actor_id: u64) -> Result<Actor> {
        self.actors
            .get(&actor_id)
            .cloned()
            .ok_or_else(|| UpstreamError::missing_entity("person", actor_id).into())
    }

    async fn actor_filmography(&self, actor_id: u64) -> Result<Vec<Movie>> {
        if !self.actors.contains_key(&actor_id) {
            return Err(UpstreamError::missing_entity("person", actor_id).into());
        }

        Ok(self
            .filmographies
            .get(&actor_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.movies.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<CastMember>> {
        self.casts
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| UpstreamError::missing_entity("movie", movie_id).into())
    }

    async fn movie_details(&self, movie_id: u64) -> Result<Movie> {
        self.movies
            .get(&movie_id)
            .cloned()
            .ok_or_else(|| UpstreamError::missing_entity("movie", movie_id).into())
    }

    async fn search_actors(&self, query: &str) -> Result<Vec<Actor>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .actor_order
            .iter()
            .filter_map(|id| self.actors.get(id))
            .filter(|actor| actor.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
