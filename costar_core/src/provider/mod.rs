//! Metadata provider abstraction
//!
//! The search engine only ever talks to a [`MetadataProvider`]. Concrete
//! sources are the TMDB HTTP client and an offline JSON fixture; the
//! [`CachingProvider`] decorator puts the lookup cache in front of either.

use crate::error::Result;
use crate::model::{Actor, CastMember, Movie};
use async_trait::async_trait;

pub mod caching;
pub mod fixture;
pub mod tmdb;

pub use caching::CachingProvider;
pub use fixture::{FixtureMovie, FixtureProvider, GraphFixture};
pub use tmdb::{TmdbConfig, TmdbProvider};

/// Source of actor, movie and cast records
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Details of a single actor
    async fn actor_details(&self, actor_id: u64) -> Result<Actor>;

    /// Movies an actor appeared in, in stable provider order
    async fn actor_filmography(&self, actor_id: u64) -> Result<Vec<Movie>>;

    /// Credited cast of a movie, in billing order
    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<CastMember>>;

    /// Details of a single movie
    async fn movie_details(&self, movie_id: u64) -> Result<Movie>;

    /// Actors whose name matches a free-text query, best match first
    async fn search_actors(&self, query: &str) -> Result<Vec<Actor>>;
}
