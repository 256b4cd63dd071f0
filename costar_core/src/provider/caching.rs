//! Provider decorator that memoizes every lookup

use crate::cache::{LookupCache, normalize_query};
use crate::error::Result;
use crate::model::{Actor, CastMember, Movie};
use crate::provider::MetadataProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Routes provider calls through a shared [`LookupCache`]
///
/// Listings come back as `Arc<Vec<_>>` so that cache hits during a search do
/// not copy whole filmographies.
#[derive(Clone)]
pub struct CachingProvider {
    inner: Arc<dyn MetadataProvider>,
    cache: Arc<LookupCache>,
}

impl CachingProvider {
    pub fn new(inner: Arc<dyn MetadataProvider>, cache: Arc<LookupCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &Arc<LookupCache> {
        &self.cache
    }

    pub async fn actor(&self, actor_id: u64) -> Result<Actor> {
        self.cache
            .actor(actor_id, || self.inner.actor_details(actor_id))
            .await
    }

    pub async fn movie(&self, movie_id: u64) -> Result<Movie> {
        self.cache
            .movie(movie_id, || self.inner.movie_details(movie_id))
            .await
    }

    pub async fn filmography(&self, actor_id: u64) -> Result<Arc<Vec<Movie>>> {
        self.cache
            .filmography(actor_id, || async {
                self.inner.actor_filmography(actor_id).await.map(Arc::new)
            })
            .await
    }

    pub async fn cast(&self, movie_id: u64) -> Result<Arc<Vec<CastMember>>> {
        self.cache
            .cast(movie_id, || async {
                self.inner.movie_cast(movie_id).await.map(Arc::new)
            })
            .await
    }

    pub async fn search(&self, query: &str) -> Result<Arc<Vec<Actor>>> {
        let normalized = normalize_query(query);
        self.cache
            .search(normalized.clone(), || async {
                self.inner.search_actors(&normalized).await.map(Arc::new)
            })
            .await
    }
}

#[async_trait]
impl MetadataProvider for CachingProvider {
    async fn actor_details(&self, actor_id: u64) -> Result<Actor> {
        self.actor(actor_id).await
    }

    async fn actor_filmography(&self, actor_id: u64) -> Result<Vec<Movie>> {
        Ok(self.filmography(actor_id).await?.as_ref().clone())
    }

    async fn movie_cast(&self, movie_id: u64) -> Result<Vec<CastMember>> {
        Ok(self.cast(movie_id).await?.as_ref().clone())
    }

    async fn movie_details(&self, movie_id: u64) -> Result<Movie> {
        self.movie(movie_id).await
    }

    async fn search_actors(&self, query: &str) -> Result<Vec<Actor>> {
        Ok(self.search(query).await?.as_ref().clone())
    }
}
