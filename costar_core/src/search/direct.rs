//! Shared-movie shortcut tried before any breadth-first search

use crate::model::{Actor, PathResult};
use crate::provider::CachingProvider;
use futures::future::join_all;
use log::{debug, warn};

/// Look for a movie in the head of `from`'s filmography whose full cast
/// includes `to`
///
/// Casts are fetched `batch_size` at a time; the first match in filmography
/// order wins. Provider failures are logged and treated as "no match".
pub(crate) async fn find_direct(
    provider: &CachingProvider,
    from: &Actor,
    to: &Actor,
    prefix: usize,
    batch_size: usize,
) -> Option<PathResult> {
    if prefix == 0 {
        return None;
    }

    let films = match provider.filmography(from.id).await {
        Ok(films) => films,
        Err(e) => {
            warn!("Skipping direct check, filmography of actor {} failed: {e}", from.id);
            return None;
        }
    };

    let head = &films[..films.len().min(prefix)];
    for batch in head.chunks(batch_size.max(1)) {
        let casts = join_all(batch.iter().map(|movie| provider.cast(movie.id))).await;

        for (movie, cast) in batch.iter().zip(casts) {
            match cast {
                Ok(cast) if cast.iter().any(|member| member.id == to.id) => {
                    debug!(
                        "Direct connection {} -> {} via movie {} ({})",
                        from.id, to.id, movie.id, movie.title
                    );
                    return Some(PathResult::direct(from.clone(), movie.clone(), to.clone()));
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping cast of movie {} in direct check: {e}", movie.id),
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, LookupCache};
    use crate::model::{CastMember, FoundBy, Movie};
    use crate::provider::{FixtureMovie, FixtureProvider, GraphFixture};
    use std::sync::Arc;

    fn provider(movies: Vec<FixtureMovie>) -> CachingProvider {
        let fixture = GraphFixture {
            actors: Vec::new(),
            movies,
        };
        CachingProvider::new(
            Arc::new(FixtureProvider::from_fixture(fixture).unwrap()),
            Arc::new(LookupCache::new(CacheConfig::default())),
        )
    }

    fn movie(id: u64, cast: &[u64]) -> FixtureMovie {
        FixtureMovie {
            movie: Movie::new(id, format!("Movie {id}")),
            cast: cast
                .iter()
                .enumerate()
                .map(|(order, id)| CastMember::new(*id, format!("Actor {id}"), order as u32))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_first_shared_movie_in_filmography_order_wins() {
        let provider = provider(vec![movie(10, &[1, 3]), movie(11, &[1, 2]), movie(12, &[2, 1])]);

        let result = find_direct(
            &provider,
            &Actor::new(1, "Actor 1"),
            &Actor::new(2, "Actor 2"),
            30,
            1,
        )
        .await
        .unwrap();

        assert_eq!(result.degrees(), 1);
        assert_eq!(result.found_by(), &FoundBy::Direct);
        assert_eq!(result.movies().next().unwrap().id, 11);
    }

    #[tokio::test]
    async fn test_first_match_in_concurrent_batch_wins() {
        let provider = provider(vec![movie(10, &[1, 3]), movie(11, &[1, 2]), movie(12, &[2, 1])]);

        let result = find_direct(
            &provider,
            &Actor::new(1, "Actor 1"),
            &Actor::new(2, "Actor 2"),
            30,
            10,
        )
        .await
        .unwrap();

        assert_eq!(result.movies().next().unwrap().id, 11);
    }

    #[tokio::test]
    async fn test_match_outside_prefix_is_ignored() {
        let provider = provider(vec![movie(10, &[1, 3]), movie(11, &[1, 2])]);

        let result = find_direct(
            &provider,
            &Actor::new(1, "Actor 1"),
            &Actor::new(2, "Actor 2"),
            1,
            10,
        )
        .await;

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_actor_yields_none() {
        let provider = provider(vec![movie(10, &[1, 2])]);

        let result = find_direct(
            &provider,
            &Actor::new(99, "Nobody"),
            &Actor::new(2, "Actor 2"),
            30,
            10,
        )
        .await;

        assert!(result.is_none());
    }
}
