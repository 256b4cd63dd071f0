//! End-to-end connection search behaviour against an instrumented provider

use costar_core::{
    CoreConfig, ConnectionEngine, Error, FoundBy, LookupCache, PathKey, PathResult, PathStep,
};
use costar_test_utils::{GraphBuilder, MockProvider};
use std::sync::Arc;
use std::time::Duration;

fn engine_with(mock: &Arc<MockProvider>, config: &CoreConfig) -> ConnectionEngine {
    ConnectionEngine::new(
        mock.clone(),
        Arc::new(LookupCache::new(config.cache.clone())),
        config.search.clone(),
    )
    .unwrap()
}

fn engine(mock: &Arc<MockProvider>) -> ConnectionEngine {
    engine_with(mock, &CoreConfig::test())
}

fn ids(result: &PathResult) -> Vec<u64> {
    result.path().iter().map(PathStep::id).collect()
}

#[tokio::test]
async fn test_direct_check_skips_failed_cast_and_uses_later_movie() {
    let mock = Arc::new(
        GraphBuilder::new()
            .actor(1, "Robert De Niro")
            .actor(2, "Al Pacino")
            .movie(10, "The Godfather Part II", &[1, 2])
            .movie(11, "Heat", &[1, 2])
            .into_mock(),
    );
    mock.fail_cast_for(10);
    let engine = engine(&mock);

    let result = engine.find_path(1, 2).await.unwrap();

    assert_eq!(ids(&result), vec![1, 11, 2]);
    assert_eq!(result.found_by(), &FoundBy::Direct);
    assert!(mock.cast_calls_for(10) >= 1);
}

#[tokio::test]
async fn test_same_actor_is_trivial_path() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    let engine = engine(&mock);

    let result = engine.find_path(2, 2).await.unwrap();

    assert_eq!(ids(&result), vec![2]);
    assert_eq!(result.degrees(), 0);
    assert_eq!(result.found_by(), &FoundBy::Trivial);
    assert_eq!(mock.calls().actor_details, 1);
    assert_eq!(mock.calls().listings(), 0);
}

#[tokio::test]
async fn test_co_stars_are_one_degree_apart() {
    let mock = Arc::new(
        GraphBuilder::new()
            .actor(1, "Robert De Niro")
            .actor(2, "Al Pacino")
            .movie(10, "Heat", &[2, 1])
            .into_mock(),
    );
    let engine = engine(&mock);

    let result = engine.find_path(1, 2).await.unwrap();

    assert_eq!(ids(&result), vec![1, 10, 2]);
    assert_eq!(result.degrees(), 1);
    assert_eq!(result.found_by(), &FoundBy::Direct);
    assert_eq!(result.start().unwrap().name, "Robert De Niro");
    assert_eq!(result.end().unwrap().name, "Al Pacino");
}

#[tokio::test]
async fn test_transitive_connection_has_five_steps() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    let engine = engine(&mock);

    let result = engine.find_path(1, 3).await.unwrap();

    assert_eq!(ids(&result), vec![1, 101, 2, 102, 3]);
    assert_eq!(result.degrees(), 2);
    assert_eq!(result.found_by(), &FoundBy::Phase("fast".to_string()));
}

#[tokio::test]
async fn test_reverse_query_hits_the_same_cache_entry() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    let engine = engine(&mock);

    let forward = engine.find_path(1, 3).await.unwrap();
    mock.reset_calls();
    let backward = engine.find_path(3, 1).await.unwrap();

    assert_eq!(mock.calls().total(), 0);
    assert_eq!(backward.start().unwrap().id, 3);
    assert_eq!(backward.end().unwrap().id, 1);
    assert_eq!(
        ids(&backward),
        ids(&forward).into_iter().rev().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_repeated_query_makes_no_listing_calls() {
    let mock = Arc::new(GraphBuilder::chain(3).into_mock());
    let engine = engine(&mock);

    let first = engine.find_path(1, 4).await.unwrap();
    mock.reset_calls();
    let second = engine.find_path(1, 4).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.calls().listings(), 0);
}

#[tokio::test]
async fn test_disconnected_actors_are_not_found() {
    let mock = Arc::new(GraphBuilder::chain(1).link_chain(10, 201, 1).into_mock());
    let engine = engine(&mock);

    let error = engine.find_path(1, 11).await.unwrap_err();

    assert!(error.is_not_found());
    assert!(matches!(error, Error::NotFound { actor1: 1, actor2: 11 }));
    assert!(engine.lookup().cached_path(&PathKey::new(1, 11)).await.is_none());
}

#[tokio::test]
async fn test_failed_cast_fetch_falls_back_to_alternate_route() {
    // Two routes from 1 to 4: via 2 (movies 10, 20) and via 3 (movies 11, 21)
    let mock = Arc::new(
        GraphBuilder::new()
            .movie(10, "Route A1", &[1, 2])
            .movie(11, "Route B1", &[1, 3])
            .movie(20, "Route A2", &[2, 4])
            .movie(21, "Route B2", &[3, 4])
            .into_mock(),
    );
    mock.fail_cast_for(20);
    let engine = engine(&mock);

    let result = engine.find_path(1, 4).await.unwrap();

    assert_eq!(ids(&result), vec![1, 11, 3, 21, 4]);
    assert!(mock.cast_calls_for(20) >= 1);
}

#[tokio::test]
async fn test_failed_filmography_is_skipped() {
    // Actor 2's filmography fails, but 3 still links 1 and 4
    let mock = Arc::new(
        GraphBuilder::new()
            .movie(10, "Shared A", &[1, 2, 3])
            .movie(20, "Shared B", &[2, 4])
            .movie(21, "Shared C", &[3, 4])
            .into_mock(),
    );
    mock.fail_filmography_for(2);
    let mut config = CoreConfig::test();
    config.search.bidirectional = false;
    let engine = engine_with(&mock, &config);

    let result = engine.find_path(1, 4).await.unwrap();

    assert_eq!(ids(&result), vec![1, 10, 3, 21, 4]);
}

#[tokio::test]
async fn test_unidirectional_search_finds_same_path() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    let mut config = CoreConfig::test();
    config.search.bidirectional = false;
    let engine = engine_with(&mock, &config);

    let result = engine.find_path(1, 3).await.unwrap();

    assert_eq!(ids(&result), vec![1, 101, 2, 102, 3]);
}

#[tokio::test]
async fn test_long_chain_escalates_to_later_phase() {
    let mock = Arc::new(GraphBuilder::chain(6).into_mock());
    let engine = engine(&mock);

    let result = engine.find_path(1, 7).await.unwrap();

    assert_eq!(result.degrees(), 6);
    assert_eq!(result.found_by(), &FoundBy::Phase("exhaustive".to_string()));
    assert_eq!(result.start().unwrap().id, 1);
    assert_eq!(result.end().unwrap().id, 7);
}

#[tokio::test]
async fn test_endpoint_lookup_failure_surfaces_as_upstream() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    mock.fail_actor_details_for(3);
    let engine = engine(&mock);

    let error = engine.find_path(1, 3).await.unwrap_err();
    assert!(matches!(error, Error::Upstream(_)));

    let error = engine.find_path(1, 999).await.unwrap_err();
    assert!(matches!(error, Error::Upstream(_)));
}

#[tokio::test]
async fn test_recovers_after_upstream_heals() {
    let mock = Arc::new(GraphBuilder::chain(2).into_mock());
    mock.fail_actor_details_for(3);
    let engine = engine(&mock);

    assert!(engine.find_path(1, 3).await.is_err());

    mock.heal();
    assert_eq!(engine.find_path(1, 3).await.unwrap().degrees(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_searches_share_upstream_fetches() {
    let mock = Arc::new(
        GraphBuilder::chain(2)
            .into_mock()
            .with_latency(Duration::from_millis(50)),
    );
    let engine = Arc::new(engine(&mock));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.find_path(1, 3).await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().degrees(), 2);
    }

    assert_eq!(mock.filmography_calls_for(1), 1);
    assert_eq!(mock.cast_calls_for(101), 1);
    assert_eq!(mock.calls().actor_details, 2);
}
