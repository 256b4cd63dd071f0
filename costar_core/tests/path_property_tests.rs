//! Property tests for path construction and search results

use costar_core::{Actor, CoreConfig, FoundBy, Movie, PathResult, PathStep};
use costar_test_utils::GraphBuilder;
use proptest::prelude::*;
use std::sync::Arc;

fn step(is_actor: bool, id: u64) -> PathStep {
    if is_actor {
        PathStep::Actor(Actor::new(id, format!("Actor {id}")))
    } else {
        PathStep::Movie(Movie::new(id, format!("Movie {id}")))
    }
}

fn alternates(steps: &[PathStep]) -> bool {
    !steps.is_empty()
        && steps.len() % 2 == 1
        && steps
            .iter()
            .enumerate()
            .all(|(index, step)| step.is_actor() == (index % 2 == 0))
}

proptest! {
    #[test]
    fn from_steps_accepts_exactly_alternating_paths(kinds in prop::collection::vec(any::<bool>(), 0..12)) {
        let steps: Vec<PathStep> = kinds
            .iter()
            .enumerate()
            .map(|(index, is_actor)| step(*is_actor, index as u64))
            .collect();
        let expected = alternates(&steps);

        let result = PathResult::from_steps(steps.clone(), FoundBy::Direct);

        prop_assert_eq!(result.is_ok(), expected);
        if let Ok(result) = result {
            prop_assert_eq!(result.degrees(), result.actors().count() - 1);
            prop_assert_eq!(result.reversed().into_steps(), steps.into_iter().rev().collect::<Vec<_>>());
        }
    }

    #[test]
    fn chain_search_finds_every_hop(hops in 1u64..=6) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let provider = Arc::new(GraphBuilder::chain(hops).into_fixture_provider());
            let engine = CoreConfig::test().build_engine(provider).unwrap();

            let forward = engine.find_path(1, hops + 1).await.unwrap();
            let backward = engine.find_path(hops + 1, 1).await.unwrap();

            assert_eq!(forward.degrees() as u64, hops);
            assert!(alternates(forward.path()));
            assert_eq!(backward.start().unwrap().id, hops + 1);
            assert_eq!(
                backward.into_steps(),
                forward.into_steps().into_iter().rev().collect::<Vec<_>>()
            );
        });
    }
}
