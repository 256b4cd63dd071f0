//! Budget-limited breadth-first search over the actor/movie graph
//!
//! Each side keeps a FIFO frontier and a visited map from actor id to the
//! partial path that reached it. Bidirectional searches alternate one pop per
//! side; a cast member already visited by the other side is a meeting point.
//! Unidirectional searches use a backward side that never expands and only
//! knows the target actor.

use crate::model::{Actor, Movie, PathStep};
use crate::provider::CachingProvider;
use crate::search::PhaseBudget;
use futures::future::join_all;
use log::{debug, warn};
use std::collections::{HashMap, VecDeque};
use std::ops::AddAssign;

/// Counters reported by a finished phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SearchStats {
    /// Frontier pops, both sides combined
    pub iterations: usize,
    /// Actors added to either visited map
    pub actors_visited: usize,
    /// Cast lists examined
    pub movies_scanned: usize,
    /// Filmography or cast fetches that failed and were skipped
    pub skipped_fetches: usize,
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, other: Self) {
        self.iterations += other.iterations;
        self.actors_visited += other.actors_visited;
        self.movies_scanned += other.movies_scanned;
        self.skipped_fetches += other.skipped_fetches;
    }
}

/// Result of one phase
#[derive(Debug)]
pub(crate) struct PhaseOutcome {
    /// Steps from actor1 to actor2, when the phase found a connection
    pub path: Option<Vec<PathStep>>,
    pub stats: SearchStats,
}

#[derive(Debug)]
struct FrontierItem {
    actor_id: u64,
    path: Vec<PathStep>,
}

impl FrontierItem {
    fn actor_steps(&self) -> usize {
        self.path.len().div_ceil(2)
    }
}

#[derive(Debug, Default)]
struct Side {
    queue: VecDeque<FrontierItem>,
    visited: HashMap<u64, Vec<PathStep>>,
}

impl Side {
    /// A side that will expand outward from `root`
    fn rooted(root: &Actor) -> Self {
        let mut side = Self::anchored(root);
        side.queue.push_back(FrontierItem {
            actor_id: root.id,
            path: vec![PathStep::Actor(root.clone())],
        });
        side
    }

    /// A side that only marks `root` as reachable and never expands
    fn anchored(root: &Actor) -> Self {
        let mut side = Self::default();
        side.visited
            .insert(root.id, vec![PathStep::Actor(root.clone())]);
        side
    }
}

/// One breadth-first search attempt under a fixed budget
pub(crate) struct PhasedSearch<'a> {
    provider: &'a CachingProvider,
    budget: &'a PhaseBudget,
    batch_size: usize,
    bidirectional: bool,
}

impl<'a> PhasedSearch<'a> {
    pub(crate) fn new(
        provider: &'a CachingProvider,
        budget: &'a PhaseBudget,
        batch_size: usize,
        bidirectional: bool,
    ) -> Self {
        Self {
            provider,
            budget,
            batch_size: batch_size.max(1),
            bidirectional,
        }
    }

    pub(crate) async fn run(&self, from: &Actor, to: &Actor) -> PhaseOutcome {
        let mut stats = SearchStats::default();
        let mut forward = Side::rooted(from);
        let mut backward = if self.bidirectional {
            Side::rooted(to)
        } else {
            Side::anchored(to)
        };
        let mut forward_turn = true;

        let path = loop {
            if stats.iterations >= self.budget.max_iterations {
                debug!(
                    "Phase {} hit its iteration budget ({})",
                    self.budget.name, self.budget.max_iterations
                );
                break None;
            }
            if forward.queue.is_empty() && backward.queue.is_empty() {
                debug!("Phase {} exhausted both frontiers", self.budget.name);
                break None;
            }

            // Alternate sides, falling back to whichever still has work
            let expand_forward = if forward_turn {
                !forward.queue.is_empty()
            } else {
                backward.queue.is_empty()
            };
            forward_turn = !forward_turn;

            let (this, other) = if expand_forward {
                (&mut forward, &backward)
            } else {
                (&mut backward, &forward)
            };
            let Some(item) = this.queue.pop_front() else {
                continue;
            };
            stats.iterations += 1;

            if item.actor_steps() >= self.budget.max_depth {
                continue;
            }

            if let Some(mut path) = self.expand(item, this, other, &mut stats).await {
                if !expand_forward {
                    path.reverse();
                }
                break Some(path);
            }
        };

        debug!(
            "Phase {} finished: found={} iterations={} actors_visited={} movies_scanned={} skipped_fetches={}",
            self.budget.name,
            path.is_some(),
            stats.iterations,
            stats.actors_visited,
            stats.movies_scanned,
            stats.skipped_fetches
        );
        PhaseOutcome { path, stats }
    }

    /// Scan the capped filmography of `item`, returning a complete path
    /// (oriented from this side's root) on the first meeting
    async fn expand(
        &self,
        item: FrontierItem,
        this: &mut Side,
        other: &Side,
        stats: &mut SearchStats,
    ) -> Option<Vec<PathStep>> {
        let films = match self.provider.filmography(item.actor_id).await {
            Ok(films) => films,
            Err(e) => {
                warn!("Skipping actor {}, filmography fetch failed: {e}", item.actor_id);
                stats.skipped_fetches += 1;
                return None;
            }
        };

        let head = &films[..films.len().min(self.budget.max_movies_per_actor)];
        for batch in head.chunks(self.batch_size) {
            let casts = join_all(batch.iter().map(|movie| self.provider.cast(movie.id))).await;

            for (movie, cast) in batch.iter().zip(casts) {
                let cast = match cast {
                    Ok(cast) => cast,
                    Err(e) => {
                        warn!("Skipping movie {}, cast fetch failed: {e}", movie.id);
                        stats.skipped_fetches += 1;
                        continue;
                    }
                };
                stats.movies_scanned += 1;

                for member in cast.iter().take(self.budget.max_cast_per_movie) {
                    if let Some(other_path) = other.visited.get(&member.id) {
                        return Some(join_paths(&item.path, movie, other_path));
                    }
                    if this.visited.contains_key(&member.id) {
                        continue;
                    }

                    let mut path = item.path.clone();
                    path.push(PathStep::Movie(movie.clone()));
                    path.push(PathStep::Actor(Actor::from(member)));

                    this.visited.insert(member.id, path.clone());
                    this.queue.push_back(FrontierItem {
                        actor_id: member.id,
                        path,
                    });
                    stats.actors_visited += 1;
                }
            }
        }

        None
    }
}

/// `near` + `movie` + `far` walked back from the meeting actor to its root
fn join_paths(near: &[PathStep], movie: &Movie, far: &[PathStep]) -> Vec<PathStep> {
    let mut path = Vec::with_capacity(near.len() + 1 + far.len());
    path.extend_from_slice(near);
    path.push(PathStep::Movie(movie.clone()));
    path.extend(far.iter().rev().cloned());
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, LookupCache};
    use crate::model::CastMember;
    use crate::provider::{FixtureMovie, FixtureProvider, GraphFixture};
    use std::sync::Arc;

    fn provider(movies: &[(u64, &[u64])]) -> CachingProvider {
        let fixture = GraphFixture {
            actors: Vec::new(),
            movies: movies
                .iter()
                .map(|(id, cast)| FixtureMovie {
                    movie: Movie::new(*id, format!("Movie {id}")),
                    cast: cast
                        .iter()
                        .enumerate()
                        .map(|(order, actor)| {
                            CastMember::new(*actor, format!("Actor {actor}"), order as u32)
                        })
                        .collect(),
                })
                .collect(),
        };
        CachingProvider::new(
            Arc::new(FixtureProvider::from_fixture(fixture).unwrap()),
            Arc::new(LookupCache::new(CacheConfig::default())),
        )
    }

    fn actor(id: u64) -> Actor {
        Actor::new(id, format!("Actor {id}"))
    }

    fn ids(path: &[PathStep]) -> Vec<u64> {
        path.iter().map(PathStep::id).collect()
    }

    #[test]
    fn test_join_paths_reverses_far_side() {
        let near = vec![
            PathStep::Actor(actor(1)),
            PathStep::Movie(Movie::new(10, "M10")),
            PathStep::Actor(actor(2)),
        ];
        let far = vec![
            PathStep::Actor(actor(4)),
            PathStep::Movie(Movie::new(30, "M30")),
            PathStep::Actor(actor(3)),
        ];

        let path = join_paths(&near, &Movie::new(20, "M20"), &far);
        assert_eq!(ids(&path), vec![1, 10, 2, 20, 3, 30, 4]);
    }

    #[tokio::test]
    async fn test_bidirectional_finds_three_hop_chain() {
        // 1 -10- 2 -20- 3 -30- 4
        let provider = provider(&[(10, &[1, 2]), (20, &[2, 3]), (30, &[3, 4])]);
        let budget = PhaseBudget::fast();

        let outcome = PhasedSearch::new(&provider, &budget, 5, true)
            .run(&actor(1), &actor(4))
            .await;

        assert_eq!(ids(&outcome.path.unwrap()), vec![1, 10, 2, 20, 3, 30, 4]);
        assert!(outcome.stats.iterations <= budget.max_iterations);
    }

    #[tokio::test]
    async fn test_meeting_prefers_earlier_movie_then_billing_in_batch() {
        // Expanding 2 scans 10, 30 and 31 in one batch. Movie 30 bills 5
        // ahead of 4, and both were reached from 9; 31 would meet at 4.
        let provider = provider(&[
            (10, &[1, 2]),
            (11, &[1, 3]),
            (20, &[9, 4]),
            (21, &[9, 5]),
            (30, &[2, 5, 4]),
            (31, &[2, 4]),
        ]);
        let budget = PhaseBudget::fast();

        let outcome = PhasedSearch::new(&provider, &budget, 5, true)
            .run(&actor(1), &actor(9))
            .await;

        assert_eq!(ids(&outcome.path.unwrap()), vec![1, 10, 2, 30, 5, 21, 9]);
        assert_eq!(outcome.stats.iterations, 3);
    }

    #[test]
    fn test_stats_accumulate_across_phases() {
        let mut totals = SearchStats::default();
        totals += SearchStats {
            iterations: 4,
            actors_visited: 7,
            movies_scanned: 3,
            skipped_fetches: 0,
        };
        totals += SearchStats {
            iterations: 2,
            actors_visited: 1,
            movies_scanned: 5,
            skipped_fetches: 1,
        };

        assert_eq!(
            totals,
            SearchStats {
                iterations: 6,
                actors_visited: 8,
                movies_scanned: 8,
                skipped_fetches: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_unidirectional_finds_two_hop_chain() {
        let provider = provider(&[(10, &[1, 2]), (20, &[2, 3])]);
        let budget = PhaseBudget::fast();

        let outcome = PhasedSearch::new(&provider, &budget, 5, false)
            .run(&actor(1), &actor(3))
            .await;

        assert_eq!(ids(&outcome.path.unwrap()), vec![1, 10, 2, 20, 3]);
    }

    #[tokio::test]
    async fn test_depth_budget_limits_unidirectional_reach() {
        let provider = provider(&[(10, &[1, 2]), (20, &[2, 3]), (30, &[3, 4])]);
        let budget = PhaseBudget {
            max_depth: 2,
            ..PhaseBudget::fast()
        };

        let outcome = PhasedSearch::new(&provider, &budget, 5, false)
            .run(&actor(1), &actor(4))
            .await;

        assert!(outcome.path.is_none());
    }

    #[tokio::test]
    async fn test_iteration_budget_stops_search() {
        let provider = provider(&[(10, &[1, 2]), (20, &[2, 3]), (30, &[3, 4]), (40, &[4, 5])]);
        let budget = PhaseBudget {
            max_iterations: 1,
            ..PhaseBudget::fast()
        };

        let outcome = PhasedSearch::new(&provider, &budget, 5, false)
            .run(&actor(1), &actor(5))
            .await;

        assert!(outcome.path.is_none());
        assert_eq!(outcome.stats.iterations, 1);
    }

    #[tokio::test]
    async fn test_disconnected_graph_exhausts_frontiers() {
        let provider = provider(&[(10, &[1, 2]), (20, &[3, 4])]);
        let budget = PhaseBudget::exhaustive();

        let outcome = PhasedSearch::new(&provider, &budget, 5, true)
            .run(&actor(1), &actor(4))
            .await;

        assert!(outcome.path.is_none());
        assert!(outcome.stats.iterations < budget.max_iterations);
    }

    #[tokio::test]
    async fn test_cast_cap_hides_low_billed_members() {
        // Actor 3 is billed third in the only shared movie
        let provider = provider(&[(10, &[1, 2, 3])]);
        let budget = PhaseBudget {
            max_cast_per_movie: 2,
            ..PhaseBudget::fast()
        };

        let outcome = PhasedSearch::new(&provider, &budget, 5, false)
            .run(&actor(1), &actor(3))
            .await;

        assert!(outcome.path.is_none());
    }

    #[tokio::test]
    async fn test_failed_filmography_is_counted_and_skipped() {
        let provider = provider(&[(10, &[1, 2])]);
        let budget = PhaseBudget::fast();

        // Actor 99 is unknown to the fixture, so its filmography fetch fails
        let outcome = PhasedSearch::new(&provider, &budget, 5, true)
            .run(&actor(99), &actor(2))
            .await;

        assert!(outcome.path.is_none());
        assert_eq!(outcome.stats.skipped_fetches, 1);
    }
}
