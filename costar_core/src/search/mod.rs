//! Connection path search
//!
//! The engine tries, in order: the path cache, the trivial same-actor case,
//! a shared-movie shortcut, then each configured BFS phase. Phases run
//! cheapest first and the first one that connects the pair wins, so a later
//! phase is never consulted for a shorter path.

mod bfs;
mod config;
mod direct;
mod engine;

pub use config::{PhaseBudget, SearchConfig};
pub use engine::ConnectionEngine;
