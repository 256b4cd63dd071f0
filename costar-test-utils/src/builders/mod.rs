//! Test data builders

mod graph;

pub use graph::GraphBuilder;
