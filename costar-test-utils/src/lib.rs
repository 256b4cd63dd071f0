//! Test utilities for costar
//!
//! This crate provides an instrumented mock metadata provider and builders
//! for small actor/movie graphs.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::GraphBuilder;
pub use mocks::{CallCounts, MockProvider};
