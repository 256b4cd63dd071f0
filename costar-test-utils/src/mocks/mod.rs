//! Mock implementations for testing

mod provider;

pub use provider::{CallCounts, MockProvider};
