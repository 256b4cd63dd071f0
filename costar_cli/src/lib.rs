//! Library half of the `costar` binary, shared with the integration tests

pub mod config;
pub mod error;
pub mod factory;
pub mod output;
pub mod progress;
pub mod terminal;
