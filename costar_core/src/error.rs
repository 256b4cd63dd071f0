//! Error types for the costar core library
//!
//! Errors are grouped the same way callers need to react to them: a search
//! that ran to completion without a match, a metadata provider failure,
//! rejected input, or a broken internal invariant.

use thiserror::Error;

pub mod internal;
pub mod upstream;
pub mod validation;

pub use internal::InternalError;
pub use upstream::UpstreamError;
pub use validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the costar core library
///
/// - `NotFound`: every search phase was exhausted without a connection
/// - `Upstream`: the metadata provider failed and the search could not recover
/// - `Validation`: malformed configuration or input
/// - `Internal`: an invariant of the library itself was violated
#[derive(Error, Debug)]
pub enum Error {
    /// No connection exists within the explored part of the graph
    #[error("No connection found between actors {actor1} and {actor2}")]
    NotFound { actor1: u64, actor2: u64 },

    /// Metadata provider errors
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal library errors
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Create a not-found error for an actor pair
    pub fn not_found(actor1: u64, actor2: u64) -> Self {
        Self::NotFound { actor1, actor2 }
    }

    /// Whether this is the terminal "no connection" outcome
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(UpstreamError::from(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Upstream(UpstreamError::decode(err.to_string()))
    }
}
