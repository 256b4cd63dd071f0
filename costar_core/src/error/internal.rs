//! Internal library error types

use thiserror::Error;

/// Internal library errors
#[derive(Error, Debug)]
pub enum InternalError {
    /// A path failed the actor/movie alternation check
    #[error("Malformed connection path: {message}")]
    MalformedPath { message: String },

    /// Internal assertion failure
    #[error("Internal assertion failed: {message}")]
    Assertion { message: String },
}

impl InternalError {
    /// Create a malformed path error
    pub fn malformed_path(message: impl Into<String>) -> Self {
        Self::MalformedPath {
            message: message.into(),
        }
    }

    /// Create an internal assertion failure error
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_path_error() {
        let error = InternalError::malformed_path("path ends with a movie");
        assert!(error.to_string().contains("Malformed connection path"));
        assert!(error.to_string().contains("ends with a movie"));
    }

    #[test]
    fn test_assertion_error() {
        let error = InternalError::assertion("Invariant violated");
        assert!(error.to_string().contains("Internal assertion failed"));
    }
}
