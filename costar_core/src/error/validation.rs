//! Validation related error types

use std::path::PathBuf;
use thiserror::Error;

/// Validation and configuration errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// A graph fixture file could not be loaded
    #[error("Invalid fixture {path}: {reason}")]
    InvalidFixture { path: PathBuf, reason: String },
}

impl ValidationError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: &str) -> Self {
        Self::InvalidConfiguration {
            message: message.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid fixture error
    pub fn invalid_fixture(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::InvalidFixture {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
