//! Metadata provider error types

use std::time::Duration;
use thiserror::Error;

/// Failures reported by a metadata provider
#[derive(Error, Debug, Clone)]
pub enum UpstreamError {
    /// Network is unreachable, the connection dropped, or the request timed out
    #[error("Metadata provider is unreachable")]
    NetworkOffline,

    /// Provider answered with a non-success HTTP status
    #[error("Metadata provider error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Provider kept rate limiting us after all retries were spent
    #[error("Metadata provider rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },

    /// The requested entity does not exist upstream
    #[error("{resource} {id} not found")]
    MissingEntity { resource: String, id: u64 },

    /// Response body could not be decoded
    #[error("Failed to decode provider response: {message}")]
    Decode { message: String },

    /// Generic provider failure
    #[error("Metadata provider error: {message}")]
    Other { message: String },
}

impl UpstreamError {
    /// Create an HTTP status error
    pub fn http(status: u16, message: &str) -> Self {
        Self::Http {
            status,
            message: message.to_string(),
        }
    }

    /// Create a missing entity error
    pub fn missing_entity(resource: &str, id: u64) -> Self {
        Self::MissingEntity {
            resource: resource.to_string(),
            id,
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a generic provider error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error is transient and can be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkOffline | Self::RateLimited { .. } => true,
            Self::Http { status, .. } => matches!(status, 429 | 500..=504),
            _ => false,
        }
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status != 429 && (400..=499).contains(status),
            Self::MissingEntity { .. } | Self::Decode { .. } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::NetworkOffline
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::http(status.as_u16(), status.canonical_reason().unwrap_or("unknown"))
        } else {
            Self::other(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_offline_error() {
        let error = UpstreamError::NetworkOffline;
        assert!(error.to_string().contains("unreachable"));
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_server_error_is_transient() {
        let error = UpstreamError::http(502, "Bad Gateway");
        assert!(error.to_string().contains("502"));
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_rate_limit_status_is_transient_not_permanent() {
        let error = UpstreamError::http(429, "Too Many Requests");
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_client_error_is_permanent() {
        let error = UpstreamError::http(401, "Unauthorized");
        assert!(!error.is_transient());
        assert!(error.is_permanent());
    }

    #[test]
    fn test_missing_entity() {
        let error = UpstreamError::missing_entity("person", 99);
        assert_eq!(error.to_string(), "person 99 not found");
        assert!(error.is_permanent());
    }

    #[test]
    fn test_other_error() {
        let error = UpstreamError::other("socket closed");
        assert!(error.to_string().contains("socket closed"));
        assert!(!error.is_transient());
        assert!(!error.is_permanent());
    }
}
