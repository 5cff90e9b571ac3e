//! Unified error handling for the community stores.
//!
//! Store operations never surface backend failures to their callers; those are
//! absorbed into the connection state. The errors here reach callers only for
//! invalid input, and are otherwise used between the backend/storage layers
//! and the stores.

use thiserror::Error;

use crate::rides::RideStatus;

/// Unified error type for community store operations.
#[derive(Debug, Error)]
pub enum CommunityError {
    /// HTTP/API error
    #[error("{}", format_http(.message, .status_code))]
    Http {
        message: String,
        status_code: Option<u16>,
    },
    /// No backend base URL configured
    #[error("Backend not configured")]
    NotConfigured,
    /// Persistence/storage error
    #[error("Storage error: {message}")]
    Storage { message: String },
    /// JSON encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Caller passed a value outside the accepted domain
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    /// Status change rejected by strict transition checking
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: RideStatus, to: RideStatus },
}

fn format_http(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("HTTP error ({}): {}", code, message),
        None => format!("HTTP error: {}", message),
    }
}

impl CommunityError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        CommunityError::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        CommunityError::Storage {
            message: message.into(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for CommunityError {
    fn from(e: reqwest::Error) -> Self {
        CommunityError::Http {
            message: e.to_string(),
            status_code: e.status().map(|s| s.as_u16()),
        }
    }
}

#[cfg(feature = "persistence")]
impl From<rusqlite::Error> for CommunityError {
    fn from(e: rusqlite::Error) -> Self {
        CommunityError::storage(e.to_string())
    }
}

/// Result type alias for community store operations.
pub type Result<T> = std::result::Result<T, CommunityError>;
