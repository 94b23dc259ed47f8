//! Domain error type.
//!
//! One error enum covers the repository/use-case layer. Failures travel
//! as typed values through failure event sources up to the UI, which
//! decides copy and retry. Structural programmer errors never appear
//! here — those go through the fail-fast path in `arbor-core`.

use serde::{Deserialize, Serialize};

/// Failure from a repository or use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    /// Transport-level failure.
    #[error("network error: {message}")]
    Network {
        /// What failed on the wire.
        message: String,
    },

    /// The backend rejected the caller's credentials.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Rejection detail.
        message: String,
    },

    /// The requested entity does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// What was missing.
        message: String,
    },

    /// A payload could not be decoded.
    #[error("decoding error: {message}")]
    Decoding {
        /// What failed to decode.
        message: String,
    },

    /// Anything that is not the caller's fault.
    #[error("internal error: {message}")]
    Internal {
        /// Failure detail.
        message: String,
    },
}

impl DomainError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a decoding error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
