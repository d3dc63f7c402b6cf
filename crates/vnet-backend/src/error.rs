//! Error types for virtual-switch backend operations.

use thiserror::Error;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur against the virtual-switch backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The named object does not exist.
    #[error("backend object '{name}' not found")]
    NotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// A create collided with an existing network of the same name.
    #[error("backend network '{name}' already exists")]
    AlreadyExists {
        /// The colliding network name.
        name: String,
    },

    /// A network delete was refused because ports still reference it.
    #[error("backend network '{network}' still has {ports} active port(s)")]
    HasActiveEndpoints {
        /// The network name.
        network: String,
        /// Number of ports still attached.
        ports: usize,
    },

    /// Unclassified transport or switch failure.
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}

impl BackendError {
    /// Creates a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an already-exists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Creates an unavailability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true for the not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}
