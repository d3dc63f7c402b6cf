//! Error types for the plugin driver.

use thiserror::Error;
use vnet_backend::BackendError;
use vnet_graph::GraphError;

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors surfaced through the plugin lifecycle contract.
///
/// Store-level errors pass through unchanged (`Graph`, `Backend`); the
/// variants defined here cover request validation and the orchestrator
/// record store.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A required option is absent from the request or record.
    #[error("required option '{key}' is missing")]
    MissingOption {
        /// The option key.
        key: String,
    },

    /// An option is present but not of the expected shape.
    #[error("option '{key}' is malformed")]
    MalformedOption {
        /// The option key.
        key: String,
    },

    /// The named endpoint has no backend port.
    #[error("endpoint '{endpoint}' not found")]
    EndpointNotFound {
        /// The endpoint id.
        endpoint: String,
    },

    /// The lifecycle call is not part of this driver's contract.
    #[error("operation '{operation}' is not implemented")]
    NotImplemented {
        /// The operation name.
        operation: String,
    },

    /// Failure against the orchestrator's record store.
    #[error("orchestrator: {message}")]
    Orchestrator {
        /// Error message.
        message: String,
    },

    /// Control-plane graph failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Virtual-switch backend failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DriverError {
    /// Creates a missing-option error.
    pub fn missing_option(key: impl Into<String>) -> Self {
        Self::MissingOption { key: key.into() }
    }

    /// Creates a malformed-option error.
    pub fn malformed_option(key: impl Into<String>) -> Self {
        Self::MalformedOption { key: key.into() }
    }

    /// Creates an endpoint-not-found error.
    pub fn endpoint_not_found(endpoint: impl Into<String>) -> Self {
        Self::EndpointNotFound {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a not-implemented error.
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    /// Creates an orchestrator-store error.
    pub fn orchestrator(message: impl Into<String>) -> Self {
        Self::Orchestrator {
            message: message.into(),
        }
    }
}
