//! Error types for control-plane graph operations.

use thiserror::Error;
use vnet_types::ParseError;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors returned by the graph API and the client built on top of it.
///
/// `NotFound` and `AlreadyExists` are frequently non-fatal: the find-or-create
/// operations swallow them and converge, and a delete racing with another
/// cleanup treats `NotFound` as already-done. `Conflict` carries the raw
/// remote message because its text embeds the `<type>/<uuid>` references of
/// the dependents that blocked the delete.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The requested object does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing object.
        what: String,
    },

    /// A delete was blocked by objects that still reference the target.
    #[error("conflict: {message}")]
    Conflict {
        /// Raw remote message, with embedded dependent references.
        message: String,
    },

    /// A create collided with an existing object of the same name.
    #[error("{what} already exists")]
    AlreadyExists {
        /// Description of the colliding object.
        what: String,
    },

    /// Multiple candidates matched and no disambiguating key was given.
    #[error("ambiguous: {what}")]
    Ambiguous {
        /// Description of the ambiguity.
        what: String,
    },

    /// The interface has no MAC address yet.
    ///
    /// MAC assignment happens asynchronously server-side, so this can occur
    /// when reading an interface immediately after creating it.
    #[error("interface '{interface}' has an empty MAC list")]
    EmptyMacList {
        /// Name of the interface.
        interface: String,
    },

    /// A dependent referenced in a conflict message could not be fetched.
    #[error("failed to look up dependent object '{reference}'")]
    ChildLookupFailed {
        /// The `<type>/<uuid>` reference that failed to resolve.
        reference: String,
    },

    /// The subnet has no default gateway configured.
    #[error("subnet '{subnet}' has no default gateway")]
    NoDefaultGateway {
        /// The subnet prefix.
        subnet: String,
    },

    /// Unclassified transport or remote failure.
    #[error("graph API unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },

    /// A value returned by the remote failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl GraphError {
    /// Creates a not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a conflict error with the raw remote message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates an already-exists error.
    pub fn already_exists(what: impl Into<String>) -> Self {
        Self::AlreadyExists { what: what.into() }
    }

    /// Creates an ambiguity error.
    pub fn ambiguous(what: impl Into<String>) -> Self {
        Self::Ambiguous { what: what.into() }
    }

    /// Creates a child-lookup failure for a `<type>/<uuid>` reference.
    pub fn child_lookup_failed(reference: impl Into<String>) -> Self {
        Self::ChildLookupFailed {
            reference: reference.into(),
        }
    }

    /// Creates an unavailability error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true for the not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }

    /// Returns true for the name-collision condition.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, GraphError::AlreadyExists { .. })
    }
}
