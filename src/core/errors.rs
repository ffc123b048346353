//! Error taxonomy for backend resolution, installation and removal.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error raised by catalog resolution and installed-backend operations.
///
/// Every variant carries the name and/or path involved so callers can log or
/// display it without re-deriving context.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Name unresolvable in the catalog or on disk (including alias scan miss).
    #[error("no backend found with name `{name}`")]
    NotFound { name: String },

    /// The requested name cannot be used as a backend directory name.
    #[error("invalid backend name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid operation on backend `{name}`: {reason}")]
    InvalidOperation { name: String, reason: String },

    /// The host profile key has no entry in the meta-backend's capability map.
    #[error("meta backend `{name}` has no backend for capability `{capability}` (available: {})", available.join(", "))]
    NoCapabilityMatch {
        name: String,
        capability: String,
        available: Vec<String>,
    },

    #[error("meta backend `{name}` cannot be resolved: host capability profile is unavailable")]
    NoCapabilityProfile { name: String },

    /// A redirect record points at a concrete backend that is not on disk.
    #[error("meta backend `{name}` points to `{target}`, which is not installed at {}", path.display())]
    InconsistentState {
        name: String,
        target: String,
        path: PathBuf,
    },

    #[error("corrupt backend metadata at {}", path.display())]
    MetadataCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to {action} {}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Wrapped failure from the image fetch/unpack collaborator.
    #[error("failed to fetch image `{uri}` into {}", dest.display())]
    Collaborator {
        uri: String,
        dest: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl BackendError {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        BackendError::NotFound { name: name.into() }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackendError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the name was never known (catalog or disk).
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
    }
}

/// Result alias for backend operations.
pub type BackendResult<T> = std::result::Result<T, BackendError>;
