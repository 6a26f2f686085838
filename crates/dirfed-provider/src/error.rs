//! Federation error types.

use dirfed_directory::DirectoryError;
use dirfed_store::StoreError;
use thiserror::Error;

/// Errors that can occur during federation operations.
///
/// Absence of a user is never an error: resolution returns `Ok(None)`.
/// Directory transport failures propagate untouched so the host can treat
/// this provider as non-authoritative for the request and fall back to
/// local validation.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Required configuration missing or invalid. Fatal at provider
    /// construction time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure against the external directory.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Failure against the local user store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Internal federation error.
    #[error("Internal federation error: {0}")]
    Internal(String),
}

impl FederationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Checks if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Checks if this is a transport-level failure against the directory.
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Directory(e) if e.is_connection_error())
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
