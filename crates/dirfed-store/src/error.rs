//! Local store error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur against the local user store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("User not found: {id}")]
    NotFound {
        /// User ID.
        id: Uuid,
    },

    /// Duplicate user (unique constraint violation on username).
    #[error("Duplicate user: username '{username}' already exists")]
    Duplicate {
        /// Conflicting username.
        username: String,
    },

    /// Invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Connection error to the local store.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Internal error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a not found error.
    #[must_use]
    pub const fn not_found(id: Uuid) -> Self {
        Self::NotFound { id }
    }

    /// Creates a duplicate error for the given username.
    #[must_use]
    pub fn duplicate(username: impl Into<String>) -> Self {
        Self::Duplicate {
            username: username.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for local store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        let id = Uuid::now_v7();
        assert!(StoreError::not_found(id).is_not_found());
        assert!(StoreError::duplicate("jdoe").is_duplicate());
        assert!(!StoreError::duplicate("jdoe").is_not_found());
        assert!(StoreError::duplicate("jdoe").to_string().contains("jdoe"));
    }
}
