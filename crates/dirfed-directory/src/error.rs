//! Directory error types.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Errors that can occur against the external directory.
///
/// Absence of a record is never an error; lookups return `Ok(None)` or an
/// empty sequence. These variants cover transport and query failures, which
/// propagate to the host untouched (the host decides whether to fall back to
/// local storage).
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Connection-level failure (pool exhausted, network, TLS).
    #[error("Directory connection error: {0}")]
    Connection(String),

    /// Query-level failure reported by the database.
    #[error("Directory query error: {0}")]
    Query(String),

    /// Internal error.
    #[error("Internal directory error: {0}")]
    Internal(String),
}

impl DirectoryError {
    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Checks if this is a connection error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Converts a `SQLx` error to a directory error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> DirectoryError {
    match err {
        SqlxError::Database(db_err) => DirectoryError::Query(db_err.to_string()),
        SqlxError::PoolTimedOut => {
            DirectoryError::Connection("Connection pool timeout".to_string())
        }
        SqlxError::PoolClosed => DirectoryError::Connection("Connection pool closed".to_string()),
        SqlxError::Io(io_err) => DirectoryError::Connection(io_err.to_string()),
        _ => DirectoryError::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(DirectoryError::connection("refused").is_connection_error());
        assert!(!DirectoryError::Query("bad column".to_string()).is_connection_error());
    }

    #[test]
    fn pool_errors_map_to_connection() {
        assert!(from_sqlx_error(SqlxError::PoolTimedOut).is_connection_error());
        assert!(from_sqlx_error(SqlxError::PoolClosed).is_connection_error());
    }
}
