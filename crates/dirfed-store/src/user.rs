//! Local user store trait.

use async_trait::async_trait;
use dirfed_model::LocalUser;

use crate::error::StoreResult;

/// Provider interface for the host's local user store.
///
/// Implementations must be thread-safe and support concurrent access. The
/// local store is expected to enforce a unique constraint on username;
/// `create` reports a conflict as [`StoreError::Duplicate`], which callers
/// provisioning concurrently treat as "already created, re-fetch".
///
/// [`StoreError::Duplicate`]: crate::StoreError::Duplicate
#[async_trait]
pub trait LocalUserStore: Send + Sync {
    /// Gets a user by username.
    async fn get_by_username(&self, username: &str) -> StoreResult<Option<LocalUser>>;

    /// Creates a new user with the given username and default fields.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::Duplicate` if a user with the same username
    /// already exists.
    async fn create(&self, username: &str) -> StoreResult<LocalUser>;

    /// Persists changes to an existing user.
    ///
    /// ## Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    async fn update(&self, user: &LocalUser) -> StoreResult<()>;

    /// Checks whether the user has a password configured in the local store.
    ///
    /// A locally configured password takes precedence over the directory
    /// credential; the federation provider never shadows it.
    async fn is_password_configured(&self, user: &LocalUser) -> StoreResult<bool>;
}
