//! Local user domain model.
//!
//! A `LocalUser` is the host's persisted copy of a directory user. It is
//! created lazily on first resolution of a username and merged against the
//! directory record on every subsequent resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A locally stored user.
///
/// The username is the federation join key: it always equals the username of
/// the directory record that provisioned this user. The directory's opaque
/// record id is not used to locate local users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalUser {
    /// Unique identifier in the local store.
    pub id: Uuid,
    /// Unique username, equal to the directory record's username.
    pub username: String,
    /// Whether the account is enabled locally.
    pub enabled: bool,

    /// User's first name.
    pub first_name: Option<String>,
    /// User's last name.
    pub last_name: Option<String>,
    /// User's email address.
    pub email: Option<String>,

    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,

    /// Opaque reference to the federation provider that provisioned this
    /// user, or `None` for purely local accounts.
    pub federation_link: Option<String>,
}

impl LocalUser {
    /// Creates a new local user with the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            enabled: true,
            first_name: None,
            last_name: None,
            email: None,
            created_at: now,
            updated_at: now,
            federation_link: None,
        }
    }

    /// Sets the user's email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the user's first name.
    #[must_use]
    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    /// Sets the user's last name.
    #[must_use]
    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    /// Sets whether the user is enabled.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the federation link.
    #[must_use]
    pub fn with_federation_link(mut self, link: impl Into<String>) -> Self {
        self.federation_link = Some(link.into());
        self
    }

    /// Checks if this user was provisioned by a federation provider.
    #[must_use]
    pub const fn is_federated(&self) -> bool {
        self.federation_link.is_some()
    }

    /// Checks if the user has a non-blank email.
    #[must_use]
    pub fn has_email(&self) -> bool {
        self.email
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_defaults() {
        let user = LocalUser::new("testuser");

        assert_eq!(user.username, "testuser");
        assert!(user.enabled);
        assert!(user.email.is_none());
        assert!(user.federation_link.is_none());
        assert!(!user.is_federated());
    }

    #[test]
    fn builder_pattern_works() {
        let user = LocalUser::new("jdoe")
            .with_email("jdoe@example.com")
            .with_first_name("John")
            .with_last_name("Doe")
            .with_federation_link("directory-1");

        assert_eq!(user.email, Some("jdoe@example.com".to_string()));
        assert_eq!(user.first_name, Some("John".to_string()));
        assert_eq!(user.last_name, Some("Doe".to_string()));
        assert!(user.is_federated());
    }

    #[test]
    fn has_email_ignores_blank() {
        let mut user = LocalUser::new("u1");
        assert!(!user.has_email());

        user.email = Some("   ".to_string());
        assert!(!user.has_email());

        user.email = Some("u1@example.com".to_string());
        assert!(user.has_email());
    }
}
