//! Directory row type and pagination.

use sqlx::FromRow;

/// One row of the legacy directory's `users` table.
///
/// The directory owns and mutates these rows; the federation provider only
/// reads them, except for `password`, which may be overwritten with a new
/// digest on credential update.
#[derive(Debug, Clone, FromRow)]
pub struct DirectoryRecord {
    /// Opaque stable identifier (primary key).
    pub id: String,
    /// Unique username; the federation join key.
    pub username: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Email address, if the directory has one.
    pub email: Option<String>,
    /// Salted password digest (opaque hex string).
    pub password: Option<String>,
    /// Whether the row is active. Disabled rows are invisible to lookups.
    pub enabled: bool,
}

impl DirectoryRecord {
    /// Returns the stored password digest, if any.
    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the email if it is present and non-blank.
    #[must_use]
    pub fn email_non_blank(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

/// Pagination window for list and search operations.
///
/// The legacy contract uses `-1` for "no bound" on both the offset and the
/// count; that maps to `None` here. [`Page::from_bounds`] accepts the raw
/// legacy values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Index of the first result, or `None` to start from the beginning.
    pub first: Option<u32>,
    /// Maximum number of results, or `None` for no limit.
    pub max: Option<u32>,
}

impl Page {
    /// A page with no offset and no limit.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            first: None,
            max: None,
        }
    }

    /// Creates a bounded page.
    #[must_use]
    pub const fn new(first: u32, max: u32) -> Self {
        Self {
            first: Some(first),
            max: Some(max),
        }
    }

    /// Creates a page from legacy bounds, where any negative value means
    /// "no bound".
    #[must_use]
    pub fn from_bounds(first: i32, max: i32) -> Self {
        Self {
            first: u32::try_from(first).ok(),
            max: u32::try_from(max).ok(),
        }
    }

    /// The SQL offset for this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.first.unwrap_or(0))
    }

    /// The SQL limit for this page, `None` meaning unlimited.
    #[must_use]
    pub fn limit(&self) -> Option<i64> {
        self.max.map(i64::from)
    }

    /// True if the page admits no results at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }
}

/// Recognized keys for filtered directory lookups.
pub mod filter {
    /// Exact email lookup.
    pub const EMAIL: &str = "email";
    /// Exact username lookup.
    pub const USERNAME: &str = "username";
    /// Lookup by the directory's opaque record id.
    pub const USER_ID: &str = "id";
    /// Substring pattern search.
    pub const SEARCH: &str = "search";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: Option<&str>) -> DirectoryRecord {
        DirectoryRecord {
            id: "42".to_string(),
            username: "jdoe".to_string(),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            email: email.map(str::to_string),
            password: None,
            enabled: true,
        }
    }

    #[test]
    fn email_non_blank_trims() {
        assert_eq!(
            record(Some("  jdoe@example.com ")).email_non_blank(),
            Some("jdoe@example.com")
        );
        assert_eq!(record(Some("   ")).email_non_blank(), None);
        assert_eq!(record(None).email_non_blank(), None);
    }

    #[test]
    fn page_from_legacy_bounds() {
        let page = Page::from_bounds(-1, -1);
        assert_eq!(page, Page::unbounded());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), None);

        let page = Page::from_bounds(10, 5);
        assert_eq!(page.offset(), 10);
        assert_eq!(page.limit(), Some(5));
    }

    #[test]
    fn zero_max_is_empty() {
        assert!(Page::from_bounds(0, 0).is_empty());
        assert!(!Page::unbounded().is_empty());
        assert!(!Page::new(0, 10).is_empty());
    }
}
