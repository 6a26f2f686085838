//! Directory repository trait.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::record::{filter, DirectoryRecord, Page};

/// Keyed and filtered read access to the external directory.
///
/// Pure data access: no provisioning or merge policy lives here. Every
/// lookup observes only enabled rows; a disabled row does not exist as far
/// as callers are concerned. All list operations are read-only snapshots —
/// no transaction spans multiple calls.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Finds the enabled record with the given id.
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<DirectoryRecord>>;

    /// Finds the enabled record with the given username.
    ///
    /// The directory schema guarantees at most one match; if it ever holds
    /// more, the first row of a stable order is returned.
    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<DirectoryRecord>>;

    /// Finds the enabled record with the given email.
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<DirectoryRecord>>;

    /// Finds enabled records whose username or email contains the pattern,
    /// case-insensitively, ordered by username ascending.
    async fn find_by_pattern(
        &self,
        pattern: &str,
        page: Page,
    ) -> DirectoryResult<Vec<DirectoryRecord>>;

    /// Lists enabled records, ordered by username ascending.
    async fn find_all(&self, page: Page) -> DirectoryResult<Vec<DirectoryRecord>>;

    /// Counts enabled records.
    async fn count(&self) -> DirectoryResult<u64>;

    /// Replaces the stored password digest for the given username.
    ///
    /// Best-effort push: if no enabled record matches, this is a silent
    /// no-op, mirroring the credential delegate's "did not claim authority"
    /// contract.
    async fn update_password(&self, username: &str, new_hash: &str) -> DirectoryResult<()>;

    /// Releases any held connections. Teardown failures must not propagate.
    async fn close(&self) {}

    /// Dispatches a filtered lookup to the matching single-field operation.
    ///
    /// Recognizes the keys in [`filter`]; unrecognized keys are logged and
    /// skipped, and a filter set that matches nothing recognized yields an
    /// empty sequence. Keys are tried in a fixed precedence (email,
    /// username, id, search) so a mixed filter set resolves
    /// deterministically.
    async fn find_by_filters(
        &self,
        filters: &HashMap<String, String>,
        page: Page,
    ) -> DirectoryResult<Vec<DirectoryRecord>> {
        for key in filters.keys() {
            if !matches!(
                key.as_str(),
                filter::EMAIL | filter::USERNAME | filter::USER_ID | filter::SEARCH
            ) {
                tracing::warn!(key = %key, "search by attribute not supported");
            }
        }

        if let Some(email) = filters.get(filter::EMAIL) {
            return Ok(single_page(self.find_by_email(email).await?, page));
        }
        if let Some(username) = filters.get(filter::USERNAME) {
            return Ok(single_page(self.find_by_username(username).await?, page));
        }
        if let Some(id) = filters.get(filter::USER_ID) {
            return Ok(single_page(self.find_by_id(id).await?, page));
        }
        if let Some(pattern) = filters.get(filter::SEARCH) {
            return self.find_by_pattern(pattern, page).await;
        }

        Ok(Vec::new())
    }
}

/// Applies a page window to an at-most-one result.
fn single_page(record: Option<DirectoryRecord>, page: Page) -> Vec<DirectoryRecord> {
    if page.offset() > 0 || page.is_empty() {
        return Vec::new();
    }
    record.into_iter().collect()
}
