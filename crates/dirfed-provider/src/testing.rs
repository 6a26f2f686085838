//! In-memory doubles for the storage seams, shared across test modules.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dirfed_directory::{DirectoryRecord, DirectoryRepository, DirectoryResult, Page};
use dirfed_model::LocalUser;
use dirfed_store::{LocalUserStore, StoreError, StoreResult};
use parking_lot::Mutex;

/// Builds an enabled directory record for tests.
pub(crate) fn directory_record(
    username: &str,
    email: Option<&str>,
    password: Option<&str>,
) -> DirectoryRecord {
    DirectoryRecord {
        id: format!("id-{username}"),
        username: username.to_string(),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        email: email.map(str::to_string),
        password: password.map(str::to_string),
        enabled: true,
    }
}

/// In-memory local user store with a unique constraint on username.
#[derive(Default)]
pub(crate) struct MemoryStore {
    users: Mutex<HashMap<String, LocalUser>>,
    local_passwords: Mutex<HashSet<String>>,
    create_calls: AtomicUsize,
    duplicate_on_create: Mutex<Option<String>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks a username as having a locally configured password.
    pub(crate) fn set_local_password(&self, username: &str) {
        self.local_passwords.lock().insert(username.to_string());
    }

    /// Makes the next `create` for this username behave as if another
    /// instance inserted the row first: the user appears in the store and
    /// the call reports a duplicate conflict.
    pub(crate) fn fail_next_create_with_duplicate(&self, username: &str) {
        *self.duplicate_on_create.lock() = Some(username.to_string());
    }

    pub(crate) fn user(&self, username: &str) -> Option<LocalUser> {
        self.users.lock().get(username).cloned()
    }

    pub(crate) fn user_count(&self) -> usize {
        self.users.lock().len()
    }

    pub(crate) fn created_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalUserStore for MemoryStore {
    async fn get_by_username(&self, username: &str) -> StoreResult<Option<LocalUser>> {
        Ok(self.users.lock().get(username).cloned())
    }

    async fn create(&self, username: &str) -> StoreResult<LocalUser> {
        {
            let mut pending = self.duplicate_on_create.lock();
            if pending.as_deref() == Some(username) {
                *pending = None;
                drop(pending);
                self.users
                    .lock()
                    .insert(username.to_string(), LocalUser::new(username));
                return Err(StoreError::duplicate(username));
            }
        }

        let mut users = self.users.lock();
        if users.contains_key(username) {
            return Err(StoreError::duplicate(username));
        }
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let user = LocalUser::new(username);
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: &LocalUser) -> StoreResult<()> {
        let mut users = self.users.lock();
        match users.get_mut(&user.username) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(user.id)),
        }
    }

    async fn is_password_configured(&self, user: &LocalUser) -> StoreResult<bool> {
        Ok(self.local_passwords.lock().contains(&user.username))
    }
}

/// In-memory directory with the enabled-rows-only lookup contract.
#[derive(Default)]
pub(crate) struct MemoryDirectory {
    records: Mutex<Vec<DirectoryRecord>>,
}

impl MemoryDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, record: DirectoryRecord) {
        self.records.lock().push(record);
    }

    pub(crate) fn disable(&self, username: &str) {
        for record in self.records.lock().iter_mut() {
            if record.username == username {
                record.enabled = false;
            }
        }
    }

    pub(crate) fn remove(&self, username: &str) {
        self.records.lock().retain(|r| r.username != username);
    }

    pub(crate) fn set_email(&self, username: &str, email: Option<&str>) {
        for record in self.records.lock().iter_mut() {
            if record.username == username {
                record.email = email.map(str::to_string);
            }
        }
    }

    /// Reads a row back regardless of its enabled flag.
    pub(crate) fn record(&self, username: &str) -> Option<DirectoryRecord> {
        self.records
            .lock()
            .iter()
            .find(|r| r.username == username)
            .cloned()
    }

    fn enabled(&self) -> Vec<DirectoryRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.enabled)
            .cloned()
            .collect()
    }
}

fn apply_page(mut records: Vec<DirectoryRecord>, page: Page) -> Vec<DirectoryRecord> {
    records.sort_by(|a, b| a.username.cmp(&b.username));
    let skipped = records.into_iter().skip(page.offset() as usize);
    match page.limit() {
        Some(limit) => skipped.take(limit as usize).collect(),
        None => skipped.collect(),
    }
}

#[async_trait]
impl DirectoryRepository for MemoryDirectory {
    async fn find_by_id(&self, id: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        Ok(self.enabled().into_iter().find(|r| r.id == id))
    }

    async fn find_by_username(&self, username: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        Ok(self.enabled().into_iter().find(|r| r.username == username))
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<DirectoryRecord>> {
        Ok(self
            .enabled()
            .into_iter()
            .find(|r| r.email.as_deref() == Some(email)))
    }

    async fn find_by_pattern(
        &self,
        pattern: &str,
        page: Page,
    ) -> DirectoryResult<Vec<DirectoryRecord>> {
        let needle = pattern.to_lowercase();
        let matches = self
            .enabled()
            .into_iter()
            .filter(|r| {
                r.username.to_lowercase().contains(&needle)
                    || r.email
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
            })
            .collect();
        Ok(apply_page(matches, page))
    }

    async fn find_all(&self, page: Page) -> DirectoryResult<Vec<DirectoryRecord>> {
        Ok(apply_page(self.enabled(), page))
    }

    async fn count(&self) -> DirectoryResult<u64> {
        Ok(self.enabled().len() as u64)
    }

    async fn update_password(&self, username: &str, new_hash: &str) -> DirectoryResult<()> {
        for record in self.records.lock().iter_mut() {
            if record.username == username && record.enabled {
                record.password = Some(new_hash.to_string());
            }
        }
        Ok(())
    }
}
