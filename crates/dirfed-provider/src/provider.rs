//! Reconciliation engine.
//!
//! Resolves lookup keys against the external directory and provisions or
//! merges the corresponding local shadow user for every record returned.

use std::collections::HashMap;
use std::sync::Arc;

use dirfed_directory::{DirectoryRecord, DirectoryRepository, Page};
use dirfed_model::LocalUser;
use dirfed_store::LocalUserStore;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

use crate::config::ProviderConfig;
use crate::error::{FederationError, FederationResult};
use crate::identity::CompositeUser;

/// Federation provider over one configured directory datasource.
///
/// Request-scoped and synchronous from the host's point of view: each call
/// runs to completion with a handful of sequential reads (and at most one
/// write) against the directory. Shadow creation for a given username is
/// serialized through a per-username critical section, so concurrent first
/// resolutions of the same user produce exactly one shadow.
pub struct FederationProvider<S, R> {
    config: ProviderConfig,
    store: Arc<S>,
    repository: R,
    provision_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S, R> FederationProvider<S, R>
where
    S: LocalUserStore,
    R: DirectoryRepository,
{
    /// Creates a provider from a validated configuration, the host's local
    /// store, and a directory repository.
    #[must_use]
    pub fn new(config: ProviderConfig, store: Arc<S>, repository: R) -> Self {
        Self {
            config,
            store,
            repository,
            provision_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the directory repository.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the local user store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a user by the directory's opaque record id.
    pub async fn resolve_by_id(&self, id: &str) -> FederationResult<Option<CompositeUser>> {
        match self.repository.find_by_id(id).await? {
            Some(record) => Ok(Some(self.link_record(record).await?)),
            None => {
                tracing::info!(id = %id, "could not find directory user by id");
                Ok(None)
            }
        }
    }

    /// Resolves a user by username.
    pub async fn resolve_by_username(
        &self,
        username: &str,
    ) -> FederationResult<Option<CompositeUser>> {
        match self.repository.find_by_username(username).await? {
            Some(record) => Ok(Some(self.link_record(record).await?)),
            None => Ok(None),
        }
    }

    /// Resolves a user by email.
    pub async fn resolve_by_email(&self, email: &str) -> FederationResult<Option<CompositeUser>> {
        match self.repository.find_by_email(email).await? {
            Some(record) => Ok(Some(self.link_record(record).await?)),
            None => Ok(None),
        }
    }

    /// Re-checks that the directory still has an enabled record for the
    /// username.
    ///
    /// Returns `false` to signal the host to evict/deauthorize the identity.
    /// This check is the only path by which external disablement propagates;
    /// the host is expected to call it opportunistically on each validation
    /// attempt.
    pub async fn is_still_valid(&self, username: &str) -> FederationResult<bool> {
        if self.repository.find_by_username(username).await?.is_none() {
            tracing::warn!(
                username = %username,
                "user no longer active in directory, signalling eviction"
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// Counts enabled directory users.
    pub async fn count_all(&self) -> FederationResult<u64> {
        Ok(self.repository.count().await?)
    }

    /// Lists directory users, provisioning/merging a shadow for each.
    pub async fn list_all(&self, page: Page) -> FederationResult<Vec<CompositeUser>> {
        let records = self.repository.find_all(page).await?;
        self.link_all(records).await
    }

    /// Searches directory users by substring, provisioning/merging a shadow
    /// for each match.
    pub async fn search(&self, term: &str, page: Page) -> FederationResult<Vec<CompositeUser>> {
        let records = self.repository.find_by_pattern(term, page).await?;
        self.link_all(records).await
    }

    /// Releases the directory connection. Teardown never propagates.
    pub async fn close(&self) {
        self.repository.close().await;
    }

    async fn link_all(
        &self,
        records: Vec<DirectoryRecord>,
    ) -> FederationResult<Vec<CompositeUser>> {
        let mut users = Vec::with_capacity(records.len());
        for record in records {
            users.push(self.link_record(record).await?);
        }
        Ok(users)
    }

    /// Binds a directory record to its local shadow, creating or merging it.
    async fn link_record(&self, record: DirectoryRecord) -> FederationResult<CompositeUser> {
        let local = match self.store.get_by_username(&record.username).await? {
            Some(existing) => self.merge_existing(existing, &record).await?,
            None => self.provision(&record).await?,
        };
        Ok(CompositeUser::federated(local, record))
    }

    /// Creates the shadow for a not-yet-linked directory record.
    ///
    /// Creation is guarded by a per-username critical section, and a
    /// duplicate-insert conflict from the store is treated as "someone else
    /// created it": the row is re-fetched and merged instead.
    async fn provision(&self, record: &DirectoryRecord) -> FederationResult<LocalUser> {
        let lock = self.provision_lock(&record.username);
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.get_by_username(&record.username).await? {
            return self.merge_existing(existing, record).await;
        }

        tracing::info!(username = %record.username, "creating local user");
        let mut local = match self.store.create(&record.username).await {
            Ok(local) => local,
            Err(e) if e.is_duplicate() => {
                let existing = self
                    .store
                    .get_by_username(&record.username)
                    .await?
                    .ok_or_else(|| {
                        FederationError::internal(format!(
                            "user '{}' vanished after duplicate-create conflict",
                            record.username
                        ))
                    })?;
                return self.merge_existing(existing, record).await;
            }
            Err(e) => return Err(e.into()),
        };

        local.first_name = record.first_name.clone();
        local.last_name = record.last_name.clone();
        if let Some(email) = record.email_non_blank() {
            local.email = Some(email.to_string());
        }
        local.enabled = record.enabled;
        local.federation_link = Some(self.config.federation_link());
        self.store.update(&local).await?;

        Ok(local)
    }

    /// Applies the update-merge policy to an existing shadow.
    ///
    /// Only the email is re-synced after creation: the trimmed directory
    /// value overwrites the local one when the local email is blank or
    /// differs case-insensitively. The local `enabled` flag is never touched
    /// here; external disablement surfaces through `is_still_valid` only.
    async fn merge_existing(
        &self,
        mut local: LocalUser,
        record: &DirectoryRecord,
    ) -> FederationResult<LocalUser> {
        tracing::debug!(username = %local.username, "reusing local user");

        if let Some(external) = record.email_non_blank() {
            let stale = match local.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
                None => true,
                Some(current) => current.to_lowercase() != external.to_lowercase(),
            };
            if stale {
                local.email = Some(external.to_string());
                self.store.update(&local).await?;
            }
        }

        Ok(local)
    }

    fn provision_lock(&self, username: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.provision_locks.lock();
        locks
            .entry(username.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
