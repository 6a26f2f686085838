//! Provider factory and datasource pool lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use dirfed_directory::pool::{create_pool, PoolConfig};
use dirfed_directory::PgDirectoryRepository;
use dirfed_store::LocalUserStore;
use parking_lot::Mutex;
use sqlx::PgPool;

use crate::config::ProviderConfig;
use crate::error::FederationResult;
use crate::provider::FederationProvider;

/// Stable identifier for this provider implementation.
pub const PROVIDER_ID: &str = "legacy-directory-user-storage";

/// Factory creating federation providers over pooled directory connections.
///
/// One pool is held per configured datasource, as explicit factory state
/// with an `open`/`close_all` lifecycle: providers sharing a datasource
/// share the pool, and the factory owner decides when connections are torn
/// down. Nothing is cached process-wide.
#[derive(Default)]
pub struct FederationFactory {
    pools: Mutex<HashMap<String, PgPool>>,
}

impl FederationFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider for the given configuration and local store.
    ///
    /// # Errors
    ///
    /// Returns `FederationError::Configuration` for an invalid
    /// configuration, or a connection error if the datasource is
    /// unreachable.
    pub async fn create<S: LocalUserStore>(
        &self,
        config: ProviderConfig,
        store: Arc<S>,
    ) -> FederationResult<FederationProvider<S, PgDirectoryRepository>> {
        config.validate()?;
        tracing::info!(
            datasource = %config.datasource,
            name = %config.name,
            "initializing federation provider"
        );
        let pool = self.open(&config.datasource).await?;
        Ok(FederationProvider::new(
            config,
            store,
            PgDirectoryRepository::new(pool),
        ))
    }

    /// Returns the pool for a datasource, creating it on first use.
    async fn open(&self, datasource: &str) -> FederationResult<PgPool> {
        if let Some(pool) = self.pools.lock().get(datasource) {
            return Ok(pool.clone());
        }

        tracing::info!(datasource = %datasource, "creating directory connection pool");
        let pool = create_pool(&PoolConfig::new(datasource)).await?;

        let existing = {
            let mut pools = self.pools.lock();
            match pools.get(datasource) {
                Some(existing) => Some(existing.clone()),
                None => {
                    pools.insert(datasource.to_string(), pool.clone());
                    None
                }
            }
        };

        // Lost a racing open for the same datasource: keep the first pool.
        if let Some(existing) = existing {
            pool.close().await;
            return Ok(existing);
        }

        Ok(pool)
    }

    /// Number of datasources with an open pool.
    #[must_use]
    pub fn open_pool_count(&self) -> usize {
        self.pools.lock().len()
    }

    /// Closes every held pool. Teardown failures never propagate.
    pub async fn close_all(&self) {
        let pools: Vec<(String, PgPool)> = self.pools.lock().drain().collect();
        for (datasource, pool) in pools {
            tracing::debug!(datasource = %datasource, "closing directory connection pool");
            pool.close().await;
        }
    }
}
