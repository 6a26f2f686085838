//! Provider configuration.

use dirfed_crypto::DigestAlgorithm;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FederationError, FederationResult};

/// Configuration for one directory federation provider instance.
///
/// Two values are required and validated non-empty at configuration time:
/// the datasource (a `PostgreSQL` connection URL for the directory) and the
/// fixed per-deployment salt used by the legacy digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique identifier for this provider configuration. Stored on shadow
    /// users as their federation link.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Connection URL for the external directory database.
    pub datasource: String,

    /// Fixed salt the directory prepends to secrets before digesting.
    #[serde(skip_serializing)]
    pub salt: String,

    /// Digest strategy matching the format of stored credentials.
    #[serde(skip)]
    pub digest: DigestAlgorithm,
}

impl ProviderConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ProviderConfigBuilder {
        ProviderConfigBuilder::new()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `FederationError::Configuration` if the datasource or salt
    /// is missing or blank.
    pub fn validate(&self) -> FederationResult<()> {
        if self.datasource.trim().is_empty() {
            return Err(FederationError::config("Datasource not defined"));
        }
        if self.salt.trim().is_empty() {
            return Err(FederationError::config("Salt not defined"));
        }
        Ok(())
    }

    /// The federation link value stamped on provisioned shadow users.
    #[must_use]
    pub fn federation_link(&self) -> String {
        self.id.to_string()
    }
}

/// Builder for `ProviderConfig`.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
    id: Option<Uuid>,
    name: Option<String>,
    datasource: Option<String>,
    salt: Option<String>,
    digest_format: Option<String>,
}

impl ProviderConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the provider ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the datasource connection URL.
    #[must_use]
    pub fn datasource(mut self, url: impl Into<String>) -> Self {
        self.datasource = Some(url.into());
        self
    }

    /// Sets the digest salt.
    #[must_use]
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    /// Selects the digest strategy by stored credential format tag.
    ///
    /// Defaults to the legacy `"sha1"` format when not set.
    #[must_use]
    pub fn digest_format(mut self, tag: impl Into<String>) -> Self {
        self.digest_format = Some(tag.into());
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `FederationError::Configuration` if a required value is
    /// missing/blank or the digest format tag is unknown.
    pub fn build(self) -> FederationResult<ProviderConfig> {
        let digest = match self.digest_format.as_deref() {
            None => DigestAlgorithm::default(),
            Some(tag) => DigestAlgorithm::from_format(tag).ok_or_else(|| {
                FederationError::config(format!("Unknown digest format '{tag}'"))
            })?,
        };

        let config = ProviderConfig {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            name: self
                .name
                .unwrap_or_else(|| "Legacy directory".to_string()),
            datasource: self.datasource.unwrap_or_default(),
            salt: self.salt.unwrap_or_default(),
            digest,
        };

        config.validate()?;
        Ok(config)
    }
}
