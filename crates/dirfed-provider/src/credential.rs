//! Credential delegation.
//!
//! Decides whether the local store or the directory is authoritative for a
//! password check or update, and performs the digest comparison.

use dirfed_directory::DirectoryRepository;
use dirfed_store::LocalUserStore;

use crate::error::FederationResult;
use crate::identity::CompositeUser;
use crate::provider::FederationProvider;

/// Kinds of credentials a host may present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    /// A password secret.
    Password,
    /// A time-based one-time password.
    Totp,
    /// A `WebAuthn` assertion.
    WebAuthn,
}

impl CredentialKind {
    /// Returns the string representation used by hosts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Totp => "otp",
            Self::WebAuthn => "webauthn",
        }
    }
}

/// Credential operations the provider exposes to the host.
///
/// The contract mirrors the host's fall-through model: returning `false`
/// from a validation or update tells the host to try its local storage
/// next; it is not an error.
#[allow(async_fn_in_trait)]
pub trait CredentialDelegate {
    /// True if this delegate can handle the credential kind.
    fn supports_credential_kind(&self, kind: CredentialKind) -> bool;

    /// Validates a supplied secret against the directory's stored digest.
    ///
    /// Returns `false` when the kind is unsupported, when the host has a
    /// locally configured password for the user (local always wins), or
    /// when no directory digest is resolvable.
    async fn is_valid(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
        supplied: &str,
    ) -> FederationResult<bool>;

    /// Pushes a new secret's digest to the directory.
    ///
    /// Always returns `false` on success: the delegate never claims local
    /// authority, leaving the host free to also persist a local copy.
    async fn update_credential(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
        new_secret: &str,
    ) -> FederationResult<bool>;

    /// Disables the credential kind for the user on the local shadow only;
    /// the directory record is never touched.
    async fn disable_credential(
        &self,
        identity: &mut CompositeUser,
        kind: CredentialKind,
    ) -> FederationResult<()>;

    /// True if the kind is supported and a directory digest is resolvable
    /// for the user.
    async fn is_configured(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
    ) -> FederationResult<bool>;

    /// Credential kinds this delegate can disable.
    fn disableable_credential_kinds(&self) -> &'static [CredentialKind] {
        &[CredentialKind::Password]
    }
}

impl<S, R> FederationProvider<S, R>
where
    S: LocalUserStore,
    R: DirectoryRepository,
{
    /// Resolves the directory digest for an identity.
    ///
    /// A federated identity carries its record; a purely local identity is
    /// read through to the directory by username, covering hosts that hand
    /// back a cached user without the record attached.
    async fn remote_hash(&self, identity: &CompositeUser) -> FederationResult<Option<String>> {
        match identity.remote_password_hash() {
            Some(hash) => Ok(Some(hash.to_string())),
            None => match identity {
                CompositeUser::Federated { .. } => Ok(None),
                CompositeUser::Local(local) => Ok(self
                    .repository()
                    .find_by_username(&local.username)
                    .await?
                    .and_then(|r| r.password)),
            },
        }
    }
}

impl<S, R> CredentialDelegate for FederationProvider<S, R>
where
    S: LocalUserStore,
    R: DirectoryRepository,
{
    fn supports_credential_kind(&self, kind: CredentialKind) -> bool {
        kind == CredentialKind::Password
    }

    async fn is_valid(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
        supplied: &str,
    ) -> FederationResult<bool> {
        if !self.supports_credential_kind(kind) {
            return Ok(false);
        }
        if self.store().is_password_configured(identity.local()).await? {
            return Ok(false);
        }
        let Some(expected) = self.remote_hash(identity).await? else {
            return Ok(false);
        };

        let config = self.config();
        let digest = config.digest.encode_with_salt(supplied, &config.salt);
        Ok(digest.is_some_and(|d| d == expected))
    }

    async fn update_credential(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
        new_secret: &str,
    ) -> FederationResult<bool> {
        if !self.supports_credential_kind(kind) {
            return Ok(false);
        }

        let config = self.config();
        let Some(digest) = config.digest.encode_with_salt(new_secret, &config.salt) else {
            tracing::error!(
                username = %identity.username(),
                "digest unavailable, not pushing password to directory"
            );
            return Ok(false);
        };

        tracing::info!(username = %identity.username(), "updating password on directory");
        self.repository()
            .update_password(identity.username(), &digest)
            .await?;

        Ok(false)
    }

    async fn disable_credential(
        &self,
        identity: &mut CompositeUser,
        kind: CredentialKind,
    ) -> FederationResult<()> {
        if !self.supports_credential_kind(kind) {
            return Ok(());
        }
        let local = identity.local_mut();
        local.enabled = false;
        self.store().update(local).await?;
        Ok(())
    }

    async fn is_configured(
        &self,
        identity: &CompositeUser,
        kind: CredentialKind,
    ) -> FederationResult<bool> {
        Ok(self.supports_credential_kind(kind) && self.remote_hash(identity).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dirfed_crypto::DigestAlgorithm;
    use dirfed_model::LocalUser;

    use super::*;
    use crate::config::ProviderConfig;
    use crate::testing::{directory_record, MemoryDirectory, MemoryStore};

    const SALT: &str = "pepper";

    fn digest_of(secret: &str) -> String {
        DigestAlgorithm::SaltedSha1
            .encode_with_salt(secret, SALT)
            .unwrap()
    }

    fn provider(
        directory: MemoryDirectory,
    ) -> FederationProvider<MemoryStore, MemoryDirectory> {
        let config = ProviderConfig::builder()
            .datasource("postgres://localhost/legacy")
            .salt(SALT)
            .build()
            .unwrap();
        FederationProvider::new(config, Arc::new(MemoryStore::new()), directory)
    }

    async fn resolve(
        provider: &FederationProvider<MemoryStore, MemoryDirectory>,
        username: &str,
    ) -> CompositeUser {
        provider
            .resolve_by_username(username)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn only_password_kind_is_supported() {
        let provider = provider(MemoryDirectory::new());
        assert!(provider.supports_credential_kind(CredentialKind::Password));
        assert!(!provider.supports_credential_kind(CredentialKind::Totp));
        assert!(!provider.supports_credential_kind(CredentialKind::WebAuthn));
        assert_eq!(
            provider.disableable_credential_kinds(),
            &[CredentialKind::Password]
        );
    }

    #[tokio::test]
    async fn correct_secret_validates() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record(
            "alice",
            Some("Alice@Ex.com"),
            Some(&digest_of("secret")),
        ));
        let provider = provider(directory);
        let identity = resolve(&provider, "alice").await;

        assert!(provider
            .is_valid(&identity, CredentialKind::Password, "secret")
            .await
            .unwrap());
        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "wrong")
            .await
            .unwrap());
        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "secreT")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unsupported_kind_never_validates() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("alice", None, Some(&digest_of("secret"))));
        let provider = provider(directory);
        let identity = resolve(&provider, "alice").await;

        assert!(!provider
            .is_valid(&identity, CredentialKind::Totp, "secret")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn locally_configured_password_takes_precedence() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("bob", None, Some(&digest_of("secret"))));
        let provider = provider(directory);
        let identity = resolve(&provider, "bob").await;

        provider.store().set_local_password("bob");

        // Even the correct directory secret is refused once a local
        // password exists.
        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "secret")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn missing_remote_hash_fails_closed() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("carol", None, None));
        let provider = provider(directory);
        let identity = resolve(&provider, "carol").await;

        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "anything")
            .await
            .unwrap());
        assert!(!provider
            .is_configured(&identity, CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn local_identity_reads_hash_through_by_username() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("dave", None, Some(&digest_of("secret"))));
        let provider = provider(directory);

        // A host handing back a cached user without the directory record.
        let identity = CompositeUser::local_only(LocalUser::new("dave"));

        assert!(provider
            .is_valid(&identity, CredentialKind::Password, "secret")
            .await
            .unwrap());
        assert!(provider
            .is_configured(&identity, CredentialKind::Password)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn update_credential_pushes_digest_but_returns_false() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("erin", None, Some(&digest_of("old"))));
        let provider = provider(directory);
        let identity = resolve(&provider, "erin").await;

        let claimed = provider
            .update_credential(&identity, CredentialKind::Password, "new")
            .await
            .unwrap();
        assert!(!claimed);

        let record = provider.repository().record("erin").unwrap();
        assert_eq!(record.password.as_deref(), Some(digest_of("new").as_str()));

        // A fresh resolution validates against the new secret.
        let identity = resolve(&provider, "erin").await;
        assert!(provider
            .is_valid(&identity, CredentialKind::Password, "new")
            .await
            .unwrap());
        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "old")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn update_credential_ignores_unsupported_kind() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("frank", None, Some(&digest_of("old"))));
        let provider = provider(directory);
        let identity = resolve(&provider, "frank").await;

        let claimed = provider
            .update_credential(&identity, CredentialKind::Totp, "new")
            .await
            .unwrap();
        assert!(!claimed);

        let record = provider.repository().record("frank").unwrap();
        assert_eq!(record.password.as_deref(), Some(digest_of("old").as_str()));
    }

    #[tokio::test]
    async fn disable_credential_touches_local_shadow_only() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record("grace", None, Some(&digest_of("secret"))));
        let provider = provider(directory);
        let mut identity = resolve(&provider, "grace").await;

        provider
            .disable_credential(&mut identity, CredentialKind::Password)
            .await
            .unwrap();

        assert!(!provider.store().user("grace").unwrap().enabled);
        assert!(provider.repository().record("grace").unwrap().enabled);
    }

    #[tokio::test]
    async fn sha256_strategy_validates_migrated_credentials() {
        let hash = DigestAlgorithm::SaltedSha256
            .encode_with_salt("secret", SALT)
            .unwrap();
        let directory = MemoryDirectory::new();
        directory.push(directory_record("heidi", None, Some(&hash)));

        let config = ProviderConfig::builder()
            .datasource("postgres://localhost/legacy")
            .salt(SALT)
            .digest_format("sha256")
            .build()
            .unwrap();
        let provider =
            FederationProvider::new(config, Arc::new(MemoryStore::new()), directory);
        let identity = resolve(&provider, "heidi").await;

        assert!(provider
            .is_valid(&identity, CredentialKind::Password, "secret")
            .await
            .unwrap());
    }

    /// End-to-end walk of the lifecycle: resolve, validate, disable
    /// externally, evict.
    #[tokio::test]
    async fn federation_lifecycle_scenario() {
        let directory = MemoryDirectory::new();
        directory.push(directory_record(
            "alice",
            Some("Alice@Ex.com"),
            Some(&digest_of("secret")),
        ));
        let provider = provider(directory);

        let identity = resolve(&provider, "alice").await;
        assert_eq!(
            identity.local().email.as_deref(),
            Some("Alice@Ex.com")
        );

        assert!(provider
            .is_valid(&identity, CredentialKind::Password, "secret")
            .await
            .unwrap());
        assert!(!provider
            .is_valid(&identity, CredentialKind::Password, "wrong")
            .await
            .unwrap());

        provider.repository().disable("alice");
        assert!(!provider.is_still_valid("alice").await.unwrap());
    }
}
