//! Composite identity handle.

use dirfed_directory::DirectoryRecord;
use dirfed_model::LocalUser;

/// A per-request identity handle binding a local user to the directory
/// record it was resolved from.
///
/// Profile reads go through the local user in both variants; the federated
/// variant additionally exposes the directory's password digest. Handles are
/// constructed fresh per lookup and never persisted or shared across
/// requests.
#[derive(Debug, Clone)]
pub enum CompositeUser {
    /// A purely local user with no directory counterpart in hand.
    Local(LocalUser),

    /// A local shadow bound to the directory record that resolved it.
    Federated {
        /// The local shadow user.
        local: LocalUser,
        /// The directory record backing it.
        record: DirectoryRecord,
    },
}

impl CompositeUser {
    /// Wraps a purely local user.
    #[must_use]
    pub const fn local_only(local: LocalUser) -> Self {
        Self::Local(local)
    }

    /// Binds a local shadow to its directory record.
    #[must_use]
    pub const fn federated(local: LocalUser, record: DirectoryRecord) -> Self {
        Self::Federated { local, record }
    }

    /// The underlying local user.
    #[must_use]
    pub const fn local(&self) -> &LocalUser {
        match self {
            Self::Local(local) | Self::Federated { local, .. } => local,
        }
    }

    /// Mutable access to the underlying local user.
    #[must_use]
    pub fn local_mut(&mut self) -> &mut LocalUser {
        match self {
            Self::Local(local) | Self::Federated { local, .. } => local,
        }
    }

    /// The username (federation join key).
    #[must_use]
    pub fn username(&self) -> &str {
        &self.local().username
    }

    /// The directory record, when this identity was resolved from one.
    #[must_use]
    pub const fn directory_record(&self) -> Option<&DirectoryRecord> {
        match self {
            Self::Local(_) => None,
            Self::Federated { record, .. } => Some(record),
        }
    }

    /// The directory's password digest, when present.
    #[must_use]
    pub fn remote_password_hash(&self) -> Option<&str> {
        self.directory_record().and_then(DirectoryRecord::password_hash)
    }

    /// Unwraps into the local user.
    #[must_use]
    pub fn into_local(self) -> LocalUser {
        match self {
            Self::Local(local) | Self::Federated { local, .. } => local,
        }
    }
}
