//! # dirfed-directory
//!
//! Read access to the legacy relational identity directory.
//!
//! The directory is a single `users` table owned and mutated by the legacy
//! system. This crate exposes keyed, paginated and filtered lookups over it,
//! plus the one write the federation provider is allowed: replacing a stored
//! password digest. Disabled rows are invisible to every lookup path.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod pg;
pub mod pool;
pub mod record;
pub mod repository;

pub use error::{DirectoryError, DirectoryResult};
pub use pg::PgDirectoryRepository;
pub use record::{DirectoryRecord, Page};
pub use repository::DirectoryRepository;
