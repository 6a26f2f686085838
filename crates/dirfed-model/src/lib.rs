//! # dirfed-model
//!
//! Domain model for the legacy directory federation provider.
//!
//! This crate defines the locally persisted representation of a federated
//! user (the shadow identity the host keeps for each directory user).

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod user;

pub use user::LocalUser;
