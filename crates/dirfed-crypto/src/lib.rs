//! # dirfed-crypto
//!
//! Salted credential digest strategies using aws-lc-rs.
//!
//! The legacy directory stores passwords as a single round of a salted
//! one-way hash. This crate exposes that construction as a named strategy,
//! alongside a stronger strategy for credentials issued after migration,
//! selected by a stored format tag.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod digest;

pub use digest::DigestAlgorithm;
