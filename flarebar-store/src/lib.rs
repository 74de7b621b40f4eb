//! # Flarebar Store
//!
//! Credential and settings storage:
//!
//! - [`KeychainSecretStore`] - OS keychain backend for the secret store seam
//! - [`ProfileStore`] - named API-token profiles with an active pointer
//! - [`JsonPreferenceStore`] - non-secret settings persisted as one JSON file
//! - [`CredentialResolver`] - layered resolution: active profile, wrangler
//!   config file, environment
//!
//! In-memory fakes ([`MemorySecretStore`], [`MemoryPreferenceStore`]) back
//! the test suites of every crate that consumes these seams.

pub mod error;
pub mod keychain;
pub mod persistence;
pub mod preferences;
pub mod profiles;
pub mod resolver;
pub mod wrangler;

pub use error::StoreError;
pub use keychain::{KeychainSecretStore, MemorySecretStore};
pub use preferences::{JsonPreferenceStore, MemoryPreferenceStore, keys};
pub use profiles::ProfileStore;
pub use resolver::CredentialResolver;

#[cfg(test)]
mod persistence_tests;
