//! Trait definitions for Flarebar.
//!
//! This module defines the collaborator seams the engine depends on. All of
//! them are dependency-injected: nothing in Flarebar reaches for a process
//! global, so tests swap in in-memory fakes.

use crate::error::CoreError;
use crate::models::{Credentials, DeploymentStatus};

/// Opaque secure key-value storage (OS keychain or equivalent).
///
/// Implementations must provide overwrite semantics on `save`
/// (delete-then-insert is acceptable). A `load` after a `save` on the same
/// task must observe the written value; no write buffering.
pub trait SecretStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` when the backend rejects the write.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), CoreError>;

    /// Loads the value stored under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Option<Vec<u8>>;

    /// Deletes the entry under `key`. Deleting a missing entry is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Storage` when the backend fails for any reason
    /// other than the entry being absent.
    fn delete(&self, key: &str) -> Result<(), CoreError>;
}

/// Simple string key-value storage for non-secret settings.
///
/// Used for the active profile id, the selected account id, and the
/// diagnostics toggle. Writes are best-effort; implementations log failures
/// rather than surfacing them.
pub trait PreferenceStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str);

    /// Removes the entry under `key`, if present.
    fn remove(&self, key: &str);
}

/// Delivers OS-level notifications. Fire-and-forget: implementations log
/// delivery failures, never propagate them.
pub trait Notifier: Send + Sync {
    /// Notifies about a deployment reaching a terminal status.
    fn notify_deployment(
        &self,
        project_name: &str,
        status: DeploymentStatus,
        environment: Option<&str>,
    );

    /// Notifies about a worker event.
    fn notify_worker(&self, worker_name: &str, event: &str);
}

/// Resolves a usable credential from whatever sources are configured.
///
/// Resolution is a pure read and never fails: when no source yields a token
/// the returned [`Credentials`] simply report unauthenticated.
pub trait CredentialSource: Send + Sync {
    /// Resolves the current credentials.
    fn resolve(&self) -> Credentials;
}
