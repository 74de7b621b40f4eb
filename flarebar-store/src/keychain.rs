//! Secure storage using the system keychain.
//!
//! Backends:
//! - macOS: Keychain Services
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KDE Wallet)
//!
//! [`KeychainSecretStore`] implements the [`SecretStore`] seam; profile
//! payloads are UTF-8 JSON stored as the entry password. The in-memory
//! [`MemorySecretStore`] backs tests.

use flarebar_core::{CoreError, SecretStore};
use keyring::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Keychain service name for Flarebar entries.
const SERVICE_NAME: &str = "Flarebar";

// ============================================================================
// Keychain Store
// ============================================================================

/// OS-keychain-backed secret store.
#[derive(Debug, Clone, Default)]
pub struct KeychainSecretStore {
    service: String,
}

impl KeychainSecretStore {
    /// Creates a store under the default service name.
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Creates a store under a custom service name (used by tests that talk
    /// to a real keychain without clobbering user entries).
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, CoreError> {
        Entry::new(&self.service, key)
            .map_err(|e| CoreError::Storage(format!("Failed to create keychain entry: {e}")))
    }
}

impl SecretStore for KeychainSecretStore {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        let text = std::str::from_utf8(value)
            .map_err(|e| CoreError::Storage(format!("Secret payload is not UTF-8: {e}")))?;

        self.entry(key)?
            .set_password(text)
            .map_err(|e| CoreError::Storage(format!("Failed to store secret: {e}")))?;

        debug!(key, "Secret stored in keychain");
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.entry(key).ok()?;
        match entry.get_password() {
            Ok(text) => Some(text.into_bytes()),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                debug!(key, error = %e, "Keychain read failed");
                None
            }
        }
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => {
                debug!(key, "Secret deleted from keychain");
                Ok(())
            }
            // Already deleted, that's fine
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CoreError::Storage(format!("Failed to delete secret: {e}"))),
        }
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory secret store for tests.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn save(&self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("poisoned lock".to_string()))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn delete(&self, key: &str) -> Result<(), CoreError> {
        self.entries
            .lock()
            .map_err(|_| CoreError::Storage("poisoned lock".to_string()))?
            .remove(key);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
