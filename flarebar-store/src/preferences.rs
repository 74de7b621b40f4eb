//! Non-secret preference storage.
//!
//! A flat string-to-string map persisted as one JSON file. Writes are
//! best-effort: a failed save is logged and the in-memory value stays
//! current, so a read-after-write on the same task always observes the
//! mutation.

use flarebar_core::PreferenceStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tracing::warn;

use crate::persistence::{default_preferences_path, load_json, save_json};

/// Well-known preference keys.
pub mod keys {
    /// Id of the active credential profile.
    pub const ACTIVE_PROFILE: &str = "active_profile";
    /// Id of the selected Cloudflare account.
    pub const SELECTED_ACCOUNT: &str = "selected_account";
    /// Whether response diagnostics logging is enabled ("true"/"false").
    pub const DIAGNOSTICS_ENABLED: &str = "diagnostics_enabled";
}

// ============================================================================
// JSON-backed Store
// ============================================================================

/// Preference store persisted to a JSON file.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    values: RwLock<HashMap<String, String>>,
    path: PathBuf,
}

impl JsonPreferenceStore {
    /// Loads the store from `path`, starting empty when the file is missing
    /// or unreadable.
    pub fn load(path: PathBuf) -> Self {
        let values = match load_json::<HashMap<String, String>>(&path) {
            Ok(values) => values,
            Err(e) => {
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "Failed to load preferences, starting empty");
                }
                HashMap::new()
            }
        };

        Self {
            values: RwLock::new(values),
            path,
        }
    }

    /// Loads the store from the default preferences path.
    pub fn load_default() -> Self {
        Self::load(default_preferences_path())
    }

    fn persist(&self, values: &HashMap<String, String>) {
        if let Err(e) = save_json(&self.path, values) {
            warn!(path = %self.path.display(), error = %e, "Failed to save preferences");
        }
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut values) = self.values.write() else {
            return;
        };
        values.insert(key.to_string(), value.to_string());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let Ok(mut values) = self.values.write() else {
            return;
        };
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// In-memory preference store for tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_store_roundtrip_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = JsonPreferenceStore::load(path.clone());
        store.set(keys::SELECTED_ACCOUNT, "acc-1");
        store.set(keys::DIAGNOSTICS_ENABLED, "true");

        // A fresh load sees the persisted values.
        let reloaded = JsonPreferenceStore::load(path);
        assert_eq!(
            reloaded.get(keys::SELECTED_ACCOUNT).as_deref(),
            Some("acc-1")
        );
        assert_eq!(
            reloaded.get(keys::DIAGNOSTICS_ENABLED).as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_json_store_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPreferenceStore::load(dir.path().join("prefs.json"));

        store.set(keys::ACTIVE_PROFILE, "p-1");
        store.remove(keys::ACTIVE_PROFILE);
        assert!(store.get(keys::ACTIVE_PROFILE).is_none());
    }

    #[test]
    fn test_json_store_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = JsonPreferenceStore::load(path);
        assert!(store.get(keys::SELECTED_ACCOUNT).is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1");
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a");
        assert!(store.get("a").is_none());
    }
}
