//! Credential profile storage.
//!
//! Profiles live as one JSON-serialized list under a single secret-store key
//! and are rewritten wholesale on every mutation. The active-profile pointer
//! is not secret and lives in the preference store.

use flarebar_core::{PreferenceStore, Profile, SecretStore};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::preferences::keys;

/// Secret-store key holding the serialized profile list.
const PROFILES_KEY: &str = "profiles";

/// Store for named credential profiles.
///
/// Callers serialize their own mutations (single active consumer); the store
/// itself adds no locking beyond what its backends provide. A `list()` after
/// a mutating call on the same task always observes the mutation.
#[derive(Clone)]
pub struct ProfileStore {
    secrets: Arc<dyn SecretStore>,
    prefs: Arc<dyn PreferenceStore>,
}

impl ProfileStore {
    /// Creates a store over the given backends.
    pub fn new(secrets: Arc<dyn SecretStore>, prefs: Arc<dyn PreferenceStore>) -> Self {
        Self { secrets, prefs }
    }

    /// Returns all profiles. A missing or undecodable payload yields an
    /// empty list, never an error.
    pub fn list(&self) -> Vec<Profile> {
        let Some(bytes) = self.secrets.load(PROFILES_KEY) else {
            return Vec::new();
        };

        match serde_json::from_slice(&bytes) {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "Stored profile list is undecodable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Returns one profile by id.
    pub fn get(&self, id: &str) -> Option<Profile> {
        self.list().into_iter().find(|p| p.id == id)
    }

    /// Adds a profile.
    ///
    /// # Errors
    ///
    /// Returns error when the secret store rejects the write.
    pub fn add(&self, profile: Profile) -> Result<(), StoreError> {
        let mut profiles = self.list();
        debug!(id = %profile.id, name = %profile.name, "Adding profile");
        profiles.push(profile);
        self.persist(&profiles)
    }

    /// Replaces the profile with the same id; a no-op when the id is absent.
    ///
    /// # Errors
    ///
    /// Returns error when the secret store rejects the write.
    pub fn update(&self, profile: Profile) -> Result<(), StoreError> {
        let mut profiles = self.list();
        let Some(slot) = profiles.iter_mut().find(|p| p.id == profile.id) else {
            debug!(id = %profile.id, "Update target not found, ignoring");
            return Ok(());
        };
        *slot = profile;
        self.persist(&profiles)
    }

    /// Deletes the profile with the given id, clearing the active pointer if
    /// it pointed at the deleted profile.
    ///
    /// # Errors
    ///
    /// Returns error when the secret store rejects the write.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut profiles = self.list();
        profiles.retain(|p| p.id != id);
        self.persist(&profiles)?;

        if self.active_id().as_deref() == Some(id) {
            debug!(id, "Deleted profile was active, clearing pointer");
            self.set_active_id(None);
        }
        Ok(())
    }

    /// Id of the active profile, if any.
    pub fn active_id(&self) -> Option<String> {
        self.prefs.get(keys::ACTIVE_PROFILE)
    }

    /// Sets or clears the active profile pointer.
    pub fn set_active_id(&self, id: Option<&str>) {
        match id {
            Some(id) => self.prefs.set(keys::ACTIVE_PROFILE, id),
            None => self.prefs.remove(keys::ACTIVE_PROFILE),
        }
    }

    /// The active profile record, when the pointer resolves to a stored
    /// profile.
    pub fn active_profile(&self) -> Option<Profile> {
        let id = self.active_id()?;
        self.get(&id)
    }

    fn persist(&self, profiles: &[Profile]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(profiles)?;
        self.secrets.save(PROFILES_KEY, &bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for ProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileStore").finish_non_exhaustive()
    }
}
