//! Cross-module persistence tests: profile round-trips through the secret
//! store and the interplay with the active pointer.

use std::sync::Arc;

use flarebar_core::{Profile, SecretStore};

use crate::keychain::MemorySecretStore;
use crate::preferences::{MemoryPreferenceStore, keys};
use crate::profiles::ProfileStore;
use flarebar_core::PreferenceStore;

fn store_with_backends() -> (ProfileStore, Arc<MemorySecretStore>, Arc<MemoryPreferenceStore>) {
    let secrets = Arc::new(MemorySecretStore::new());
    let prefs = Arc::new(MemoryPreferenceStore::new());
    let store = ProfileStore::new(secrets.clone(), prefs.clone());
    (store, secrets, prefs)
}

#[test]
fn test_list_empty_store() {
    let (store, _, _) = store_with_backends();
    assert!(store.list().is_empty());
    assert!(store.active_id().is_none());
}

#[test]
fn test_add_then_list_roundtrip() {
    let (store, _, _) = store_with_backends();

    let a = Profile::new("work", "token-a");
    let b = Profile::new("personal", "token-b");
    store.add(a.clone()).unwrap();
    store.add(b.clone()).unwrap();

    let listed = store.list();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0], a);
    assert_eq!(listed[1], b);
}

#[test]
fn test_update_replaces_by_id() {
    let (store, _, _) = store_with_backends();

    let mut profile = Profile::new("work", "old-token");
    store.add(profile.clone()).unwrap();

    profile.api_token = "new-token".to_string();
    profile.name = "work (rotated)".to_string();
    store.update(profile.clone()).unwrap();

    let listed = store.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].api_token, "new-token");
    assert_eq!(listed[0].name, "work (rotated)");
}

#[test]
fn test_update_unknown_id_is_noop() {
    let (store, _, _) = store_with_backends();
    store.add(Profile::new("work", "token")).unwrap();

    store.update(Profile::new("ghost", "ghost-token")).unwrap();
    let listed = store.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "work");
}

#[test]
fn test_delete_removes_exactly_one() {
    let (store, _, _) = store_with_backends();

    let a = Profile::new("a", "ta");
    let b = Profile::new("b", "tb");
    store.add(a.clone()).unwrap();
    store.add(b.clone()).unwrap();

    store.delete(&a.id).unwrap();
    let listed = store.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, b.id);
}

#[test]
fn test_delete_active_profile_clears_pointer() {
    let (store, _, prefs) = store_with_backends();

    let profile = Profile::new("work", "token");
    let id = profile.id.clone();
    store.add(profile).unwrap();
    store.set_active_id(Some(&id));
    assert_eq!(store.active_id().as_deref(), Some(id.as_str()));

    store.delete(&id).unwrap();
    assert!(store.active_id().is_none());
    assert!(prefs.get(keys::ACTIVE_PROFILE).is_none());
}

#[test]
fn test_delete_inactive_profile_keeps_pointer() {
    let (store, _, _) = store_with_backends();

    let active = Profile::new("active", "ta");
    let other = Profile::new("other", "tb");
    let active_id = active.id.clone();
    store.add(active).unwrap();
    store.add(other.clone()).unwrap();
    store.set_active_id(Some(&active_id));

    store.delete(&other.id).unwrap();
    assert_eq!(store.active_id().as_deref(), Some(active_id.as_str()));
}

#[test]
fn test_corrupt_secret_payload_yields_empty_list() {
    let (store, secrets, _) = store_with_backends();
    secrets.save("profiles", b"{{{ not json").unwrap();
    assert!(store.list().is_empty());

    // And the store recovers on the next write.
    store.add(Profile::new("fresh", "token")).unwrap();
    assert_eq!(store.list().len(), 1);
}

#[test]
fn test_mutation_is_whole_list_overwrite() {
    let (store, secrets, _) = store_with_backends();
    store.add(Profile::new("one", "t1")).unwrap();
    store.add(Profile::new("two", "t2")).unwrap();

    let raw = secrets.load("profiles").unwrap();
    let decoded: Vec<Profile> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(decoded.len(), 2);
}

#[test]
fn test_active_profile_lookup() {
    let (store, _, _) = store_with_backends();
    let profile = Profile::new("work", "token");
    let id = profile.id.clone();
    store.add(profile.clone()).unwrap();

    assert!(store.active_profile().is_none());
    store.set_active_id(Some(&id));
    assert_eq!(store.active_profile(), Some(profile));

    // A dangling pointer resolves to no profile.
    store.set_active_id(Some("missing"));
    assert!(store.active_profile().is_none());
}
