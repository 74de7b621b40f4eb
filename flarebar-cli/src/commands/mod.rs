//! Command implementations.

pub mod accounts;
pub mod profile;
pub mod resources;
pub mod status;
pub mod usage;
pub mod watch;

use anyhow::Result;
use std::sync::Arc;

use flarebar_api::{CloudflareClient, DiagnosticsLog};
use flarebar_core::PreferenceStore;
use flarebar_engine::{LogNotifier, Orchestrator};
use flarebar_store::{
    CredentialResolver, JsonPreferenceStore, KeychainSecretStore, ProfileStore, keys,
};

/// Wired-up services shared by every command.
pub struct Services {
    /// The orchestrator owning application state.
    pub orchestrator: Orchestrator,
    /// Profile store for the `profile` command.
    pub profiles: ProfileStore,
}

/// Builds the service graph: keychain-backed profiles, JSON preferences,
/// layered credential resolution, and the API client.
pub fn build_services() -> Result<Services> {
    let secrets = Arc::new(KeychainSecretStore::new());
    let prefs = Arc::new(JsonPreferenceStore::load_default());
    let prefs_dyn: Arc<dyn PreferenceStore> = prefs.clone();

    let profiles = ProfileStore::new(secrets, prefs_dyn.clone());
    let resolver = Arc::new(CredentialResolver::new(profiles.clone()));

    let mut client = CloudflareClient::new(resolver.clone())?;
    if prefs.get(keys::DIAGNOSTICS_ENABLED).as_deref() == Some("true") {
        client = client
            .with_diagnostics(Arc::new(DiagnosticsLog::new(DiagnosticsLog::default_path())));
    }

    let orchestrator = Orchestrator::new(
        Arc::new(client),
        resolver,
        profiles.clone(),
        prefs_dyn,
        Arc::new(LogNotifier),
    );

    Ok(Services {
        orchestrator,
        profiles,
    })
}
