//! Layered credential resolution.
//!
//! Order, first source with a token wins:
//!
//! 1. The active profile (API token only)
//! 2. The wrangler config file
//! 3. `CLOUDFLARE_API_TOKEN` / `CLOUDFLARE_ACCOUNT_ID` environment variables
//!
//! Resolution is a pure read and never fails; when every source comes up
//! empty the result simply reports unauthenticated.

use flarebar_core::{CredentialSource, Credentials};
use std::env;
use std::path::PathBuf;
use tracing::debug;

use crate::profiles::ProfileStore;
use crate::wrangler;

/// Environment variable for the API token fallback.
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";

/// Environment variable for the account id fallback.
pub const ENV_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";

/// Resolves credentials from profiles, wrangler config, and environment.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    profiles: ProfileStore,
    config_paths: Vec<PathBuf>,
}

impl CredentialResolver {
    /// Creates a resolver over the given profile store and the default
    /// wrangler config candidates.
    pub fn new(profiles: ProfileStore) -> Self {
        Self {
            profiles,
            config_paths: wrangler::candidate_paths(),
        }
    }

    /// Overrides the wrangler config candidates (tests).
    pub fn with_config_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config_paths = paths;
        self
    }

    fn resolve_with(&self, env_lookup: &dyn Fn(&str) -> Option<String>) -> Credentials {
        if let Some(profile) = self.profiles.active_profile() {
            debug!(profile = %profile.name, "Resolved credentials from active profile");
            return Credentials::from_api_token(profile.api_token);
        }

        if let Some(creds) = wrangler::read_config_from(&self.config_paths) {
            return creds;
        }

        let api_token = env_lookup(ENV_API_TOKEN).filter(|t| !t.is_empty());
        let account_id = env_lookup(ENV_ACCOUNT_ID).filter(|a| !a.is_empty());
        if api_token.is_some() {
            debug!("Resolved credentials from environment");
        }

        Credentials {
            oauth_token: None,
            api_token,
            account_id,
        }
    }
}

impl CredentialSource for CredentialResolver {
    fn resolve(&self) -> Credentials {
        self.resolve_with(&|key| env::var(key).ok())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::MemorySecretStore;
    use crate::preferences::MemoryPreferenceStore;
    use flarebar_core::Profile;
    use std::sync::Arc;

    fn profile_store() -> ProfileStore {
        ProfileStore::new(
            Arc::new(MemorySecretStore::new()),
            Arc::new(MemoryPreferenceStore::new()),
        )
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_active_profile_wins_over_config_and_env() {
        let profiles = profile_store();
        let profile = Profile::new("work", "profile-token");
        let id = profile.id.clone();
        profiles.add(profile).unwrap();
        profiles.set_active_id(Some(&id));

        // The config candidate is corrupt; resolution must not care.
        let dir = tempfile::tempdir().unwrap();
        let corrupt = dir.path().join("default.toml");
        std::fs::write(&corrupt, "oauth_token = \"config-token\"").unwrap();

        let resolver =
            CredentialResolver::new(profiles).with_config_paths(vec![corrupt]);

        let creds = resolver.resolve_with(&|_| Some("env-token".to_string()));
        assert_eq!(creds.api_token.as_deref(), Some("profile-token"));
        assert!(creds.oauth_token.is_none());
        assert!(creds.account_id.is_none());
    }

    #[test]
    fn test_config_fallback_when_no_active_profile() {
        let profiles = profile_store();
        // A stored but inactive profile is not consulted.
        profiles.add(Profile::new("idle", "idle-token")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("default.toml");
        std::fs::write(
            &config,
            "oauth_token = \"config-oauth\"\naccount_id = \"acc-1\"",
        )
        .unwrap();

        let resolver = CredentialResolver::new(profiles).with_config_paths(vec![config]);
        let creds = resolver.resolve_with(&no_env);
        assert_eq!(creds.oauth_token.as_deref(), Some("config-oauth"));
        assert_eq!(creds.account_id.as_deref(), Some("acc-1"));
    }

    #[test]
    fn test_env_fallback() {
        let resolver =
            CredentialResolver::new(profile_store()).with_config_paths(Vec::new());

        let creds = resolver.resolve_with(&|key| match key {
            ENV_API_TOKEN => Some("env-token".to_string()),
            ENV_ACCOUNT_ID => Some("env-account".to_string()),
            _ => None,
        });
        assert_eq!(creds.api_token.as_deref(), Some("env-token"));
        assert_eq!(creds.account_id.as_deref(), Some("env-account"));
    }

    #[test]
    fn test_unauthenticated_when_all_sources_empty() {
        let resolver =
            CredentialResolver::new(profile_store()).with_config_paths(Vec::new());
        let creds = resolver.resolve_with(&no_env);
        assert!(!creds.is_authenticated());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let resolver =
            CredentialResolver::new(profile_store()).with_config_paths(Vec::new());
        let creds = resolver.resolve_with(&|_| Some(String::new()));
        assert!(!creds.is_authenticated());
    }

    #[test]
    fn test_dangling_active_pointer_falls_through() {
        let profiles = profile_store();
        profiles.set_active_id(Some("no-such-profile"));

        let resolver = CredentialResolver::new(profiles).with_config_paths(Vec::new());
        let creds = resolver.resolve_with(&no_env);
        assert!(!creds.is_authenticated());
    }
}
