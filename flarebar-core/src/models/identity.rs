//! Identity types: credentials, profiles, and accounts.
//!
//! - [`Credentials`] - the result of credential resolution
//! - [`Profile`] - a named, user-managed API token stored securely
//! - [`Account`] - a Cloudflare account (tenant)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates::flexible_date_opt;

// ============================================================================
// Credentials
// ============================================================================

/// Resolved authentication material.
///
/// Produced by the credential resolver from whichever source won: an active
/// profile, a wrangler config file, or environment variables. Authenticated
/// iff at least one token is present; the OAuth token wins when both are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth token from a wrangler login session.
    pub oauth_token: Option<String>,
    /// API token (profile, config file, or environment).
    pub api_token: Option<String>,
    /// Account id hint, when the source carries one.
    pub account_id: Option<String>,
}

impl Credentials {
    /// Credentials carrying only an API token.
    pub fn from_api_token(token: impl Into<String>) -> Self {
        Self {
            oauth_token: None,
            api_token: Some(token.into()),
            account_id: None,
        }
    }

    /// Unauthenticated credentials (no source yielded a token).
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    /// Returns true when at least one token is present.
    pub fn is_authenticated(&self) -> bool {
        self.oauth_token.is_some() || self.api_token.is_some()
    }

    /// The `Authorization` header value, or `None` when unauthenticated.
    ///
    /// The OAuth token takes precedence over the API token.
    pub fn authorization_header(&self) -> Option<String> {
        self.oauth_token
            .as_deref()
            .or(self.api_token.as_deref())
            .map(|token| format!("Bearer {token}"))
    }
}

// ============================================================================
// Profile
// ============================================================================

/// A named credential profile persisted in the secret store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable unique id (UUID string).
    pub id: String,
    /// User-chosen display name.
    pub name: String,
    /// The Cloudflare API token.
    pub api_token: String,
}

impl Profile {
    /// Creates a new profile with a fresh id.
    pub fn new(name: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            api_token: api_token.into(),
        }
    }
}

// ============================================================================
// Account
// ============================================================================

/// A Cloudflare account (tenant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account id (32-hex tag).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account type (e.g., "standard", "enterprise").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Account-level settings, when the listing includes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AccountSettings>,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_on: Option<chrono::DateTime<chrono::Utc>>,
}

/// Account-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Whether two-factor auth is enforced for members.
    pub enforce_twofactor: Option<bool>,
    /// Legacy flag present on some accounts.
    pub abuse_contact_email: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_without_tokens() {
        let creds = Credentials::unauthenticated();
        assert!(!creds.is_authenticated());
        assert!(creds.authorization_header().is_none());

        let with_account_only = Credentials {
            account_id: Some("abc123".to_string()),
            ..Default::default()
        };
        assert!(!with_account_only.is_authenticated());
    }

    #[test]
    fn test_authorization_header_prefers_oauth() {
        let creds = Credentials {
            oauth_token: Some("oauth-xyz".to_string()),
            api_token: Some("api-abc".to_string()),
            account_id: None,
        };
        assert_eq!(
            creds.authorization_header().as_deref(),
            Some("Bearer oauth-xyz")
        );
    }

    #[test]
    fn test_authorization_header_from_api_token() {
        let creds = Credentials::from_api_token("api-abc");
        assert!(creds.is_authenticated());
        assert_eq!(
            creds.authorization_header().as_deref(),
            Some("Bearer api-abc")
        );
    }

    #[test]
    fn test_profile_ids_are_unique() {
        let a = Profile::new("work", "token-1");
        let b = Profile::new("work", "token-1");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_account_type_field_rename() {
        let json = r#"{"id":"0123","name":"Acme","type":"standard"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_type.as_deref(), Some("standard"));
    }
}
