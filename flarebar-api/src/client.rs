//! HTTP client core: authorized requests and envelope decoding.

use std::sync::Arc;
use std::time::Duration;

use flarebar_core::CredentialSource;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::diagnostics::DiagnosticsLog;
use crate::error::ApiError;

/// Fixed REST base for the Cloudflare control-plane API.
pub const API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Fixed GraphQL endpoint.
pub const GRAPHQL_URL: &str = "https://api.cloudflare.com/client/v4/graphql";

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Total per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum bytes of body preview attached to content-type errors.
const CONTENT_TYPE_PREVIEW_BYTES: usize = 200;

/// Maximum bytes of body preview attached to decoding errors.
const DECODE_PREVIEW_BYTES: usize = 300;

// ============================================================================
// Envelope Types
// ============================================================================

/// The uniform `{success, errors, messages, result}` wrapper Cloudflare's
/// REST API returns on every response.
#[derive(Debug, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    /// Whether the call succeeded.
    #[serde(default)]
    pub success: bool,
    /// Error records, present on failure.
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    /// Informational messages.
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    /// The payload; absent on failure.
    #[serde(default)]
    pub result: Option<T>,
    /// Pagination info, when the endpoint paginates.
    #[serde(default)]
    pub result_info: Option<serde_json::Value>,
}

/// One entry in an envelope's `errors` array.
#[derive(Debug, serde::Deserialize)]
pub struct ApiMessage {
    /// Cloudflare error code.
    #[serde(default)]
    pub code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Reqwest-backed Cloudflare client.
///
/// Credentials are resolved through the injected [`CredentialSource`] on
/// every request, so token edits take effect without restarting. Cloning is
/// cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct CloudflareClient {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialSource>,
    diagnostics: Option<Arc<DiagnosticsLog>>,
    base_url: String,
    graphql_url: String,
}

impl CloudflareClient {
    /// Creates a client against the production API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` when the TLS backend cannot be
    /// initialized.
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("flarebar/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            credentials,
            diagnostics: None,
            base_url: API_BASE.to_string(),
            graphql_url: GRAPHQL_URL.to_string(),
        })
    }

    /// Attaches a diagnostics log for decode and content-type failures.
    pub fn with_diagnostics(mut self, diagnostics: Arc<DiagnosticsLog>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Overrides both endpoints; used by integration tests against a local
    /// server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        self.graphql_url = format!("{base}/graphql");
        self.base_url = base;
        self
    }

    /// Resolves the authorization header, failing before any I/O when no
    /// source yields a token.
    fn authorization(&self) -> Result<String, ApiError> {
        self.credentials
            .resolve()
            .authorization_header()
            .ok_or(ApiError::NotAuthenticated)
    }

    /// Executes a GET against a REST path and unwraps the envelope.
    pub(crate) async fn get_result<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let auth = self.authorization()?;
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        self.decode_envelope(path, response).await
    }

    /// Posts a GraphQL document and returns the `data` payload.
    pub(crate) async fn post_graphql<V: Serialize, T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: V,
    ) -> Result<T, ApiError> {
        let auth = self.authorization()?;
        debug!(url = %self.graphql_url, "POST graphql");

        let response = self
            .http
            .post(&self.graphql_url)
            .header(AUTHORIZATION, auth)
            .header(ACCEPT, "application/json")
            .json(&serde_json::json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let bytes = self.read_json_body("/graphql", response).await?;

        let envelope: crate::graphql::GraphQlEnvelope<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => return Err(self.decoding_error("/graphql", &bytes, &e)),
        };

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                let joined = errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(", ");
                warn!(error = %joined, "GraphQL query failed");
                return Err(ApiError::from_envelope_message(joined));
            }
        }

        envelope.data.ok_or(ApiError::InvalidResponse)
    }

    /// Checks status and content type, then returns the raw body bytes.
    async fn read_json_body(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<Vec<u8>, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::NotAuthenticated);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let bytes = response.bytes().await?.to_vec();

        // A 2xx answer that is not JSON is a captive portal or proxy, not
        // the API; surface it as its own error class instead of a confusing
        // parse failure.
        if status.is_success() && !declares_json(content_type.as_deref()) {
            let preview = text_preview(&bytes, CONTENT_TYPE_PREVIEW_BYTES);
            if let Some(diagnostics) = &self.diagnostics {
                diagnostics.record(
                    endpoint,
                    Some(status.as_u16()),
                    content_type.as_deref(),
                    "unexpected content type",
                    &bytes,
                );
            }
            return Err(ApiError::UnexpectedContentType {
                content_type,
                preview,
            });
        }

        Ok(bytes)
    }

    /// Decodes a REST envelope, classifying failure envelopes and decode
    /// errors.
    async fn decode_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let bytes = self.read_json_body(endpoint, response).await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(endpoint, status = status.as_u16(), error = %e, "Envelope decode failed");
                return Err(self.decoding_error(endpoint, &bytes, &e));
            }
        };

        if !envelope.success {
            let joined = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            warn!(endpoint, error = %joined, "API reported failure");
            return Err(ApiError::from_envelope_message(joined));
        }

        envelope.result.ok_or(ApiError::InvalidResponse)
    }

    /// Builds a `Decoding` error, appending a diagnostics entry when enabled.
    fn decoding_error(&self, endpoint: &str, bytes: &[u8], cause: &serde_json::Error) -> ApiError {
        let log_path = self.diagnostics.as_ref().and_then(|diagnostics| {
            diagnostics.record(endpoint, None, None, &cause.to_string(), bytes)
        });

        ApiError::Decoding {
            message: cause.to_string(),
            preview: text_preview(bytes, DECODE_PREVIEW_BYTES),
            log_path: log_path.map(|p| p.display().to_string()),
        }
    }
}

impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("base_url", &self.base_url)
            .field("diagnostics", &self.diagnostics.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Whether a content-type header declares JSON.
fn declares_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let ct = ct.to_ascii_lowercase();
        ct.starts_with("application/json") || ct.contains("+json")
    })
}

/// A lossy UTF-8 preview of at most `limit` bytes.
pub(crate) fn text_preview(bytes: &[u8], limit: usize) -> String {
    let slice = if bytes.len() > limit {
        &bytes[..limit]
    } else {
        bytes
    };
    String::from_utf8_lossy(slice).into_owned()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declares_json() {
        assert!(declares_json(Some("application/json")));
        assert!(declares_json(Some("application/json; charset=utf-8")));
        assert!(declares_json(Some("application/problem+json")));
        assert!(!declares_json(Some("text/html")));
        assert!(!declares_json(None));
    }

    #[test]
    fn test_text_preview_truncates() {
        let body = "x".repeat(500);
        let preview = text_preview(body.as_bytes(), 200);
        assert_eq!(preview.len(), 200);
    }

    #[test]
    fn test_text_preview_handles_invalid_utf8() {
        let preview = text_preview(&[0xff, 0xfe, b'o', b'k'], 10);
        assert!(preview.ends_with("ok"));
    }

    #[test]
    fn test_envelope_failure_shape() {
        let json = r#"{
            "success": false,
            "errors": [{"code": 9109, "message": "Invalid access token"}],
            "messages": [],
            "result": null
        }"#;
        let envelope: ApiEnvelope<Vec<String>> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.errors[0].code, 9109);
        assert!(envelope.result.is_none());
    }

    #[test]
    fn test_envelope_success_shape() {
        let json = r#"{"success": true, "errors": [], "messages": [], "result": ["a", "b"]}"#;
        let envelope: ApiEnvelope<Vec<String>> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.result.unwrap().len(), 2);
    }
}
