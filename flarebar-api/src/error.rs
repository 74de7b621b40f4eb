//! API error taxonomy and classification.
//!
//! Every failure the client can produce is one of the closed set of
//! [`ApiError`] variants; raw transport and serde errors never leak past
//! this crate untagged. [`ApiError::user_message`] renders the single
//! human-readable string the presentation layer shows.

use thiserror::Error;

/// Case-insensitive substrings that mark an envelope error as an
/// authentication failure rather than a generic API error.
const AUTH_FAILURE_KEYWORDS: &[&str] = &[
    "invalid access token",
    "invalid token",
    "expired",
    "authentication",
    "unauthorized",
    "not authorized",
    "invalid credentials",
    "token is invalid",
];

/// Returns true when an API error message indicates a rejected or expired
/// token.
pub fn is_auth_failure_message(message: &str) -> bool {
    let lowered = message.to_lowercase();
    AUTH_FAILURE_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Error type for Cloudflare API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No credential source yielded a token; nothing was sent.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The API rejected the token as invalid or expired.
    #[error("Token rejected: {0}")]
    TokenExpired(String),

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The envelope reported success but carried no result.
    #[error("Invalid response: success without a result")]
    InvalidResponse,

    /// The API returned an error envelope.
    #[error("API error: {0}")]
    Api(String),

    /// A syntactically valid response failed to decode into the expected
    /// shape.
    #[error("Decoding error: {message}")]
    Decoding {
        /// Underlying decode failure.
        message: String,
        /// UTF-8 preview of the offending body (at most 300 bytes).
        preview: String,
        /// Diagnostics log file the full entry was appended to, if enabled.
        log_path: Option<String>,
    },

    /// A 2xx response declared a non-JSON content type — typically a captive
    /// portal or transparent proxy answering in HTML.
    #[error("Unexpected content type: {}", content_type.as_deref().unwrap_or("none"))]
    UnexpectedContentType {
        /// The declared content type, when present.
        content_type: Option<String>,
        /// UTF-8 preview of the body (at most 200 bytes).
        preview: String,
    },
}

impl ApiError {
    /// Renders the single human-readable string shown at the UI boundary.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => {
                "Not authenticated. Add a profile or log in with wrangler.".to_string()
            }
            Self::TokenExpired(message) => {
                format!("Session expired, please re-authenticate ({message})")
            }
            Self::Network(cause) => format!("Network error: {cause}"),
            Self::InvalidResponse => "Cloudflare returned an empty response".to_string(),
            Self::Api(message) => message.clone(),
            Self::Decoding {
                message,
                preview,
                log_path,
            } => match log_path {
                Some(path) => format!(
                    "Could not decode response: {message} (body starts with {preview:?}; details logged to {path})"
                ),
                None => {
                    format!("Could not decode response: {message} (body starts with {preview:?})")
                }
            },
            Self::UnexpectedContentType {
                content_type,
                preview,
            } => format!(
                "Expected JSON but got {} (body starts with {preview:?}). Are you behind a captive portal?",
                content_type.as_deref().unwrap_or("no content type")
            ),
        }
    }

    /// Classifies a joined envelope error message into `TokenExpired` or
    /// `Api`, defaulting empty messages to "Unknown error".
    pub fn from_envelope_message(message: String) -> Self {
        if is_auth_failure_message(&message) {
            Self::TokenExpired(message)
        } else if message.is_empty() {
            Self::Api("Unknown error".to_string())
        } else {
            Self::Api(message)
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
    fn test_auth_keywords_case_insensitive() {
        assert!(is_auth_failure_message("Invalid access token"));
        assert!(is_auth_failure_message("the token is invalid"));
        assert!(is_auth_failure_message("UNAUTHORIZED request"));
        assert!(is_auth_failure_message("Your session has expired."));
        assert!(!is_auth_failure_message("quota exceeded"));
        assert!(!is_auth_failure_message(""));
    }

    #[test]
    fn test_envelope_message_classification() {
        assert!(matches!(
            ApiError::from_envelope_message("Invalid access token".to_string()),
            ApiError::TokenExpired(_)
        ));
        match ApiError::from_envelope_message("quota exceeded".to_string()) {
            ApiError::Api(message) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected Api, got {other:?}"),
        }
        match ApiError::from_envelope_message(String::new()) {
            ApiError::Api(message) => assert_eq!(message, "Unknown error"),
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn test_user_messages_are_single_line() {
        let errors = [
            ApiError::NotAuthenticated,
            ApiError::TokenExpired("expired".to_string()),
            ApiError::InvalidResponse,
            ApiError::Api("quota exceeded".to_string()),
            ApiError::Decoding {
                message: "missing field `id`".to_string(),
                preview: "{\"succ".to_string(),
                log_path: None,
            },
            ApiError::UnexpectedContentType {
                content_type: Some("text/html".to_string()),
                preview: "<html>".to_string(),
            },
        ];
        for error in errors {
            let message = error.user_message();
            assert!(!message.is_empty());
            assert!(!message.contains('\n'));
        }
    }
}
