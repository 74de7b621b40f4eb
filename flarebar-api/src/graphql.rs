//! GraphQL envelope types.
//!
//! The analytics endpoint answers `{data, errors}` instead of the REST
//! envelope. Error messages run through the same auth classification as REST
//! (see [`crate::error::ApiError::from_envelope_message`]); the request
//! plumbing lives in [`crate::client::CloudflareClient::post_graphql`].

use serde::Deserialize;

/// The `{data, errors}` wrapper on every GraphQL response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlEnvelope<T> {
    /// Query payload; absent on failure.
    #[serde(default)]
    pub data: Option<T>,
    /// Error records; absent or empty on success.
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

/// One entry in a GraphQL `errors` array.
#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_data() {
        let json = r#"{"data": {"value": 42}, "errors": null}"#;

        #[derive(Deserialize)]
        struct Payload {
            value: u32,
        }

        let envelope: GraphQlEnvelope<Payload> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.unwrap().value, 42);
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn test_envelope_with_errors() {
        let json = r#"{"data": null, "errors": [{"message": "unknown field"}]}"#;
        let envelope: GraphQlEnvelope<serde_json::Value> = serde_json::from_str(json).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.errors.unwrap()[0].message, "unknown field");
    }
}
