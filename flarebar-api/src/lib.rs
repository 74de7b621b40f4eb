//! # Flarebar API
//!
//! Typed Cloudflare control-plane client: REST envelope decoding, GraphQL
//! analytics, error classification, and best-effort response diagnostics.
//!
//! The crate exposes two entry points:
//!
//! - [`CloudflareClient`] - the concrete reqwest-backed client
//! - [`CloudflareApi`] - the object-safe read surface the engine consumes,
//!   so orchestration and tests can substitute fakes
//!
//! Credentials are resolved per request through an injected
//! [`flarebar_core::CredentialSource`]; nothing in this crate caches tokens.

pub mod client;
pub mod diagnostics;
pub mod error;
pub mod graphql;
pub mod rest;
pub mod usage;

pub use client::CloudflareClient;
pub use diagnostics::DiagnosticsLog;
pub use error::{ApiError, is_auth_failure_message};
pub use rest::CloudflareApi;
