// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Flarebar Core
//!
//! Core types, models, and traits for the Flarebar application.
//!
//! This crate provides the foundational abstractions used across all other
//! Flarebar crates, including:
//!
//! - Domain models (accounts, resources, deployments, usage metrics)
//! - Credential and profile types
//! - Collaborator trait definitions (secret store, preferences, notifier)
//! - Flexible timestamp parsing for Cloudflare API payloads
//!
//! ## Key Types
//!
//! ### Identity
//! - [`Credentials`] - Resolved authentication material
//! - [`Profile`] - Named, user-managed API token bundle
//! - [`Account`] - A Cloudflare account (tenant)
//!
//! ### Resources
//! - [`WorkerScript`] - A deployed Worker
//! - [`PagesProject`] / [`PagesDeployment`] - Pages projects and deployments
//! - [`KvNamespace`], [`R2Bucket`], [`D1Database`], [`Queue`] - Storage resources
//! - [`DeploymentStatus`] - Normalized deployment stage status
//!
//! ### Usage & Activity
//! - [`UsageMetrics`] - Aggregated account analytics with a staleness gate
//! - [`ActivityItem`] - Entry in the recent-activity feed

pub mod dates;
pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Identity
    Account,
    AccountSettings,
    Credentials,
    Profile,
    // Pages & deployments
    DeploymentStage,
    DeploymentStatus,
    DeploymentTrigger,
    PagesDeployment,
    PagesProject,
    TriggerMetadata,
    // Other resources
    D1Database,
    KvNamespace,
    Queue,
    QueueConsumer,
    QueueProducer,
    R2Bucket,
    WorkerScript,
    // Usage & activity
    ActivityItem,
    ActivityKind,
    UsageMetrics,
};

// Re-export traits
pub use traits::{CredentialSource, Notifier, PreferenceStore, SecretStore};
