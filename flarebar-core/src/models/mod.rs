//! Domain models for Flarebar.
//!
//! This module contains the core data structures representing Cloudflare
//! accounts, deployed resources, usage analytics, and the credential types
//! the resolution layer produces.
//!
//! ## Submodules
//!
//! - [`identity`] - Credentials, profiles, and accounts
//! - [`pages`] - Pages projects, deployments, and deployment status
//! - [`resources`] - Workers, KV, R2, D1, and Queues
//! - [`usage`] - Aggregated usage metrics with the staleness gate
//! - [`activity`] - Recent-activity feed entries

mod activity;
mod identity;
mod pages;
mod resources;
mod usage;

// Re-export everything at the models level
pub use activity::{ActivityItem, ActivityKind};
pub use identity::{Account, AccountSettings, Credentials, Profile};
pub use pages::{
    DeploymentStage, DeploymentStatus, DeploymentTrigger, PagesDeployment, PagesProject,
    TriggerMetadata,
};
pub use resources::{
    D1Database, KvNamespace, Queue, QueueConsumer, QueueProducer, R2Bucket, WorkerScript,
};
pub use usage::UsageMetrics;
#[cfg(test)]
mod serde_tests;
