//! Pages projects, deployments, and deployment status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::flexible_date_opt;

// ============================================================================
// Deployment Status
// ============================================================================

/// Normalized status of a Pages deployment, derived from the latest stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Stage has not started.
    Idle,
    /// Stage is in progress.
    Active,
    /// Stage completed successfully.
    Success,
    /// Stage failed.
    Failure,
    /// Stage was canceled.
    Canceled,
    /// Unrecognized or missing stage status.
    Unknown,
}

impl DeploymentStatus {
    /// Parses a raw stage status string, case-insensitively.
    ///
    /// The dashboard treats `building` and `deploying` as one in-progress
    /// state, so both map to [`DeploymentStatus::Active`]. Anything
    /// unrecognized maps to [`DeploymentStatus::Unknown`].
    pub fn from_stage_status(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "idle" => Self::Idle,
            "active" | "building" | "deploying" => Self::Active,
            "success" => Self::Success,
            "failure" => Self::Failure,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::Unknown,
        }
    }

    /// Returns true for the terminal statuses that warrant a notification.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Canceled => "Canceled",
            Self::Unknown => "Unknown",
        };
        write!(f, "{label}")
    }
}

// ============================================================================
// Pages Project & Deployment
// ============================================================================

/// A Pages project, including its latest deployment when the listing carries
/// one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesProject {
    /// Project id.
    #[serde(default)]
    pub id: String,
    /// Project name (the natural key used in API paths).
    pub name: String,
    /// The `<subdomain>.pages.dev` host.
    #[serde(default)]
    pub subdomain: String,
    /// Custom domains attached to the project.
    #[serde(default)]
    pub domains: Vec<String>,
    /// Branch that production deploys track.
    #[serde(default)]
    pub production_branch: Option<String>,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_on: Option<DateTime<Utc>>,
    /// Most recent deployment across environments.
    #[serde(default)]
    pub latest_deployment: Option<PagesDeployment>,
    /// Current production deployment.
    #[serde(default)]
    pub canonical_deployment: Option<PagesDeployment>,
}

impl PagesProject {
    /// Status of the latest deployment, or `Unknown` when there is none.
    pub fn latest_status(&self) -> DeploymentStatus {
        self.latest_deployment
            .as_ref()
            .map_or(DeploymentStatus::Unknown, PagesDeployment::status)
    }

    /// Best-available timestamp for activity ordering.
    pub fn best_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest_deployment
            .as_ref()
            .and_then(PagesDeployment::best_timestamp)
            .or(self.created_on)
    }
}

/// A single Pages deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesDeployment {
    /// Deployment id.
    pub id: String,
    /// Short id shown in the dashboard.
    #[serde(default)]
    pub short_id: Option<String>,
    /// Environment: "production" or "preview".
    #[serde(default)]
    pub environment: Option<String>,
    /// Deployment URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub modified_on: Option<DateTime<Utc>>,
    /// The stage the deployment is currently in.
    #[serde(default)]
    pub latest_stage: Option<DeploymentStage>,
    /// What triggered the deployment.
    #[serde(default)]
    pub deployment_trigger: Option<DeploymentTrigger>,
    /// Alias URLs (branch aliases etc.).
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
}

impl PagesDeployment {
    /// Normalized status derived from the latest stage.
    pub fn status(&self) -> DeploymentStatus {
        self.latest_stage
            .as_ref()
            .map_or(DeploymentStatus::Unknown, |stage| {
                DeploymentStatus::from_stage_status(&stage.status)
            })
    }

    /// Branch the deployment was built from, when known.
    pub fn branch(&self) -> Option<&str> {
        self.deployment_trigger
            .as_ref()
            .and_then(|t| t.metadata.as_ref())
            .and_then(|m| m.branch.as_deref())
    }

    /// Best-available timestamp: stage end, else modification, else creation.
    pub fn best_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest_stage
            .as_ref()
            .and_then(|s| s.ended_on)
            .or(self.modified_on)
            .or(self.created_on)
    }
}

/// One stage of a deployment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentStage {
    /// Stage name (e.g., "queued", "build", "deploy").
    #[serde(default)]
    pub name: String,
    /// Raw stage status string.
    #[serde(default)]
    pub status: String,
    /// When the stage started.
    #[serde(default, with = "flexible_date_opt")]
    pub started_on: Option<DateTime<Utc>>,
    /// When the stage ended.
    #[serde(default, with = "flexible_date_opt")]
    pub ended_on: Option<DateTime<Utc>>,
}

/// What triggered a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentTrigger {
    /// Trigger type (e.g., "github:push", "ad_hoc").
    #[serde(rename = "type")]
    pub trigger_type: Option<String>,
    /// Commit metadata for VCS-triggered deployments.
    pub metadata: Option<TriggerMetadata>,
}

/// Commit metadata carried by a deployment trigger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerMetadata {
    /// Source branch.
    pub branch: Option<String>,
    /// Commit hash.
    pub commit_hash: Option<String>,
    /// Commit message.
    pub commit_message: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
