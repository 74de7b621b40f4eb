//! Recent-activity feed entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pages::DeploymentStatus;
use crate::dates::flexible_date_opt;

/// What kind of resource an activity item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A Worker script.
    Worker,
    /// A Pages project.
    Pages,
}

/// One entry in the recent-activity feed.
///
/// Workers contribute `worker-<id>` items, Pages projects `pages-<id>` items
/// carrying their latest deployment's status, branch, and URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Stable key: `worker-<id>` or `pages-<id>`.
    pub id: String,
    /// Resource kind.
    pub kind: ActivityKind,
    /// Display name.
    pub name: String,
    /// Best-available timestamp; items without one sort last.
    #[serde(default, with = "flexible_date_opt")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Latest deployment status (Pages only).
    #[serde(default)]
    pub status: Option<DeploymentStatus>,
    /// Source branch of the latest deployment (Pages only).
    #[serde(default)]
    pub branch: Option<String>,
    /// Deployment or preview URL (Pages only).
    #[serde(default)]
    pub url: Option<String>,
}
