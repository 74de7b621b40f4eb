//! Deployment-status transition tracking.
//!
//! Keeps a process-lifetime map of `deployment id -> status` so a refresh
//! can tell a genuine transition from a first observation. Only transitions
//! into a terminal status (success or failure) produce a notification; the
//! recorded status is updated on every observation regardless.

use flarebar_core::{DeploymentStatus, PagesProject};
use std::collections::HashMap;
use tracing::debug;

/// A deployment transition worth notifying about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTransition {
    /// Owning project name.
    pub project_name: String,
    /// The new terminal status.
    pub status: DeploymentStatus,
    /// Deployment environment, when known.
    pub environment: Option<String>,
}

/// Process-lifetime tracker of observed deployment statuses.
#[derive(Debug, Default)]
pub struct DeploymentTracker {
    previous: HashMap<String, DeploymentStatus>,
}

impl DeploymentTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes the latest deployment of every project, returning the
    /// transitions that warrant a notification.
    ///
    /// A deployment seen for the first time records its status silently. A
    /// repeat observation with an unchanged status records nothing new. Only
    /// `previous != current` with a terminal `current` notifies.
    pub fn observe(&mut self, projects: &[PagesProject]) -> Vec<DeploymentTransition> {
        let mut transitions = Vec::new();

        for project in projects {
            let Some(deployment) = project.latest_deployment.as_ref() else {
                continue;
            };

            let current = deployment.status();
            let previous = self.previous.get(&deployment.id).copied();

            if let Some(previous) = previous {
                if previous != current && current.is_terminal() {
                    debug!(
                        project = %project.name,
                        deployment = %deployment.id,
                        from = %previous,
                        to = %current,
                        "Deployment transition"
                    );
                    transitions.push(DeploymentTransition {
                        project_name: project.name.clone(),
                        status: current,
                        environment: deployment.environment.clone(),
                    });
                }
            }

            self.previous.insert(deployment.id.clone(), current);
        }

        transitions
    }

    /// Forgets everything; used when the identity changes.
    pub fn clear(&mut self) {
        self.previous.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, deployment_id: &str, status: &str) -> PagesProject {
        serde_json::from_value(serde_json::json!({
            "id": name,
            "name": name,
            "latest_deployment": {
                "id": deployment_id,
                "environment": "production",
                "latest_stage": {"name": "deploy", "status": status}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_first_observation_is_silent() {
        let mut tracker = DeploymentTracker::new();
        let transitions = tracker.observe(&[project("site", "dep-1", "success")]);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_active_to_success_notifies_once() {
        let mut tracker = DeploymentTracker::new();
        tracker.observe(&[project("site", "dep-1", "active")]);

        let transitions = tracker.observe(&[project("site", "dep-1", "success")]);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].project_name, "site");
        assert_eq!(transitions[0].status, DeploymentStatus::Success);
        assert_eq!(transitions[0].environment.as_deref(), Some("production"));

        // Unchanged status on the next refresh: nothing.
        let transitions = tracker.observe(&[project("site", "dep-1", "success")]);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_active_to_failure_notifies() {
        let mut tracker = DeploymentTracker::new();
        tracker.observe(&[project("site", "dep-1", "active")]);
        let transitions = tracker.observe(&[project("site", "dep-1", "failure")]);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].status, DeploymentStatus::Failure);
    }

    #[test]
    fn test_transition_to_non_terminal_is_silent() {
        let mut tracker = DeploymentTracker::new();
        tracker.observe(&[project("site", "dep-1", "idle")]);
        let transitions = tracker.observe(&[project("site", "dep-1", "active")]);
        assert!(transitions.is_empty());

        // But the recorded status moved, so the eventual success notifies.
        let transitions = tracker.observe(&[project("site", "dep-1", "success")]);
        assert_eq!(transitions.len(), 1);
    }

    #[test]
    fn test_new_deployment_id_starts_fresh() {
        let mut tracker = DeploymentTracker::new();
        tracker.observe(&[project("site", "dep-1", "active")]);
        // The project rolled to a new deployment that is already successful:
        // first sight of dep-2, no notification.
        let transitions = tracker.observe(&[project("site", "dep-2", "success")]);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_clear_forgets_history() {
        let mut tracker = DeploymentTracker::new();
        tracker.observe(&[project("site", "dep-1", "active")]);
        tracker.clear();
        let transitions = tracker.observe(&[project("site", "dep-1", "success")]);
        assert!(transitions.is_empty());
    }

    #[test]
    fn test_project_without_deployment_is_ignored() {
        let mut tracker = DeploymentTracker::new();
        let bare: PagesProject =
            serde_json::from_value(serde_json::json!({"id": "p", "name": "p"})).unwrap();
        assert!(tracker.observe(&[bare]).is_empty());
    }
}
