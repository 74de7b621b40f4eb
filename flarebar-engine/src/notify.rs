//! Notifier implementations.

use flarebar_core::{DeploymentStatus, Notifier};
use tracing::info;

/// Notifier that writes to the log instead of the OS notification center.
///
/// The CLI uses this; the menu-bar shell swaps in a real OS notifier behind
/// the same trait.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_deployment(
        &self,
        project_name: &str,
        status: DeploymentStatus,
        environment: Option<&str>,
    ) {
        info!(
            project = project_name,
            status = %status,
            environment = environment.unwrap_or("unknown"),
            "Deployment finished"
        );
    }

    fn notify_worker(&self, worker_name: &str, event: &str) {
        info!(worker = worker_name, event, "Worker event");
    }
}
