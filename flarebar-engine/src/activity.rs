//! Recent-activity derivation.
//!
//! Recomputed after every successful Workers or Pages fetch: one item per
//! worker and one per Pages project, sorted descending by best-available
//! timestamp with undated items last.

use flarebar_core::{ActivityItem, ActivityKind, PagesDeployment, PagesProject, WorkerScript};
use std::cmp::Ordering;

/// Builds the sorted activity feed from the current resource lists.
pub fn derive_recent_activity(
    workers: &[WorkerScript],
    pages_projects: &[PagesProject],
) -> Vec<ActivityItem> {
    let mut items = Vec::with_capacity(workers.len() + pages_projects.len());

    for worker in workers {
        items.push(ActivityItem {
            id: format!("worker-{}", worker.id),
            kind: ActivityKind::Worker,
            name: worker.id.clone(),
            timestamp: worker.best_timestamp(),
            status: None,
            branch: None,
            url: None,
        });
    }

    for project in pages_projects {
        let key = if project.id.is_empty() {
            &project.name
        } else {
            &project.id
        };
        let deployment = project.latest_deployment.as_ref();
        items.push(ActivityItem {
            id: format!("pages-{key}"),
            kind: ActivityKind::Pages,
            name: project.name.clone(),
            timestamp: project.best_timestamp(),
            status: deployment.map(PagesDeployment::status),
            branch: deployment.and_then(|d| d.branch().map(str::to_owned)),
            url: deployment.and_then(|d| d.url.clone()),
        });
    }

    items.sort_by(compare_items);
    items
}

/// Descending by timestamp, undated last, name as the stable tie-break.
fn compare_items(a: &ActivityItem, b: &ActivityItem) -> Ordering {
    match (&a.timestamp, &b.timestamp) {
        (Some(x), Some(y)) => y.cmp(x).then_with(|| a.name.cmp(&b.name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

// ============================================================================
// Tests
// ============================================================================
