//! Application state and its observable container.

use chrono::{DateTime, Utc};
use flarebar_core::{
    Account, ActivityItem, D1Database, KvNamespace, PagesProject, Profile, Queue, R2Bucket,
    UsageMetrics, WorkerScript,
};
use tokio::sync::watch;

// ============================================================================
// Tabs & Resource Kinds
// ============================================================================

/// The resource types a refresh can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Worker scripts.
    Workers,
    /// Pages projects.
    Pages,
    /// KV namespaces.
    Kv,
    /// R2 buckets.
    R2,
    /// D1 databases.
    D1,
    /// Queues.
    Queues,
    /// Aggregated usage metrics.
    Usage,
}

impl ResourceKind {
    /// Every resource kind, in fill order.
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Workers,
        ResourceKind::Pages,
        ResourceKind::Kv,
        ResourceKind::R2,
        ResourceKind::D1,
        ResourceKind::Queues,
        ResourceKind::Usage,
    ];
}

/// The UI tab driving which resources a refresh loads eagerly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    /// Overview: workers, pages, and usage.
    #[default]
    Overview,
    /// Workers only.
    Workers,
    /// Pages only.
    Pages,
    /// Storage: KV, R2, D1, and Queues.
    Storage,
}

impl Tab {
    /// The resources this tab needs before it can render.
    pub fn resources(&self) -> &'static [ResourceKind] {
        match self {
            Tab::Overview => &[ResourceKind::Workers, ResourceKind::Pages, ResourceKind::Usage],
            Tab::Workers => &[ResourceKind::Workers],
            Tab::Pages => &[ResourceKind::Pages],
            Tab::Storage => &[
                ResourceKind::Kv,
                ResourceKind::R2,
                ResourceKind::D1,
                ResourceKind::Queues,
            ],
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "workers" => Ok(Tab::Workers),
            "pages" => Ok(Tab::Pages),
            "storage" => Ok(Tab::Storage),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

// ============================================================================
// App State
// ============================================================================

/// The canonical application state, owned by the orchestrator.
///
/// Presentation layers receive clones of this via [`StateContainer`] and
/// never mutate it. Resource collections are replaced wholesale on
/// successful fetches and left untouched (stale) on failure; they are only
/// cleared on explicit profile or account changes.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Whether credential resolution produced a token.
    pub is_authenticated: bool,
    /// Whether a refresh is in flight.
    pub is_loading: bool,
    /// Human-readable error from the last refresh-fatal failure.
    pub error: Option<String>,
    /// When the last refresh completed successfully.
    pub last_refresh: Option<DateTime<Utc>>,
    /// Accounts visible to the token.
    pub accounts: Vec<Account>,
    /// The account all resource queries target.
    pub selected_account_id: Option<String>,
    /// Worker scripts.
    pub workers: Vec<WorkerScript>,
    /// Pages projects.
    pub pages_projects: Vec<PagesProject>,
    /// KV namespaces.
    pub kv_namespaces: Vec<KvNamespace>,
    /// R2 buckets.
    pub r2_buckets: Vec<R2Bucket>,
    /// D1 databases.
    pub d1_databases: Vec<D1Database>,
    /// Queues.
    pub queues: Vec<Queue>,
    /// Aggregated usage metrics, when fetched.
    pub usage: Option<UsageMetrics>,
    /// Usage-specific error shown only in the usage widget.
    pub usage_error: Option<String>,
    /// Derived recent-activity feed.
    pub recent_activity: Vec<ActivityItem>,
    /// The active credential profile, when one is set.
    pub active_profile: Option<Profile>,
    /// The tab the UI currently shows.
    pub active_tab: Tab,
}

impl AppState {
    /// The selected account record, when the id resolves.
    pub fn selected_account(&self) -> Option<&Account> {
        let id = self.selected_account_id.as_deref()?;
        self.accounts.iter().find(|a| a.id == id)
    }

    /// Clears every per-account resource collection and derived data.
    pub(crate) fn clear_resources(&mut self) {
        self.workers.clear();
        self.pages_projects.clear();
        self.kv_namespaces.clear();
        self.r2_buckets.clear();
        self.d1_databases.clear();
        self.queues.clear();
        self.usage = None;
        self.usage_error = None;
        self.recent_activity.clear();
    }
}

// ============================================================================
// State Container
// ============================================================================

/// Observable holder of [`AppState`] snapshots.
///
/// A thin wrapper over a tokio watch channel: the orchestrator mutates
/// through [`StateContainer::update`], consumers either poll
/// [`StateContainer::snapshot`] or await changes on a
/// [`StateContainer::subscribe`] receiver.
#[derive(Debug)]
pub struct StateContainer {
    tx: watch::Sender<AppState>,
}

impl StateContainer {
    /// Creates a container holding the default state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AppState::default());
        Self { tx }
    }

    /// A clone of the current state.
    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    /// Mutates the state in place and notifies subscribers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut AppState),
    {
        self.tx.send_modify(f);
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }
}

impl Default for StateContainer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_resources() {
        assert_eq!(Tab::Workers.resources(), &[ResourceKind::Workers]);
        assert_eq!(Tab::Overview.resources().len(), 3);
        assert_eq!(Tab::Storage.resources().len(), 4);
    }

    #[test]
    fn test_tab_from_str() {
        assert_eq!("overview".parse::<Tab>().unwrap(), Tab::Overview);
        assert_eq!("Storage".parse::<Tab>().unwrap(), Tab::Storage);
        assert!("usage".parse::<Tab>().is_err());
    }

    #[test]
    fn test_selected_account_lookup() {
        let mut state = AppState::default();
        state.accounts = vec![
            Account {
                id: "a".to_string(),
                name: "A".to_string(),
                account_type: None,
                settings: None,
                created_on: None,
            },
            Account {
                id: "b".to_string(),
                name: "B".to_string(),
                account_type: None,
                settings: None,
                created_on: None,
            },
        ];

        assert!(state.selected_account().is_none());
        state.selected_account_id = Some("b".to_string());
        assert_eq!(state.selected_account().unwrap().name, "B");
        state.selected_account_id = Some("gone".to_string());
        assert!(state.selected_account().is_none());
    }

    #[tokio::test]
    async fn test_container_update_and_subscribe() {
        let container = StateContainer::new();
        let mut rx = container.subscribe();

        container.update(|s| s.is_loading = true);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_loading);
        assert!(container.snapshot().is_loading);
    }
}
