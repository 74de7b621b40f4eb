//! The refresh orchestrator.
//!
//! Single owner of [`AppState`]: every mutation funnels through its commit
//! path, and every commit is gated on a cancel guard so a superseded refresh
//! can never write after its successor starts. Per-resource fetches within a
//! refresh fan out in parallel and are joined before committing; everything
//! except the accounts fetch degrades to keep-previous-value on failure.

use chrono::Utc;
use flarebar_api::{ApiError, CloudflareApi};
use flarebar_core::{CredentialSource, Notifier, PagesProject, PreferenceStore};
use flarebar_store::{ProfileStore, keys};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::activity::derive_recent_activity;
use crate::state::{AppState, ResourceKind, StateContainer, Tab};
use crate::transitions::DeploymentTracker;

/// Auto-refresh cadence while the popover is shown.
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

// ============================================================================
// Cancel Guard
// ============================================================================

/// Cooperative cancellation flag shared between a refresh task and the
/// orchestrator that may supersede it.
#[derive(Debug, Clone, Default)]
struct CancelGuard(Arc<AtomicBool>);

impl CancelGuard {
    fn new() -> Self {
        Self::default()
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Resource Updates
// ============================================================================

/// The outcome of one tolerant resource fetch, applied at commit time.
enum ResourceUpdate {
    Workers(Vec<flarebar_core::WorkerScript>),
    Pages(Vec<PagesProject>),
    Kv(Vec<flarebar_core::KvNamespace>),
    R2(Vec<flarebar_core::R2Bucket>),
    D1(Vec<flarebar_core::D1Database>),
    Queues(Vec<flarebar_core::Queue>),
    Usage(flarebar_core::UsageMetrics),
    UsageError(String),
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Coordinates refreshes and owns the canonical [`AppState`].
///
/// Cheap to clone; clones share the same state and cancellation bookkeeping.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn CloudflareApi>,
    credentials: Arc<dyn CredentialSource>,
    profiles: ProfileStore,
    prefs: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    container: StateContainer,
    transitions: Mutex<DeploymentTracker>,
    current_refresh: Mutex<Option<CancelGuard>>,
}

impl Orchestrator {
    /// Creates an orchestrator over explicitly injected collaborators.
    pub fn new(
        api: Arc<dyn CloudflareApi>,
        credentials: Arc<dyn CredentialSource>,
        profiles: ProfileStore,
        prefs: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                credentials,
                profiles,
                prefs,
                notifier,
                container: StateContainer::new(),
                transitions: Mutex::new(DeploymentTracker::new()),
                current_refresh: Mutex::new(None),
            }),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.inner.container.snapshot()
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AppState> {
        self.inner.container.subscribe()
    }

    /// Resolves credentials, updates the authentication flag and active
    /// profile, and refreshes when authenticated.
    pub async fn check_authentication(&self, tab: Tab) {
        let guard = self.begin_refresh();
        self.inner.run_check_authentication(tab, guard).await;
    }

    /// Runs a refresh for the given tab, superseding any refresh in flight.
    pub async fn refresh(&self, tab: Tab) {
        let guard = self.begin_refresh();
        self.inner.run_refresh(tab, guard).await;
    }

    /// Spawns a refresh as a background task.
    pub fn refresh_detached(&self, tab: Tab) -> JoinHandle<()> {
        let guard = self.begin_refresh();
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.run_refresh(tab, guard).await })
    }

    /// Persists the account selection, clears account-scoped derived data,
    /// and refreshes under the new account.
    pub async fn select_account(&self, account_id: &str, tab: Tab) {
        info!(account = account_id, "Selecting account");
        self.inner.prefs.set(keys::SELECTED_ACCOUNT, account_id);

        let guard = self.begin_refresh();
        let committed = self.inner.commit(&guard, |state| {
            state.selected_account_id = Some(account_id.to_string());
            state.usage = None;
            state.usage_error = None;
            state.recent_activity.clear();
        });
        if committed {
            self.inner.run_refresh(tab, guard).await;
        }
    }

    /// Full re-bootstrap after the active profile changed: clears every
    /// resource collection and error, then re-checks authentication.
    pub async fn on_profile_changed(&self, tab: Tab) {
        info!("Profile changed, re-bootstrapping");
        let guard = self.begin_refresh();

        if let Ok(mut tracker) = self.inner.transitions.lock() {
            tracker.clear();
        }

        let committed = self.inner.commit(&guard, |state| {
            state.clear_resources();
            state.accounts.clear();
            state.error = None;
            state.last_refresh = None;
        });
        if committed {
            self.inner.run_check_authentication(tab, guard).await;
        }
    }

    /// Cancels any refresh in flight without starting a new one.
    pub fn cancel_refresh(&self) {
        if let Ok(mut current) = self.inner.current_refresh.lock() {
            if let Some(guard) = current.take() {
                debug!("Cancelling in-flight refresh");
                guard.cancel();
            }
        }
    }

    /// Starts the periodic auto-refresh task. Call when the popover is
    /// shown; drop (or [`AutoRefreshHandle::stop`]) when it hides.
    pub fn start_auto_refresh(&self, interval: Duration) -> AutoRefreshHandle {
        info!(secs = interval.as_secs(), "Starting auto-refresh");
        let orchestrator = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The consumer refreshes on show; skip the interval's immediate
            // first tick.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let tab = orchestrator.state().active_tab;
                orchestrator.refresh(tab).await;
            }
        });

        AutoRefreshHandle { handle }
    }

    /// Registers a fresh cancel guard, cancelling whichever refresh held the
    /// slot before. Last request wins; there is no queueing.
    fn begin_refresh(&self) -> CancelGuard {
        let guard = CancelGuard::new();
        if let Ok(mut current) = self.inner.current_refresh.lock() {
            if let Some(previous) = current.replace(guard.clone()) {
                previous.cancel();
            }
        }
        guard
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator").finish_non_exhaustive()
    }
}

// ============================================================================
// Refresh Internals
// ============================================================================

impl Inner {
    /// Applies a mutation unless the guard was cancelled. Returns whether
    /// the commit happened.
    fn commit<F>(&self, guard: &CancelGuard, f: F) -> bool
    where
        F: FnOnce(&mut AppState),
    {
        if guard.is_cancelled() {
            debug!("Refresh superseded, skipping commit");
            return false;
        }
        self.container.update(f);
        true
    }

    async fn run_check_authentication(&self, tab: Tab, guard: CancelGuard) {
        let credentials = self.credentials.resolve();
        let active_profile = self.profiles.active_profile();
        let authenticated = credentials.is_authenticated();
        debug!(authenticated, "Checked authentication");

        let committed = self.commit(&guard, |state| {
            state.is_authenticated = authenticated;
            state.active_profile = active_profile;
            if !authenticated {
                state.is_loading = false;
            }
        });

        if committed && authenticated {
            self.run_refresh(tab, guard).await;
        }
    }

    async fn run_refresh(&self, tab: Tab, guard: CancelGuard) {
        if !self.container.snapshot().is_authenticated {
            debug!("Not authenticated, skipping refresh");
            return;
        }

        if !self.commit(&guard, |state| {
            state.is_loading = true;
            state.error = None;
            state.active_tab = tab;
        }) {
            return;
        }

        match self.refresh_account_scope(tab, &guard).await {
            Ok(()) => {
                self.commit(&guard, |state| {
                    state.last_refresh = Some(Utc::now());
                    state.is_loading = false;
                });
            }
            Err(error) => {
                warn!(error = %error, "Refresh failed");
                // Previously loaded collections stay untouched; only the
                // error surfaces.
                self.commit(&guard, |state| {
                    state.error = Some(error.user_message());
                    state.is_loading = false;
                });
            }
        }
    }

    /// The fatal path (accounts + selection), then the two tolerant fan-out
    /// phases.
    async fn refresh_account_scope(
        &self,
        tab: Tab,
        guard: &CancelGuard,
    ) -> Result<(), ApiError> {
        let accounts = self.api.list_accounts().await?;
        if accounts.is_empty() {
            return Err(ApiError::Api("No accounts found".to_string()));
        }

        let account_id = self.resolve_selection(&accounts)?;
        if !self.commit(guard, |state| {
            state.accounts = accounts;
            state.selected_account_id = Some(account_id.clone());
        }) {
            return Ok(());
        }

        // Eagerly load what the active tab needs so it renders as soon as
        // this join completes.
        self.load_resources(tab.resources(), &account_id, guard).await;
        if guard.is_cancelled() {
            return Ok(());
        }

        // Then fill every resource type the tab didn't cover.
        let loaded: HashSet<ResourceKind> = tab.resources().iter().copied().collect();
        let remaining: Vec<ResourceKind> = ResourceKind::ALL
            .iter()
            .copied()
            .filter(|kind| !loaded.contains(kind))
            .collect();
        self.load_resources(&remaining, &account_id, guard).await;

        Ok(())
    }

    /// Stored selection when it still exists, else the first account.
    fn resolve_selection(
        &self,
        accounts: &[flarebar_core::Account],
    ) -> Result<String, ApiError> {
        let stored = self.prefs.get(keys::SELECTED_ACCOUNT);
        let id = stored
            .filter(|id| accounts.iter().any(|a| &a.id == id))
            .or_else(|| accounts.first().map(|a| a.id.clone()))
            .ok_or_else(|| ApiError::Api("No account selected".to_string()))?;

        self.prefs.set(keys::SELECTED_ACCOUNT, &id);
        Ok(id)
    }

    /// Fans out tolerant fetches for `kinds`, joins them, and commits the
    /// successful ones in a single state update.
    async fn load_resources(
        &self,
        kinds: &[ResourceKind],
        account_id: &str,
        guard: &CancelGuard,
    ) {
        if kinds.is_empty() {
            return;
        }

        let fetches = kinds
            .iter()
            .map(|kind| self.fetch_resource(*kind, account_id));
        let updates: Vec<ResourceUpdate> =
            join_all(fetches).await.into_iter().flatten().collect();

        let pages_for_transitions: Option<Vec<PagesProject>> =
            updates.iter().find_map(|update| match update {
                ResourceUpdate::Pages(projects) => Some(projects.clone()),
                _ => None,
            });
        let recompute_activity = updates
            .iter()
            .any(|u| matches!(u, ResourceUpdate::Workers(_) | ResourceUpdate::Pages(_)));

        let committed = self.commit(guard, |state| {
            for update in updates {
                apply_update(state, update);
            }
            if recompute_activity {
                state.recent_activity =
                    derive_recent_activity(&state.workers, &state.pages_projects);
            }
        });

        if committed {
            if let Some(projects) = pages_for_transitions {
                self.notify_transitions(&projects);
            }
        }
    }

    /// Fetches one resource kind, degrading failures to `None` so the
    /// previous in-state value survives.
    async fn fetch_resource(
        &self,
        kind: ResourceKind,
        account_id: &str,
    ) -> Option<ResourceUpdate> {
        match kind {
            ResourceKind::Workers => match self.api.list_workers(account_id).await {
                Ok(workers) => Some(ResourceUpdate::Workers(workers)),
                Err(error) => keep_previous("workers", &error),
            },
            ResourceKind::Pages => match self.api.list_pages_projects(account_id).await {
                Ok(projects) => Some(ResourceUpdate::Pages(projects)),
                Err(error) => keep_previous("pages", &error),
            },
            ResourceKind::Kv => match self.api.list_kv_namespaces(account_id).await {
                Ok(namespaces) => Some(ResourceUpdate::Kv(namespaces)),
                Err(error) => keep_previous("kv", &error),
            },
            ResourceKind::R2 => match self.api.list_r2_buckets(account_id).await {
                Ok(buckets) => Some(ResourceUpdate::R2(buckets)),
                Err(error) => keep_previous("r2", &error),
            },
            ResourceKind::D1 => match self.api.list_d1_databases(account_id).await {
                Ok(databases) => Some(ResourceUpdate::D1(databases)),
                Err(error) => keep_previous("d1", &error),
            },
            ResourceKind::Queues => match self.api.list_queues(account_id).await {
                Ok(queues) => Some(ResourceUpdate::Queues(queues)),
                Err(error) => keep_previous("queues", &error),
            },
            ResourceKind::Usage => self.fetch_usage_gated(account_id).await,
        }
    }

    /// The staleness gate: fresh cached metrics short-circuit without a
    /// network call. Failures become a usage-specific message and keep the
    /// previous metrics.
    async fn fetch_usage_gated(&self, account_id: &str) -> Option<ResourceUpdate> {
        if let Some(cached) = self.container.snapshot().usage {
            if !cached.is_stale(Utc::now()) {
                debug!("Usage metrics fresh, skipping fetch");
                return None;
            }
        }

        match self.api.fetch_usage(account_id).await {
            Ok(metrics) => Some(ResourceUpdate::Usage(metrics)),
            Err(error) => {
                warn!(error = %error, "Usage fetch failed");
                Some(ResourceUpdate::UsageError(usage_error_message(&error)))
            }
        }
    }

    fn notify_transitions(&self, projects: &[PagesProject]) {
        let transitions = match self.transitions.lock() {
            Ok(mut tracker) => tracker.observe(projects),
            Err(_) => return,
        };

        for transition in transitions {
            self.notifier.notify_deployment(
                &transition.project_name,
                transition.status,
                transition.environment.as_deref(),
            );
        }
    }
}

/// Logs a tolerated per-resource failure and keeps the previous value.
fn keep_previous(resource: &str, error: &ApiError) -> Option<ResourceUpdate> {
    warn!(resource, error = %error, "Resource fetch failed, keeping previous value");
    None
}

fn apply_update(state: &mut AppState, update: ResourceUpdate) {
    match update {
        ResourceUpdate::Workers(workers) => state.workers = workers,
        ResourceUpdate::Pages(projects) => state.pages_projects = projects,
        ResourceUpdate::Kv(namespaces) => state.kv_namespaces = namespaces,
        ResourceUpdate::R2(buckets) => state.r2_buckets = buckets,
        ResourceUpdate::D1(databases) => state.d1_databases = databases,
        ResourceUpdate::Queues(queues) => state.queues = queues,
        ResourceUpdate::Usage(metrics) => {
            state.usage = Some(metrics);
            state.usage_error = None;
        }
        ResourceUpdate::UsageError(message) => state.usage_error = Some(message),
    }
}

/// Maps an API failure to the usage-widget message classes.
fn usage_error_message(error: &ApiError) -> String {
    match error {
        ApiError::NotAuthenticated | ApiError::TokenExpired(_) => {
            "Usage metrics require a valid session".to_string()
        }
        ApiError::Api(message) => {
            let lowered = message.to_lowercase();
            if lowered.contains("permission") || lowered.contains("access denied") {
                "No permission to read analytics for this account".to_string()
            } else {
                format!("Usage metrics unavailable: {message}")
            }
        }
        other => format!("Usage metrics unavailable: {}", other.user_message()),
    }
}

// ============================================================================
// Auto-Refresh Handle
// ============================================================================

/// Handle to the periodic auto-refresh task; aborts the task on drop.
#[derive(Debug)]
pub struct AutoRefreshHandle {
    handle: JoinHandle<()>,
}

impl AutoRefreshHandle {
    /// Stops the auto-refresh task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_guard() {
        let guard = CancelGuard::new();
        assert!(!guard.is_cancelled());

        let clone = guard.clone();
        clone.cancel();
        assert!(guard.is_cancelled());
    }

    #[test]
    fn test_usage_error_classification() {
        assert_eq!(
            usage_error_message(&ApiError::NotAuthenticated),
            "Usage metrics require a valid session"
        );
        assert_eq!(
            usage_error_message(&ApiError::TokenExpired("expired".to_string())),
            "Usage metrics require a valid session"
        );
        assert_eq!(
            usage_error_message(&ApiError::Api(
                "your token lacks the Analytics permission".to_string()
            )),
            "No permission to read analytics for this account"
        );
        assert!(
            usage_error_message(&ApiError::Api("quota exceeded".to_string()))
                .contains("quota exceeded")
        );
        assert!(usage_error_message(&ApiError::InvalidResponse).starts_with("Usage metrics unavailable"));
    }
}
