//! Output formatting: colored text and JSON reports.

use chrono::{DateTime, Utc};
use flarebar_core::{ActivityItem, DeploymentStatus, PagesProject, UsageMetrics};
use flarebar_engine::AppState;
use serde::Serialize;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// Formats the overview screen.
    pub fn format_status(&self, state: &AppState) -> String {
        let mut lines = Vec::new();

        if !state.is_authenticated {
            lines.push("Not authenticated.".to_string());
            lines.push(self.dim(
                "Add a profile (flarebar profile add), run `wrangler login`, or set CLOUDFLARE_API_TOKEN.",
            ));
            return lines.join("\n");
        }

        match state.selected_account() {
            Some(account) => {
                lines.push(format!(
                    "{} {}",
                    self.bold(&account.name),
                    self.dim(&format!("({})", account.id))
                ));
            }
            None => lines.push(self.bold("No account selected")),
        }

        if let Some(profile) = &state.active_profile {
            lines.push(format!("Profile:  {}", self.cyan(&profile.name)));
        }

        if let Some(error) = &state.error {
            lines.push(self.paint(RED, &format!("Error: {error}")));
        }

        lines.push(format!(
            "Workers:  {}   Pages: {}   KV: {}   R2: {}   D1: {}   Queues: {}",
            state.workers.len(),
            state.pages_projects.len(),
            state.kv_namespaces.len(),
            state.r2_buckets.len(),
            state.d1_databases.len(),
            state.queues.len(),
        ));

        lines.push(String::new());
        lines.push(self.format_usage(state));

        if !state.recent_activity.is_empty() {
            lines.push(String::new());
            lines.push(self.bold("Recent activity"));
            for item in state.recent_activity.iter().take(8) {
                lines.push(self.format_activity_item(item));
            }
        }

        if let Some(last_refresh) = state.last_refresh {
            lines.push(String::new());
            lines.push(self.dim(&format!("Last refresh: {}", format_time(Some(last_refresh)))));
        }

        lines.join("\n")
    }

    /// Formats the workers listing.
    pub fn format_workers(&self, state: &AppState) -> String {
        if state.workers.is_empty() {
            return "No Worker scripts.".to_string();
        }

        let mut lines = vec![self.bold(&format!("Workers ({})", state.workers.len()))];
        for worker in &state.workers {
            lines.push(format!(
                "  {:<32} {}",
                worker.id,
                self.dim(&format_time(worker.best_timestamp()))
            ));
        }
        lines.join("\n")
    }

    /// Formats the Pages listing.
    pub fn format_pages(&self, state: &AppState) -> String {
        if state.pages_projects.is_empty() {
            return "No Pages projects.".to_string();
        }

        let mut lines = vec![self.bold(&format!("Pages ({})", state.pages_projects.len()))];
        for project in &state.pages_projects {
            lines.push(self.format_pages_project(project));
        }
        lines.join("\n")
    }

    fn format_pages_project(&self, project: &PagesProject) -> String {
        let status = project.latest_status();
        let branch = project
            .latest_deployment
            .as_ref()
            .and_then(|d| d.branch())
            .unwrap_or("-");

        format!(
            "  {:<28} {:<10} {:<16} {}",
            project.name,
            self.format_deploy_status(status),
            branch,
            self.dim(&format_time(project.best_timestamp()))
        )
    }

    /// Formats the storage listing.
    pub fn format_storage(&self, state: &AppState) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold(&format!("KV namespaces ({})", state.kv_namespaces.len())));
        for ns in &state.kv_namespaces {
            lines.push(format!("  {:<36} {}", ns.title, self.dim(&ns.id)));
        }

        lines.push(self.bold(&format!("R2 buckets ({})", state.r2_buckets.len())));
        for bucket in &state.r2_buckets {
            lines.push(format!(
                "  {:<36} {}",
                bucket.name,
                self.dim(bucket.location.as_deref().unwrap_or("-"))
            ));
        }

        lines.push(self.bold(&format!("D1 databases ({})", state.d1_databases.len())));
        for db in &state.d1_databases {
            let tables = db
                .num_tables
                .map_or_else(|| "-".to_string(), |n| n.to_string());
            lines.push(format!(
                "  {:<36} {} tables",
                db.name,
                self.dim(&tables)
            ));
        }

        lines.push(self.bold(&format!("Queues ({})", state.queues.len())));
        for queue in &state.queues {
            lines.push(format!(
                "  {:<36} {} producers, {} consumers",
                queue.queue_name,
                queue.producers.len(),
                queue.consumers.len()
            ));
        }

        lines.join("\n")
    }

    /// Formats the usage widget.
    pub fn format_usage(&self, state: &AppState) -> String {
        if let Some(error) = &state.usage_error {
            return self.paint(YELLOW, &format!("Usage: {error}"));
        }

        let Some(usage) = &state.usage else {
            return self.dim("Usage: not loaded");
        };

        let mut lines = vec![self.bold(&format!(
            "Usage today (since {})",
            usage.period_start.format("%Y-%m-%d 00:00 UTC")
        ))];
        lines.push(format!(
            "  Workers requests: {}",
            format_count(usage.workers_requests)
        ));
        lines.push(format!(
            "  KV ops:           {} ({} reads, {} writes, {} deletes, {} lists)",
            format_count(usage.total_kv_operations()),
            format_count(usage.kv_reads),
            format_count(usage.kv_writes),
            format_count(usage.kv_deletes),
            format_count(usage.kv_lists),
        ));
        lines.push(format!(
            "  D1 queries:       {} ({} rows read, {} rows written)",
            format_count(usage.total_d1_queries()),
            format_count(usage.d1_rows_read),
            format_count(usage.d1_rows_written),
        ));
        lines.push(self.dim(&format!(
            "  Updated: {}",
            format_time(Some(usage.last_updated))
        )));
        lines.join("\n")
    }

    fn format_activity_item(&self, item: &ActivityItem) -> String {
        let status = item
            .status
            .map_or_else(String::new, |s| format!(" {}", self.format_deploy_status(s)));
        let branch = item
            .branch
            .as_deref()
            .map_or_else(String::new, |b| format!(" ({b})"));

        format!(
            "  {:<28}{}{} {}",
            item.name,
            status,
            branch,
            self.dim(&format_time(item.timestamp))
        )
    }

    fn format_deploy_status(&self, status: DeploymentStatus) -> String {
        let text = status.to_string();
        match status {
            DeploymentStatus::Success => self.paint(GREEN, &text),
            DeploymentStatus::Failure => self.paint(RED, &text),
            DeploymentStatus::Active => self.paint(YELLOW, &text),
            _ => self.dim(&text),
        }
    }
}

/// `YYYY-MM-DD HH:MM` in UTC, or `-`.
fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |t| t.format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Thousands-separated count.
fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ============================================================================
// JSON Reports
// ============================================================================

/// Account summary for JSON output.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    /// Account id.
    pub id: String,
    /// Account name.
    pub name: String,
}

/// Overview report for `--format json`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Whether credentials resolved.
    pub authenticated: bool,
    /// The selected account.
    pub account: Option<AccountSummary>,
    /// Active profile name (never the token).
    pub profile: Option<String>,
    /// Refresh-fatal error, if any.
    pub error: Option<String>,
    /// Resource counts.
    pub workers: usize,
    /// Pages project count.
    pub pages: usize,
    /// KV namespace count.
    pub kv_namespaces: usize,
    /// R2 bucket count.
    pub r2_buckets: usize,
    /// D1 database count.
    pub d1_databases: usize,
    /// Queue count.
    pub queues: usize,
    /// Usage metrics, when loaded.
    pub usage: Option<UsageMetrics>,
    /// Usage-specific error, if any.
    pub usage_error: Option<String>,
    /// Recent activity feed.
    pub recent_activity: Vec<ActivityItem>,
    /// Last successful refresh.
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Builds the JSON overview report from a state snapshot.
pub fn status_report(state: &AppState) -> StatusReport {
    StatusReport {
        authenticated: state.is_authenticated,
        account: state.selected_account().map(|a| AccountSummary {
            id: a.id.clone(),
            name: a.name.clone(),
        }),
        profile: state.active_profile.as_ref().map(|p| p.name.clone()),
        error: state.error.clone(),
        workers: state.workers.len(),
        pages: state.pages_projects.len(),
        kv_namespaces: state.kv_namespaces.len(),
        r2_buckets: state.r2_buckets.len(),
        d1_databases: state.d1_databases.len(),
        queues: state.queues.len(),
        usage: state.usage.clone(),
        usage_error: state.usage_error.clone(),
        recent_activity: state.recent_activity.clone(),
        last_refresh: state.last_refresh,
    }
}

/// Prints a value as JSON, optionally pretty.
///
/// # Errors
///
/// Returns error when serialization fails.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(None), "-");
        let time = flarebar_core::dates::parse_api_date("2024-05-01T10:03:00Z");
        assert_eq!(format_time(time), "2024-05-01 10:03");
    }

    #[test]
    fn test_no_color_output_has_no_escapes() {
        let formatter = TextFormatter::new(false);
        let state = AppState::default();
        let rendered = formatter.format_status(&state);
        assert!(!rendered.contains('\x1b'));
        assert!(rendered.contains("Not authenticated"));
    }

    #[test]
    fn test_status_report_omits_token() {
        let mut state = AppState::default();
        state.active_profile = Some(flarebar_core::Profile::new("work", "secret-token"));
        let report = status_report(&state);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("work"));
        assert!(!json.contains("secret-token"));
    }
}
