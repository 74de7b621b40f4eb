//! Usage-metrics aggregation over the GraphQL analytics API.
//!
//! One query pulls three datasets scoped to an account — Workers invocations
//! (instant-grained), KV operations grouped by action type (day-grained),
//! and D1 analytics sums (day-grained) — and reduces them into a single
//! [`UsageMetrics`]. The caller decides *whether* to fetch (the staleness
//! gate lives in the orchestrator); this module only knows *how*.

use chrono::{DateTime, SecondsFormat, Utc};
use flarebar_core::UsageMetrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CloudflareClient;
use crate::error::ApiError;

/// The combined analytics query.
///
/// `workersInvocationsAdaptive` filters on instants; the KV and D1 group
/// datasets are day-grained and filter on dates.
const USAGE_QUERY: &str = r"
query FlarebarAccountUsage(
  $accountTag: string!
  $datetimeStart: Time!
  $datetimeEnd: Time!
  $dateStart: Date!
  $dateEnd: Date!
) {
  viewer {
    accounts(filter: { accountTag: $accountTag }) {
      workersInvocationsAdaptive(
        limit: 10000
        filter: { datetime_geq: $datetimeStart, datetime_leq: $datetimeEnd }
      ) {
        sum {
          requests
        }
      }
      kvOperationsAdaptiveGroups(
        limit: 10000
        filter: { date_geq: $dateStart, date_leq: $dateEnd }
      ) {
        dimensions {
          actionType
        }
        sum {
          requests
        }
      }
      d1AnalyticsAdaptiveGroups(
        limit: 10000
        filter: { date_geq: $dateStart, date_leq: $dateEnd }
      ) {
        sum {
          readQueries
          writeQueries
          rowsRead
          rowsWritten
        }
      }
    }
  }
}";

// ============================================================================
// Query Variables
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UsageVariables {
    account_tag: String,
    datetime_start: String,
    datetime_end: String,
    date_start: String,
    date_end: String,
}

// ============================================================================
// Response Shape
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UsagePayload {
    #[serde(default)]
    pub viewer: UsageViewer,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UsageViewer {
    #[serde(default)]
    pub accounts: Vec<AccountUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AccountUsage {
    pub workers_invocations_adaptive: Vec<WorkersRow>,
    pub kv_operations_adaptive_groups: Vec<KvOperationsRow>,
    pub d1_analytics_adaptive_groups: Vec<D1AnalyticsRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WorkersRow {
    pub sum: WorkersSum,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct WorkersSum {
    pub requests: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct KvOperationsRow {
    pub dimensions: KvDimensions,
    pub sum: KvSum,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct KvDimensions {
    pub action_type: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct KvSum {
    pub requests: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct D1AnalyticsRow {
    pub sum: D1Sum,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct D1Sum {
    pub read_queries: u64,
    pub write_queries: u64,
    pub rows_read: u64,
    pub rows_written: u64,
}

// ============================================================================
// Fetch & Reduce
// ============================================================================

/// Issues the usage query for `[startOfTodayUTC, now]` and reduces the
/// result.
pub(crate) async fn fetch_usage(
    client: &CloudflareClient,
    account_id: &str,
) -> Result<UsageMetrics, ApiError> {
    let now = Utc::now();
    let period_start = start_of_day_utc(now);

    debug!(account = account_id, "Fetching usage metrics");

    let variables = UsageVariables {
        account_tag: account_id.to_string(),
        datetime_start: period_start.to_rfc3339_opts(SecondsFormat::Secs, true),
        datetime_end: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        date_start: period_start.format("%Y-%m-%d").to_string(),
        date_end: now.format("%Y-%m-%d").to_string(),
    };

    let payload: UsagePayload = client.post_graphql(USAGE_QUERY, variables).await?;

    Ok(reduce_usage(&payload, period_start, now))
}

/// UTC midnight of the instant's calendar day.
pub(crate) fn start_of_day_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// Reduces the three dataset groups into a single [`UsageMetrics`].
///
/// Workers requests sum across rows; KV requests bucket by action type
/// (case-insensitive, unrecognized types ignored); D1 counters sum across
/// groups. Accounts the filter did not match contribute nothing.
pub(crate) fn reduce_usage(
    payload: &UsagePayload,
    period_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> UsageMetrics {
    let mut metrics = UsageMetrics {
        period_start,
        period_end: now,
        last_updated: now,
        ..Default::default()
    };

    for account in &payload.viewer.accounts {
        for row in &account.workers_invocations_adaptive {
            metrics.workers_requests += row.sum.requests;
        }

        for row in &account.kv_operations_adaptive_groups {
            match row.dimensions.action_type.to_ascii_lowercase().as_str() {
                "read" => metrics.kv_reads += row.sum.requests,
                "write" => metrics.kv_writes += row.sum.requests,
                "delete" => metrics.kv_deletes += row.sum.requests,
                "list" => metrics.kv_lists += row.sum.requests,
                _ => {}
            }
        }

        for row in &account.d1_analytics_adaptive_groups {
            metrics.d1_read_queries += row.sum.read_queries;
            metrics.d1_write_queries += row.sum.write_queries;
            metrics.d1_rows_read += row.sum.rows_read;
            metrics.d1_rows_written += row.sum.rows_written;
        }
    }

    metrics
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse_payload(json: &str) -> UsagePayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_start_of_day_utc() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 18, 45, 12).unwrap();
        let start = start_of_day_utc(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reduce_full_payload() {
        let payload = parse_payload(
            r#"{
            "viewer": {
                "accounts": [{
                    "workersInvocationsAdaptive": [
                        {"sum": {"requests": 100}},
                        {"sum": {"requests": 250}}
                    ],
                    "kvOperationsAdaptiveGroups": [
                        {"dimensions": {"actionType": "read"}, "sum": {"requests": 40}},
                        {"dimensions": {"actionType": "READ"}, "sum": {"requests": 2}},
                        {"dimensions": {"actionType": "write"}, "sum": {"requests": 7}},
                        {"dimensions": {"actionType": "delete"}, "sum": {"requests": 1}},
                        {"dimensions": {"actionType": "list"}, "sum": {"requests": 3}},
                        {"dimensions": {"actionType": "purge"}, "sum": {"requests": 99}}
                    ],
                    "d1AnalyticsAdaptiveGroups": [
                        {"sum": {"readQueries": 10, "writeQueries": 4, "rowsRead": 500, "rowsWritten": 60}},
                        {"sum": {"readQueries": 5, "writeQueries": 1, "rowsRead": 100, "rowsWritten": 10}}
                    ]
                }]
            }
        }"#,
        );

        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let metrics = reduce_usage(&payload, start_of_day_utc(now), now);

        assert_eq!(metrics.workers_requests, 350);
        assert_eq!(metrics.kv_reads, 42);
        assert_eq!(metrics.kv_writes, 7);
        assert_eq!(metrics.kv_deletes, 1);
        assert_eq!(metrics.kv_lists, 3);
        // "purge" is not a recognized action type and is ignored.
        assert_eq!(metrics.total_kv_operations(), 53);
        assert_eq!(metrics.d1_read_queries, 15);
        assert_eq!(metrics.d1_write_queries, 5);
        assert_eq!(metrics.d1_rows_read, 600);
        assert_eq!(metrics.d1_rows_written, 70);
        assert_eq!(metrics.period_end, now);
        assert_eq!(metrics.last_updated, now);
    }

    #[test]
    fn test_reduce_empty_account_list() {
        let payload = parse_payload(r#"{"viewer": {"accounts": []}}"#);
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let metrics = reduce_usage(&payload, start_of_day_utc(now), now);

        assert_eq!(metrics.workers_requests, 0);
        assert_eq!(metrics.total_kv_operations(), 0);
        assert_eq!(metrics.total_d1_queries(), 0);
        // The stamp still marks today's period.
        assert!(!metrics.is_stale(now));
    }

    #[test]
    fn test_reduce_missing_datasets() {
        // An account without D1 or KV simply omits those groups.
        let payload = parse_payload(
            r#"{
            "viewer": {
                "accounts": [{
                    "workersInvocationsAdaptive": [{"sum": {"requests": 9}}]
                }]
            }
        }"#,
        );
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let metrics = reduce_usage(&payload, start_of_day_utc(now), now);
        assert_eq!(metrics.workers_requests, 9);
        assert_eq!(metrics.kv_reads, 0);
    }
}
