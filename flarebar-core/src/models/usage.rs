//! Aggregated usage metrics.
//!
//! One GraphQL round trip produces a [`UsageMetrics`] covering the current
//! UTC calendar day. The staleness gate lives here; the orchestrator consults
//! it before deciding whether to refetch.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::flexible_date;

/// Minutes after which cached metrics are considered stale.
const STALE_AFTER_MINUTES: i64 = 15;

/// Aggregated account usage counters for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageMetrics {
    /// Workers invocations over the period.
    pub workers_requests: u64,
    /// KV read operations.
    pub kv_reads: u64,
    /// KV write operations.
    pub kv_writes: u64,
    /// KV delete operations.
    pub kv_deletes: u64,
    /// KV list operations.
    pub kv_lists: u64,
    /// D1 read queries.
    pub d1_read_queries: u64,
    /// D1 write queries.
    pub d1_write_queries: u64,
    /// D1 rows read.
    pub d1_rows_read: u64,
    /// D1 rows written.
    pub d1_rows_written: u64,
    /// Start of the covered period (UTC midnight of the fetch day).
    #[serde(with = "flexible_date")]
    pub period_start: DateTime<Utc>,
    /// End of the covered period (fetch instant).
    #[serde(with = "flexible_date")]
    pub period_end: DateTime<Utc>,
    /// When the metrics were last fetched.
    #[serde(with = "flexible_date")]
    pub last_updated: DateTime<Utc>,
}

impl Default for UsageMetrics {
    fn default() -> Self {
        Self {
            workers_requests: 0,
            kv_reads: 0,
            kv_writes: 0,
            kv_deletes: 0,
            kv_lists: 0,
            d1_read_queries: 0,
            d1_write_queries: 0,
            d1_rows_read: 0,
            d1_rows_written: 0,
            period_start: DateTime::UNIX_EPOCH,
            period_end: DateTime::UNIX_EPOCH,
            last_updated: DateTime::UNIX_EPOCH,
        }
    }
}

impl UsageMetrics {
    /// Returns true when the metrics must be refetched: the period no longer
    /// covers the current UTC calendar day, or the last fetch is 15 minutes
    /// old or more.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.period_start.date_naive() != now.date_naive()
            || now - self.last_updated >= Duration::minutes(STALE_AFTER_MINUTES)
    }

    /// Sum of all KV operations.
    pub fn total_kv_operations(&self) -> u64 {
        self.kv_reads + self.kv_writes + self.kv_deletes + self.kv_lists
    }

    /// Sum of all D1 queries.
    pub fn total_d1_queries(&self) -> u64 {
        self.d1_read_queries + self.d1_write_queries
    }
}

// ============================================================================
// Tests
// ============================================================================
