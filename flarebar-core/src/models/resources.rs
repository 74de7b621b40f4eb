//! Account resource types: Workers, KV, R2, D1, and Queues.
//!
//! All of these are list-fetched and replaced wholesale on every successful
//! refresh; there is no incremental merging. Fields the API may omit are
//! optional with serde defaults so one sparse record never fails a whole
//! listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::flexible_date_opt;

// ============================================================================
// Workers
// ============================================================================

/// A deployed Worker script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerScript {
    /// Script name (the natural key).
    pub id: String,
    /// Content hash.
    #[serde(default)]
    pub etag: Option<String>,
    /// Usage model ("bundled" or "unbound"), absent on newer accounts.
    #[serde(default)]
    pub usage_model: Option<String>,
    /// Whether Logpush is enabled for the script.
    #[serde(default)]
    pub logpush: Option<bool>,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub modified_on: Option<DateTime<Utc>>,
}

impl WorkerScript {
    /// Best-available timestamp for activity ordering.
    pub fn best_timestamp(&self) -> Option<DateTime<Utc>> {
        self.modified_on.or(self.created_on)
    }
}

// ============================================================================
// KV
// ============================================================================

/// A Workers KV namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KvNamespace {
    /// Namespace id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Whether keys may contain URL-encoded characters.
    #[serde(default)]
    pub supports_url_encoding: Option<bool>,
}

// ============================================================================
// R2
// ============================================================================

/// An R2 bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct R2Bucket {
    /// Bucket name (the natural key).
    pub name: String,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub creation_date: Option<DateTime<Utc>>,
    /// Location hint (e.g., "WNAM").
    #[serde(default)]
    pub location: Option<String>,
    /// Default storage class.
    #[serde(default)]
    pub storage_class: Option<String>,
}

// ============================================================================
// D1
// ============================================================================

/// A D1 database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct D1Database {
    /// Database uuid (the natural key).
    pub uuid: String,
    /// Display name.
    pub name: String,
    /// Engine version.
    #[serde(default)]
    pub version: Option<String>,
    /// Number of tables.
    #[serde(default)]
    pub num_tables: Option<u64>,
    /// On-disk size in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Queues
// ============================================================================

/// A Queues queue, with its producer and consumer bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    /// Queue id (the natural key).
    #[serde(default)]
    pub queue_id: String,
    /// Queue name.
    pub queue_name: String,
    /// Creation timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub created_on: Option<DateTime<Utc>>,
    /// Last modification timestamp.
    #[serde(default, with = "flexible_date_opt")]
    pub modified_on: Option<DateTime<Utc>>,
    /// Scripts producing into the queue.
    #[serde(default)]
    pub producers: Vec<QueueProducer>,
    /// Scripts consuming from the queue.
    #[serde(default)]
    pub consumers: Vec<QueueConsumer>,
    /// Producer count as reported by the API.
    #[serde(default)]
    pub producers_total_count: Option<u64>,
    /// Consumer count as reported by the API.
    #[serde(default)]
    pub consumers_total_count: Option<u64>,
}

/// A producer binding on a queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueProducer {
    /// Producing script name.
    pub script: Option<String>,
    /// Producer type (e.g., "worker", "r2_bucket").
    #[serde(rename = "type")]
    pub producer_type: Option<String>,
}

/// A consumer binding on a queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConsumer {
    /// Consuming script name.
    pub script: Option<String>,
    /// Consumer type (e.g., "worker", "http_pull").
    #[serde(rename = "type")]
    pub consumer_type: Option<String>,
    /// Script environment, when set.
    pub environment: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_minimal_payload() {
        // Cloudflare omits most fields for freshly created scripts.
        let worker: WorkerScript = serde_json::from_str(r#"{"id":"my-worker"}"#).unwrap();
        assert_eq!(worker.id, "my-worker");
        assert!(worker.best_timestamp().is_none());
    }

    #[test]
    fn test_worker_best_timestamp_prefers_modified() {
        let json = r#"{
            "id": "api",
            "created_on": "2024-01-01T00:00:00Z",
            "modified_on": "2024-03-01T12:00:00.5Z"
        }"#;
        let worker: WorkerScript = serde_json::from_str(json).unwrap();
        let ts = worker.best_timestamp().unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-03-01T12:00:00.500+00:00");
    }

    #[test]
    fn test_queue_with_bindings() {
        let json = r#"{
            "queue_id": "q-1",
            "queue_name": "jobs",
            "producers": [{"script": "api", "type": "worker"}],
            "consumers": [{"script": "worker-consumer", "type": "worker"}],
            "producers_total_count": 1,
            "consumers_total_count": 1
        }"#;
        let queue: Queue = serde_json::from_str(json).unwrap();
        assert_eq!(queue.producers.len(), 1);
        assert_eq!(queue.consumers[0].script.as_deref(), Some("worker-consumer"));
    }

    #[test]
    fn test_d1_database_fields() {
        let json = r#"{
            "uuid": "xxxx-yyyy",
            "name": "prod-db",
            "version": "production",
            "num_tables": 12,
            "file_size": 4096,
            "created_at": "2024-02-02T08:00:00.123456Z"
        }"#;
        let db: D1Database = serde_json::from_str(json).unwrap();
        assert_eq!(db.num_tables, Some(12));
        assert!(db.created_at.is_some());
    }
}
