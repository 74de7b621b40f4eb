//! Serde serialization/deserialization tests for core types.
//!
//! These tests decode realistic Cloudflare API payloads into the model types
//! and verify round-trips preserve the data, including the flexible
//! timestamp handling.

use serde_json;

use crate::{
    Account, ActivityItem, ActivityKind, D1Database, DeploymentStatus, KvNamespace,
    PagesDeployment, PagesProject, Profile, Queue, R2Bucket, UsageMetrics, WorkerScript,
};

// ============================================================================
// Account
// ============================================================================

#[test]
fn test_account_realistic_payload() {
    let json = r#"{
        "id": "023e105f4ecef8ad9ca31a8372d0c353",
        "name": "Acme Corp",
        "type": "standard",
        "settings": {"enforce_twofactor": true},
        "created_on": "2021-06-28T09:13:51.456789Z"
    }"#;

    let account: Account = serde_json::from_str(json).unwrap();
    assert_eq!(account.id, "023e105f4ecef8ad9ca31a8372d0c353");
    assert_eq!(account.account_type.as_deref(), Some("standard"));
    assert_eq!(
        account.settings.as_ref().unwrap().enforce_twofactor,
        Some(true)
    );
    // Fraction normalized to milliseconds.
    assert_eq!(
        account.created_on.unwrap().to_rfc3339(),
        "2021-06-28T09:13:51.456+00:00"
    );
}

#[test]
fn test_account_sparse_payload() {
    let account: Account = serde_json::from_str(r#"{"id":"abc","name":"Solo"}"#).unwrap();
    assert!(account.account_type.is_none());
    assert!(account.settings.is_none());
    assert!(account.created_on.is_none());
}

// ============================================================================
// Pages
// ============================================================================

#[test]
fn test_pages_project_with_latest_deployment() {
    let json = r#"{
        "id": "7b162ea7-7367-4d67-bcde-1160995d5",
        "name": "my-site",
        "subdomain": "my-site.pages.dev",
        "domains": ["my-site.pages.dev", "example.com"],
        "production_branch": "main",
        "created_on": "2023-08-10T13:00:00Z",
        "latest_deployment": {
            "id": "f64788e9-fccd-4d4a-a28a-cb84f88f6",
            "short_id": "f64788e9",
            "environment": "production",
            "url": "https://f64788e9.my-site.pages.dev",
            "created_on": "2024-05-01T10:00:00.25Z",
            "modified_on": "2024-05-01T10:03:12.5Z",
            "latest_stage": {
                "name": "deploy",
                "status": "success",
                "started_on": "2024-05-01T10:02:00Z",
                "ended_on": "2024-05-01T10:03:12.5Z"
            },
            "deployment_trigger": {
                "type": "github:push",
                "metadata": {
                    "branch": "main",
                    "commit_hash": "ad9ccd918a81025731e10e40267e11273a263421",
                    "commit_message": "Update index"
                }
            },
            "aliases": ["https://main.my-site.pages.dev"]
        }
    }"#;

    let project: PagesProject = serde_json::from_str(json).unwrap();
    assert_eq!(project.name, "my-site");
    assert_eq!(project.domains.len(), 2);
    assert_eq!(project.latest_status(), DeploymentStatus::Success);

    let deployment = project.latest_deployment.as_ref().unwrap();
    assert_eq!(deployment.branch(), Some("main"));
    assert_eq!(deployment.environment.as_deref(), Some("production"));

    // Round-trip keeps the normalized data.
    let rendered = serde_json::to_string(&project).unwrap();
    let again: PagesProject = serde_json::from_str(&rendered).unwrap();
    assert_eq!(project, again);
}

#[test]
fn test_pages_deployment_in_flight() {
    let json = r#"{
        "id": "dep-busy",
        "latest_stage": {"name": "build", "status": "active"}
    }"#;
    let deployment: PagesDeployment = serde_json::from_str(json).unwrap();
    assert_eq!(deployment.status(), DeploymentStatus::Active);
    assert!(deployment.best_timestamp().is_none());
}

// ============================================================================
// Workers & storage resources
// ============================================================================

#[test]
fn test_worker_script_roundtrip() {
    let json = r#"{
        "id": "image-resizer",
        "etag": "13a3240e8fb414561b0366813b0b8f42b3e6cfa0d9e70e99835dae83d0d8a794",
        "usage_model": "bundled",
        "logpush": false,
        "created_on": "2023-01-15T00:00:00Z",
        "modified_on": "2024-04-20T18:30:00.123456Z"
    }"#;
    let worker: WorkerScript = serde_json::from_str(json).unwrap();
    assert_eq!(worker.id, "image-resizer");

    let rendered = serde_json::to_string(&worker).unwrap();
    let again: WorkerScript = serde_json::from_str(&rendered).unwrap();
    assert_eq!(worker, again);
}

#[test]
fn test_kv_namespace() {
    let json = r#"{"id":"0f2ac74b498b48028cb68387c421e279","title":"sessions","supports_url_encoding":true}"#;
    let ns: KvNamespace = serde_json::from_str(json).unwrap();
    assert_eq!(ns.title, "sessions");
}

#[test]
fn test_r2_bucket() {
    let json = r#"{"name":"uploads","creation_date":"2024-03-03T03:03:03.333Z","location":"WNAM"}"#;
    let bucket: R2Bucket = serde_json::from_str(json).unwrap();
    assert_eq!(bucket.name, "uploads");
    assert_eq!(bucket.location.as_deref(), Some("WNAM"));
}

#[test]
fn test_d1_database() {
    let json = r#"{"uuid":"d1-uuid","name":"prod","num_tables":3,"file_size":12288,"created_at":"2024-01-01T00:00:00Z"}"#;
    let db: D1Database = serde_json::from_str(json).unwrap();
    assert_eq!(db.uuid, "d1-uuid");
}

#[test]
fn test_queue_sparse() {
    let queue: Queue = serde_json::from_str(r#"{"queue_name":"emails"}"#).unwrap();
    assert_eq!(queue.queue_name, "emails");
    assert!(queue.producers.is_empty());
    assert!(queue.consumers.is_empty());
}

// ============================================================================
// Profiles, usage, activity
// ============================================================================

#[test]
fn test_profile_roundtrip() {
    let profile = Profile::new("personal", "cf-token-123");
    let json = serde_json::to_string(&profile).unwrap();
    let again: Profile = serde_json::from_str(&json).unwrap();
    assert_eq!(profile, again);
}

#[test]
fn test_usage_metrics_roundtrip() {
    let json = r#"{
        "workers_requests": 120345,
        "kv_reads": 400,
        "kv_writes": 120,
        "kv_deletes": 3,
        "kv_lists": 9,
        "d1_read_queries": 250,
        "d1_write_queries": 40,
        "d1_rows_read": 9000,
        "d1_rows_written": 1200,
        "period_start": "2024-06-02T00:00:00Z",
        "period_end": "2024-06-02T12:00:00Z",
        "last_updated": "2024-06-02T12:00:00Z"
    }"#;
    let metrics: UsageMetrics = serde_json::from_str(json).unwrap();
    assert_eq!(metrics.workers_requests, 120_345);
    assert_eq!(metrics.total_kv_operations(), 532);

    let rendered = serde_json::to_string(&metrics).unwrap();
    let again: UsageMetrics = serde_json::from_str(&rendered).unwrap();
    assert_eq!(metrics, again);
}

#[test]
fn test_activity_item_roundtrip() {
    let item = ActivityItem {
        id: "pages-my-site".to_string(),
        kind: ActivityKind::Pages,
        name: "my-site".to_string(),
        timestamp: crate::dates::parse_api_date("2024-05-01T10:03:12.5Z"),
        status: Some(DeploymentStatus::Success),
        branch: Some("main".to_string()),
        url: Some("https://f64788e9.my-site.pages.dev".to_string()),
    };
    let json = serde_json::to_string(&item).unwrap();
    let again: ActivityItem = serde_json::from_str(&json).unwrap();
    assert_eq!(item, again);
}
