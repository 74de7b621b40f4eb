//! Typed REST read operations and the [`CloudflareApi`] trait.

use async_trait::async_trait;
use flarebar_core::{
    Account, D1Database, KvNamespace, PagesDeployment, PagesProject, Queue, R2Bucket, UsageMetrics,
    WorkerScript,
};
use serde::Deserialize;

use crate::client::CloudflareClient;
use crate::error::ApiError;

/// The read surface the engine consumes.
///
/// Implemented by [`CloudflareClient`]; engine tests substitute fakes to
/// exercise partial-failure and cancellation behavior without a network.
#[async_trait]
pub trait CloudflareApi: Send + Sync {
    /// Lists the accounts the token can see.
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError>;

    /// Fetches one account.
    async fn get_account(&self, account_id: &str) -> Result<Account, ApiError>;

    /// Lists Worker scripts.
    async fn list_workers(&self, account_id: &str) -> Result<Vec<WorkerScript>, ApiError>;

    /// Fetches one Worker script record.
    async fn get_worker(
        &self,
        account_id: &str,
        script_name: &str,
    ) -> Result<WorkerScript, ApiError>;

    /// Lists Pages projects, each carrying its latest deployment.
    async fn list_pages_projects(&self, account_id: &str) -> Result<Vec<PagesProject>, ApiError>;

    /// Lists deployments of one Pages project, newest first.
    async fn list_pages_deployments(
        &self,
        account_id: &str,
        project_name: &str,
    ) -> Result<Vec<PagesDeployment>, ApiError>;

    /// Lists KV namespaces.
    async fn list_kv_namespaces(&self, account_id: &str) -> Result<Vec<KvNamespace>, ApiError>;

    /// Lists R2 buckets.
    async fn list_r2_buckets(&self, account_id: &str) -> Result<Vec<R2Bucket>, ApiError>;

    /// Lists D1 databases.
    async fn list_d1_databases(&self, account_id: &str) -> Result<Vec<D1Database>, ApiError>;

    /// Lists Queues queues with producer/consumer bindings.
    async fn list_queues(&self, account_id: &str) -> Result<Vec<Queue>, ApiError>;

    /// Fetches aggregated usage metrics for the current UTC day.
    async fn fetch_usage(&self, account_id: &str) -> Result<UsageMetrics, ApiError>;
}

/// R2 wraps its bucket list one envelope level deeper than every other
/// listing: `{result: {buckets: [...]}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct R2BucketList {
    #[serde(default)]
    pub buckets: Vec<R2Bucket>,
}

#[async_trait]
impl CloudflareApi for CloudflareClient {
    async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get_result("/accounts?per_page=50").await
    }

    async fn get_account(&self, account_id: &str) -> Result<Account, ApiError> {
        self.get_result(&format!("/accounts/{account_id}")).await
    }

    async fn list_workers(&self, account_id: &str) -> Result<Vec<WorkerScript>, ApiError> {
        self.get_result(&format!("/accounts/{account_id}/workers/scripts"))
            .await
    }

    async fn get_worker(
        &self,
        account_id: &str,
        script_name: &str,
    ) -> Result<WorkerScript, ApiError> {
        self.get_result(&format!(
            "/accounts/{account_id}/workers/scripts/{script_name}"
        ))
        .await
    }

    async fn list_pages_projects(&self, account_id: &str) -> Result<Vec<PagesProject>, ApiError> {
        self.get_result(&format!("/accounts/{account_id}/pages/projects"))
            .await
    }

    async fn list_pages_deployments(
        &self,
        account_id: &str,
        project_name: &str,
    ) -> Result<Vec<PagesDeployment>, ApiError> {
        self.get_result(&format!(
            "/accounts/{account_id}/pages/projects/{project_name}/deployments?per_page=25"
        ))
        .await
    }

    async fn list_kv_namespaces(&self, account_id: &str) -> Result<Vec<KvNamespace>, ApiError> {
        self.get_result(&format!(
            "/accounts/{account_id}/storage/kv/namespaces?per_page=100"
        ))
        .await
    }

    async fn list_r2_buckets(&self, account_id: &str) -> Result<Vec<R2Bucket>, ApiError> {
        let wrapped: R2BucketList = self
            .get_result(&format!("/accounts/{account_id}/r2/buckets"))
            .await?;
        Ok(wrapped.buckets)
    }

    async fn list_d1_databases(&self, account_id: &str) -> Result<Vec<D1Database>, ApiError> {
        self.get_result(&format!("/accounts/{account_id}/d1/database?per_page=100"))
            .await
    }

    async fn list_queues(&self, account_id: &str) -> Result<Vec<Queue>, ApiError> {
        self.get_result(&format!("/accounts/{account_id}/queues"))
            .await
    }

    async fn fetch_usage(&self, account_id: &str) -> Result<UsageMetrics, ApiError> {
        crate::usage::fetch_usage(self, account_id).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiEnvelope;

    #[test]
    fn test_r2_bucket_list_unwrap() {
        let json = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": {"buckets": [{"name": "a"}, {"name": "b"}]}
        }"#;
        let envelope: ApiEnvelope<R2BucketList> = serde_json::from_str(json).unwrap();
        let buckets = envelope.result.unwrap().buckets;
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].name, "a");
        assert_eq!(buckets[1].name, "b");
    }

    #[test]
    fn test_r2_bucket_list_tolerates_missing_key() {
        let json = r#"{"success": true, "errors": [], "messages": [], "result": {}}"#;
        let envelope: ApiEnvelope<R2BucketList> = serde_json::from_str(json).unwrap();
        assert!(envelope.result.unwrap().buckets.is_empty());
    }

    #[test]
    fn test_flat_listings_decode_from_plain_arrays() {
        // D1 and Queues return flat arrays in `result`, unlike R2.
        let json = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{"uuid": "u1", "name": "db"}]
        }"#;
        let envelope: ApiEnvelope<Vec<D1Database>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.result.unwrap()[0].uuid, "u1");

        let json = r#"{
            "success": true,
            "errors": [],
            "messages": [],
            "result": [{"queue_name": "jobs"}]
        }"#;
        let envelope: ApiEnvelope<Vec<Queue>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.result.unwrap()[0].queue_name, "jobs");
    }
}
