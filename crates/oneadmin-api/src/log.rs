use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

impl ApiClient {
    /// Purges usage logs older than `target_timestamp`; returns the number
    /// of rows removed.
    pub async fn delete_history_logs(&self, target_timestamp: i64) -> Result<i64> {
        self.fetch_or_default(ApiRequest::delete("/api/log/").query("target_timestamp", target_timestamp))
            .await
    }
}
