use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

/// A Midjourney task as logged by the gateway. Times are milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MjTask {
    pub id: i64,
    pub code: i64,
    pub user_id: i64,
    pub action: String,
    pub mj_id: String,
    pub prompt: String,
    pub prompt_en: String,
    pub description: String,
    pub state: String,
    pub submit_time: i64,
    pub start_time: i64,
    pub finish_time: i64,
    pub image_url: String,
    pub status: String,
    pub progress: String,
    pub fail_reason: String,
    pub channel_id: i64,
}

/// Filters for the task log. Empty strings are sent as-is; the gateway
/// treats them as "any".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MjQuery {
    pub channel_id: String,
    pub mj_id: String,
    /// Milliseconds since the epoch.
    pub start_timestamp: i64,
    pub end_timestamp: i64,
}

impl ApiClient {
    /// All users' tasks (admin).
    pub async fn list_mj_tasks(&self, page: usize, query: &MjQuery) -> Result<Vec<MjTask>> {
        self.fetch_or_default(
            ApiRequest::get("/api/mj/")
                .query("p", page)
                .query("channel_id", &query.channel_id)
                .query("mj_id", &query.mj_id)
                .query("start_timestamp", query.start_timestamp)
                .query("end_timestamp", query.end_timestamp),
        )
        .await
    }

    /// The caller's own tasks.
    pub async fn list_self_mj_tasks(&self, page: usize, query: &MjQuery) -> Result<Vec<MjTask>> {
        self.fetch_or_default(
            ApiRequest::get("/api/mj/self/")
                .query("p", page)
                .query("mj_id", &query.mj_id)
                .query("start_timestamp", query.start_timestamp)
                .query("end_timestamp", query.end_timestamp),
        )
        .await
    }
}
