use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use oneadmin_core::types::ChannelStatus;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::transport::ApiRequest;

/// An upstream provider credential as returned by `/api/channel/`.
/// The list endpoint blanks `key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Channel {
    pub id: i64,
    #[serde(rename = "type")]
    pub channel_type: i64,
    pub key: String,
    pub status: ChannelStatus,
    pub name: String,
    pub weight: Option<i64>,
    pub created_time: i64,
    pub test_time: i64,
    /// Milliseconds; zero means never tested.
    pub response_time: i64,
    pub base_url: Option<String>,
    pub other: String,
    pub balance: f64,
    pub balance_updated_time: i64,
    pub models: String,
    pub group: String,
    pub used_quota: i64,
    pub model_mapping: Option<String>,
    pub priority: Option<i64>,
    pub auto_ban: Option<i64>,
    pub system_prompt: Option<String>,
    pub openai_organization: Option<String>,
}

impl Channel {
    pub fn model_list(&self) -> Vec<String> {
        oneadmin_core::render::split_list(&self.models)
    }

    pub fn group_list(&self) -> Vec<String> {
        oneadmin_core::render::split_list(&self.group)
    }
}

/// Full create/update body. `models` and `group` are comma lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: i64,
    pub key: String,
    pub openai_organization: String,
    pub base_url: String,
    pub other: String,
    pub model_mapping: String,
    pub system_prompt: String,
    pub models: String,
    pub group: String,
    pub auto_ban: i64,
}

/// Partial update used by the table's inline controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelPatch {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChannelStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestScope {
    All,
    Disabled,
}

impl TestScope {
    pub fn as_str(self) -> &'static str {
        match self {
            TestScope::All => "all",
            TestScope::Disabled => "disabled",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSearch {
    pub keyword: String,
    pub group: String,
    pub model: String,
}

impl ChannelSearch {
    pub fn is_empty(&self) -> bool {
        self.keyword.is_empty() && self.group.is_empty() && self.model.is_empty()
    }
}

impl ApiClient {
    #[instrument(skip(self))]
    pub async fn list_channels(&self, page: usize, page_size: usize, id_sort: bool) -> Result<Vec<Channel>> {
        self.fetch_or_default(
            ApiRequest::get("/api/channel/")
                .query("p", page)
                .query("page_size", page_size)
                .query("id_sort", id_sort),
        )
        .await
    }

    pub async fn search_channels(&self, search: &ChannelSearch) -> Result<Vec<Channel>> {
        self.fetch_or_default(
            ApiRequest::get("/api/channel/search")
                .query("keyword", &search.keyword)
                .query("group", &search.group)
                .query("model", &search.model),
        )
        .await
    }

    pub async fn get_channel(&self, id: i64) -> Result<Channel> {
        self.fetch(ApiRequest::get(format!("/api/channel/{}", id))).await
    }

    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_channel(&self, form: &ChannelForm) -> Result<()> {
        self.execute(ApiRequest::post("/api/channel/").json(serde_json::to_value(form)?))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, form), fields(id = ?form.id))]
    pub async fn update_channel(&self, form: &ChannelForm) -> Result<()> {
        self.execute(ApiRequest::put("/api/channel/").json(serde_json::to_value(form)?))
            .await?;
        Ok(())
    }

    /// Returns the channel as stored after the patch.
    pub async fn patch_channel(&self, patch: &ChannelPatch) -> Result<Channel> {
        self.fetch_or_default(ApiRequest::put("/api/channel/").json(serde_json::to_value(patch)?))
            .await
    }

    pub async fn delete_channel(&self, id: i64) -> Result<()> {
        self.execute(ApiRequest::delete(format!("/api/channel/{}/", id)))
            .await?;
        Ok(())
    }

    /// Returns how many channels were removed.
    pub async fn delete_disabled_channels(&self) -> Result<i64> {
        self.fetch_or_default(ApiRequest::delete("/api/channel/disabled"))
            .await
    }

    pub async fn batch_delete_channels(&self, ids: &[i64]) -> Result<i64> {
        self.fetch_or_default(ApiRequest::post("/api/channel/batch").json(json!({ "ids": ids })))
            .await
    }

    pub async fn fix_channel_abilities(&self) -> Result<i64> {
        self.fetch_or_default(ApiRequest::post("/api/channel/fix"))
            .await
    }

    /// Runs one test completion; returns the elapsed seconds reported by
    /// the gateway.
    #[instrument(skip(self))]
    pub async fn test_channel(&self, id: i64, model: &str) -> Result<f64> {
        let env = self
            .execute(ApiRequest::get(format!("/api/channel/test/{}", id)).query("model", model))
            .await?;
        env.extra_f64("time")
            .ok_or_else(|| ApiError::Decode("missing `time` in test response".to_string()))
    }

    /// Starts a background test of every channel in `scope`.
    pub async fn test_all_channels(&self, scope: TestScope) -> Result<()> {
        self.execute(ApiRequest::get("/api/channel/test").query("scope", scope.as_str()))
            .await?;
        Ok(())
    }

    pub async fn update_channel_balance(&self, id: i64) -> Result<f64> {
        let env = self
            .execute(ApiRequest::get(format!("/api/channel/update_balance/{}/", id)))
            .await?;
        env.extra_f64("balance")
            .ok_or_else(|| ApiError::Decode("missing `balance` in response".to_string()))
    }

    pub async fn update_all_channel_balances(&self) -> Result<()> {
        self.execute(ApiRequest::get("/api/channel/update_balance"))
            .await?;
        Ok(())
    }

    pub async fn list_channel_models(&self) -> Result<Vec<ModelInfo>> {
        self.fetch_or_default(ApiRequest::get("/api/channel/models"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_decodes_with_missing_fields() {
        let c: Channel = serde_json::from_value(json!({
            "id": 7, "type": 3, "name": "azure-east", "status": 3,
            "models": "gpt-4,gpt-35-turbo", "group": "default", "priority": null
        }))
        .unwrap();
        assert_eq!(c.channel_type, 3);
        assert_eq!(c.status, ChannelStatus::AutoDisabled);
        assert_eq!(c.model_list(), vec!["gpt-4", "gpt-35-turbo"]);
        assert!(c.priority.is_none());
        assert_eq!(c.response_time, 0);
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = ChannelPatch {
            id: 4,
            status: Some(ChannelStatus::ManuallyDisabled),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"id": 4, "status": 2}));
    }

    #[test]
    fn form_omits_id_on_create() {
        let form = ChannelForm {
            name: "n".into(),
            channel_type: 1,
            ..Default::default()
        };
        let v = serde_json::to_value(&form).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v["type"], 1);
    }
}
