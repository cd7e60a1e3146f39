use serde::{Deserialize, Serialize};

use oneadmin_core::types::TokenStatus;

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

/// A user-scoped API key for calling the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub status: TokenStatus,
    pub name: String,
    pub created_time: i64,
    pub accessed_time: i64,
    /// Unix seconds; `-1` never expires.
    pub expired_time: i64,
    pub remain_quota: i64,
    pub unlimited_quota: bool,
    pub used_quota: i64,
    pub model_limits_enabled: bool,
    pub model_limits: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub remain_quota: i64,
    pub expired_time: i64,
    pub unlimited_quota: bool,
    pub model_limits_enabled: bool,
    pub model_limits: String,
}

impl ApiClient {
    pub async fn list_tokens(&self, page: usize) -> Result<Vec<Token>> {
        self.fetch_or_default(ApiRequest::get("/api/token/").query("p", page))
            .await
    }

    pub async fn search_tokens(&self, keyword: &str) -> Result<Vec<Token>> {
        self.fetch_or_default(ApiRequest::get("/api/token/search").query("keyword", keyword))
            .await
    }

    pub async fn get_token(&self, id: i64) -> Result<Token> {
        self.fetch(ApiRequest::get(format!("/api/token/{}", id))).await
    }

    pub async fn create_token(&self, form: &TokenForm) -> Result<()> {
        self.execute(ApiRequest::post("/api/token/").json(serde_json::to_value(form)?))
            .await?;
        Ok(())
    }

    pub async fn update_token(&self, form: &TokenForm) -> Result<()> {
        self.execute(ApiRequest::put("/api/token/").json(serde_json::to_value(form)?))
            .await?;
        Ok(())
    }

    /// Flips only the status; returns the stored token.
    pub async fn set_token_status(&self, id: i64, status: TokenStatus) -> Result<Token> {
        self.fetch_or_default(
            ApiRequest::put("/api/token/")
                .query("status_only", true)
                .json(serde_json::json!({ "id": id, "status": status })),
        )
        .await
    }

    pub async fn delete_token(&self, id: i64) -> Result<()> {
        self.execute(ApiRequest::delete(format!("/api/token/{}/", id)))
            .await?;
        Ok(())
    }
}
