use serde::{Deserialize, Serialize};

use oneadmin_core::types::RedemptionStatus;

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Redemption {
    pub id: i64,
    pub user_id: i64,
    pub key: String,
    pub status: RedemptionStatus,
    pub name: String,
    pub quota: i64,
    pub created_time: i64,
    pub redeemed_time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedemptionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub quota: i64,
    /// Number of codes to mint; ignored on update.
    pub count: i64,
}

impl ApiClient {
    pub async fn list_redemptions(&self, page: usize) -> Result<Vec<Redemption>> {
        self.fetch_or_default(ApiRequest::get("/api/redemption/").query("p", page))
            .await
    }

    pub async fn search_redemptions(&self, keyword: &str) -> Result<Vec<Redemption>> {
        self.fetch_or_default(ApiRequest::get("/api/redemption/search").query("keyword", keyword))
            .await
    }

    pub async fn get_redemption(&self, id: i64) -> Result<Redemption> {
        self.fetch(ApiRequest::get(format!("/api/redemption/{}", id)))
            .await
    }

    /// Returns the generated codes.
    pub async fn create_redemptions(&self, form: &RedemptionForm) -> Result<Vec<String>> {
        self.fetch_or_default(ApiRequest::post("/api/redemption/").json(serde_json::to_value(form)?))
            .await
    }

    pub async fn update_redemption(&self, form: &RedemptionForm) -> Result<()> {
        self.execute(ApiRequest::put("/api/redemption/").json(serde_json::to_value(form)?))
            .await?;
        Ok(())
    }

    pub async fn delete_redemption(&self, id: i64) -> Result<()> {
        self.execute(ApiRequest::delete(format!("/api/redemption/{}/", id)))
            .await?;
        Ok(())
    }
}
