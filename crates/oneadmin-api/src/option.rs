use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

/// One server-side setting. Every value travels as a string; boolean
/// options use `"true"`/`"false"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl ApiClient {
    pub async fn list_options(&self) -> Result<Vec<OptionEntry>> {
        self.fetch_or_default(ApiRequest::get("/api/option/")).await
    }

    #[instrument(skip(self, value))]
    pub async fn update_option(&self, key: &str, value: &str) -> Result<()> {
        self.execute(ApiRequest::put("/api/option/").json(json!({ "key": key, "value": value })))
            .await?;
        Ok(())
    }
}
