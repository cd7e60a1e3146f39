use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

/// Public site configuration from `GET /api/status`, cached locally under
/// the `status` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteStatus {
    pub system_name: String,
    pub logo: String,
    pub footer_html: String,
    pub version: String,
    pub server_address: String,
    pub top_up_link: String,
    pub chat_link: String,
    pub quota_per_unit: f64,
    pub display_in_currency: bool,
    pub email_verification: bool,
    pub github_oauth: bool,
    pub github_client_id: String,
    pub telegram_oauth: bool,
    pub telegram_bot_name: String,
    pub enable_online_topup: bool,
    pub min_topup: i64,
}

impl ApiClient {
    pub async fn site_status(&self) -> Result<SiteStatus> {
        self.fetch_or_default(ApiRequest::get("/api/status")).await
    }

    pub async fn notice(&self) -> Result<String> {
        self.fetch_or_default(ApiRequest::get("/api/notice")).await
    }

    pub async fn home_page_content(&self) -> Result<String> {
        self.fetch_or_default(ApiRequest::get("/api/home_page_content"))
            .await
    }

    pub async fn about(&self) -> Result<String> {
        self.fetch_or_default(ApiRequest::get("/api/about")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_tolerates_unknown_and_missing_fields() {
        let status: SiteStatus = serde_json::from_value(json!({
            "system_name": "One API",
            "quota_per_unit": 500000,
            "enable_online_topup": true,
            "min_topup": 5,
            "turnstile_check": false
        }))
        .unwrap();
        assert_eq!(status.system_name, "One API");
        assert!(status.enable_online_topup);
        assert_eq!(status.min_topup, 5);
        assert!(status.top_up_link.is_empty());
    }
}
