use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;

impl ApiClient {
    /// Routing/pricing group names known to the gateway.
    pub async fn list_groups(&self) -> Result<Vec<String>> {
        self.fetch_or_default(ApiRequest::get("/api/group/")).await
    }
}
