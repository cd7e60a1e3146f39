use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::transport::{ApiRequest, Transport};

/// Entry point for every management endpoint. Cheap to clone; pages hold
/// their own copy.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Raw envelope, `success: false` included.
    pub async fn call(&self, req: ApiRequest) -> Result<Envelope> {
        self.transport.send(req).await
    }

    /// Envelope checked for `success`.
    pub async fn execute(&self, req: ApiRequest) -> Result<Envelope> {
        self.call(req).await?.ensure_success()
    }

    pub async fn fetch<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T> {
        self.call(req).await?.into_data()
    }

    pub async fn fetch_or_default<T: DeserializeOwned + Default>(
        &self,
        req: ApiRequest,
    ) -> Result<T> {
        self.call(req).await?.into_data_or_default()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}
