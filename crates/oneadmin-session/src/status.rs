use std::sync::{Arc, RwLock};

use oneadmin_api::site::SiteStatus;
use oneadmin_api::ApiClient;
use oneadmin_core::render::QuotaDisplay;
use oneadmin_core::Result;
use tracing::debug;

use crate::store::{SharedStore, StoreKey};

/// Site-wide flags (top-up link, OAuth switches, currency display) fetched
/// from `/api/status` and cached under the `status` key.
#[derive(Debug, Clone)]
pub struct StatusContext {
    status: Arc<RwLock<SiteStatus>>,
    store: SharedStore,
}

impl StatusContext {
    pub fn hydrate(store: SharedStore) -> Self {
        let status: SiteStatus = store.get_json(StoreKey::Status).unwrap_or_default();
        Self {
            status: Arc::new(RwLock::new(status)),
            store,
        }
    }

    pub fn get(&self) -> SiteStatus {
        match self.status.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, status: SiteStatus) -> Result<()> {
        self.store.set_json(StoreKey::Status, &status)?;
        match self.status.write() {
            Ok(mut guard) => *guard = status,
            Err(poisoned) => *poisoned.into_inner() = status,
        }
        Ok(())
    }

    /// Fetches the current status and caches it.
    pub async fn refresh(&self, api: &ApiClient) -> Result<SiteStatus> {
        let status = api.site_status().await?;
        debug!(system_name = %status.system_name, "site status refreshed");
        self.set(status.clone())?;
        Ok(status)
    }

    /// Quota rendering rules; falls back to `fallback` until the gateway
    /// has reported a quota unit.
    pub fn quota_display(&self, fallback: QuotaDisplay) -> QuotaDisplay {
        let status = self.get();
        if status.quota_per_unit > 0.0 {
            QuotaDisplay::new(status.quota_per_unit, status.display_in_currency)
        } else {
            fallback
        }
    }
}
