use std::sync::Arc;

use async_trait::async_trait;
use oneadmin_api::ApiClient;
use oneadmin_core::render::QuotaDisplay;
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::{AuthContext, SharedStore, StatusContext};
use tracing::warn;

use crate::notify::Notifier;

/// Everything a page needs: the API client, the shared client-side state
/// and the feedback channel. Cloning is cheap and every clone sees the same
/// state.
#[derive(Clone)]
pub struct Console {
    pub api: ApiClient,
    pub store: SharedStore,
    pub auth: AuthContext,
    pub status: StatusContext,
    pub notifier: Arc<dyn Notifier>,
    /// Used until the gateway reports its own quota unit.
    pub display: QuotaDisplay,
    /// Channel list rows per page when nothing is persisted. Other lists
    /// follow the gateway's fixed page.
    pub page_size: usize,
    /// Public origin of the console, for invite links.
    pub origin: String,
}

impl Console {
    /// Hydrates the auth and status contexts from `store`.
    pub fn new(api: ApiClient, store: SharedStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            auth: AuthContext::hydrate(store.clone()),
            status: StatusContext::hydrate(store.clone()),
            store,
            notifier,
            display: QuotaDisplay::default(),
            page_size: oneadmin_core::config::DEFAULT_PAGE_SIZE,
            origin: String::new(),
        }
    }

    pub fn with_display(mut self, display: QuotaDisplay, page_size: usize) -> Self {
        self.display = display;
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub fn quota_display(&self) -> QuotaDisplay {
        self.status.quota_display(self.display)
    }

    pub fn render_quota(&self, quota: i64) -> String {
        oneadmin_core::render::render_quota(quota, &self.quota_display(), 2)
    }

    /// Surfaces a failure through the notifier and hands the result back.
    /// Form checks show as info, everything else as an error.
    pub fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            match e {
                ConsoleError::Validation(msg) => self.notifier.info(msg),
                other => {
                    warn!(code = other.code(), "{}", other);
                    self.notifier.error(&other.to_string());
                }
            }
        }
        result
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("origin", &self.origin)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// A list page an edit panel can ask to re-fetch after a save.
#[async_trait]
pub trait Refresh: Send {
    async fn refresh(&mut self) -> Result<()>;
}
