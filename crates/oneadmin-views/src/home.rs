use oneadmin_api::site::SiteStatus;
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::StoreKey;
use tracing::warn;

use crate::context::Console;

/// What the home page renders. Content starting with `https://` is shown
/// as an embedded page; anything else is Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeContent {
    /// Nothing configured; the default system overview is shown.
    Default,
    Url(String),
    Markdown(String),
}

impl HomeContent {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            HomeContent::Default
        } else if raw.starts_with("https://") {
            HomeContent::Url(raw.to_string())
        } else {
            HomeContent::Markdown(raw.to_string())
        }
    }
}

pub struct Home {
    ctx: Console,
    content: HomeContent,
}

impl Home {
    /// Starts from the cached content so the page renders before the fetch.
    pub fn new(ctx: Console) -> Self {
        let cached = ctx.store.get(StoreKey::HomePageContent).unwrap_or_default();
        Self {
            content: HomeContent::parse(&cached),
            ctx,
        }
    }

    pub fn content(&self) -> &HomeContent {
        &self.content
    }

    /// Returns the notice when it is new. A notice is shown once; the
    /// last one seen is remembered.
    pub async fn fresh_notice(&self) -> Result<Option<String>> {
        let result = self.ctx.api.notice().await;
        let notice = self.ctx.report(result.map_err(ConsoleError::from))?;
        let seen = self.ctx.store.get(StoreKey::Notice).unwrap_or_default();
        if notice.is_empty() || notice == seen {
            return Ok(None);
        }
        self.ctx.store.set(StoreKey::Notice, notice.as_str())?;
        Ok(Some(notice))
    }

    pub async fn load_content(&mut self) -> Result<&HomeContent> {
        match self.ctx.api.home_page_content().await {
            Ok(raw) => {
                self.ctx.store.set(StoreKey::HomePageContent, raw.as_str())?;
                self.content = HomeContent::parse(&raw);
                Ok(&self.content)
            }
            Err(e) => {
                let e = ConsoleError::from(e);
                warn!(error = %e, "home page content");
                self.ctx.notifier.error(&format!(
                    "Failed to load homepage content, showing default homepage: {}",
                    e
                ));
                self.content = HomeContent::Default;
                Err(e)
            }
        }
    }

    /// Same rules as the home content.
    pub async fn about(&self) -> Result<HomeContent> {
        let result = self.ctx.api.about().await;
        let raw = self.ctx.report(result.map_err(ConsoleError::from))?;
        Ok(HomeContent::parse(&raw))
    }

    /// Refreshes the cached site status shown in the overview.
    pub async fn load_status(&self) -> Result<SiteStatus> {
        let result = self.ctx.status.refresh(&self.ctx.api).await;
        self.ctx.report(result)
    }
}
