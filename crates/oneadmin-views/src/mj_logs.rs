use async_trait::async_trait;
use chrono::{Duration, Utc};
use oneadmin_api::mj::{MjQuery, MjTask};
use oneadmin_core::render::{parse_timestamp, timestamp_to_string};
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::StoreKey;

use crate::context::{Console, Refresh};
use crate::table::{PagedTable, ITEMS_PER_PAGE};

/// Filter form. Times use the console's `YYYY-MM-DD HH:MM:SS` format.
#[derive(Debug, Clone, PartialEq)]
pub struct MjLogsFilter {
    pub channel_id: String,
    pub mj_id: String,
    pub start_time: String,
    pub end_time: String,
}

impl Default for MjLogsFilter {
    /// The last 30 days, plus an hour of slack for clock skew.
    fn default() -> Self {
        let now = Utc::now().timestamp();
        Self {
            channel_id: String::new(),
            mj_id: String::new(),
            start_time: timestamp_to_string(now - Duration::days(30).num_seconds()),
            end_time: timestamp_to_string(now + Duration::hours(1).num_seconds()),
        }
    }
}

impl MjLogsFilter {
    fn to_query(&self) -> Result<MjQuery> {
        let start = parse_timestamp(&self.start_time)
            .ok_or_else(|| ConsoleError::validation("Start time format error!"))?;
        let end = parse_timestamp(&self.end_time)
            .ok_or_else(|| ConsoleError::validation("End time format error!"))?;
        Ok(MjQuery {
            channel_id: self.channel_id.trim().to_string(),
            mj_id: self.mj_id.trim().to_string(),
            start_timestamp: start * 1000,
            end_timestamp: end * 1000,
        })
    }
}

/// Midjourney task log. Admins see every user's tasks, others their own.
pub struct MjLogsTable {
    ctx: Console,
    table: PagedTable<MjTask>,
    filter: MjLogsFilter,
}

impl MjLogsTable {
    pub fn new(ctx: Console) -> Self {
        Self {
            ctx,
            table: PagedTable::new(ITEMS_PER_PAGE),
            filter: MjLogsFilter::default(),
        }
    }

    pub fn table(&self) -> &PagedTable<MjTask> {
        &self.table
    }

    pub fn filter(&self) -> &MjLogsFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: MjLogsFilter) {
        self.filter = filter;
    }

    /// Admin hint that task callbacks are off unless the operator has
    /// enabled them.
    pub fn show_callback_banner(&self) -> bool {
        self.ctx.auth.is_admin() && !self.ctx.store.get_bool(StoreKey::MjNotifyEnabled)
    }

    /// The log never knows its total; it always offers one more page.
    pub fn total_hint(&self) -> usize {
        self.table.len() + self.table.page_size()
    }

    async fn load(&mut self, page_index: usize) -> Result<()> {
        let query = self.ctx.report(self.filter.to_query())?;
        let result = if self.ctx.auth.is_admin() {
            self.ctx.api.list_mj_tasks(page_index, &query).await
        } else {
            self.ctx.api.list_self_mj_tasks(page_index, &query).await
        };
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        if page_index == 0 {
            self.table.replace(rows);
        } else {
            self.table.merge_page(page_index, rows);
        }
        Ok(())
    }

    pub async fn set_page(&mut self, page: usize) -> Result<()> {
        let fetch = self.table.needs_fetch(page);
        self.table.set_active_page(page);
        if fetch {
            self.load(page - 1).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Refresh for MjLogsTable {
    async fn refresh(&mut self) -> Result<()> {
        self.table.set_active_page(1);
        self.load(0).await
    }
}

pub fn action_label(action: &str) -> &'static str {
    match action {
        "IMAGINE" => "Drawing",
        "UPSCALE" => "Upscale",
        "VARIATION" => "Variation",
        "HIGH_VARIATION" => "High Variation",
        "LOW_VARIATION" => "Low Variation",
        "PAN" => "Pan",
        "DESCRIBE" => "Image to Text",
        "BLEND" => "Blend",
        "SHORTEN" => "Shorten",
        "REROLL" => "Reroll",
        "INPAINT" => "Inpaint-Submit",
        "ZOOM" => "Zoom",
        "CUSTOM_ZOOM" => "Custom Zoom-Submit",
        "MODAL" => "Modal Processing",
        "SWAP_FACE" => "Face Swap",
        _ => "Unknown",
    }
}

/// Result of submitting the task upstream.
pub fn code_label(code: i64) -> &'static str {
    match code {
        1 => "Submitted",
        21 => "Waiting",
        22 => "Duplicate Submission",
        0 => "Not Submitted",
        _ => "Unknown",
    }
}

pub fn status_label(status: &str) -> &'static str {
    match status {
        "SUCCESS" => "Success",
        "NOT_START" => "Not Started",
        "SUBMITTED" => "In Queue",
        "IN_PROGRESS" => "In Progress",
        "FAILURE" => "Failed",
        "MODAL" => "Modal Waiting",
        _ => "Unknown",
    }
}
