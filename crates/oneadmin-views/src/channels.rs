use std::collections::BTreeSet;

use async_trait::async_trait;
use oneadmin_api::channel::{Channel, ChannelPatch, ChannelSearch, TestScope};
use oneadmin_core::types::ChannelStatus;
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::StoreKey;
use tracing::{debug, instrument};

use crate::context::{Console, Refresh};
use crate::table::PagedTable;

/// Inline controls on a channel row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelAction {
    Delete,
    Enable,
    Disable,
    /// Raw text from the priority cell; empty is ignored.
    Priority(String),
    /// Raw text from the weight cell; empty is ignored, negatives clamp to 0.
    Weight(String),
}

/// The channel list: paging, search, inline edits and bulk operations.
pub struct ChannelsTable {
    ctx: Console,
    table: PagedTable<Channel>,
    id_sort: bool,
    search: ChannelSearch,
    groups: Vec<String>,
    selected: BTreeSet<i64>,
    loading: bool,
}

impl ChannelsTable {
    /// Restores the persisted page size and id-sort preference.
    pub fn new(ctx: Console) -> Self {
        let page_size = ctx.store.get_usize(StoreKey::PageSize).unwrap_or(ctx.page_size);
        let id_sort = ctx.store.get_bool(StoreKey::IdSort);
        Self {
            ctx,
            table: PagedTable::new(page_size),
            id_sort,
            search: ChannelSearch::default(),
            groups: Vec::new(),
            selected: BTreeSet::new(),
            loading: false,
        }
    }

    pub fn table(&self) -> &PagedTable<Channel> {
        &self.table
    }

    pub fn id_sort(&self) -> bool {
        self.id_sort
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn channel(&self, id: i64) -> Option<&Channel> {
        self.table.find(id)
    }

    /// First page plus the group list.
    pub async fn open(&mut self) -> Result<()> {
        self.load(0).await?;
        self.fetch_groups().await
    }

    #[instrument(skip(self), fields(page_size = self.table.page_size(), id_sort = self.id_sort))]
    async fn load(&mut self, page_index: usize) -> Result<()> {
        self.loading = true;
        let result = self
            .ctx
            .api
            .list_channels(page_index, self.table.page_size(), self.id_sort)
            .await;
        self.loading = false;
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        debug!(rows = rows.len(), "channels loaded");
        if page_index == 0 {
            self.table.replace(rows);
        } else {
            self.table.merge_page(page_index, rows);
        }
        Ok(())
    }

    pub async fn fetch_groups(&mut self) -> Result<()> {
        let groups = self.ctx.api.list_groups().await.map_err(ConsoleError::from);
        self.groups = self.ctx.report(groups)?;
        Ok(())
    }

    /// Moves to `page`, fetching once when it is the first page past the
    /// cache.
    pub async fn set_page(&mut self, page: usize) -> Result<()> {
        let fetch = self.table.needs_fetch(page);
        self.table.set_active_page(page);
        if fetch {
            self.load(page - 1).await?;
        }
        Ok(())
    }

    pub async fn set_page_size(&mut self, size: usize) -> Result<()> {
        let size = size.max(1);
        self.ctx.store.set(StoreKey::PageSize, size.to_string())?;
        self.table.set_page_size(size);
        self.load(0).await
    }

    pub async fn set_id_sort(&mut self, id_sort: bool) -> Result<()> {
        self.id_sort = id_sort;
        self.ctx.store.set(StoreKey::IdSort, id_sort.to_string())?;
        self.table.set_active_page(1);
        self.load(0).await
    }

    /// Filters by keyword, group and model. With every filter empty the
    /// regular first page is loaded instead.
    pub async fn search(&mut self, search: ChannelSearch) -> Result<()> {
        self.search = search;
        if self.search.is_empty() {
            self.load(0).await?;
            self.table.set_active_page(1);
            return Ok(());
        }
        let result = self.ctx.api.search_channels(&self.search).await;
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.table.replace(rows);
        self.table.set_active_page(1);
        Ok(())
    }

    /// Applies an inline action. Returns `false` when the action was a
    /// no-op (an empty priority or weight cell).
    #[instrument(skip(self))]
    pub async fn manage(&mut self, id: i64, action: ChannelAction) -> Result<bool> {
        let result = self.apply(id, action).await;
        let applied = self.ctx.report(result)?;
        if applied {
            self.ctx.notifier.success("Operation completed successfully!");
        }
        Ok(applied)
    }

    async fn apply(&mut self, id: i64, action: ChannelAction) -> Result<bool> {
        let mut patch = ChannelPatch {
            id,
            ..Default::default()
        };
        match action {
            ChannelAction::Delete => {
                self.ctx.api.delete_channel(id).await?;
                self.table.remove_by_id(id);
                self.selected.remove(&id);
                return Ok(true);
            }
            ChannelAction::Enable => patch.status = Some(ChannelStatus::Enabled),
            ChannelAction::Disable => patch.status = Some(ChannelStatus::ManuallyDisabled),
            ChannelAction::Priority(value) => match parse_cell(&value)? {
                Some(p) => patch.priority = Some(p),
                None => return Ok(false),
            },
            ChannelAction::Weight(value) => match parse_cell(&value)? {
                Some(w) => patch.weight = Some(w.max(0)),
                None => return Ok(false),
            },
        }

        let stored = self.ctx.api.patch_channel(&patch).await?;
        if let Some(row) = self.table.find_mut(id) {
            row.status = stored.status;
            if let Some(p) = patch.priority {
                row.priority = Some(p);
            }
            if let Some(w) = patch.weight {
                row.weight = Some(w);
            }
        }
        Ok(true)
    }

    /// Sends one test request through the channel and records its latency.
    /// Without `model` the gateway picks the channel's first model.
    pub async fn test(&mut self, id: i64, model: Option<&str>) -> Result<f64> {
        let result = self
            .ctx
            .api
            .test_channel(id, model.unwrap_or_default())
            .await;
        let secs = self.ctx.report(result.map_err(ConsoleError::from))?;
        let name = match self.table.find_mut(id) {
            Some(row) => {
                row.response_time = (secs * 1000.0).round() as i64;
                row.test_time = chrono::Utc::now().timestamp();
                row.name.clone()
            }
            None => id.to_string(),
        };
        self.ctx.notifier.info(&format!(
            "Channel {} test successful, took {:.2} seconds.",
            name, secs
        ));
        Ok(secs)
    }

    pub async fn test_all(&mut self, scope: TestScope) -> Result<()> {
        let result = self.ctx.api.test_all_channels(scope).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.info(
            "Channel testing started successfully, please refresh the page to view results.",
        );
        Ok(())
    }

    pub async fn delete_disabled(&mut self) -> Result<i64> {
        let result = self.ctx.api.delete_disabled_channels().await;
        let count = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .success(&format!("Deleted all disabled channels, total: {}", count));
        self.refresh().await?;
        Ok(count)
    }

    pub async fn update_balance(&mut self, id: i64) -> Result<f64> {
        let result = self.ctx.api.update_channel_balance(id).await;
        let balance = self.ctx.report(result.map_err(ConsoleError::from))?;
        let name = match self.table.find_mut(id) {
            Some(row) => {
                row.balance = balance;
                row.balance_updated_time = chrono::Utc::now().timestamp();
                row.name.clone()
            }
            None => id.to_string(),
        };
        self.ctx
            .notifier
            .info(&format!("Channel {} balance updated successfully!", name));
        Ok(balance)
    }

    pub async fn update_all_balances(&mut self) -> Result<()> {
        let result = self.ctx.api.update_all_channel_balances().await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .info("All enabled channel balances have been updated!");
        Ok(())
    }

    pub fn select(&mut self, id: i64) {
        self.selected.insert(id);
    }

    pub fn deselect(&mut self, id: i64) {
        self.selected.remove(&id);
    }

    pub fn selected(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    /// Deletes every selected channel in one request.
    pub async fn batch_delete(&mut self) -> Result<i64> {
        if self.selected.is_empty() {
            return self.ctx.report(Err(ConsoleError::Rejected(
                "Please select channels to delete first!".to_string(),
            )));
        }
        let ids = self.selected();
        let result = self.ctx.api.batch_delete_channels(&ids).await;
        let count = self.ctx.report(result.map_err(ConsoleError::from))?;
        for id in &ids {
            self.table.remove_by_id(*id);
        }
        self.selected.clear();
        self.ctx
            .notifier
            .success(&format!("Deleted {} channels!", count));
        Ok(count)
    }

    /// Rebuilds the gateway's model/group ability index.
    pub async fn fix_abilities(&mut self) -> Result<i64> {
        let result = self.ctx.api.fix_channel_abilities().await;
        let count = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.success(&format!("Fixed {} channels!", count));
        Ok(count)
    }
}

#[async_trait]
impl Refresh for ChannelsTable {
    async fn refresh(&mut self) -> Result<()> {
        let page = self.table.active_page();
        self.load(page - 1).await
    }
}

/// Empty cell means "leave unchanged".
fn parse_cell(value: &str) -> Result<Option<i64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ConsoleError::validation("Please enter a valid integer!"))
}
