use async_trait::async_trait;
use oneadmin_api::redemption::Redemption;
use oneadmin_core::{ConsoleError, Result};

use crate::context::{Console, Refresh};
use crate::table::{PagedTable, ITEMS_PER_PAGE};

pub struct RedemptionsTable {
    ctx: Console,
    table: PagedTable<Redemption>,
    keyword: String,
}

impl RedemptionsTable {
    pub fn new(ctx: Console) -> Self {
        Self {
            ctx,
            table: PagedTable::new(ITEMS_PER_PAGE),
            keyword: String::new(),
        }
    }

    pub fn table(&self) -> &PagedTable<Redemption> {
        &self.table
    }

    pub async fn open(&mut self) -> Result<()> {
        self.ctx.auth.require_admin()?;
        self.load(0).await
    }

    async fn load(&mut self, page_index: usize) -> Result<()> {
        let result = self.ctx.api.list_redemptions(page_index).await;
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

    pub async fn search(&mut self, keyword: &str) -> Result<()> {
        self.keyword = keyword.trim().to_string();
        if self.keyword.is_empty() {
            self.table.set_active_page(1);
            return self.load(0).await;
        }
        let result = self.ctx.api.search_redemptions(&self.keyword).await;
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.table.replace(rows);
        self.table.set_active_page(1);
        Ok(())
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        let result = self.ctx.api.delete_redemption(id).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.table.remove_by_id(id);
        self.ctx.notifier.success("Operation completed successfully!");
        Ok(())
    }
}

#[async_trait]
impl Refresh for RedemptionsTable {
    async fn refresh(&mut self) -> Result<()> {
        if self.keyword.is_empty() {
            let page = self.table.active_page();
            self.load(page - 1).await
        } else {
            let keyword = self.keyword.clone();
            self.search(&keyword).await
        }
    }
}
