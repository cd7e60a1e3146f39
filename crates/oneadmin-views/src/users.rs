use std::cmp::Ordering;

use async_trait::async_trait;
use oneadmin_api::user::User;
use oneadmin_core::types::UserAction;
use oneadmin_core::{ConsoleError, Result};

use crate::context::{Console, Refresh};
use crate::table::{PagedTable, ITEMS_PER_PAGE};

/// Columns the user list can be sorted by locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortKey {
    Id,
    Username,
    Group,
    Quota,
    UsedQuota,
    RequestCount,
    Role,
    Status,
}

impl UserSortKey {
    fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            UserSortKey::Id => a.id.cmp(&b.id),
            UserSortKey::Username => a.username.cmp(&b.username),
            UserSortKey::Group => a.group.cmp(&b.group),
            UserSortKey::Quota => a.quota.cmp(&b.quota),
            UserSortKey::UsedQuota => a.used_quota.cmp(&b.used_quota),
            UserSortKey::RequestCount => a.request_count.cmp(&b.request_count),
            UserSortKey::Role => a.role.code().cmp(&b.role.code()),
            UserSortKey::Status => a.status.code().cmp(&b.status.code()),
        }
    }
}

/// Admin user list. Pages are appended as they are fetched.
pub struct UsersTable {
    ctx: Console,
    table: PagedTable<User>,
    order: String,
    keyword: String,
}

impl UsersTable {
    pub fn new(ctx: Console) -> Self {
        Self {
            ctx,
            table: PagedTable::new(ITEMS_PER_PAGE),
            order: String::new(),
            keyword: String::new(),
        }
    }

    pub fn table(&self) -> &PagedTable<User> {
        &self.table
    }

    pub fn user(&self, id: i64) -> Option<&User> {
        self.table.find(id)
    }

    /// Pager total: one extra row while the active page is full.
    pub fn total_hint(&self) -> usize {
        let len = self.table.len();
        if len >= self.table.active_page() * self.table.page_size() {
            len + 1
        } else {
            len
        }
    }

    pub async fn open(&mut self) -> Result<()> {
        self.ctx.auth.require_admin()?;
        self.load(0).await
    }

    async fn load(&mut self, page_index: usize) -> Result<()> {
        let result = self.ctx.api.list_users(page_index, &self.order).await;
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        if page_index == 0 {
            self.table.replace(rows);
        } else {
            self.table.append(rows);
        }
        Ok(())
    }

    pub async fn set_page(&mut self, page: usize) -> Result<()> {
        if self.table.needs_fetch(page) {
            self.load(page - 1).await?;
        }
        self.table.set_active_page(page);
        Ok(())
    }

    /// Server-side ordering (e.g. `quota`, `used_quota`); empty for the
    /// default. Reloads from the first page.
    pub async fn set_order(&mut self, order: &str) -> Result<()> {
        self.order = order.to_string();
        self.table.set_active_page(1);
        self.load(0).await
    }

    pub async fn search(&mut self, keyword: &str) -> Result<()> {
        self.keyword = keyword.trim().to_string();
        if self.keyword.is_empty() {
            self.order.clear();
            self.load(0).await?;
            self.table.set_active_page(1);
            return Ok(());
        }
        let result = self.ctx.api.search_users(&self.keyword).await;
        let rows = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.table.replace(rows);
        self.table.set_active_page(1);
        Ok(())
    }

    /// Sorts the cached rows by `key`. Sorting twice by the same key flips
    /// the direction: when ascending order leaves the first row in place
    /// the list is reversed.
    pub fn sort_by(&mut self, key: UserSortKey) {
        let Some(first) = self.table.rows().first().map(|u| u.id) else {
            return;
        };
        self.table.sort_by(|a, b| key.compare(a, b));
        if self.table.rows().first().map(|u| u.id) == Some(first) {
            self.table.reverse();
        }
    }

    pub async fn manage(&mut self, id: i64, action: UserAction) -> Result<()> {
        let result = self.apply(id, action).await;
        self.ctx.report(result)?;
        self.ctx.notifier.success("Operation completed successfully!");
        Ok(())
    }

    async fn apply(&mut self, id: i64, action: UserAction) -> Result<()> {
        let username = self
            .table
            .find(id)
            .map(|u| u.username.clone())
            .ok_or_else(|| ConsoleError::validation(format!("User {} is not in the list", id)))?;
        let managed = self.ctx.api.manage_user(&username, action).await?;
        if action == UserAction::Delete {
            self.table.remove_by_id(id);
        } else if let Some(row) = self.table.find_mut(id) {
            row.status = managed.status;
            row.role = managed.role;
        }
        Ok(())
    }
}

#[async_trait]
impl Refresh for UsersTable {
    async fn refresh(&mut self) -> Result<()> {
        if self.keyword.is_empty() {
            let page = self.table.active_page();
            // appended pages are refetched from the start
            if page == 1 {
                return self.load(0).await;
            }
            self.table.replace(Vec::new());
            for index in 0..page {
                self.load(index).await?;
            }
            Ok(())
        } else {
            let keyword = self.keyword.clone();
            self.search(&keyword).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use oneadmin_api::Method;
    use oneadmin_core::render::QuotaDisplay;
    use oneadmin_core::types::{UserRole, UserStatus};
    use serde_json::{json, Value};

    fn users(ids: std::ops::Range<i64>) -> Value {
        Value::Array(
            ids.map(|id| {
                json!({
                    "id": id,
                    "username": format!("user{:02}", id),
                    "quota": 1000 - id,
                    "role": 1,
                    "status": 1
                })
            })
            .collect(),
        )
    }

    #[tokio::test]
    async fn open_requires_admin() {
        let h = harness();
        h.login_as(UserRole::Common);
        let mut t = UsersTable::new(h.console.clone());
        assert!(t.open().await.is_err());
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn later_pages_are_appended() {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock
            .ok(Method::Get, "/api/user/", users(1..11))
            .ok(Method::Get, "/api/user/", users(11..14));
        let mut t = UsersTable::new(h.console.clone());
        t.open().await.unwrap();
        assert_eq!(t.total_hint(), 11);

        t.set_page(2).await.unwrap();
        assert_eq!(h.mock.count(Method::Get, "/api/user/"), 2);
        assert_eq!(t.table().len(), 13);
        assert_eq!(t.table().page_rows().len(), 3);
        assert_eq!(t.total_hint(), 13);
    }

    #[tokio::test]
    async fn configured_page_size_does_not_change_server_pages() {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock
            .ok(Method::Get, "/api/user/", users(1..11))
            .ok(Method::Get, "/api/user/", users(11..21));
        let ctx = h.console.clone().with_display(QuotaDisplay::default(), 20);
        let mut t = UsersTable::new(ctx);
        t.open().await.unwrap();
        assert_eq!(t.table().page_size(), ITEMS_PER_PAGE);
        assert_eq!(t.total_hint(), 11);

        t.set_page(2).await.unwrap();
        assert_eq!(h.mock.count(Method::Get, "/api/user/"), 2);
        assert_eq!(h.mock.last().unwrap().query_value("p"), Some("1"));
        let ids: Vec<i64> = t.table().page_rows().iter().map(|u| u.id).collect();
        assert_eq!(ids, (11..21).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn promote_updates_role_and_delete_removes_row() {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock
            .ok(Method::Get, "/api/user/", users(1..4))
            .ok(Method::Post, "/api/user/manage", json!({"role": 10, "status": 1}))
            .ok(Method::Post, "/api/user/manage", Value::Null);
        let mut t = UsersTable::new(h.console.clone());
        t.open().await.unwrap();

        t.manage(2, UserAction::Promote).await.unwrap();
        assert_eq!(
            h.mock.last().unwrap().body,
            Some(json!({"username": "user02", "action": "promote"}))
        );
        assert_eq!(t.user(2).unwrap().role, UserRole::Admin);
        assert_eq!(t.user(2).unwrap().status, UserStatus::Enabled);

        t.manage(3, UserAction::Delete).await.unwrap();
        assert!(t.user(3).is_none());
        assert_eq!(t.table().len(), 2);
    }

    #[tokio::test]
    async fn sort_toggles_direction() {
        let h = harness();
        h.login_as(UserRole::Admin);
        h.mock.ok(Method::Get, "/api/user/", users(1..4));
        let mut t = UsersTable::new(h.console.clone());
        t.open().await.unwrap();

        // ids ascending already: the first sort reverses
        t.sort_by(UserSortKey::Id);
        assert_eq!(t.table().rows()[0].id, 3);
        t.sort_by(UserSortKey::Id);
        assert_eq!(t.table().rows()[0].id, 1);

        // quota is descending by id, so ascending quota starts at id 3
        t.sort_by(UserSortKey::Quota);
        assert_eq!(t.table().rows()[0].id, 3);
    }

    #[tokio::test]
    async fn blank_search_reloads() {
        let h = harness();
        h.login_as(UserRole::Admin);
        h.mock.ok(Method::Get, "/api/user/", users(1..2));
        let mut t = UsersTable::new(h.console.clone());
        t.search("   ").await.unwrap();
        assert_eq!(h.mock.count(Method::Get, "/api/user/search"), 0);
        assert_eq!(h.mock.count(Method::Get, "/api/user/"), 1);
    }
}
