use oneadmin_api::user::{NewUser, UserUpdate};
use oneadmin_core::{ConsoleError, Result};
use tracing::info;

use crate::context::{Console, Refresh};

const MIN_PASSWORD_LEN: usize = 8;

/// Edits a user's profile. Admins open any user by id; everyone else edits
/// their own account through `/api/user/self`.
pub struct UserEditor {
    ctx: Console,
    id: Option<i64>,
    draft: UserUpdate,
    groups: Vec<String>,
    visible: bool,
}

impl UserEditor {
    pub async fn open(ctx: Console, id: Option<i64>) -> Result<Self> {
        let result = match id {
            Some(id) => ctx.api.get_user(id).await,
            None => ctx.api.get_self().await,
        };
        let user = ctx.report(result.map_err(ConsoleError::from))?;
        let mut draft = UserUpdate::from(&user);
        if id.is_none() {
            draft.id = None;
        }
        Ok(Self {
            ctx,
            id,
            draft,
            groups: Vec::new(),
            visible: true,
        })
    }

    /// Group choices; only admins may change a user's group.
    pub async fn load_groups(&mut self) -> Result<()> {
        self.ctx.auth.require_admin()?;
        let result = self.ctx.api.list_groups().await;
        self.groups = self.ctx.report(result.map_err(ConsoleError::from))?;
        Ok(())
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn draft(&self) -> &UserUpdate {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut UserUpdate {
        &mut self.draft
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    /// Quota arrives as text from the form.
    pub fn set_quota(&mut self, raw: &str) -> Result<()> {
        let quota = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConsoleError::validation("Please enter a valid integer!"));
        self.draft.quota = self.ctx.report(quota)?;
        Ok(())
    }

    pub async fn submit(&mut self, parent: &mut impl Refresh) -> Result<()> {
        if self.draft.username.trim().is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter a username!")));
        }
        let result = match self.id {
            Some(_) => self.ctx.api.update_user(&self.draft).await,
            None => {
                let body = serde_json::to_value(&self.draft).map_err(ConsoleError::from);
                let body = self.ctx.report(body)?;
                self.ctx.api.update_self(body).await
            }
        };
        self.ctx.report(result.map_err(ConsoleError::from))?;
        info!(username = %self.draft.username, "user updated");
        self.ctx
            .notifier
            .success("User information updated successfully!");
        self.draft.password.clear();
        self.visible = false;
        parent.refresh().await
    }
}

/// Admin panel for adding an account.
pub struct UserCreator {
    ctx: Console,
    draft: NewUser,
    visible: bool,
}

impl UserCreator {
    pub fn new(ctx: Console) -> Self {
        Self {
            ctx,
            draft: NewUser::default(),
            visible: true,
        }
    }

    pub fn draft_mut(&mut self) -> &mut NewUser {
        &mut self.draft
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    fn validate(&self) -> Result<()> {
        if self.draft.username.trim().is_empty() {
            return Err(ConsoleError::validation("Please enter a username!"));
        }
        if self.draft.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ConsoleError::validation(
                "Password must be at least 8 characters long!",
            ));
        }
        Ok(())
    }

    pub async fn submit(&mut self, parent: &mut impl Refresh) -> Result<()> {
        self.ctx.report(self.validate())?;
        let result = self.ctx.api.create_user(&self.draft).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        info!(username = %self.draft.username, "user created");
        self.ctx.notifier.success("User account created successfully!");
        self.draft = NewUser::default();
        self.visible = false;
        parent.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::harness;
    use async_trait::async_trait;
    use oneadmin_api::Method;
    use oneadmin_core::types::UserRole;
    use serde_json::json;

    #[derive(Default)]
    struct Parent(usize);

    #[async_trait]
    impl Refresh for Parent {
        async fn refresh(&mut self) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn admin_edit_clears_password_and_puts_with_id() {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock
            .ok(
                Method::Get,
                "/api/user/5",
                json!({"id": 5, "username": "alice", "quota": 10, "group": "default"}),
            )
            .ok(Method::Put, "/api/user/", json!(null));
        let mut parent = Parent::default();
        let mut ed = UserEditor::open(h.console.clone(), Some(5)).await.unwrap();
        assert!(ed.draft().password.is_empty());

        ed.set_quota("2500").unwrap();
        assert!(ed.set_quota("lots").is_err());
        ed.submit(&mut parent).await.unwrap();

        let body = h.mock.last().unwrap().body.unwrap();
        assert_eq!(body["id"], 5);
        assert_eq!(body["quota"], 2500);
        assert_eq!(parent.0, 1);
        assert!(!ed.is_open());
        assert!(h.notes.contains(Level::Success, "updated successfully"));
    }

    #[tokio::test]
    async fn self_edit_targets_self_endpoint() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock
            .ok(Method::Get, "/api/user/self", json!({"id": 1, "username": "root"}))
            .ok(Method::Put, "/api/user/self", json!(null));
        let mut parent = Parent::default();
        let mut ed = UserEditor::open(h.console.clone(), None).await.unwrap();
        ed.draft_mut().display_name = "Me".into();
        ed.submit(&mut parent).await.unwrap();

        let req = h.mock.last().unwrap();
        assert_eq!(req.path, "/api/user/self");
        assert!(req.body.unwrap().get("id").is_none());
    }

    #[tokio::test]
    async fn empty_username_blocks_request() {
        let h = harness();
        h.mock.ok(Method::Get, "/api/user/self", json!({"id": 1, "username": "root"}));
        let mut parent = Parent::default();
        let mut ed = UserEditor::open(h.console.clone(), None).await.unwrap();
        ed.draft_mut().username.clear();
        assert!(ed.submit(&mut parent).await.is_err());
        assert_eq!(h.mock.count(Method::Put, "/api/user/self"), 0);
        assert!(ed.is_open());
    }

    #[tokio::test]
    async fn creator_checks_password_length() {
        let h = harness();
        h.mock.ok(Method::Post, "/api/user/", json!(null));
        let mut parent = Parent::default();
        let mut c = UserCreator::new(h.console.clone());
        c.draft_mut().username = "bob".into();
        c.draft_mut().password = "short".into();
        assert!(c.submit(&mut parent).await.is_err());
        assert!(h.mock.requests().is_empty());

        c.draft_mut().password = "long enough".into();
        c.submit(&mut parent).await.unwrap();
        assert_eq!(h.mock.count(Method::Post, "/api/user/"), 1);
        assert_eq!(parent.0, 1);
        assert!(!c.is_open());
    }
}
