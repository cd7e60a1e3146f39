use async_trait::async_trait;
use oneadmin_api::oauth::TelegramAuth;
use oneadmin_api::user::User;
use oneadmin_core::{ConsoleError, Result};
use serde_json::json;
use tracing::info;

use crate::context::{Console, Refresh};
use crate::navigate::Route;

/// The signed-in user's own account page.
pub struct PersonalSettings {
    ctx: Console,
    aff_link: Option<String>,
    models: Vec<String>,
    access_token: Option<String>,
}

impl PersonalSettings {
    pub fn new(ctx: Console) -> Result<Self> {
        ctx.auth.require_user()?;
        Ok(Self {
            ctx,
            aff_link: None,
            models: Vec::new(),
            access_token: None,
        })
    }

    /// Re-reads the profile and pushes it into the auth context.
    pub async fn refresh_profile(&mut self) -> Result<User> {
        let result = self.ctx.api.get_self().await;
        let user = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.auth.login(user.clone())?;
        Ok(user)
    }

    pub async fn load_models(&mut self) -> Result<&[String]> {
        let result = self.ctx.api.available_models().await;
        self.models = self.ctx.report(result.map_err(ConsoleError::from))?;
        Ok(&self.models)
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Issues a new system access token; the old one stops working.
    pub async fn generate_access_token(&mut self) -> Result<String> {
        let result = self.ctx.api.generate_access_token().await;
        let token = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .success("Token has been reset and copied to clipboard");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// `<origin>/register?aff=<code>`, fetched once.
    pub async fn invite_link(&mut self) -> Result<String> {
        if let Some(link) = &self.aff_link {
            return Ok(link.clone());
        }
        let result = self.ctx.api.get_aff_code().await;
        let code = self.ctx.report(result.map_err(ConsoleError::from))?;
        let link = format!("{}/register?aff={}", self.ctx.origin, code);
        self.aff_link = Some(link.clone());
        Ok(link)
    }

    pub async fn change_password(&mut self, password: &str, confirm: &str) -> Result<()> {
        if password != confirm {
            return self.ctx.report(Err(ConsoleError::validation(
                "The two passwords entered do not match!",
            )));
        }
        let result = self
            .ctx
            .api
            .update_self(json!({ "password": password }))
            .await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.success("Password changed successfully!");
        Ok(())
    }

    /// Moves affiliate rewards into the balance. At least one currency unit
    /// worth of quota must move.
    pub async fn transfer_aff_quota(&mut self, quota: i64) -> Result<()> {
        let display = self.ctx.quota_display();
        let minimum = display.quota_per_unit as i64;
        if quota < minimum {
            let msg = format!(
                "Minimum transfer amount is {}",
                oneadmin_core::render::render_quota(minimum, &display, 2)
            );
            return self.ctx.report(Err(ConsoleError::validation(msg)));
        }
        let result = self.ctx.api.transfer_aff_quota(quota).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.success("Transfer successful!");
        self.refresh_profile().await?;
        Ok(())
    }

    pub async fn send_verification(&mut self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter email address!")));
        }
        let result = self.ctx.api.send_verification(email).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .success("Verification code sent successfully, please check your email!");
        Ok(())
    }

    pub async fn bind_email(&mut self, email: &str, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return self.ctx.report(Err(ConsoleError::validation(
                "Please enter email verification code!",
            )));
        }
        let email = email.trim();
        let result = self.ctx.api.bind_email(email, code.trim()).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.auth.update(|u| u.email = email.to_string())?;
        self.ctx.notifier.success("Email account bound successfully!");
        Ok(())
    }

    /// Starts binding a GitHub account.
    pub async fn github_bind_url(&mut self) -> Result<Route> {
        crate::auth::github_authorize_url(&self.ctx).await
    }

    pub async fn bind_telegram(&mut self, auth: &TelegramAuth) -> Result<()> {
        let result = self.ctx.api.telegram_bind(auth).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.success("Telegram account bound successfully!");
        self.refresh_profile().await?;
        Ok(())
    }

    /// Deletes the account. `confirmation` must repeat the username.
    pub async fn delete_account(&mut self, confirmation: &str) -> Result<Route> {
        let user = self.ctx.auth.require_user()?;
        if confirmation != user.username {
            return self.ctx.report(Err(ConsoleError::validation(
                "Please enter your account name to confirm deletion!",
            )));
        }
        let result = self.ctx.api.delete_self().await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.notifier.success("Account has been deleted!");
        // the session is gone server-side; a failed logout changes nothing
        if let Err(e) = self.ctx.api.logout().await {
            tracing::debug!(error = %e, "logout after account deletion");
        }
        self.ctx.auth.logout()?;
        info!(username = %user.username, "account deleted");
        Ok(Route::Login)
    }
}

/// The profile editor refreshes this page after a save.
#[async_trait]
impl Refresh for PersonalSettings {
    async fn refresh(&mut self) -> Result<()> {
        self.refresh_profile().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::harness;
    use oneadmin_api::site::SiteStatus;
    use oneadmin_api::Method;
    use oneadmin_core::types::UserRole;
    use oneadmin_session::StoreKey;
    use serde_json::Value;

    #[tokio::test]
    async fn invite_link_uses_origin_and_is_cached() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock.ok(Method::Get, "/api/user/aff", json!("Ab12"));
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        let link = page.invite_link().await.unwrap();
        assert_eq!(link, "https://console.example.com/register?aff=Ab12");
        page.invite_link().await.unwrap();
        assert_eq!(h.mock.count(Method::Get, "/api/user/aff"), 1);
    }

    #[tokio::test]
    async fn password_mismatch_is_local() {
        let h = harness();
        h.login_as(UserRole::Common);
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        assert!(page.change_password("a-long-pass", "another").await.is_err());
        assert!(h.notes.contains(Level::Info, "do not match"));
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn transfer_below_one_unit_is_rejected() {
        let h = harness();
        h.login_as(UserRole::Common);
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        assert!(page.transfer_aff_quota(1000).await.is_err());
        assert!(h.notes.contains(Level::Info, "Minimum transfer amount is"));
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn bind_email_updates_current_user() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock.ok(Method::Get, "/api/oauth/email/bind", Value::Null);
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        assert!(page.bind_email("me@example.com", "").await.is_err());
        assert!(h.mock.requests().is_empty());

        page.bind_email("me@example.com", "123456").await.unwrap();
        assert_eq!(h.console.auth.current().unwrap().email, "me@example.com");
        let req = h.mock.last().unwrap();
        assert_eq!(req.query_value("code"), Some("123456"));
    }

    #[tokio::test]
    async fn github_bind_url_carries_state() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.console
            .status
            .set(SiteStatus {
                github_oauth: true,
                github_client_id: "cid".into(),
                ..Default::default()
            })
            .unwrap();
        h.mock.ok(Method::Get, "/api/oauth/state", json!("xyz"));
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        let route = page.github_bind_url().await.unwrap();
        assert_eq!(
            route.path(),
            "https://github.com/login/oauth/authorize?client_id=cid&state=xyz&scope=user:email"
        );
    }

    #[tokio::test]
    async fn delete_account_requires_username_and_logs_out() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock
            .ok(Method::Delete, "/api/user/self", Value::Null)
            .ok(Method::Get, "/api/user/logout", Value::Null);
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();

        assert!(page.delete_account("someone").await.is_err());
        assert_eq!(h.mock.count(Method::Delete, "/api/user/self"), 0);

        let route = page.delete_account("root").await.unwrap();
        assert_eq!(route, Route::Login);
        assert!(!h.console.auth.is_logged_in());
        assert!(h.console.store.get(StoreKey::User).is_none());
        assert_eq!(h.mock.count(Method::Get, "/api/user/logout"), 1);
    }

    #[tokio::test]
    async fn profile_edit_refreshes_page() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock
            .ok(Method::Get, "/api/user/self", json!({"id": 1, "username": "root", "display_name": "Old", "role": 1, "status": 1}))
            .ok(Method::Put, "/api/user/self", Value::Null)
            .ok(Method::Get, "/api/user/self", json!({"id": 1, "username": "root", "display_name": "New", "role": 1, "status": 1}));
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        let mut editor = crate::edit_user::UserEditor::open(h.console.clone(), None)
            .await
            .unwrap();
        editor.draft_mut().display_name = "New".into();
        editor.submit(&mut page).await.unwrap();
        assert_eq!(h.console.auth.current().unwrap().display_name, "New");
        assert!(!editor.is_open());
    }

    #[tokio::test]
    async fn access_token_regeneration() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock.ok(Method::Get, "/api/user/token", json!("tok-123"));
        let mut page = PersonalSettings::new(h.console.clone()).unwrap();
        assert_eq!(page.generate_access_token().await.unwrap(), "tok-123");
        assert_eq!(page.access_token(), Some("tok-123"));
    }
}
