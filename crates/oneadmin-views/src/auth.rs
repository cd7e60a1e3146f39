//! Login, registration, OAuth callbacks and logout.

use oneadmin_api::oauth::TelegramAuth;
use oneadmin_api::user::{RegisterForm, User};
use oneadmin_core::{ConsoleError, Result};
use oneadmin_session::StoreKey;
use tracing::{info, warn};

use crate::context::Console;
use crate::navigate::Route;

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const MIN_PASSWORD_LEN: usize = 8;
const VSCODE_SOURCE: &str = "vscode";

/// GitHub authorize URL with a fresh anti-CSRF state from the gateway.
pub async fn github_authorize_url(ctx: &Console) -> Result<Route> {
    let status = ctx.status.get();
    if !status.github_oauth || status.github_client_id.is_empty() {
        return ctx.report(Err(ConsoleError::validation(
            "GitHub OAuth is not enabled on this site",
        )));
    }
    let result = ctx.api.oauth_state().await;
    let state = ctx.report(result.map_err(ConsoleError::from))?;
    Ok(Route::External(format!(
        "{}?client_id={}&state={}&scope=user:email",
        GITHUB_AUTHORIZE_URL, status.github_client_id, state
    )))
}

/// Landing page an editor extension opens after it has been signed in.
/// Built from the redirect's query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorAuthSuccess {
    pub token: Option<String>,
    pub username: Option<String>,
    pub session_id: Option<String>,
    /// `local` unless the sign-in went through a Coder deployment.
    pub provider: String,
}

impl EditorAuthSuccess {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut page = Self::default();
        for (key, value) in pairs {
            let value = Some(value.to_string()).filter(|v| !v.is_empty());
            match key {
                "token" => page.token = value,
                "username" => page.username = value,
                "session_id" => page.session_id = value,
                "provider" => page.provider = value.unwrap_or_default(),
                _ => {}
            }
        }
        if page.provider.is_empty() {
            page.provider = "local".to_string();
        }
        page
    }

    pub fn is_coder(&self) -> bool {
        self.provider == "coder"
    }

    pub fn title(&self) -> &'static str {
        if self.is_coder() {
            "Coder Integration Successful!"
        } else {
            "VSCode Integration Successful!"
        }
    }

    pub fn message(&self) -> &'static str {
        if self.is_coder() {
            "Your VSCode extension has been successfully authenticated with One API via Coder."
        } else {
            "Your VSCode extension has been successfully authenticated with One API."
        }
    }

    /// Where "go to tokens" leads.
    pub fn next(&self) -> Route {
        Route::Token
    }
}

pub struct AuthPages {
    ctx: Console,
}

impl AuthPages {
    pub fn new(ctx: Console) -> Self {
        Self { ctx }
    }

    /// Called when the login page is shown; `expired` comes from the
    /// redirect that sent the user here.
    pub fn open_login(&self, expired: bool) {
        if expired {
            self.ctx
                .notifier
                .error("Not logged in or login has expired, please log in again!");
        }
    }

    fn sign_in(&self, user: User) -> Result<()> {
        info!(username = %user.username, role = user.role.code(), "signed in");
        self.ctx.auth.login(user)?;
        self.ctx.notifier.success("Login successful!");
        Ok(())
    }

    /// Password login. `source` tags logins started by an editor
    /// integration.
    pub async fn login(&self, username: &str, password: &str, source: Option<&str>) -> Result<Route> {
        if username.is_empty() || password.is_empty() {
            return self.ctx.report(Err(ConsoleError::validation(
                "Please enter username and password!",
            )));
        }
        let result = self.ctx.api.login(username, password, source).await;
        let user = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.sign_in(user)?;
        if username == "root" && password == "123456" {
            warn!("default root password in use");
            self.ctx.notifier.warning(
                "You are using the default password! Please change the default password immediately!",
            );
        }
        if source == Some(VSCODE_SOURCE) {
            self.ctx.notifier.info("VSCode integration login successful!");
        }
        Ok(Route::Token)
    }

    /// Login through the Telegram widget. Only the widget's own fields are
    /// forwarded.
    pub async fn telegram_login<'a, I>(&self, pairs: I) -> Result<Route>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let auth = TelegramAuth::from_pairs(pairs);
        let result = self.ctx.api.telegram_login(&auth).await;
        let user = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.sign_in(user)?;
        Ok(Route::Home)
    }

    pub async fn github_login_url(&self) -> Result<Route> {
        github_authorize_url(&self.ctx).await
    }

    /// Completes the GitHub redirect. A signed-in user gets the account
    /// bound instead and lands on the settings page.
    pub async fn github_callback(&self, code: &str, state: &str) -> Result<Route> {
        let result = self.ctx.api.github_oauth(code, state).await;
        match self.ctx.report(result.map_err(ConsoleError::from))? {
            Some(user) => {
                self.sign_in(user)?;
                Ok(Route::Home)
            }
            None => {
                self.ctx.notifier.success("Binding successful!");
                Ok(Route::Setting)
            }
        }
    }

    /// Keeps an affiliate code from an invite link for later registration.
    pub fn remember_aff(&self, code: &str) -> Result<()> {
        if !code.is_empty() {
            self.ctx.store.set(StoreKey::Aff, code)?;
        }
        Ok(())
    }

    pub async fn send_register_code(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(());
        }
        let result = self.ctx.api.send_verification(email).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .success("Verification code sent successfully, please check your email!");
        Ok(())
    }

    pub async fn register(&self, mut form: RegisterForm, source: Option<&str>) -> Result<Route> {
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return self.ctx.report(Err(ConsoleError::validation(
                "Password must be at least 8 characters long!",
            )));
        }
        if form.password != form.password2 {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Passwords do not match")));
        }
        if form.username.is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter a username!")));
        }
        if self.ctx.status.get().email_verification
            && (form.email.is_empty() || form.verification_code.is_empty())
        {
            return self.ctx.report(Err(ConsoleError::validation(
                "Please enter your email and verification code!",
            )));
        }
        if form.aff_code.is_empty() {
            form.aff_code = self.ctx.store.get(StoreKey::Aff).unwrap_or_default();
        }
        let result = self.ctx.api.register(&form, source).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        info!(username = %form.username, "registered");
        if source == Some(VSCODE_SOURCE) {
            self.ctx
                .notifier
                .success("VSCode integration registration successful!");
        } else {
            self.ctx.notifier.success("Registration successful!");
        }
        Ok(Route::Login)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter email address!")));
        }
        let result = self.ctx.api.request_password_reset(email).await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx
            .notifier
            .success("Reset email sent successfully, please check your email!");
        Ok(())
    }

    /// Ends the session on the gateway, then clears local state.
    pub async fn logout(&self) -> Result<Route> {
        let result = self.ctx.api.logout().await;
        self.ctx.report(result.map_err(ConsoleError::from))?;
        self.ctx.auth.logout()?;
        self.ctx.notifier.success("Logout successful!");
        Ok(Route::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::harness;
    use oneadmin_api::site::SiteStatus;
    use oneadmin_api::{Envelope, Method};
    use oneadmin_core::types::UserRole;
    use serde_json::{json, Value};

    fn user() -> Value {
        json!({"id": 3, "username": "root", "role": 100, "status": 1})
    }

    #[test]
    fn editor_success_reads_redirect_pairs() {
        let page = EditorAuthSuccess::from_pairs([
            ("token", "sk-abc"),
            ("username", "alice"),
            ("session_id", ""),
            ("utm", "x"),
        ]);
        assert_eq!(page.token.as_deref(), Some("sk-abc"));
        assert_eq!(page.username.as_deref(), Some("alice"));
        assert_eq!(page.session_id, None);
        assert_eq!(page.provider, "local");
        assert_eq!(page.title(), "VSCode Integration Successful!");
        assert_eq!(page.next(), Route::Token);

        let coder = EditorAuthSuccess::from_pairs([("provider", "coder")]);
        assert!(coder.is_coder());
        assert!(coder.message().ends_with("via Coder."));
    }

    #[tokio::test]
    async fn login_persists_and_routes_to_tokens() {
        let h = harness();
        h.mock.ok(Method::Post, "/api/user/login", user());
        let pages = AuthPages::new(h.console.clone());
        let route = pages.login("root", "123456", Some("vscode")).await.unwrap();

        assert_eq!(route, Route::Token);
        assert!(h.console.auth.is_root());
        assert!(h.console.store.get(StoreKey::User).is_some());
        assert!(h.notes.contains(Level::Warning, "default password"));
        assert!(h.notes.contains(Level::Info, "VSCode integration login successful!"));
        assert_eq!(h.mock.last().unwrap().query_value("source"), Some("vscode"));
    }

    #[tokio::test]
    async fn login_needs_both_fields() {
        let h = harness();
        let pages = AuthPages::new(h.console.clone());
        assert!(pages.login("root", "", None).await.is_err());
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn rejected_login_leaves_state_alone() {
        let h = harness();
        h.mock
            .on(Method::Post, "/api/user/login", Envelope::fail("wrong password"));
        let pages = AuthPages::new(h.console.clone());
        assert!(pages.login("root", "nope", None).await.is_err());
        assert!(!h.console.auth.is_logged_in());
        assert!(h.notes.contains(Level::Error, "wrong password"));
    }

    #[tokio::test]
    async fn telegram_forwards_widget_fields_only() {
        let h = harness();
        h.mock.ok(Method::Get, "/api/oauth/telegram/login", user());
        let pages = AuthPages::new(h.console.clone());
        let route = pages
            .telegram_login([("id", "42"), ("hash", "h"), ("evil", "x")])
            .await
            .unwrap();
        assert_eq!(route, Route::Home);
        let req = h.mock.last().unwrap();
        assert_eq!(req.query_value("id"), Some("42"));
        assert!(req.query_value("evil").is_none());
        assert!(h.console.auth.is_logged_in());
    }

    #[tokio::test]
    async fn github_callback_logs_in_or_binds() {
        let h = harness();
        h.mock
            .ok(Method::Get, "/api/oauth/github", user())
            .ok(Method::Get, "/api/oauth/github", json!("bind"));
        let pages = AuthPages::new(h.console.clone());
        assert_eq!(pages.github_callback("c", "s").await.unwrap(), Route::Home);
        assert!(h.console.auth.is_logged_in());
        assert_eq!(pages.github_callback("c", "s").await.unwrap(), Route::Setting);
    }

    #[tokio::test]
    async fn register_checks_and_uses_stored_aff() {
        let h = harness();
        h.mock.ok(Method::Post, "/api/user/register", Value::Null);
        let pages = AuthPages::new(h.console.clone());
        let mut form = RegisterForm {
            username: "new".into(),
            password: "short".into(),
            password2: "short".into(),
            ..Default::default()
        };
        assert!(pages.register(form.clone(), None).await.is_err());
        assert!(h.notes.contains(Level::Info, "at least 8 characters"));

        form.password = "long-password".into();
        assert!(pages.register(form.clone(), None).await.is_err());
        assert!(h.notes.contains(Level::Info, "Passwords do not match"));
        assert!(h.mock.requests().is_empty());

        form.password2 = "long-password".into();
        pages.remember_aff("INV1").unwrap();
        assert_eq!(pages.register(form, None).await.unwrap(), Route::Login);
        assert_eq!(h.mock.last().unwrap().body.unwrap()["aff_code"], "INV1");
    }

    #[tokio::test]
    async fn register_requires_code_when_site_verifies_email() {
        let h = harness();
        h.console
            .status
            .set(SiteStatus {
                email_verification: true,
                ..Default::default()
            })
            .unwrap();
        let pages = AuthPages::new(h.console.clone());
        let form = RegisterForm {
            username: "new".into(),
            password: "long-password".into(),
            password2: "long-password".into(),
            email: "a@b.c".into(),
            ..Default::default()
        };
        assert!(pages.register(form, None).await.is_err());
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let h = harness();
        h.login_as(UserRole::Common);
        h.mock.ok(Method::Get, "/api/user/logout", Value::Null);
        let pages = AuthPages::new(h.console.clone());
        assert_eq!(pages.logout().await.unwrap(), Route::Login);
        assert!(!h.console.auth.is_logged_in());
    }

    #[test]
    fn expired_banner() {
        let h = harness();
        AuthPages::new(h.console.clone()).open_login(true);
        assert!(h.notes.contains(Level::Error, "login has expired"));
    }
}
