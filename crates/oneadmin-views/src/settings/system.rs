use oneadmin_core::render::remove_trailing_slash;
use oneadmin_core::{ConsoleError, Result};

use super::{load_options, put_if_changed, put_option, toggle_option, OptionSet};
use crate::context::Console;

pub const TOGGLES: [&str; 7] = [
    "PasswordLoginEnabled",
    "PasswordRegisterEnabled",
    "EmailVerificationEnabled",
    "GitHubOAuthEnabled",
    "TelegramOAuthEnabled",
    "EmailDomainRestrictionEnabled",
    "RegisterEnabled",
];

const PASSWORD_LOGIN: &str = "PasswordLoginEnabled";
const WHITELIST: &str = "EmailDomainWhitelist";

/// Login, mail, OAuth and notice configuration. Root only.
pub struct SystemSettings {
    ctx: Console,
    options: OptionSet,
    domains: Vec<String>,
}

impl SystemSettings {
    pub async fn open(ctx: Console) -> Result<Self> {
        let options = load_options(&ctx).await?;
        let domains = split_domains(options.get(WHITELIST));
        Ok(Self {
            ctx,
            options,
            domains,
        })
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn get(&self, key: &str) -> &str {
        self.options.get(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.options.set(key, value);
    }

    /// Flips a boolean option. Turning password login off can lock every
    /// admin out, so it needs `confirmed`.
    pub async fn toggle(&mut self, key: &str, confirmed: bool) -> Result<bool> {
        if key == PASSWORD_LOGIN && self.options.get_bool(key) && !confirmed {
            return self.ctx.report(Err(ConsoleError::validation(
                "Disabling password login may lock out users without another login method; confirm to continue",
            )));
        }
        toggle_option(&self.ctx, &mut self.options, key).await
    }

    pub async fn save_server_address(&mut self) -> Result<()> {
        let address = remove_trailing_slash(self.options.get("ServerAddress"));
        put_option(&self.ctx, &mut self.options, "ServerAddress", &address).await
    }

    /// Port and token are left alone when blank.
    pub async fn save_smtp(&mut self) -> Result<()> {
        for key in ["SMTPServer", "SMTPAccount", "SMTPFrom"] {
            put_if_changed(&self.ctx, &mut self.options, key).await?;
        }
        for key in ["SMTPPort", "SMTPToken"] {
            if !self.options.get(key).is_empty() {
                put_if_changed(&self.ctx, &mut self.options, key).await?;
            }
        }
        Ok(())
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Adds a domain to the pending whitelist; duplicates and blanks are
    /// ignored.
    pub fn add_domain(&mut self, domain: &str) {
        let domain = domain.trim();
        if !domain.is_empty() && !self.domains.iter().any(|d| d == domain) {
            self.domains.push(domain.to_string());
        }
    }

    pub fn remove_domain(&mut self, domain: &str) {
        self.domains.retain(|d| d != domain);
    }

    pub async fn save_domain_whitelist(&mut self) -> Result<()> {
        self.options.set(WHITELIST, self.domains.join(","));
        put_if_changed(&self.ctx, &mut self.options, WHITELIST).await
    }

    pub async fn save_message_pusher(&mut self) -> Result<()> {
        if self.options.changed("MessagePusherAddress") {
            let address = remove_trailing_slash(self.options.get("MessagePusherAddress"));
            put_option(&self.ctx, &mut self.options, "MessagePusherAddress", &address).await?;
        }
        if !self.options.get("MessagePusherToken").is_empty() {
            put_if_changed(&self.ctx, &mut self.options, "MessagePusherToken").await?;
        }
        Ok(())
    }

    pub async fn save_github_oauth(&mut self) -> Result<()> {
        put_if_changed(&self.ctx, &mut self.options, "GitHubClientId").await?;
        if !self.options.get("GitHubClientSecret").is_empty() {
            put_if_changed(&self.ctx, &mut self.options, "GitHubClientSecret").await?;
        }
        Ok(())
    }

    pub async fn save_telegram_oauth(&mut self) -> Result<()> {
        put_if_changed(&self.ctx, &mut self.options, "TelegramBotName").await?;
        if !self.options.get("TelegramBotToken").is_empty() {
            put_if_changed(&self.ctx, &mut self.options, "TelegramBotToken").await?;
        }
        Ok(())
    }

    pub async fn save_notice(&mut self) -> Result<()> {
        put_if_changed(&self.ctx, &mut self.options, "Notice").await?;
        self.ctx.notifier.success("Notice updated successfully");
        Ok(())
    }
}

fn split_domains(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::{harness, Harness};
    use oneadmin_api::Method;
    use oneadmin_core::types::UserRole;
    use serde_json::{json, Value};

    async fn open() -> (Harness, SystemSettings) {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock
            .ok(
                Method::Get,
                "/api/option/",
                json!([
                    {"key": "PasswordLoginEnabled", "value": "true"},
                    {"key": "RegisterEnabled", "value": "false"},
                    {"key": "ServerAddress", "value": ""},
                    {"key": "SMTPServer", "value": "smtp.old"},
                    {"key": "SMTPPort", "value": "587"},
                    {"key": "SMTPToken", "value": ""},
                    {"key": "GitHubClientId", "value": "id"},
                    {"key": "EmailDomainWhitelist", "value": "gmail.com,qq.com"}
                ]),
            )
            .ok(Method::Put, "/api/option/", Value::Null);
        let page = SystemSettings::open(h.console.clone()).await.unwrap();
        (h, page)
    }

    fn put_keys(h: &Harness) -> Vec<String> {
        h.mock
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Put)
            .map(|r| r.body.unwrap()["key"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn disabling_password_login_needs_confirmation() {
        let (h, mut page) = open().await;
        assert!(page.toggle("PasswordLoginEnabled", false).await.is_err());
        assert!(put_keys(&h).is_empty());
        assert!(h.notes.contains(Level::Info, "confirm"));

        assert!(!page.toggle("PasswordLoginEnabled", true).await.unwrap());
        assert!(page.toggle("RegisterEnabled", false).await.unwrap());
        assert_eq!(put_keys(&h), vec!["PasswordLoginEnabled", "RegisterEnabled"]);
    }

    #[tokio::test]
    async fn server_address_loses_trailing_slash() {
        let (h, mut page) = open().await;
        page.set("ServerAddress", "https://gw.example.com/");
        page.save_server_address().await.unwrap();
        assert_eq!(
            h.mock.last().unwrap().body,
            Some(json!({"key": "ServerAddress", "value": "https://gw.example.com"}))
        );
    }

    #[tokio::test]
    async fn smtp_skips_blank_secrets() {
        let (h, mut page) = open().await;
        page.set("SMTPServer", "smtp.new");
        page.set("SMTPPort", "");
        page.save_smtp().await.unwrap();
        assert_eq!(put_keys(&h), vec!["SMTPServer"]);

        page.set("SMTPToken", "secret");
        page.save_smtp().await.unwrap();
        assert_eq!(put_keys(&h), vec!["SMTPServer", "SMTPToken"]);
    }

    #[tokio::test]
    async fn whitelist_dedups_and_joins() {
        let (h, mut page) = open().await;
        page.add_domain("gmail.com");
        page.add_domain(" example.org ");
        page.add_domain("");
        assert_eq!(page.domains(), &["gmail.com", "qq.com", "example.org"]);
        page.save_domain_whitelist().await.unwrap();
        assert_eq!(
            h.mock.last().unwrap().body,
            Some(json!({"key": "EmailDomainWhitelist", "value": "gmail.com,qq.com,example.org"}))
        );
    }

    #[tokio::test]
    async fn github_secret_only_when_given() {
        let (h, mut page) = open().await;
        page.set("GitHubClientId", "new-id");
        page.save_github_oauth().await.unwrap();
        assert_eq!(put_keys(&h), vec!["GitHubClientId"]);
    }
}
