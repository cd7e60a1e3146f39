use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::user::User;

/// Fields the Telegram login widget hands back. Anything else the widget
/// adds is dropped before the request is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramAuth {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub photo_url: String,
    pub auth_date: String,
    pub hash: String,
    pub lang: String,
}

impl TelegramAuth {
    pub const FIELDS: [&'static str; 8] = [
        "id",
        "first_name",
        "last_name",
        "username",
        "photo_url",
        "auth_date",
        "hash",
        "lang",
    ];

    /// Keeps only the widget's own fields, in a stable order; empty values
    /// are omitted.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut auth = TelegramAuth::default();
        for (k, v) in pairs {
            let slot = match k {
                "id" => &mut auth.id,
                "first_name" => &mut auth.first_name,
                "last_name" => &mut auth.last_name,
                "username" => &mut auth.username,
                "photo_url" => &mut auth.photo_url,
                "auth_date" => &mut auth.auth_date,
                "hash" => &mut auth.hash,
                "lang" => &mut auth.lang,
                _ => continue,
            };
            *slot = v.to_string();
        }
        auth
    }

    fn apply(&self, mut req: ApiRequest) -> ApiRequest {
        let values = [
            &self.id,
            &self.first_name,
            &self.last_name,
            &self.username,
            &self.photo_url,
            &self.auth_date,
            &self.hash,
            &self.lang,
        ];
        for (key, value) in Self::FIELDS.iter().zip(values) {
            if !value.is_empty() {
                req = req.query(key, value);
            }
        }
        req
    }
}

impl ApiClient {
    /// Anti-CSRF state for the GitHub authorize redirect.
    pub async fn oauth_state(&self) -> Result<String> {
        self.fetch(ApiRequest::get("/api/oauth/state")).await
    }

    /// Completes the GitHub flow. When the caller is already logged in the
    /// gateway binds the account instead and `data` may be empty.
    pub async fn github_oauth(&self, code: &str, state: &str) -> Result<Option<User>> {
        let env = self
            .execute(
                ApiRequest::get("/api/oauth/github")
                    .query("code", code)
                    .query("state", state),
            )
            .await?;
        if env.data.is_object() {
            Ok(Some(serde_json::from_value(env.data)?))
        } else {
            Ok(None)
        }
    }

    pub async fn telegram_login(&self, auth: &TelegramAuth) -> Result<User> {
        self.fetch(auth.apply(ApiRequest::get("/api/oauth/telegram/login")))
            .await
    }

    pub async fn telegram_bind(&self, auth: &TelegramAuth) -> Result<()> {
        self.execute(auth.apply(ApiRequest::get("/api/oauth/telegram/bind")))
            .await?;
        Ok(())
    }

    pub async fn bind_email(&self, email: &str, code: &str) -> Result<()> {
        self.execute(
            ApiRequest::get("/api/oauth/email/bind")
                .query("email", email)
                .query("code", code),
        )
        .await?;
        Ok(())
    }

    /// Mails a verification code to `email`.
    pub async fn send_verification(&self, email: &str) -> Result<()> {
        self.execute(ApiRequest::get("/api/verification").query("email", email))
            .await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.execute(ApiRequest::get("/api/reset_password").query("email", email))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telegram_fields_are_filtered_and_ordered() {
        let auth = TelegramAuth::from_pairs([
            ("hash", "abc"),
            ("id", "42"),
            ("utm_source", "ads"),
            ("auth_date", "1700000000"),
        ]);
        let req = auth.apply(ApiRequest::get("/api/oauth/telegram/login"));
        let keys: Vec<&str> = req.query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "auth_date", "hash"]);
        assert!(req.query_value("utm_source").is_none());
    }
}
