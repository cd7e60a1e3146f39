use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::instrument;

use oneadmin_core::types::{UserAction, UserRole, UserStatus};

use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::transport::ApiRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub email: String,
    pub github_id: String,
    pub wechat_id: String,
    pub telegram_id: String,
    pub quota: i64,
    pub used_quota: i64,
    pub request_count: i64,
    pub group: String,
    pub aff_code: String,
    pub aff_count: i64,
    pub aff_quota: i64,
    pub aff_history_quota: i64,
    pub inviter_id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_token: String,
}

/// Body of `PUT /api/user/` (admin) and `PUT /api/user/self`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub display_name: String,
    /// Empty keeps the current password.
    pub password: String,
    pub email: String,
    pub github_id: String,
    pub wechat_id: String,
    pub telegram_id: String,
    pub quota: i64,
    pub group: String,
}

impl From<&User> for UserUpdate {
    fn from(u: &User) -> Self {
        Self {
            id: Some(u.id),
            username: u.username.clone(),
            display_name: u.display_name.clone(),
            password: String::new(),
            email: u.email.clone(),
            github_id: u.github_id.clone(),
            wechat_id: u.wechat_id.clone(),
            telegram_id: u.telegram_id.clone(),
            quota: u.quota,
            group: u.group.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
    pub verification_code: String,
    pub aff_code: String,
}

/// Role and status after a manage action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManagedUser {
    pub role: UserRole,
    pub status: UserStatus,
}

/// Body for the online payment endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub amount: i64,
    pub top_up_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// Result of `POST /api/user/pay`: a form to post to the payment gateway.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentForm {
    pub url: String,
    pub params: Map<String, Value>,
}

impl PaymentForm {
    pub fn from_envelope(env: &Envelope) -> Self {
        Self {
            url: env.extra_str("url").unwrap_or_default().to_string(),
            params: env.data.as_object().cloned().unwrap_or_default(),
        }
    }
}

impl ApiClient {
    pub async fn list_users(&self, page: usize, order: &str) -> Result<Vec<User>> {
        self.fetch_or_default(ApiRequest::get("/api/user/").query("p", page).query("order", order))
            .await
    }

    pub async fn search_users(&self, keyword: &str) -> Result<Vec<User>> {
        self.fetch_or_default(ApiRequest::get("/api/user/search").query("keyword", keyword))
            .await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        self.fetch(ApiRequest::get(format!("/api/user/{}", id))).await
    }

    pub async fn get_self(&self) -> Result<User> {
        self.fetch(ApiRequest::get("/api/user/self")).await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<()> {
        self.execute(ApiRequest::post("/api/user/").json(serde_json::to_value(user)?))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, update), fields(id = ?update.id))]
    pub async fn update_user(&self, update: &UserUpdate) -> Result<()> {
        self.execute(ApiRequest::put("/api/user/").json(serde_json::to_value(update)?))
            .await?;
        Ok(())
    }

    /// `PUT /api/user/self` with an arbitrary subset of profile fields.
    pub async fn update_self(&self, fields: Value) -> Result<()> {
        self.execute(ApiRequest::put("/api/user/self").json(fields))
            .await?;
        Ok(())
    }

    pub async fn delete_self(&self) -> Result<()> {
        self.execute(ApiRequest::delete("/api/user/self")).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn manage_user(&self, username: &str, action: UserAction) -> Result<ManagedUser> {
        self.fetch_or_default(
            ApiRequest::post("/api/user/manage")
                .json(json!({ "username": username, "action": action })),
        )
        .await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str, source: Option<&str>) -> Result<User> {
        let mut req = ApiRequest::post("/api/user/login")
            .json(json!({ "username": username, "password": password }));
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            req = req.query("source", source);
        }
        self.fetch(req).await
    }

    pub async fn register(&self, form: &RegisterForm, source: Option<&str>) -> Result<()> {
        let mut req = ApiRequest::post("/api/user/register").json(serde_json::to_value(form)?);
        if let Some(source) = source.filter(|s| !s.is_empty()) {
            req = req.query("source", source);
        }
        self.execute(req).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.execute(ApiRequest::get("/api/user/logout")).await?;
        Ok(())
    }

    /// Regenerates and returns the caller's system access token.
    pub async fn generate_access_token(&self) -> Result<String> {
        self.fetch(ApiRequest::get("/api/user/token")).await
    }

    pub async fn get_aff_code(&self) -> Result<String> {
        self.fetch(ApiRequest::get("/api/user/aff")).await
    }

    pub async fn available_models(&self) -> Result<Vec<String>> {
        self.fetch_or_default(ApiRequest::get("/api/user/available_models"))
            .await
    }

    /// Redeems a code; returns the quota credited.
    pub async fn redeem_code(&self, key: &str) -> Result<i64> {
        self.fetch(ApiRequest::post("/api/user/topup").json(json!({ "key": key })))
            .await
    }

    /// Moves affiliate reward quota into the spendable balance.
    pub async fn transfer_aff_quota(&self, quota: i64) -> Result<()> {
        self.execute(ApiRequest::post("/api/user/aff_transfer").json(json!({ "quota": quota })))
            .await?;
        Ok(())
    }

    /// These two endpoints signal success with `message == "success"` and
    /// carry the error text in `data` otherwise, so the raw envelope is
    /// returned.
    pub async fn topup_amount(&self, req: &PaymentRequest) -> Result<Envelope> {
        self.call(ApiRequest::post("/api/user/amount").json(serde_json::to_value(req)?))
            .await
    }

    pub async fn request_payment(&self, req: &PaymentRequest) -> Result<Envelope> {
        self.call(ApiRequest::post("/api/user/pay").json(serde_json::to_value(req)?))
            .await
    }
}
