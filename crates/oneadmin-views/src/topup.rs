use oneadmin_api::user::{PaymentForm, PaymentRequest};
use oneadmin_api::Envelope;
use oneadmin_core::{ConsoleError, Result};
use serde_json::Value;
use tracing::info;

use crate::context::Console;
use crate::navigate::Route;

/// Balance page: redemption codes, the external top-up link and online
/// payment.
pub struct TopUp {
    ctx: Console,
    quota: i64,
    /// Optional promotion code passed to the payment endpoints.
    pub top_up_code: String,
}

impl TopUp {
    pub async fn open(ctx: Console) -> Result<Self> {
        ctx.auth.require_user()?;
        let result = ctx.api.get_self().await;
        let user = ctx.report(result.map_err(ConsoleError::from))?;
        Ok(Self {
            ctx,
            quota: user.quota,
            top_up_code: String::new(),
        })
    }

    pub fn quota(&self) -> i64 {
        self.quota
    }

    /// Redeems `code` and returns the quota credited.
    pub async fn redeem(&mut self, code: &str) -> Result<i64> {
        let code = code.trim();
        if code.is_empty() {
            return self
                .ctx
                .report(Err(ConsoleError::validation("Please enter redemption code!")));
        }
        let result = self.ctx.api.redeem_code(code).await;
        let credited = self.ctx.report(result.map_err(ConsoleError::from))?;
        self.quota += credited;
        info!(credited, "redemption code used");
        self.ctx.notifier.success(&format!(
            "Redemption successful! Successfully redeemed quota: {}",
            self.ctx.render_quota(credited)
        ));
        Ok(credited)
    }

    pub fn top_up_link(&self) -> Result<Route> {
        let link = self.ctx.status.get().top_up_link;
        if link.is_empty() {
            return self.ctx.report(Err(ConsoleError::Rejected(
                "Super administrator has not set up top-up link!".into(),
            )));
        }
        Ok(Route::External(link))
    }

    fn check_online(&self, count: i64) -> Result<()> {
        let status = self.ctx.status.get();
        if !status.enable_online_topup {
            return self.ctx.report(Err(ConsoleError::Rejected(
                "Administrator has not enabled online top-up!".into(),
            )));
        }
        let minimum = status.min_topup.max(1);
        if count < minimum {
            return self.ctx.report(Err(ConsoleError::validation(format!(
                "Top-up amount cannot be less than {}",
                minimum
            ))));
        }
        Ok(())
    }

    fn request(&self, count: i64, method: Option<&str>) -> PaymentRequest {
        PaymentRequest {
            amount: count,
            top_up_code: self.top_up_code.clone(),
            payment_method: method.map(String::from),
        }
    }

    /// Price of `count` units in the payment currency.
    pub async fn amount(&self, count: i64) -> Result<f64> {
        self.check_online(count)?;
        let result = self.ctx.api.topup_amount(&self.request(count, None)).await;
        let env = self.payment_reply(result)?;
        let price = match &env.data {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        self.ctx.report(price.ok_or_else(|| {
            ConsoleError::Rejected(format!("unexpected amount: {}", env.data))
        }))
    }

    /// Starts an online payment. The returned form is posted by the caller
    /// to the payment provider.
    pub async fn pay(&self, count: i64, method: &str) -> Result<PaymentForm> {
        self.check_online(count)?;
        let result = self
            .ctx
            .api
            .request_payment(&self.request(count, Some(method)))
            .await;
        let env = self.payment_reply(result)?;
        info!(count, method, "payment requested");
        Ok(PaymentForm::from_envelope(&env))
    }

    /// These endpoints report success as `message == "success"` and put the
    /// error text in `data`.
    fn payment_reply(&self, result: oneadmin_api::Result<Envelope>) -> Result<Envelope> {
        let env = self.ctx.report(result.map_err(ConsoleError::from))?;
        if env.message == "success" {
            return Ok(env);
        }
        let reason = match &env.data {
            Value::String(s) => s.clone(),
            Value::Null => env.message.clone(),
            other => other.to_string(),
        };
        self.ctx.report(Err(ConsoleError::Rejected(reason)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::{harness, Harness};
    use oneadmin_api::site::SiteStatus;
    use oneadmin_api::Method;
    use oneadmin_core::types::UserRole;
    use serde_json::json;

    async fn open(status: SiteStatus) -> (Harness, TopUp) {
        let h = harness();
        h.login_as(UserRole::Common);
        h.console.status.set(status).unwrap();
        h.mock.ok(Method::Get, "/api/user/self", json!({"id": 1, "quota": 100}));
        let page = TopUp::open(h.console.clone()).await.unwrap();
        (h, page)
    }

    fn online() -> SiteStatus {
        SiteStatus {
            enable_online_topup: true,
            min_topup: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_code_is_info_without_request() {
        let (h, mut page) = open(SiteStatus::default()).await;
        assert!(page.redeem("  ").await.is_err());
        assert!(h.notes.contains(Level::Info, "Please enter redemption code!"));
        assert_eq!(h.mock.count(Method::Post, "/api/user/topup"), 0);
    }

    #[tokio::test]
    async fn redeem_adds_quota() {
        let (h, mut page) = open(SiteStatus::default()).await;
        h.mock.ok(Method::Post, "/api/user/topup", json!(500));
        assert_eq!(page.redeem("CODE").await.unwrap(), 500);
        assert_eq!(page.quota(), 600);
        assert!(h.notes.contains(Level::Success, "Redemption successful!"));
    }

    #[tokio::test]
    async fn top_up_link_must_be_set() {
        let (h, page) = open(SiteStatus::default()).await;
        assert!(page.top_up_link().is_err());
        assert!(h.notes.contains(Level::Error, "has not set up top-up link"));

        let (_h, page) = open(SiteStatus {
            top_up_link: "https://shop.example.com".into(),
            ..Default::default()
        })
        .await;
        assert_eq!(
            page.top_up_link().unwrap(),
            Route::External("https://shop.example.com".into())
        );
    }

    #[tokio::test]
    async fn online_payment_gates() {
        let (h, page) = open(SiteStatus::default()).await;
        assert!(page.amount(10).await.is_err());
        assert!(h.notes.contains(Level::Error, "not enabled online top-up"));

        let (h, page) = open(online()).await;
        assert!(page.pay(3, "alipay").await.is_err());
        assert!(h.notes.contains(Level::Info, "cannot be less than 5"));
        assert_eq!(h.mock.count(Method::Post, "/api/user/pay"), 0);
    }

    #[tokio::test]
    async fn pay_returns_form() {
        let (h, page) = open(online()).await;
        let mut env = Envelope::ok(json!({"pid": "1", "sign": "abc"}));
        env.message = "success".into();
        env.extra.insert("url".into(), json!("https://pay.example.com/submit"));
        h.mock.on(Method::Post, "/api/user/pay", env);
        let form = page.pay(10, "wxpay").await.unwrap();
        assert_eq!(form.url, "https://pay.example.com/submit");
        assert_eq!(form.params["sign"], "abc");
        let body = h.mock.last().unwrap().body.unwrap();
        assert_eq!(body["payment_method"], "wxpay");
        assert_eq!(body["amount"], 10);
    }

    #[tokio::test]
    async fn amount_error_text_comes_from_data() {
        let (h, page) = open(online()).await;
        let mut env = Envelope::fail("error");
        env.data = json!("top-up amount too large");
        h.mock.on(Method::Post, "/api/user/amount", env);
        assert!(page.amount(10).await.is_err());
        assert!(h.notes.contains(Level::Error, "top-up amount too large"));
    }
}
