use chrono::{Duration, Utc};
use oneadmin_core::render::{parse_timestamp, pretty_json, timestamp_to_string, verify_json};
use oneadmin_core::{ConsoleError, Result};
use tracing::info;

use super::{load_options, put_if_changed, toggle_option, OptionSet};
use crate::context::Console;

const RATIO_KEYS: [&str; 3] = ["ModelRatio", "GroupRatio", "CompletionRatio"];

/// Boolean options toggled straight from the page.
pub const TOGGLES: [&str; 6] = [
    "AutomaticDisableChannelEnabled",
    "AutomaticEnableChannelEnabled",
    "LogConsumeEnabled",
    "DisplayInCurrencyEnabled",
    "DisplayTokenStatEnabled",
    "ApproximateTokenEnabled",
];

/// Fields saved together by one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationGroup {
    General,
    Monitor,
    Quota,
    Ratio,
}

impl OperationGroup {
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            OperationGroup::General => &["TopUpLink", "ChatLink", "QuotaPerUnit", "RetryTimes"],
            OperationGroup::Monitor => &["ChannelDisableThreshold", "QuotaRemindThreshold"],
            OperationGroup::Quota => &[
                "QuotaForNewUser",
                "QuotaForInvitee",
                "QuotaForInviter",
                "PreConsumedQuota",
            ],
            OperationGroup::Ratio => &RATIO_KEYS,
        }
    }
}

fn ratio_label(key: &str) -> &'static str {
    match key {
        "ModelRatio" => "Model ratio",
        "GroupRatio" => "Group ratio",
        _ => "Completion ratio",
    }
}

/// Quotas, ratios, monitoring and log retention. Root only.
pub struct OperationSettings {
    ctx: Console,
    options: OptionSet,
    /// Logs older than this are purged.
    history_before: String,
}

impl OperationSettings {
    pub async fn open(ctx: Console) -> Result<Self> {
        let mut options = load_options(&ctx).await?;
        for key in RATIO_KEYS {
            let raw = options.get(key).to_string();
            // `{}` reads as an empty field
            let shown = if raw.is_empty() || raw == "{}" {
                String::new()
            } else {
                pretty_json(&raw)
            };
            options.commit(key, &shown);
        }
        let month_ago = Utc::now().timestamp() - Duration::days(30).num_seconds();
        Ok(Self {
            ctx,
            options,
            history_before: timestamp_to_string(month_ago),
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

    pub async fn toggle(&mut self, key: &str) -> Result<bool> {
        toggle_option(&self.ctx, &mut self.options, key).await
    }

    pub async fn save(&mut self, group: OperationGroup) -> Result<()> {
        if group == OperationGroup::Ratio {
            for key in RATIO_KEYS {
                if self.options.changed(key) && !verify_json(self.options.get(key)) {
                    let msg = format!("{} is not a valid JSON string", ratio_label(key));
                    return self.ctx.report(Err(ConsoleError::validation(msg)));
                }
            }
        }
        for key in group.keys() {
            put_if_changed(&self.ctx, &mut self.options, key).await?;
        }
        Ok(())
    }

    pub fn history_before(&self) -> &str {
        &self.history_before
    }

    pub fn set_history_before(&mut self, at: impl Into<String>) {
        self.history_before = at.into();
    }

    /// Purges usage logs older than the chosen time.
    pub async fn delete_history_logs(&mut self) -> Result<i64> {
        let target = parse_timestamp(&self.history_before)
            .ok_or_else(|| ConsoleError::validation("Time format error!"));
        let target = self.ctx.report(target)?;
        match self.ctx.api.delete_history_logs(target).await {
            Ok(count) => {
                info!(count, target, "history logs purged");
                self.ctx
                    .notifier
                    .success(&format!("{} log entries have been cleared!", count));
                Ok(count)
            }
            Err(e) => {
                let e = ConsoleError::from(e);
                self.ctx.notifier.error(&format!("Log cleanup failed: {}", e));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::testing::harness;
    use oneadmin_api::{Envelope, Method};
    use oneadmin_core::types::UserRole;
    use serde_json::json;

    fn options() -> serde_json::Value {
        json!([
            {"key": "ModelRatio", "value": "{\"gpt-4\":15}"},
            {"key": "GroupRatio", "value": "{}"},
            {"key": "CompletionRatio", "value": "{}"},
            {"key": "ChatLink", "value": ""},
            {"key": "TopUpLink", "value": "https://shop"},
            {"key": "QuotaPerUnit", "value": "500000"},
            {"key": "RetryTimes", "value": "0"},
            {"key": "LogConsumeEnabled", "value": "true"}
        ])
    }

    async fn open() -> (crate::testing::Harness, OperationSettings) {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock.ok(Method::Get, "/api/option/", options());
        let page = OperationSettings::open(h.console.clone()).await.unwrap();
        (h, page)
    }

    #[tokio::test]
    async fn requires_root() {
        let h = harness();
        h.login_as(UserRole::Admin);
        assert!(OperationSettings::open(h.console.clone()).await.is_err());
        assert!(h.mock.requests().is_empty());
    }

    #[tokio::test]
    async fn ratios_are_pretty_and_empty_objects_blank() {
        let (_h, page) = open().await;
        assert!(page.get("ModelRatio").contains("\n"));
        assert_eq!(page.get("GroupRatio"), "");
        assert!(!page.options().changed("ModelRatio"));
    }

    #[tokio::test]
    async fn general_save_sends_only_changed_keys() {
        let (h, mut page) = open().await;
        h.mock.ok(Method::Put, "/api/option/", json!(null));
        page.set("ChatLink", "https://chat");
        page.save(OperationGroup::General).await.unwrap();

        let puts: Vec<_> = h
            .mock
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Put)
            .collect();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].body, Some(json!({"key": "ChatLink", "value": "https://chat"})));

        page.save(OperationGroup::General).await.unwrap();
        assert_eq!(h.mock.count(Method::Put, "/api/option/"), 1);
    }

    #[tokio::test]
    async fn malformed_ratio_sends_nothing() {
        let (h, mut page) = open().await;
        page.set("ChatLink", "x");
        page.set("GroupRatio", "{\"vip\": ");
        assert!(page.save(OperationGroup::Ratio).await.is_err());
        assert!(h.notes.contains(Level::Info, "Group ratio is not a valid JSON string"));
        assert_eq!(h.mock.count(Method::Put, "/api/option/"), 0);
    }

    #[tokio::test]
    async fn toggle_updates_only_after_success() {
        let (h, mut page) = open().await;
        h.mock
            .on(Method::Put, "/api/option/", Envelope::fail("denied"))
            .on(Method::Put, "/api/option/", Envelope::ok(json!(null)));
        assert!(page.toggle("LogConsumeEnabled").await.is_err());
        assert!(page.options().get_bool("LogConsumeEnabled"));

        assert!(!page.toggle("LogConsumeEnabled").await.unwrap());
        assert!(!page.options().get_bool("LogConsumeEnabled"));
        assert_eq!(
            h.mock.last().unwrap().body,
            Some(json!({"key": "LogConsumeEnabled", "value": "false"}))
        );
    }

    #[tokio::test]
    async fn history_purge_reports_count() {
        let (h, mut page) = open().await;
        h.mock.ok(Method::Delete, "/api/log/", json!(42));
        page.set_history_before("2024-01-01 00:00:00");
        assert_eq!(page.delete_history_logs().await.unwrap(), 42);
        assert!(h.notes.contains(Level::Success, "42 log entries have been cleared!"));
        let req = h.mock.last().unwrap();
        assert_eq!(
            req.query_value("target_timestamp"),
            Some(parse_timestamp("2024-01-01 00:00:00").unwrap().to_string().as_str())
        );
    }
}
