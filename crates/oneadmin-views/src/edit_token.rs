use chrono::{Duration, Utc};
use oneadmin_api::token::{Token, TokenForm};
use oneadmin_core::render::{parse_timestamp, split_list, timestamp_to_string};
use oneadmin_core::{ConsoleError, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use crate::context::{Console, Refresh};

pub const DEFAULT_REMAIN_QUOTA: i64 = 500_000;
const NAME_SUFFIX_LEN: usize = 6;

/// Form state for the token panel. `expires_at` is `None` for a token that
/// never expires.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDraft {
    pub name: String,
    pub remain_quota: i64,
    pub expires_at: Option<String>,
    pub unlimited_quota: bool,
    pub model_limits_enabled: bool,
    pub model_limits: Vec<String>,
}

impl Default for TokenDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            remain_quota: DEFAULT_REMAIN_QUOTA,
            expires_at: None,
            unlimited_quota: false,
            model_limits_enabled: false,
            model_limits: Vec::new(),
        }
    }
}

impl From<&Token> for TokenDraft {
    fn from(t: &Token) -> Self {
        Self {
            name: t.name.clone(),
            remain_quota: t.remain_quota,
            expires_at: (t.expired_time != -1).then(|| timestamp_to_string(t.expired_time)),
            unlimited_quota: t.unlimited_quota,
            model_limits_enabled: t.model_limits_enabled,
            model_limits: split_list(&t.model_limits),
        }
    }
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NAME_SUFFIX_LEN)
        .map(char::from)
        .collect()
}

pub struct TokenEditor {
    ctx: Console,
    id: Option<i64>,
    draft: TokenDraft,
    /// Tokens to create in one submit.
    count: usize,
    visible: bool,
}

impl TokenEditor {
    pub fn create(ctx: Console) -> Self {
        Self {
            ctx,
            id: None,
            draft: TokenDraft::default(),
            count: 1,
            visible: true,
        }
    }

    pub async fn edit(ctx: Console, id: i64) -> Result<Self> {
        let result = ctx.api.get_token(id).await;
        let token = ctx.report(result.map_err(ConsoleError::from))?;
        let mut editor = Self::create(ctx);
        editor.id = Some(id);
        editor.draft = TokenDraft::from(&token);
        Ok(editor)
    }

    pub fn draft(&self) -> &TokenDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut TokenDraft {
        &mut self.draft
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = count.max(1);
    }

    pub fn set_never_expires(&mut self) {
        self.draft.expires_at = None;
    }

    /// Expiry relative to now. A month counts as 30 days; all zeros means
    /// never.
    pub fn set_relative_expiry(&mut self, months: i64, days: i64, hours: i64, minutes: i64) {
        if months == 0 && days == 0 && hours == 0 && minutes == 0 {
            self.draft.expires_at = None;
            return;
        }
        let delta = Duration::days(months * 30 + days)
            + Duration::hours(hours)
            + Duration::minutes(minutes);
        let at = Utc::now().timestamp() + delta.num_seconds();
        self.draft.expires_at = Some(timestamp_to_string(at));
    }

    pub fn toggle_unlimited(&mut self) {
        self.draft.unlimited_quota = !self.draft.unlimited_quota;
    }

    pub fn build_form(&self) -> Result<TokenForm> {
        let d = &self.draft;
        if d.name.trim().is_empty() {
            return Err(ConsoleError::validation("Please enter a token name!"));
        }
        let expired_time = match &d.expires_at {
            None => -1,
            Some(s) => parse_timestamp(s)
                .ok_or_else(|| ConsoleError::validation("Expiration time format error!"))?,
        };
        Ok(TokenForm {
            id: self.id,
            name: d.name.clone(),
            remain_quota: d.remain_quota,
            expired_time,
            unlimited_quota: d.unlimited_quota,
            model_limits_enabled: d.model_limits_enabled,
            model_limits: d.model_limits.join(","),
        })
    }

    pub async fn submit(&mut self, parent: &mut impl Refresh) -> Result<()> {
        let form = self.ctx.report(self.build_form())?;
        if self.id.is_some() {
            let result = self.ctx.api.update_token(&form).await;
            self.ctx.report(result.map_err(ConsoleError::from))?;
            self.ctx.notifier.success("Token updated successfully!");
        } else {
            let (created, failure) = self.create_batch(&form).await;
            if let (0, Some(e)) = (created, failure) {
                return Err(e);
            }
            if created < self.count {
                // keep the panel open; some copies already exist
                parent.refresh().await?;
                return Err(ConsoleError::Rejected(format!(
                    "only {} of {} tokens were created",
                    created, self.count
                )));
            }
            self.ctx.notifier.success(&format!(
                "{} token(s) created successfully, click copy on the list page to get the key!",
                created
            ));
            self.draft = TokenDraft::default();
        }
        self.visible = false;
        parent.refresh().await
    }

    /// Creates `count` tokens and returns how many succeeded along with the
    /// failure that ended the batch. Copies after the first get a random
    /// suffix.
    async fn create_batch(&self, form: &TokenForm) -> (usize, Option<ConsoleError>) {
        let mut created = 0;
        let mut failure = None;
        for i in 0..self.count {
            let mut one = form.clone();
            if i > 0 {
                one.name = format!("{}-{}", form.name, random_suffix());
            }
            let result = self.ctx.api.create_token(&one).await;
            if let Err(e) = self.ctx.report(result.map_err(ConsoleError::from)) {
                warn!(created, requested = self.count, "token batch stopped");
                failure = Some(e);
                break;
            }
            created += 1;
        }
        info!(created, "tokens created");
        (created, failure)
    }
}
