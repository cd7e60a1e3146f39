//! Create/edit panel for a single channel.

use oneadmin_api::channel::{Channel, ChannelForm};
use oneadmin_core::render::{pretty_json, remove_trailing_slash, verify_json};
use oneadmin_core::types::channel_type;
use oneadmin_core::{ConsoleError, Result};
use tracing::info;

use crate::context::{Console, Refresh};

const AZURE_DEFAULT_API_VERSION: &str = "2024-03-01-preview";
const SPARK_DEFAULT_VERSION: &str = "v2.1";

/// Mapping example offered by "fill template".
pub const MODEL_MAPPING_EXAMPLE: &str = r#"{
  "gpt-3.5-turbo-0301": "gpt-3.5-turbo",
  "gpt-4-0314": "gpt-4",
  "gpt-4-32k-0314": "gpt-4-32k"
}"#;

/// Models a fresh channel of `kind` starts with.
pub fn preset_models(kind: i64) -> &'static [&'static str] {
    match kind {
        channel_type::ANTHROPIC => &[
            "claude-instant-1.2",
            "claude-2",
            "claude-2.0",
            "claude-2.1",
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-3-haiku-20240307",
            "claude-3-5-haiku-20241022",
            "claude-3-5-sonnet-20240620",
            "claude-3-5-sonnet-20241022",
        ],
        channel_type::PALM => &["PaLM-2"],
        channel_type::BAIDU => &["ERNIE-Bot", "ERNIE-Bot-turbo", "ERNIE-Bot-4", "Embedding-V1"],
        channel_type::ALI => &[
            "qwen-turbo",
            "qwen-plus",
            "qwen-max",
            "qwen-max-longcontext",
            "text-embedding-v1",
        ],
        channel_type::ZHIPU => &["chatglm_pro", "chatglm_std", "chatglm_lite"],
        channel_type::XUNFEI => &[
            "SparkDesk",
            "SparkDesk-v1.1",
            "SparkDesk-v2.1",
            "SparkDesk-v3.1",
            "SparkDesk-v3.1-128K",
            "SparkDesk-v3.5",
            "SparkDesk-v3.5-32K",
            "SparkDesk-v4.0",
        ],
        channel_type::AI360 => &[
            "360GPT_S2_V9",
            "embedding-bert-512-v1",
            "embedding_s1_v1",
            "semantic_similarity_s1_v1",
        ],
        channel_type::TENCENT => &["hunyuan"],
        channel_type::GEMINI => &["gemini-pro", "gemini-pro-vision"],
        channel_type::MOONSHOT => &["moonshot-v1-8k", "moonshot-v1-32k", "moonshot-v1-128k"],
        channel_type::ZHIPU_V4 => &["glm-4", "glm-4v", "glm-3-turbo"],
        channel_type::MIDJOURNEY => &[
            "mj_imagine",
            "mj_variation",
            "mj_reroll",
            "mj_blend",
            "mj_upscale",
            "mj_describe",
        ],
        channel_type::MIDJOURNEY_PLUS => &[
            "swap_face",
            "mj_imagine",
            "mj_variation",
            "mj_reroll",
            "mj_blend",
            "mj_upscale",
            "mj_describe",
            "mj_zoom",
            "mj_shorten",
            "mj_modal",
            "mj_inpaint",
            "mj_custom_zoom",
            "mj_high_variation",
            "mj_low_variation",
            "mj_pan",
        ],
        _ => &[],
    }
}

/// Placeholder for the secret field.
pub fn key_prompt(kind: i64) -> &'static str {
    match kind {
        channel_type::BAIDU => "Enter in the following format: APIKey|SecretKey",
        channel_type::XUNFEI => "Enter in the following format: APPID|APISecret|APIKey",
        channel_type::FASTGPT => {
            "Enter in the following format: APIKey-AppId, for example: fastgpt-0sp2gtvfdgyi4k30jwlgwf1i-64f335d84283f05518e9e041"
        }
        channel_type::TENCENT => "Enter in the following format: AppId|SecretId|SecretKey",
        _ => "Please enter the authentication key for the channel",
    }
}

/// Provider-specific inputs shown between the type selector and the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraField {
    /// Azure resource endpoint, stored in `base_url`.
    AzureEndpoint,
    /// Azure API version, stored in `other`.
    AzureApiVersion,
    BaseUrl,
    /// Spark model version, stored in `other`.
    SparkVersion,
    /// Knowledge base id, stored in `other`.
    KnowledgeBaseId,
    /// FastGPT private deployment address, stored in `base_url`.
    PrivateDeployment,
    /// Optional reverse proxy, stored in `base_url`.
    Proxy,
}

pub fn extra_fields(kind: i64) -> &'static [ExtraField] {
    match kind {
        channel_type::AZURE => &[ExtraField::AzureEndpoint, ExtraField::AzureApiVersion],
        channel_type::CUSTOM => &[ExtraField::BaseUrl],
        channel_type::XUNFEI => &[ExtraField::SparkVersion],
        channel_type::AI_PROXY_LIBRARY => &[ExtraField::KnowledgeBaseId],
        channel_type::FASTGPT => &[ExtraField::PrivateDeployment],
        _ => &[ExtraField::Proxy],
    }
}

/// Form state for the channel panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDraft {
    pub name: String,
    pub channel_type: i64,
    pub key: String,
    pub openai_organization: String,
    pub base_url: String,
    pub other: String,
    pub model_mapping: String,
    pub system_prompt: String,
    pub models: Vec<String>,
    pub groups: Vec<String>,
    pub auto_ban: bool,
}

impl Default for ChannelDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            channel_type: channel_type::OPENAI,
            key: String::new(),
            openai_organization: String::new(),
            base_url: String::new(),
            other: String::new(),
            model_mapping: String::new(),
            system_prompt: String::new(),
            models: Vec::new(),
            groups: vec!["default".to_string()],
            auto_ban: true,
        }
    }
}

impl From<&Channel> for ChannelDraft {
    fn from(c: &Channel) -> Self {
        let mapping = c.model_mapping.clone().unwrap_or_default();
        Self {
            name: c.name.clone(),
            channel_type: c.channel_type,
            key: c.key.clone(),
            openai_organization: c.openai_organization.clone().unwrap_or_default(),
            base_url: c.base_url.clone().unwrap_or_default(),
            other: c.other.clone(),
            model_mapping: if mapping.is_empty() {
                mapping
            } else {
                pretty_json(&mapping)
            },
            system_prompt: c.system_prompt.clone().unwrap_or_default(),
            models: c.model_list(),
            groups: c.group_list(),
            auto_ban: c.auto_ban.unwrap_or(1) == 1,
        }
    }
}

pub struct ChannelEditor {
    ctx: Console,
    id: Option<i64>,
    draft: ChannelDraft,
    /// Create one channel per key line.
    batch: bool,
    available_models: Vec<String>,
    available_groups: Vec<String>,
    visible: bool,
}

impl ChannelEditor {
    pub fn create(ctx: Console) -> Self {
        Self {
            ctx,
            id: None,
            draft: ChannelDraft::default(),
            batch: false,
            available_models: Vec::new(),
            available_groups: Vec::new(),
            visible: true,
        }
    }

    /// Opens the panel on an existing channel.
    pub async fn edit(ctx: Console, id: i64) -> Result<Self> {
        let result = ctx.api.get_channel(id).await;
        let channel = ctx.report(result.map_err(ConsoleError::from))?;
        let mut editor = Self::create(ctx);
        editor.id = Some(id);
        editor.draft = ChannelDraft::from(&channel);
        Ok(editor)
    }

    /// Fetches the model and group choices.
    pub async fn load_options(&mut self) -> Result<()> {
        let models = self.ctx.api.list_channel_models().await;
        let models = self.ctx.report(models.map_err(ConsoleError::from))?;
        self.available_models = models.into_iter().map(|m| m.id).collect();
        let groups = self.ctx.api.list_groups().await;
        self.available_groups = self.ctx.report(groups.map_err(ConsoleError::from))?;
        Ok(())
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.visible
    }

    pub fn draft(&self) -> &ChannelDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut ChannelDraft {
        &mut self.draft
    }

    pub fn available_models(&self) -> &[String] {
        &self.available_models
    }

    pub fn available_groups(&self) -> &[String] {
        &self.available_groups
    }

    /// Batch mode only applies to new channels.
    pub fn set_batch(&mut self, batch: bool) {
        self.batch = batch && !self.is_edit();
    }

    pub fn fields(&self) -> &'static [ExtraField] {
        extra_fields(self.draft.channel_type)
    }

    pub fn key_prompt(&self) -> &'static str {
        key_prompt(self.draft.channel_type)
    }

    /// Switches the provider. An empty model list picks up the provider's
    /// presets.
    pub fn set_type(&mut self, kind: i64) {
        self.draft.channel_type = kind;
        if self.draft.models.is_empty() {
            self.draft.models = preset_models(kind).iter().map(|m| m.to_string()).collect();
        }
    }

    pub fn add_custom_model(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        if self.draft.models.iter().any(|m| m == name) {
            return self
                .ctx
                .report(Err(ConsoleError::validation("This model already exists!")));
        }
        self.draft.models.push(name.to_string());
        if !self.available_models.iter().any(|m| m == name) {
            self.available_models.push(name.to_string());
        }
        Ok(())
    }

    pub fn fill_basic_models(&mut self) {
        self.draft.models = self
            .available_models
            .iter()
            .filter(|m| m.starts_with("gpt-3") || m.starts_with("text-"))
            .cloned()
            .collect();
    }

    pub fn fill_all_models(&mut self) {
        self.draft.models = self.available_models.clone();
    }

    pub fn clear_models(&mut self) {
        self.draft.models.clear();
    }

    pub fn fill_mapping_template(&mut self) {
        self.draft.model_mapping = MODEL_MAPPING_EXAMPLE.to_string();
    }

    /// Checks the draft and builds the request body.
    pub fn build_form(&self) -> Result<ChannelForm> {
        let d = &self.draft;
        if !self.is_edit() && (d.name.trim().is_empty() || d.key.trim().is_empty()) {
            return Err(ConsoleError::validation(
                "Please fill in the channel name and channel key!",
            ));
        }
        if d.models.is_empty() {
            return Err(ConsoleError::validation("Please select at least one model!"));
        }
        if !d.model_mapping.is_empty() && !verify_json(&d.model_mapping) {
            return Err(ConsoleError::validation(
                "Model mapping must be in valid JSON format!",
            ));
        }

        let mut other = d.other.clone();
        if other.is_empty() {
            match d.channel_type {
                channel_type::AZURE => other = AZURE_DEFAULT_API_VERSION.to_string(),
                channel_type::XUNFEI => other = SPARK_DEFAULT_VERSION.to_string(),
                _ => {}
            }
        }
        let key = if self.batch {
            d.key
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            d.key.clone()
        };

        Ok(ChannelForm {
            id: self.id,
            name: d.name.clone(),
            channel_type: d.channel_type,
            key,
            openai_organization: d.openai_organization.clone(),
            base_url: remove_trailing_slash(&d.base_url),
            other,
            model_mapping: d.model_mapping.clone(),
            system_prompt: d.system_prompt.clone(),
            models: d.models.join(","),
            group: d.groups.join(","),
            auto_ban: i64::from(d.auto_ban),
        })
    }

    /// Saves the draft. On success the parent list is refreshed and the
    /// panel closes; on failure the panel stays open with its input.
    pub async fn submit(&mut self, parent: &mut impl Refresh) -> Result<()> {
        let form = self.ctx.report(self.build_form())?;
        let result = match self.id {
            Some(_) => self.ctx.api.update_channel(&form).await,
            None => self.ctx.api.create_channel(&form).await,
        };
        self.ctx.report(result.map_err(ConsoleError::from))?;
        if self.is_edit() {
            self.ctx.notifier.success("Channel updated successfully!");
        } else {
            self.ctx.notifier.success("Channel created successfully!");
            self.draft = ChannelDraft::default();
        }
        info!(name = %form.name, kind = form.channel_type, "channel saved");
        self.visible = false;
        parent.refresh().await
    }

    pub fn close(&mut self) {
        self.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::harness;
    use crate::notify::Level;
    use async_trait::async_trait;
    use oneadmin_api::Method;
    use oneadmin_core::types::UserRole;
    use serde_json::json;

    #[derive(Default)]
    struct Parent {
        refreshed: usize,
    }

    #[async_trait]
    impl Refresh for Parent {
        async fn refresh(&mut self) -> Result<()> {
            self.refreshed += 1;
            Ok(())
        }
    }

    #[test]
    fn layout_follows_type() {
        assert_eq!(
            extra_fields(channel_type::AZURE),
            &[ExtraField::AzureEndpoint, ExtraField::AzureApiVersion]
        );
        assert_eq!(extra_fields(channel_type::XUNFEI), &[ExtraField::SparkVersion]);
        assert_eq!(extra_fields(channel_type::ANTHROPIC), &[ExtraField::Proxy]);
        assert!(key_prompt(channel_type::TENCENT).contains("AppId|SecretId|SecretKey"));
        assert_eq!(
            key_prompt(channel_type::OPENAI),
            "Please enter the authentication key for the channel"
        );
    }

    #[tokio::test]
    async fn type_change_fills_only_empty_model_list() {
        let h = harness();
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.set_type(channel_type::GEMINI);
        assert_eq!(ed.draft().models, vec!["gemini-pro", "gemini-pro-vision"]);
        ed.set_type(channel_type::MOONSHOT);
        assert_eq!(ed.draft().models.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_custom_model_is_rejected() {
        let h = harness();
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.add_custom_model("my-model").unwrap();
        assert!(ed.add_custom_model(" my-model ").is_err());
        assert!(h.notes.contains(Level::Info, "already exists"));
        assert_eq!(ed.draft().models, vec!["my-model"]);
    }

    #[tokio::test]
    async fn fill_helpers_use_loaded_models() {
        let h = harness();
        h.mock
            .ok(
                Method::Get,
                "/api/channel/models",
                json!([{"id": "gpt-3.5-turbo"}, {"id": "gpt-4"}, {"id": "text-embedding-ada-002"}]),
            )
            .ok(Method::Get, "/api/group/", json!(["default", "vip"]));
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.load_options().await.unwrap();
        ed.fill_basic_models();
        assert_eq!(ed.draft().models, vec!["gpt-3.5-turbo", "text-embedding-ada-002"]);
        ed.fill_all_models();
        assert_eq!(ed.draft().models.len(), 3);
        ed.clear_models();
        assert!(ed.draft().models.is_empty());
        assert_eq!(ed.available_groups(), &["default", "vip"]);
    }

    #[tokio::test]
    async fn missing_fields_block_request() {
        let h = harness();
        let mut parent = Parent::default();
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.draft_mut().models = vec!["gpt-4".into()];
        assert!(ed.submit(&mut parent).await.is_err());
        assert!(h.notes.contains(Level::Info, "channel name and channel key"));

        ed.draft_mut().name = "main".into();
        ed.draft_mut().key = "sk-1".into();
        ed.draft_mut().models.clear();
        assert!(ed.submit(&mut parent).await.is_err());

        ed.draft_mut().models = vec!["gpt-4".into()];
        ed.draft_mut().model_mapping = "{not json".into();
        assert!(ed.submit(&mut parent).await.is_err());
        assert!(h.notes.contains(Level::Info, "valid JSON"));

        assert!(h.mock.requests().is_empty());
        assert_eq!(parent.refreshed, 0);
        assert!(ed.is_open());
    }

    #[tokio::test]
    async fn create_normalises_and_closes() {
        let h = harness();
        h.login_as(UserRole::Root);
        h.mock.ok(Method::Post, "/api/channel/", json!(null));
        let mut parent = Parent::default();
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.set_type(channel_type::AZURE);
        ed.set_batch(true);
        {
            let d = ed.draft_mut();
            d.name = "azure".into();
            d.key = "k1\n\n  k2  \n".into();
            d.base_url = "https://res.openai.azure.com/".into();
            d.models = vec!["gpt-4".into(), "gpt-35-turbo".into()];
            d.auto_ban = false;
        }
        ed.submit(&mut parent).await.unwrap();

        let body = h.mock.last().unwrap().body.unwrap();
        assert_eq!(body["key"], "k1\nk2");
        assert_eq!(body["base_url"], "https://res.openai.azure.com");
        assert_eq!(body["other"], AZURE_DEFAULT_API_VERSION);
        assert_eq!(body["models"], "gpt-4,gpt-35-turbo");
        assert_eq!(body["group"], "default");
        assert_eq!(body["auto_ban"], 0);
        assert_eq!(body["type"], channel_type::AZURE);
        assert!(body.get("id").is_none());

        assert_eq!(parent.refreshed, 1);
        assert!(!ed.is_open());
        assert!(h.notes.contains(Level::Success, "Channel created successfully!"));
    }

    #[tokio::test]
    async fn edit_loads_and_updates() {
        let h = harness();
        h.mock
            .ok(
                Method::Get,
                "/api/channel/7",
                json!({
                    "id": 7, "name": "spark", "type": 18, "key": "a|b|c",
                    "models": "SparkDesk,SparkDesk-v3.5", "group": "default,vip",
                    "model_mapping": "{\"a\":\"b\"}", "auto_ban": 1
                }),
            )
            .ok(Method::Put, "/api/channel/", json!(null));
        let mut parent = Parent::default();
        let mut ed = ChannelEditor::edit(h.console.clone(), 7).await.unwrap();
        assert_eq!(ed.draft().groups, vec!["default", "vip"]);
        assert!(ed.draft().model_mapping.contains('\n'));
        assert!(ed.draft().auto_ban);

        ed.submit(&mut parent).await.unwrap();
        let body = h.mock.last().unwrap().body.unwrap();
        assert_eq!(body["id"], 7);
        assert_eq!(body["other"], SPARK_DEFAULT_VERSION);
        assert!(h.notes.contains(Level::Success, "Channel updated successfully!"));
        assert_eq!(parent.refreshed, 1);
    }

    #[tokio::test]
    async fn server_rejection_keeps_panel_open() {
        let h = harness();
        h.mock.on(
            Method::Post,
            "/api/channel/",
            oneadmin_api::Envelope::fail("duplicate name"),
        );
        let mut parent = Parent::default();
        let mut ed = ChannelEditor::create(h.console.clone());
        ed.draft_mut().name = "x".into();
        ed.draft_mut().key = "k".into();
        ed.draft_mut().models = vec!["gpt-4".into()];
        assert!(ed.submit(&mut parent).await.is_err());
        assert!(ed.is_open());
        assert_eq!(ed.draft().name, "x");
        assert!(h.notes.contains(Level::Error, "duplicate name"));
    }
}
