//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use oneadmin_core::types::UserAction;

use crate::output::OutputFormat;

/// Admin console for a one-api style LLM gateway.
#[derive(Parser)]
#[command(name = "oneadmin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.oneadmin/oneadmin.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Gateway base URL, overrides the config file
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Output format for lists
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with username and password
    Login {
        username: String,
        /// Read from ONEADMIN_PASSWORD when omitted
        #[arg(short, long, env = "ONEADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        /// Tag the login as coming from an editor integration
        #[arg(long)]
        source: Option<String>,
    },

    /// End the session
    Logout,

    /// Create an account
    Register(RegisterArgs),

    /// Email a password reset link
    ResetPassword { email: String },

    /// Complete a GitHub OAuth redirect
    GithubCallback {
        #[arg(long)]
        code: String,
        #[arg(long)]
        state: String,
    },

    /// Sign in with Telegram widget fields (key=value ...)
    TelegramLogin {
        #[arg(value_parser = parse_pair, required = true)]
        fields: Vec<(String, String)>,
    },

    /// Show the editor-integration sign-in result (redirect key=value pairs)
    EditorSuccess {
        #[arg(value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },

    /// Print the GitHub authorize URL
    GithubUrl,

    /// Refresh and show the gateway's public status
    Status,

    /// Show the home page content and any new notice
    Home,

    /// Show the about page
    About,

    /// Channel management
    #[command(subcommand)]
    Channel(ChannelCommands),

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// API token management
    #[command(subcommand)]
    Token(TokenCommands),

    /// Redemption code management
    #[command(subcommand)]
    Redemption(RedemptionCommands),

    /// Gateway options (root only)
    #[command(name = "option", subcommand)]
    Options(OptionCommands),

    /// Midjourney task log
    Mj(MjArgs),

    /// Balance and payments
    #[command(subcommand)]
    Topup(TopupCommands),

    /// Your own account
    #[command(name = "self", subcommand)]
    Account(AccountCommands),
}

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "ONEADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Repeat of the password; defaults to the same value
    #[arg(long)]
    pub password2: Option<String>,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub code: String,
    /// Invite code; falls back to the one remembered from an invite link
    #[arg(long, default_value = "")]
    pub aff: String,
    /// Send the email verification code instead of registering
    #[arg(long)]
    pub send_code: bool,
}

#[derive(Subcommand)]
pub enum ChannelCommands {
    /// List channels
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Sort by id instead of priority (remembered)
        #[arg(long)]
        id_sort: Option<bool>,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Search by keyword, group and model
    Search {
        #[arg(default_value = "")]
        keyword: String,
        #[arg(long, default_value = "")]
        group: String,
        #[arg(long, default_value = "")]
        model: String,
    },
    /// Add a channel
    Add(ChannelFields),
    /// Edit a channel; omitted fields keep their value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ChannelFields,
    },
    Enable { id: i64 },
    Disable { id: i64 },
    Delete { id: i64 },
    /// Set the routing priority
    Priority { id: i64, value: String },
    /// Set the routing weight
    Weight { id: i64, value: String },
    /// Send one test request through a channel
    Test {
        id: i64,
        #[arg(long)]
        model: Option<String>,
    },
    /// Test every channel, or only disabled ones
    TestAll {
        #[arg(long)]
        disabled: bool,
    },
    /// Refresh the upstream balance of one channel, or of all channels
    Balance { id: Option<i64> },
    /// Delete every disabled channel
    DeleteDisabled,
    /// Delete several channels at once
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Rebuild the channel ability table
    Fix,
}

#[derive(Args, Default)]
pub struct ChannelFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Channel type code
    #[arg(long = "type")]
    pub kind: Option<i64>,
    /// Key; with --batch, one key per line
    #[arg(long)]
    pub key: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
    /// Type-specific extra value (API version, region, ...)
    #[arg(long)]
    pub other: Option<String>,
    #[arg(long)]
    pub organization: Option<String>,
    /// Comma-separated model list
    #[arg(long, value_delimiter = ',')]
    pub models: Option<Vec<String>>,
    /// Add models not offered by the gateway
    #[arg(long = "custom-model")]
    pub custom_models: Vec<String>,
    /// Fill in the type's preset models
    #[arg(long)]
    pub basic_models: bool,
    /// Fill in every model the gateway knows
    #[arg(long)]
    pub all_models: bool,
    /// Comma-separated groups
    #[arg(long, value_delimiter = ',')]
    pub groups: Option<Vec<String>>,
    /// JSON object mapping requested to upstream model names
    #[arg(long)]
    pub model_mapping: Option<String>,
    #[arg(long)]
    pub system_prompt: Option<String>,
    #[arg(long)]
    pub auto_ban: Option<bool>,
    /// Create one channel per key line
    #[arg(long)]
    pub batch: bool,
}

#[derive(Subcommand)]
pub enum UserCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Server-side order, e.g. "quota" or "used_quota"
        #[arg(long, default_value = "")]
        order: String,
    },
    Search { keyword: String },
    /// Delete, enable, disable, promote or demote a user
    Manage { id: i64, action: UserAction },
    Add {
        #[arg(long)]
        username: String,
        #[arg(long, env = "ONEADMIN_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        display_name: String,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
}

#[derive(Args, Default)]
pub struct UserFields {
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub display_name: Option<String>,
    /// New password; leave empty to keep the current one
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub group: Option<String>,
    #[arg(long)]
    pub quota: Option<String>,
}

#[derive(Subcommand)]
pub enum TokenCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Search { keyword: String },
    Add {
        #[command(flatten)]
        fields: TokenFields,
        /// Create several tokens with random name suffixes
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: TokenFields,
    },
    Enable { id: i64 },
    Disable { id: i64 },
    Delete { id: i64 },
}

#[derive(Args, Default)]
pub struct TokenFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub quota: Option<i64>,
    #[arg(long)]
    pub unlimited: Option<bool>,
    /// Absolute expiry, "YYYY-MM-DD HH:MM:SS"
    #[arg(long, conflicts_with_all = ["never_expires", "expires_in"])]
    pub expires_at: Option<String>,
    #[arg(long)]
    pub never_expires: bool,
    /// Relative expiry as months,days,hours,minutes
    #[arg(long, value_delimiter = ',')]
    pub expires_in: Option<Vec<i64>>,
    /// Restrict the token to these models (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub models: Option<Vec<String>>,
}

#[derive(Subcommand)]
pub enum RedemptionCommands {
    List {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    Search { keyword: String },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quota: Option<i64>,
        #[arg(long, default_value_t = 1)]
        count: i64,
        /// Write the new codes to <dir>/<name>.txt
        #[arg(long)]
        export: Option<PathBuf>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quota: Option<i64>,
    },
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum OptionCommands {
    /// Show every option
    List,
    /// Change one option and save the group it belongs to
    Set { key: String, value: String },
    /// Flip a boolean option
    Toggle {
        key: String,
        /// Required to turn password login off
        #[arg(long)]
        confirm: bool,
    },
    /// Add or remove email domains from the registration whitelist
    Domains {
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
    /// Delete usage logs older than a time ("YYYY-MM-DD HH:MM:SS")
    PurgeLogs {
        #[arg(long)]
        before: Option<String>,
    },
}

#[derive(Args)]
pub struct MjArgs {
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    #[arg(long)]
    pub channel: Option<String>,
    #[arg(long)]
    pub task: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Subcommand)]
pub enum TopupCommands {
    /// Show the current balance
    Show,
    /// Redeem a code
    Redeem { code: String },
    /// Print the external top-up link
    Link,
    /// Price of an online top-up
    Amount {
        count: i64,
        #[arg(long, default_value = "")]
        promo: String,
    },
    /// Start an online payment and print the form to submit
    Pay {
        count: i64,
        #[arg(long, default_value = "alipay")]
        method: String,
        #[arg(long, default_value = "")]
        promo: String,
    },
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show the profile
    Show,
    /// Edit display name or username
    Edit {
        #[command(flatten)]
        fields: UserFields,
    },
    /// Models available to you
    Models,
    /// Issue a new system access token
    AccessToken,
    /// Print your invite link
    Invite,
    /// Move affiliate rewards into the balance
    Transfer { quota: i64 },
    Password {
        #[arg(long, env = "ONEADMIN_NEW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Send an email verification code
    SendCode { email: String },
    BindEmail { email: String, code: String },
    /// Print the URL that binds a GitHub account
    BindGithub,
    /// Bind a Telegram account with widget fields (key=value ...)
    BindTelegram {
        #[arg(value_parser = parse_pair, required = true)]
        fields: Vec<(String, String)>,
    },
    /// Delete your account; repeat the username to confirm
    Delete {
        #[arg(long)]
        confirm: String,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", s))
}
