use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements the integer wire encoding shared by every status enum:
/// `From<i64>` (unknown codes land in `Unknown`) and `From<Enum> for i64`.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        impl From<i64> for $name {
            fn from(code: i64) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> i64 {
                match value {
                    $($name::$variant => $code,)+
                    $name::Unknown(other) => other,
                }
            }
        }

        impl $name {
            pub fn code(self) -> i64 {
                i64::from(self)
            }
        }
    };
}

// ── users ────────────────────────────────────────────────────────────────────

/// Role of a console account. Admins manage users and tokens; only root
/// sees operation and system settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum UserRole {
    Guest,
    #[default]
    Common,
    Admin,
    Root,
    Unknown(i64),
}

wire_enum!(UserRole {
    Guest = 0,
    Common = 1,
    Admin = 10,
    Root = 100,
});

impl UserRole {
    pub fn is_admin(self) -> bool {
        self.code() >= 10
    }

    pub fn is_root(self) -> bool {
        self.code() >= 100
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Guest => write!(f, "Guest"),
            UserRole::Common => write!(f, "Regular User"),
            UserRole::Admin => write!(f, "Administrator"),
            UserRole::Root => write!(f, "Super Administrator"),
            UserRole::Unknown(_) => write!(f, "Unknown Identity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum UserStatus {
    #[default]
    Enabled,
    Disabled,
    Deleted,
    Unknown(i64),
}

wire_enum!(UserStatus {
    Enabled = 1,
    Disabled = 2,
    Deleted = 3,
});

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Enabled => write!(f, "Activated"),
            UserStatus::Disabled => write!(f, "Banned"),
            UserStatus::Deleted => write!(f, "Deleted"),
            UserStatus::Unknown(_) => write!(f, "Unknown Status"),
        }
    }
}

/// Actions accepted by `POST /api/user/manage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserAction {
    Delete,
    Enable,
    Disable,
    Promote,
    Demote,
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserAction::Delete => write!(f, "delete"),
            UserAction::Enable => write!(f, "enable"),
            UserAction::Disable => write!(f, "disable"),
            UserAction::Promote => write!(f, "promote"),
            UserAction::Demote => write!(f, "demote"),
        }
    }
}

impl std::str::FromStr for UserAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete" => Ok(UserAction::Delete),
            "enable" => Ok(UserAction::Enable),
            "disable" => Ok(UserAction::Disable),
            "promote" => Ok(UserAction::Promote),
            "demote" => Ok(UserAction::Demote),
            _ => Err(format!("unknown user action: {}", s)),
        }
    }
}

// ── channels ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ChannelStatus {
    #[default]
    Enabled,
    ManuallyDisabled,
    AutoDisabled,
    Unknown(i64),
}

wire_enum!(ChannelStatus {
    Enabled = 1,
    ManuallyDisabled = 2,
    AutoDisabled = 3,
});

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Enabled => write!(f, "Enabled"),
            ChannelStatus::ManuallyDisabled => write!(f, "Disabled"),
            ChannelStatus::AutoDisabled => write!(f, "Auto Disabled"),
            ChannelStatus::Unknown(_) => write!(f, "Unknown Status"),
        }
    }
}

/// Upstream provider kinds the gateway can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelType {
    pub value: i64,
    pub label: &'static str,
    pub color: &'static str,
}

pub const CHANNEL_TYPES: &[ChannelType] = &[
    ChannelType { value: 1, label: "OpenAI", color: "green" },
    ChannelType { value: 14, label: "Anthropic Claude", color: "black" },
    ChannelType { value: 3, label: "Azure OpenAI", color: "olive" },
    ChannelType { value: 11, label: "Google PaLM2", color: "orange" },
    ChannelType { value: 24, label: "Google Gemini", color: "orange" },
    ChannelType { value: 15, label: "Baidu Wenxin Qianfan", color: "blue" },
    ChannelType { value: 17, label: "Alibaba Tongyi Qianwen", color: "orange" },
    ChannelType { value: 18, label: "iFlytek Spark Cognition", color: "blue" },
    ChannelType { value: 16, label: "Zhipu ChatGLM", color: "violet" },
    ChannelType { value: 26, label: "Zhipu GLM-4V", color: "purple" },
    ChannelType { value: 19, label: "360 Brain", color: "blue" },
    ChannelType { value: 25, label: "Moonshot AI", color: "black" },
    ChannelType { value: 23, label: "Tencent Hunyuan", color: "teal" },
    ChannelType { value: 8, label: "Custom Channel", color: "pink" },
    ChannelType { value: 2, label: "Midjourney Proxy", color: "light-blue" },
    ChannelType { value: 5, label: "Midjourney Proxy Plus", color: "blue" },
    ChannelType { value: 22, label: "Knowledge Base: FastGPT", color: "blue" },
    ChannelType { value: 21, label: "Knowledge Base: AI Proxy", color: "purple" },
    ChannelType { value: 20, label: "OpenRouter", color: "black" },
    ChannelType { value: 4, label: "CloseAI", color: "teal" },
    ChannelType { value: 6, label: "OpenAI Max", color: "violet" },
    ChannelType { value: 7, label: "OhMyGPT", color: "purple" },
    ChannelType { value: 9, label: "AI.LS", color: "yellow" },
    ChannelType { value: 10, label: "AI Proxy", color: "purple" },
    ChannelType { value: 12, label: "API2GPT", color: "blue" },
    ChannelType { value: 13, label: "AIGC2D", color: "purple" },
];

pub mod channel_type {
    pub const OPENAI: i64 = 1;
    pub const MIDJOURNEY: i64 = 2;
    pub const AZURE: i64 = 3;
    pub const MIDJOURNEY_PLUS: i64 = 5;
    pub const CUSTOM: i64 = 8;
    pub const PALM: i64 = 11;
    pub const ANTHROPIC: i64 = 14;
    pub const BAIDU: i64 = 15;
    pub const ZHIPU: i64 = 16;
    pub const ALI: i64 = 17;
    pub const XUNFEI: i64 = 18;
    pub const AI360: i64 = 19;
    pub const AI_PROXY_LIBRARY: i64 = 21;
    pub const FASTGPT: i64 = 22;
    pub const TENCENT: i64 = 23;
    pub const GEMINI: i64 = 24;
    pub const MOONSHOT: i64 = 25;
    pub const ZHIPU_V4: i64 = 26;
}

/// Catalog lookup; `None` for codes the console does not know.
pub fn find_channel_type(value: i64) -> Option<&'static ChannelType> {
    CHANNEL_TYPES.iter().find(|t| t.value == value)
}

pub fn channel_type_label(value: i64) -> &'static str {
    find_channel_type(value).map(|t| t.label).unwrap_or("Unknown")
}

// ── tokens & redemptions ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum TokenStatus {
    #[default]
    Enabled,
    Disabled,
    Expired,
    Exhausted,
    Unknown(i64),
}

wire_enum!(TokenStatus {
    Enabled = 1,
    Disabled = 2,
    Expired = 3,
    Exhausted = 4,
});

impl fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenStatus::Enabled => write!(f, "Enabled"),
            TokenStatus::Disabled => write!(f, "Disabled"),
            TokenStatus::Expired => write!(f, "Expired"),
            TokenStatus::Exhausted => write!(f, "Exhausted"),
            TokenStatus::Unknown(_) => write!(f, "Unknown Status"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum RedemptionStatus {
    #[default]
    Unused,
    Disabled,
    Used,
    Unknown(i64),
}

wire_enum!(RedemptionStatus {
    Unused = 1,
    Disabled = 2,
    Used = 3,
});

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedemptionStatus::Unused => write!(f, "Unused"),
            RedemptionStatus::Disabled => write!(f, "Disabled"),
            RedemptionStatus::Used => write!(f, "Used"),
            RedemptionStatus::Unknown(_) => write!(f, "Unknown Status"),
        }
    }
}
