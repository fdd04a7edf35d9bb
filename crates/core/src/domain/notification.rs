use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Android,
    Ios,
    Desktop,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        }
    }

    /// Android refuses to display anything until a channel exists.
    pub fn requires_channel(&self) -> bool {
        matches!(self, Self::Android)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Min,
    Low,
    #[default]
    Default,
    High,
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub importance: Importance,
}

impl NotificationChannel {
    pub const DEFAULT_ID: &'static str = "default";

    /// The `default` channel at maximum importance.
    pub fn default_max() -> Self {
        Self {
            id: Self::DEFAULT_ID.to_string(),
            name: Self::DEFAULT_ID.to_string(),
            importance: Importance::Max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
    pub shown_at: DateTime<Utc>,
}

impl LocalNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            shown_at: Utc::now(),
        }
    }
}
