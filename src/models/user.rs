use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Voice the chat coach answers in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTone {
    #[default]
    Supportive,
    Direct,
    Neutral,
}

impl ChatTone {
    pub const ALL: [ChatTone; 3] = [ChatTone::Supportive, ChatTone::Direct, ChatTone::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatTone::Supportive => "supportive",
            ChatTone::Direct => "direct",
            ChatTone::Neutral => "neutral",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatTone::Supportive => "Supportive",
            ChatTone::Direct => "Direct",
            ChatTone::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for ChatTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatTone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChatTone::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tone `{}` (expected supportive, direct or neutral)", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub chat_tone: ChatTone,
    pub currency: String,
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Body of `PUT /user/preferences` when only the tone changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneUpdate {
    pub chat_tone: ChatTone,
}
