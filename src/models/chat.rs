use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSender {
    User,
    Ai,
}

impl MessageSender {
    /// Role name used on the wire and in the chat model's history.
    pub fn role(&self) -> &'static str {
        match self {
            MessageSender::User => "user",
            MessageSender::Ai => "assistant",
        }
    }
}

// Anything other than "user" is the assistant.
impl Serialize for MessageSender {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.role())
    }
}

impl<'de> Deserialize<'de> for MessageSender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == "user" {
            MessageSender::User
        } else {
            MessageSender::Ai
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub sender: MessageSender,
    #[serde(with = "crate::api::codec::rfc3339")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, sender: MessageSender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, MessageSender::User)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(content, MessageSender::Ai)
    }
}

/// One prior turn sent along with a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for HistoryTurn {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.sender.role().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Body of `POST /chat/stream`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStreamRequest {
    pub message: String,
    pub tone: super::ChatTone,
    pub conversation_history: Vec<HistoryTurn>,
}

impl ChatStreamRequest {
    pub fn new(message: impl Into<String>, tone: super::ChatTone, history: &[ChatMessage]) -> Self {
        Self {
            message: message.into(),
            tone,
            conversation_history: history.iter().map(HistoryTurn::from).collect(),
        }
    }
}

/// Body of `POST /chat/save`.
#[derive(Debug, Clone, Serialize)]
pub struct SaveConversation<'a> {
    pub messages: &'a [ChatMessage],
}
