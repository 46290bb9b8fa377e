use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming chat message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Chat the message was posted in; replies and subscriptions are keyed on it.
    pub chat_id: i64,
    pub sender: SenderProfile,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Whether this message comes from a group chat.
    #[serde(default)]
    pub is_group: bool,
}

/// Minimal addressing profile of whoever sent a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl SenderProfile {
    /// `@username`, else "First Last", else the numeric id.
    pub fn display_name(&self) -> String {
        if let Some(ref un) = self.username {
            return format!("@{un}");
        }
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.id.to_string(),
        }
    }
}

/// How the text of an outgoing message should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

/// An outgoing message to one chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(default)]
    pub format: TextFormat,
    #[serde(default)]
    pub disable_link_preview: bool,
}

impl OutgoingMessage {
    /// Plain text with link previews enabled.
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Plain,
            disable_link_preview: false,
        }
    }

    /// HTML text with link previews suppressed, the shape used for inventory notices.
    pub fn html(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            format: TextFormat::Html,
            disable_link_preview: true,
        }
    }

    /// Same message addressed to another chat.
    pub fn to(&self, chat_id: i64) -> Self {
        Self {
            chat_id,
            ..self.clone()
        }
    }
}
