//! Outbound Bot API calls: messages, chat actions, command menu.

use super::{TelegramChannel, MAX_MESSAGE_LEN};
use invbot_core::{
    error::BotError,
    message::{OutgoingMessage, TextFormat},
};
use serde_json::json;
use tracing::{debug, info, warn};

impl TelegramChannel {
    /// Deliver a message, split into chunks under Telegram's length limit.
    ///
    /// HTML that Telegram refuses to parse is resent as plain text. Any other
    /// rejection is returned as [`BotError::Channel`].
    pub(crate) async fn send_text(&self, message: &OutgoingMessage) -> Result<(), BotError> {
        let url = format!("{}/sendMessage", self.base_url);

        for chunk in split_message(&message.text, MAX_MESSAGE_LEN) {
            let mut body = json!({
                "chat_id": message.chat_id,
                "text": chunk,
                "link_preview_options": { "is_disabled": message.disable_link_preview },
            });
            if message.format == TextFormat::Html {
                body["parse_mode"] = json!("HTML");
            }

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| BotError::Channel(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            if status.is_success() {
                continue;
            }

            let error_text = resp.text().await.unwrap_or_default();
            if message.format == TextFormat::Html && error_text.contains("can't parse entities") {
                debug!("telegram: HTML parse failed, retrying as plain text");
                if let Some(obj) = body.as_object_mut() {
                    obj.remove("parse_mode");
                }
                let retry = self
                    .client
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| BotError::Channel(format!("telegram send (plain) failed: {e}")))?;
                if !retry.status().is_success() {
                    let retry_status = retry.status();
                    let retry_text = retry.text().await.unwrap_or_default();
                    return Err(BotError::Channel(format!(
                        "telegram send (plain) to {} got {retry_status}: {retry_text}",
                        message.chat_id
                    )));
                }
            } else {
                return Err(BotError::Channel(format!(
                    "telegram send to {} got {status}: {error_text}",
                    message.chat_id
                )));
            }
        }

        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = json!({
            "commands": [
                { "command": "start", "description": "Subscribe to inventory notifications" },
                { "command": "check", "description": "Show the current inventory" },
                { "command": "stats", "description": "Bot statistics (admins only)" },
                { "command": "help", "description": "Show available commands" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("telegram: registered bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("telegram: failed to register bot commands: {body}");
            }
            Err(e) => {
                warn!("telegram: failed to register bot commands: {e}");
            }
        }
    }

    /// Send a chat action (e.g. "typing") to a chat.
    pub(crate) async fn send_chat_action(&self, chat_id: i64, action: &str) -> Result<(), BotError> {
        let url = format!("{}/sendChatAction", self.base_url);
        let body = json!({
            "chat_id": chat_id,
            "action": action,
        });

        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Channel(format!("telegram sendChatAction failed: {e}")))?;

        Ok(())
    }
}

/// Split a long message into chunks of at most `max_len` characters.
///
/// Length is counted in UTF-16 code units, as Telegram counts it, so an emoji
/// outside the BMP takes two. Breaks after the last newline inside the window
/// when there is one, and never inside a character.
pub fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;

    while let Some(end) = window_end(rest, max_len) {
        let break_at = rest[..end].rfind('\n').map_or(end, |i| i + 1);
        chunks.push(&rest[..break_at]);
        rest = &rest[break_at..];
    }
    chunks.push(rest);
    chunks
}

/// Byte offset where `text` overflows `max_len` UTF-16 units, or `None` if it fits.
///
/// A first character wider than the window is kept whole.
fn window_end(text: &str, max_len: usize) -> Option<usize> {
    let mut units = 0;
    for (i, c) in text.char_indices() {
        units += c.len_utf16();
        if units > max_len {
            return Some(if i == 0 { c.len_utf8() } else { i });
        }
    }
    None
}
