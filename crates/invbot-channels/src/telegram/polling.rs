//! Long-polling update loop and Channel trait implementation.

use super::types::{TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use invbot_core::{
    error::BotError,
    message::{IncomingMessage, OutgoingMessage, SenderProfile},
    traits::Channel,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

const POLL_TIMEOUT_SECS: u64 = 30;
const MAX_BACKOFF_SECS: u64 = 60;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, BotError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();

        info!("telegram: starting long polling");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let offset = last_update_id.lock().await.map(|id| id + 1);

                let mut url = format!("{base_url}/getUpdates?timeout={POLL_TIMEOUT_SECS}");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let failure = match client
                    .get(&url)
                    .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 5))
                    .send()
                    .await
                {
                    Err(e) => Some(format!("telegram poll error: {e}")),
                    Ok(resp) => match resp.json::<TgResponse<Vec<TgUpdate>>>().await {
                        Err(e) => Some(format!("telegram parse error: {e}")),
                        Ok(body) if !body.ok => Some(format!(
                            "telegram API error: {}",
                            body.description.unwrap_or_default()
                        )),
                        Ok(body) => {
                            // Successful poll -- reset backoff.
                            backoff_secs = 1;

                            let updates = body.result.unwrap_or_default();
                            if let Some(last_update) = updates.last() {
                                *last_update_id.lock().await = Some(last_update.update_id);
                            }

                            for update in updates {
                                let Some(incoming) = update.message.and_then(incoming_from) else {
                                    continue;
                                };
                                if tx.send(incoming).await.is_err() {
                                    info!("telegram: receiver dropped, stopping poll");
                                    return;
                                }
                            }
                            None
                        }
                    },
                };

                if let Some(reason) = failure {
                    error!("{reason} (retry in {backoff_secs}s)");
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), BotError> {
        self.send_text(&message).await
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), BotError> {
        self.send_chat_action(chat_id, "typing").await
    }

    async fn stop(&self) -> Result<(), BotError> {
        info!("telegram: channel stopped");
        Ok(())
    }
}

/// Turn a Telegram message into an [`IncomingMessage`].
///
/// Only text messages with a known sender are kept. Group chats are kept too:
/// a group can subscribe like a private chat.
pub(crate) fn incoming_from(msg: TgMessage) -> Option<IncomingMessage> {
    let Some(text) = msg.text else {
        debug!("telegram: skipping non-text message in chat {}", msg.chat.id);
        return None;
    };
    let user = msg.from?;

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        chat_id: msg.chat.id,
        sender: SenderProfile {
            id: user.id,
            first_name: Some(user.first_name).filter(|n| !n.is_empty()),
            last_name: user.last_name,
            username: user.username,
        },
        text,
        timestamp: chrono::Utc::now(),
        is_group: msg.chat.is_group(),
    })
}
