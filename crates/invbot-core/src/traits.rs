use crate::{
    error::BotError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Messaging Channel trait.
///
/// The Telegram integration implements this to receive commands and deliver
/// notifications; tests substitute recording stubs.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, BotError>;

    /// Deliver one message to the chat named in `message.chat_id`.
    async fn send(&self, message: OutgoingMessage) -> Result<(), BotError>;

    /// Send a typing indicator to show the bot is processing.
    async fn send_typing(&self, _chat_id: i64) -> Result<(), BotError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), BotError>;
}
