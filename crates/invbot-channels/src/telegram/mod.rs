//! Telegram Bot API channel.
//!
//! Uses long polling via `getUpdates` and `sendMessage` for delivery.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
pub(crate) mod send;
pub(crate) mod types;


pub use send::split_message;

use invbot_core::config::TelegramConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

const API_BASE: &str = "https://api.telegram.org";

/// Telegram's per-message text limit.
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Telegram channel using the Bot API with long polling.
pub struct TelegramChannel {
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: &TelegramConfig) -> Self {
        Self::with_api_base(config, API_BASE)
    }

    /// Same as [`TelegramChannel::new`] against another Bot API host.
    pub fn with_api_base(config: &TelegramConfig, api_base: &str) -> Self {
        let base_url = format!(
            "{}/bot{}",
            api_base.trim_end_matches('/'),
            config.bot_token
        );
        Self {
            client: reqwest::Client::new(),
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
        }
    }
}
