//! Chat commands: /start, /check, /stats, /help.

mod inventory;
mod status;


use invbot_core::message::OutgoingMessage;
use invbot_inventory::{Formatter, InventorySource};
use invbot_memory::{SnapshotStore, SubscriberStore};
use std::time::{Duration, Instant};

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub source: &'a dyn InventorySource,
    pub formatter: &'a Formatter,
    pub snapshots: &'a SnapshotStore,
    pub subscribers: &'a SubscriberStore,
    pub chat_id: i64,
    pub is_admin: bool,
    pub check_timeout: Duration,
    pub uptime: &'a Instant,
    pub bot_name: &'a str,
    /// Whether a scheduled sync currently holds the guard.
    pub sync_running: bool,
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Check,
    Stats,
    Help,
}

impl Command {
    /// Parse a command from message text. Returns `None` for plain text and
    /// unknown `/` prefixes.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        // Strip @botname suffix (e.g. "/check@inv_bot" -> "/check").
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd.to_ascii_lowercase().as_str() {
            "/start" => Some(Self::Start),
            "/check" => Some(Self::Check),
            "/stats" => Some(Self::Stats),
            "/help" => Some(Self::Help),
            _ => None,
        }
    }
}

/// Everything after the command word, trimmed.
pub fn args(text: &str) -> &str {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => text[idx..].trim(),
        None => "",
    }
}

/// Handle a command and return the reply, if any.
///
/// `/stats` from a non-admin gets no reply at all.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Option<OutgoingMessage> {
    match cmd {
        Command::Start => Some(status::handle_start(ctx)),
        Command::Check => Some(inventory::handle_check(ctx).await),
        Command::Stats if ctx.is_admin => Some(status::handle_stats(ctx).await),
        Command::Stats => None,
        Command::Help => Some(status::handle_help(ctx)),
    }
}
