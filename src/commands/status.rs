//! Informational handlers: /start, /stats, /help.

use super::CommandContext;
use chrono::Utc;
use invbot_core::message::OutgoingMessage;
use std::time::Duration;

pub(super) fn handle_start(ctx: &CommandContext<'_>) -> OutgoingMessage {
    OutgoingMessage::plain(
        ctx.chat_id,
        format!(
            "👋 Welcome to {}!\n\n\
             You are subscribed: a message arrives here whenever new vehicles \
             show up in the inventory.\n\n\
             Use /check to see the current inventory, or /help for all commands.",
            ctx.bot_name
        ),
    )
}

pub(super) fn handle_help(ctx: &CommandContext<'_>) -> OutgoingMessage {
    let mut text = String::from(
        "Commands\n\n\
         /start - subscribe to inventory notifications\n\
         /check - show the current inventory\n\
         /help - this message",
    );
    if ctx.is_admin {
        text.push_str("\n/stats - subscriber and snapshot statistics");
    }
    OutgoingMessage::plain(ctx.chat_id, text)
}

pub(super) async fn handle_stats(ctx: &CommandContext<'_>) -> OutgoingMessage {
    let subscribers = match ctx.subscribers.list().await {
        Ok(list) => list.len().to_string(),
        Err(e) => format!("unavailable ({e})"),
    };

    let snapshot = match ctx.snapshots.load().await {
        Ok(Some(s)) => {
            let age = s
                .captured_at()
                .and_then(|at| (Utc::now() - at).to_std().ok())
                .map(format_duration)
                .unwrap_or_else(|| "unknown age".to_string());
            format!("{} vehicles, {age} old", s.vehicles.len())
        }
        Ok(None) => "none yet".to_string(),
        Err(e) => format!("unreadable ({e})"),
    };

    OutgoingMessage::plain(
        ctx.chat_id,
        format!(
            "📊 {} statistics\n\n\
             👥 Subscribers: {subscribers}\n\
             📦 Snapshot: {snapshot}\n\
             🔄 Sync: {}\n\
             ⏱️ Uptime: {}",
            ctx.bot_name,
            if ctx.sync_running { "running" } else { "idle" },
            format_duration(ctx.uptime.elapsed()),
        ),
    )
}

/// `1h 2m 3s`, dropping leading zero units.
pub(super) fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (hours, minutes, secs) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
