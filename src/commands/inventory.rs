//! /check -- interactive inventory listing for the requesting chat.

use super::CommandContext;
use chrono::Utc;
use invbot_core::message::OutgoingMessage;
use invbot_inventory::format::CHECK_FAILED;
use tracing::{error, info};

/// Fetch with the short interactive timeout and render the result.
///
/// Never touches the snapshot; only the scheduled sync does.
pub(super) async fn handle_check(ctx: &CommandContext<'_>) -> OutgoingMessage {
    info!("check: requested by chat {}", ctx.chat_id);
    match ctx.source.fetch(ctx.check_timeout).await {
        Ok(results) => OutgoingMessage::html(
            ctx.chat_id,
            ctx.formatter.format_check(&results, Utc::now()),
        ),
        Err(e) => {
            error!("check: fetch for chat {} failed: {e}", ctx.chat_id);
            OutgoingMessage::html(ctx.chat_id, CHECK_FAILED)
        }
    }
}
