//! Rate-limited sequential fan-out to many chats.

use invbot_core::{message::OutgoingMessage, traits::Channel};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome of one fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub sent: usize,
    /// Recipients whose delivery failed, in send order.
    pub failed: Vec<i64>,
}

/// Sends one message to every recipient, one at a time.
///
/// Waits `delay` after every attempt, failed or not. A failure is logged and
/// the fan-out moves on; nothing is retried.
#[derive(Clone)]
pub struct Broadcaster {
    channel: Arc<dyn Channel>,
    delay: Duration,
}

impl Broadcaster {
    pub fn new(channel: Arc<dyn Channel>, delay: Duration) -> Self {
        Self { channel, delay }
    }

    /// Deliver `message` to each of `recipients`; `message.chat_id` is ignored.
    pub async fn broadcast(&self, message: &OutgoingMessage, recipients: &[i64]) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        if recipients.is_empty() {
            return report;
        }

        info!("broadcast: sending to {} recipients", recipients.len());
        for &chat_id in recipients {
            match self.channel.send(message.to(chat_id)).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!("broadcast: delivery to {chat_id} failed: {e}");
                    report.failed.push(chat_id);
                }
            }
            tokio::time::sleep(self.delay).await;
        }

        info!(
            "broadcast: finished ({} sent, {} failed)",
            report.sent,
            report.failed.len()
        );
        report
    }
}
