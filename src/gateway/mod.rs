//! Gateway -- the main event loop connecting the channel, the stores and the
//! inventory pipeline.
//!
//! Includes: subscriber registration, command dispatch, the scheduled sync,
//! and graceful shutdown.

mod broadcast;
mod guard;
mod pipeline;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;

use crate::commands::{self, Command, CommandContext};
use broadcast::Broadcaster;
use guard::SchedulerGuard;
use invbot_core::{
    config::Config,
    message::{IncomingMessage, OutgoingMessage},
    model::Subscriber,
    traits::Channel,
};
use invbot_inventory::{
    filter::filter_from_config, format::escape_html, Formatter, InventorySource,
};
use invbot_memory::{SnapshotStore, SubscriberStore};
use pipeline::Pipeline;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Routes chat traffic to command handlers and drives the periodic sync.
pub struct Gateway {
    channel: Arc<dyn Channel>,
    pipeline: Arc<Pipeline>,
    guard: SchedulerGuard,
    scheduler_enabled: bool,
    tick: Duration,
    check_timeout: Duration,
    bot_name: String,
    uptime: Instant,
}

impl Gateway {
    /// Wire the stores, formatter and pipeline from config.
    pub fn new(
        config: &Config,
        channel: Arc<dyn Channel>,
        source: Arc<dyn InventorySource>,
    ) -> Self {
        let pipeline = Pipeline {
            source,
            snapshots: SnapshotStore::new(config.snapshot_path()),
            subscribers: SubscriberStore::new(config.subscribers_path()),
            broadcaster: Broadcaster::new(channel.clone(), config.notify.send_delay()),
            formatter: Arc::new(Formatter::from_config(config)),
            filter: filter_from_config(&config.notify),
            admins: config.bot.admins.clone(),
            fetch_timeout: Duration::from_secs(config.inventory.timeout_secs),
            alert_on_failure: config.notify.alert_admins_on_failure,
        };

        Self {
            channel,
            pipeline: Arc::new(pipeline),
            guard: SchedulerGuard::new(config.scheduler.min_spacing()),
            scheduler_enabled: config.scheduler.enabled,
            tick: config.scheduler.tick(),
            check_timeout: Duration::from_secs(config.inventory.check_timeout_secs),
            bot_name: config.bot.name.clone(),
            uptime: Instant::now(),
        }
    }

    /// Run the main event loop until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "{} gateway running | channel: {} | sync: {} | admins: {}",
            self.bot_name,
            self.channel.name(),
            if self.scheduler_enabled {
                format!("every {}s", self.tick.as_secs())
            } else {
                "disabled".to_string()
            },
            self.pipeline.admins.len(),
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;

        self.notify_admins(&format!(
            "🟢 <b>{}</b> started.",
            escape_html(&self.bot_name)
        ))
        .await;

        let sched_handle = if self.scheduler_enabled {
            let pipeline = self.pipeline.clone();
            let guard = self.guard.clone();
            let tick = self.tick;
            Some(tokio::spawn(async move {
                Self::scheduler_loop(pipeline, guard, tick).await;
            }))
        } else {
            info!("scheduler disabled; only /check will reach the inventory");
            None
        };

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                incoming = rx.recv() => {
                    let Some(incoming) = incoming else {
                        warn!("channel closed its message stream");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(sched_handle).await;
        Ok(())
    }

    /// Register the chat, then answer it if the text is a command.
    pub(crate) async fn handle_message(&self, incoming: IncomingMessage) {
        self.register_chat(&incoming).await;

        let Some(cmd) = Command::parse(&incoming.text) else {
            debug!("ignoring non-command message in chat {}", incoming.chat_id);
            return;
        };
        let args = commands::args(&incoming.text);
        info!(
            "command {cmd:?} from {} in chat {}{}",
            incoming.sender.display_name(),
            incoming.chat_id,
            if args.is_empty() { String::new() } else { format!(" (ignored args: {args})") }
        );

        if cmd == Command::Check {
            if let Err(e) = self.channel.send_typing(incoming.chat_id).await {
                debug!("typing indicator failed: {e}");
            }
        }

        let ctx = CommandContext {
            source: self.pipeline.source.as_ref(),
            formatter: &self.pipeline.formatter,
            snapshots: &self.pipeline.snapshots,
            subscribers: &self.pipeline.subscribers,
            chat_id: incoming.chat_id,
            is_admin: self.pipeline.admins.contains(&incoming.sender.id)
                || self.pipeline.admins.contains(&incoming.chat_id),
            check_timeout: self.check_timeout,
            uptime: &self.uptime,
            bot_name: &self.bot_name,
            sync_running: self.guard.is_running(),
        };

        if let Some(reply) = commands::handle(cmd, &ctx).await {
            if let Err(e) = self.channel.send(reply).await {
                error!("failed to reply in chat {}: {e}", incoming.chat_id);
            }
        }
    }

    /// Add the chat to the subscriber list on first contact and tell admins.
    async fn register_chat(&self, incoming: &IncomingMessage) {
        let subscriber = Subscriber {
            id: incoming.chat_id,
            first_name: incoming.sender.first_name.clone(),
            last_name: incoming.sender.last_name.clone(),
            username: incoming.sender.username.clone(),
        };

        match self.pipeline.subscribers.register(subscriber).await {
            Ok(true) => {
                let kind = if incoming.is_group { "group" } else { "user" };
                self.notify_admins(&format!(
                    "👤 New subscriber ({kind}): {} [<code>{}</code>]",
                    escape_html(&incoming.sender.display_name()),
                    incoming.chat_id
                ))
                .await;
            }
            Ok(false) => {}
            Err(e) => warn!("could not register chat {}: {e}", incoming.chat_id),
        }
    }

    /// Best-effort operational notice to every admin.
    async fn notify_admins(&self, html: &str) {
        self.pipeline
            .broadcaster
            .broadcast(&OutgoingMessage::html(0, html), &self.pipeline.admins)
            .await;
    }

    /// Graceful shutdown: stop the scheduler, then the channel.
    async fn shutdown(&self, sched_handle: Option<tokio::task::JoinHandle<()>>) {
        info!("Shutting down...");

        if let Some(h) = sched_handle {
            h.abort();
        }

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }

        info!("Shutdown complete.");
    }
}
