mod commands;
mod gateway;

use chrono::Utc;
use clap::{Parser, Subcommand};
use invbot_channels::telegram::TelegramChannel;
use invbot_core::config::{self, Config};
use invbot_inventory::{Formatter, InventoryFetcher, InventorySource};
use invbot_memory::{SnapshotStore, SubscriberStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "invbot",
    version,
    about = "Inventory watch bot for Telegram"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "INVBOT_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot: Telegram polling plus the periodic inventory sync.
    Start,
    /// Fetch the inventory once and print what /check would reply.
    Check,
    /// Show configuration and stored state.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_tracing(&cfg)?;

    match cli.command {
        Commands::Start => {
            if !cfg.telegram.enabled {
                anyhow::bail!("Telegram is disabled in config.toml; nothing to run.");
            }
            if cfg.telegram.bot_token.trim().is_empty() {
                anyhow::bail!(
                    "bot_token is empty. \
                     Set it in config.toml or the TELEGRAM_BOT_TOKEN env var."
                );
            }

            let channel = Arc::new(TelegramChannel::new(&cfg.telegram));
            let source = Arc::new(InventoryFetcher::new(&cfg.inventory)?);

            println!("{} -- starting...", cfg.bot.name);
            let gw = Arc::new(gateway::Gateway::new(&cfg, channel, source));
            gw.run().await?;
        }
        Commands::Check => {
            let fetcher = InventoryFetcher::new(&cfg.inventory)?;
            let results = fetcher
                .fetch(Duration::from_secs(cfg.inventory.check_timeout_secs))
                .await?;
            let formatter = Formatter::from_config(&cfg);
            println!("{}", formatter.format_check(&results, Utc::now()));
        }
        Commands::Status => print_status(&cli.config, &cfg).await,
    }

    Ok(())
}

/// Stdout plus a daily rolling file under `{data_dir}/logs`.
///
/// The returned guard flushes the file writer when dropped.
fn init_tracing(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let logs_dir = cfg.logs_dir();
    std::fs::create_dir_all(&logs_dir)?;
    let appender = tracing_appender::rolling::daily(&logs_dir, "invbot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.bot.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

async fn print_status(config_path: &str, cfg: &Config) {
    println!("{} -- Status\n", cfg.bot.name);
    println!("Config: {config_path}");
    println!("Data dir: {}", config::shellexpand(&cfg.bot.data_dir));
    println!("Admins: {}", cfg.bot.admins.len());
    println!();

    println!(
        "  telegram: {}",
        if cfg.telegram.enabled && !cfg.telegram.bot_token.trim().is_empty() {
            "configured"
        } else if cfg.telegram.enabled {
            "enabled but missing bot_token"
        } else {
            "disabled"
        }
    );
    println!(
        "  proxy: {}",
        if cfg.inventory.proxy().is_some() {
            "configured"
        } else {
            "direct"
        }
    );
    println!(
        "  scheduler: {}",
        if cfg.scheduler.enabled {
            format!(
                "every {}s, at least {}s apart",
                cfg.scheduler.tick().as_secs(),
                cfg.scheduler.min_spacing().as_secs()
            )
        } else {
            "disabled".to_string()
        }
    );
    match cfg.notify.price_ceiling() {
        Some(max) => println!("  price ceiling: {max}"),
        None => println!("  price ceiling: none"),
    }
    println!();

    let snapshots = SnapshotStore::new(cfg.snapshot_path());
    match snapshots.load().await {
        Ok(Some(s)) => println!(
            "  snapshot: {} vehicles, captured {}",
            s.vehicles.len(),
            s.captured_at()
                .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
                .unwrap_or_else(|| "at an unknown time".to_string())
        ),
        Ok(None) => println!("  snapshot: none yet"),
        Err(e) => println!("  snapshot: unreadable ({e})"),
    }

    let subscribers = SubscriberStore::new(cfg.subscribers_path());
    match subscribers.list().await {
        Ok(list) => println!("  subscribers: {}", list.len()),
        Err(e) => println!("  subscribers: unreadable ({e})"),
    }
}
