mod channels;
mod defaults;
mod inventory;


pub use channels::*;
pub use inventory::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::BotError;
use defaults::*;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Chat ids that receive operational notices and may use `/stats`.
    #[serde(default)]
    pub admins: Vec<i64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            admins: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn is_admin(&self, chat_id: i64) -> bool {
        self.admins.contains(&chat_id)
    }
}

/// Scheduler configuration -- the periodic inventory sync.
///
/// `tick_secs` is how often the timer fires; `min_spacing_secs` is the
/// minimum gap between two run starts. Ticks inside the gap are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    #[serde(default = "default_min_spacing_secs")]
    pub min_spacing_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: default_tick_secs(),
            min_spacing_secs: default_min_spacing_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_secs(self.min_spacing_secs)
    }
}

/// Notification policy and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Pause after every delivery attempt during a broadcast.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    /// Only announce new vehicles at or below this price. 0 = no ceiling.
    #[serde(default)]
    pub max_price: f64,
    /// Option group used to highlight notable variants.
    #[serde(default = "default_highlight_group")]
    pub highlight_group: String,
    /// Minimum numeric value in `highlight_group`. 0 = highlighting off.
    #[serde(default = "default_highlight_min")]
    pub highlight_min: f64,
    /// How many vehicles `/check` lists in detail.
    #[serde(default = "default_check_preview_count")]
    pub check_preview_count: usize,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Tell admins when a scheduled cycle fails.
    #[serde(default)]
    pub alert_admins_on_failure: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            send_delay_ms: default_send_delay_ms(),
            max_price: 0.0,
            highlight_group: default_highlight_group(),
            highlight_min: default_highlight_min(),
            check_preview_count: default_check_preview_count(),
            currency: default_currency(),
            alert_admins_on_failure: false,
        }
    }
}

impl NotifyConfig {
    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn price_ceiling(&self) -> Option<f64> {
        (self.max_price > 0.0).then_some(self.max_price)
    }
}

/// Where the snapshot and subscriber documents live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,
    #[serde(default = "default_subscribers_file")]
    pub subscribers_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
            subscribers_file: default_subscribers_file(),
        }
    }
}

impl Config {
    /// Snapshot file path; relative names resolve under `data_dir`.
    pub fn snapshot_path(&self) -> PathBuf {
        resolve_in(&self.bot.data_dir, &self.storage.snapshot_file)
    }

    /// Subscriber file path; relative names resolve under `data_dir`.
    pub fn subscribers_path(&self) -> PathBuf {
        resolve_in(&self.bot.data_dir, &self.storage.subscribers_file)
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand(&self.bot.data_dir)).join("logs")
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(proxy) = lookup("PROXY_URL").filter(|v| !v.trim().is_empty()) {
            self.inventory.proxy_url = proxy;
        }
    }
}

fn resolve_in(data_dir: &str, file: &str) -> PathBuf {
    let file = shellexpand(file);
    let path = Path::new(&file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(shellexpand(data_dir)).join(path)
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, BotError> {
    let mut config = read(path)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn read(path: &str) -> Result<Config, BotError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| BotError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| BotError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
