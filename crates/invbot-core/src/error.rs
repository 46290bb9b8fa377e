use thiserror::Error;

/// Top-level error type for the bot.
#[derive(Debug, Error)]
pub enum BotError {
    /// Error from a messaging channel (includes per-recipient delivery failures).
    #[error("channel error: {0}")]
    Channel(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Snapshot or subscriber storage error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Upstream inventory error.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single upstream inventory fetch.
///
/// Every variant aborts the current cycle; none of them is fatal to the process.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured deadline.
    #[error("inventory fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection, DNS, or non-2xx response from upstream.
    #[error("inventory transport error: {0}")]
    Transport(String),

    /// Body is not JSON or lacks the `results` array.
    #[error("inventory parse error: {0}")]
    Parse(String),

    /// The configured forward proxy could not be reached.
    #[error("proxy error: {0}")]
    Proxy(String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Failure reading or writing a persisted JSON document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store read error ({path}): {reason}")]
    Read { path: String, reason: String },

    #[error("store write error ({path}): {reason}")]
    Write { path: String, reason: String },
}

/// Per-record rendering failure. Never aborts a batch.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("price is not a finite number: {0}")]
    InvalidPrice(f64),
}
