//! # invbot-inventory
//!
//! The inventory side of the bot:
//! - `fetcher` -- time-bounded GET against the upstream endpoint, optionally via a proxy
//! - `diff` -- identifier-based change detection between two result sets
//! - `filter` -- composable notification policies and variant highlighting
//! - `format` -- Telegram HTML rendering of records and batches

pub mod diff;
pub mod fetcher;
pub mod filter;
pub mod format;
mod labels;
mod query;

pub use diff::{diff, Changes, PriceChange};
pub use fetcher::{InventoryFetcher, InventorySource};
pub use filter::{Highlight, MinSpec, NoHighlight, PriceCeiling, RecordFilter};
pub use format::Formatter;
