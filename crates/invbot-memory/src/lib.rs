//! # invbot-memory
//!
//! Persistent state for the bot, kept as small JSON documents:
//! - `snapshot` -- the single-slot register of the last observed inventory
//! - `subscribers` -- chats that receive notifications
//!
//! Both write through `json_file`, which replaces files atomically.

mod json_file;
pub mod snapshot;
pub mod subscribers;

pub use snapshot::SnapshotStore;
pub use subscribers::SubscriberStore;
