//! # invbot-channels
//!
//! Messaging platform integrations for invbot.

pub mod telegram;
