//! # invbot-core
//!
//! Core types, traits, configuration, and error handling for the inventory bot.

pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod traits;

pub use config::shellexpand;
