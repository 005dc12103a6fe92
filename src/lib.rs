//! chatgate - message-dispatch core for a plugin-based chat bot
//!
//! Inbound messages are resolved against a hot-reloadable plugin registry,
//! rate limited per conversation and checked against owner, premium and
//! usage-limit rules before handlers run. Group membership events take a
//! separate path that syncs a participant cache and fans out to features.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::BotError;
pub use application::messaging::{DispatchOutcome, Dispatcher, MembershipHandler, MembershipOutcome};
pub use infrastructure::config::Config;
