//! Telegram Bot API adapter. Implements ChatPort for the moderation bot.

pub mod client;
pub mod format;
pub mod mapper;
pub mod wire;

pub use client::BotApiClient;
