//! Infrastructure adapters. Implement outbound ports.
//!
//! Roblox web API, Telegram Bot API, chart export, console. Map errors to DomainError.

pub mod chart;
pub mod roblox;
pub mod telegram;
pub mod ui;
