//! isb-intel: Roblox alt-account intelligence for moderators, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
