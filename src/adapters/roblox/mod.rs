//! Roblox adapter module. Implements RobloxGateway.
//!
//! Provides the reqwest gateway and an in-memory fixture gateway used by the use-case tests.

pub mod fixture_gateway;
pub mod http_gateway;
pub mod records;

pub use fixture_gateway::{FixtureGateway, FixtureResponse};
pub use http_gateway::HttpRobloxGateway;
