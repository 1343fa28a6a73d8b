//! Application use cases. Orchestrate domain logic via ports.

pub mod bot_service;
pub mod collector;
pub mod command_service;
pub mod compare_service;
pub mod group_service;
pub mod pager;
pub mod profile_service;
pub mod reports;

pub use bot_service::BotService;
pub use collector::{DEFAULT_PAGE_LIMIT, PageQuery, collect_pages};
pub use command_service::{COMMAND_SPECS, Command, CommandService};
pub use compare_service::CompareService;
pub use group_service::GroupService;
pub use pager::{PageMove, Pager};
pub use profile_service::ProfileService;
