//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    BotIdentity, Button, ChatEvent, ChatMember, CommandScope, CommandSpec, DomainError, MessageRef,
    Report,
};
use crate::ports::endpoint::Endpoint;

/// Roblox web API gateway. One bounded-timeout GET per call, no retry.
#[async_trait::async_trait]
pub trait RobloxGateway: Send + Sync {
    /// GET `endpoint` with `query` and return the decoded JSON body.
    ///
    /// Non-success status maps to `UpstreamStatus`, network errors and
    /// timeouts to `Transport`, undecodable bodies to `Parse`.
    async fn get_json(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
    ) -> Result<serde_json::Value, DomainError>;
}

/// Chat platform gateway used by the bot loop.
#[async_trait::async_trait]
pub trait ChatPort: Send + Sync {
    async fn identity(&self) -> Result<BotIdentity, DomainError>;

    /// Long-poll for new events. Returns an empty batch when the poll times out.
    async fn poll_events(&self) -> Result<Vec<ChatEvent>, DomainError>;

    /// Send a report (with its attachment, if any) and optional inline buttons.
    async fn send_report(
        &self,
        chat_id: i64,
        report: &Report,
        buttons: &[Button],
    ) -> Result<MessageRef, DomainError>;

    /// Replace the content of a previously sent report.
    async fn edit_report(
        &self,
        message: MessageRef,
        report: &Report,
        buttons: &[Button],
    ) -> Result<(), DomainError>;

    /// Acknowledge a button press, optionally with a short notice.
    async fn acknowledge(&self, callback_id: &str, notice: Option<&str>)
    -> Result<(), DomainError>;

    /// Publish the command menu. Returns how many commands were registered.
    async fn publish_commands(
        &self,
        commands: &[CommandSpec],
        scope: CommandScope,
    ) -> Result<usize, DomainError>;

    /// Look up `user_id` in `chat_id`. `Ok(None)` when the platform does not know them.
    async fn lookup_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<ChatMember>, DomainError>;
}
