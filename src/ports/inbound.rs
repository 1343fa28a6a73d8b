//! Inbound port. Front-ends (console, bot launcher) call into the application.

use crate::domain::DomainError;

/// Input port: interactive front-end driving the use cases.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run until the operator exits.
    async fn run(&self) -> Result<(), DomainError>;
}
