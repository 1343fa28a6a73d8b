//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. Every composite operation
//! fails with exactly one `DomainError`; `Operation` names the sub-call that broke.

use thiserror::Error;

/// Coarse failure category, for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    UpstreamStatus,
    Parse,
    Input,
    Chat,
    Config,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Network, DNS, connection reset or timeout.
    #[error("network error calling {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("malformed response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    #[error("{0}")]
    Input(String),

    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Chat platform error: {0}")]
    Chat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    /// Wrap this error with the name of the sub-operation that produced it.
    pub fn context(self, operation: impl Into<String>) -> Self {
        DomainError::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DomainError::Transport { .. } => FailureKind::Transport,
            DomainError::UpstreamStatus { .. } => FailureKind::UpstreamStatus,
            DomainError::Parse { .. } => FailureKind::Parse,
            DomainError::Input(_) => FailureKind::Input,
            DomainError::Operation { source, .. } => source.kind(),
            DomainError::Chat(_) => FailureKind::Chat,
            DomainError::Config(_) => FailureKind::Config,
        }
    }

    /// Innermost error, past any `Operation` wrappers.
    pub fn root(&self) -> &DomainError {
        match self {
            DomainError::Operation { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Attach an operation name to the error side of a `Result`.
pub trait ResultExt<T> {
    fn context(self, operation: impl Into<String>) -> Result<T, DomainError>;
}

impl<T> ResultExt<T> for Result<T, DomainError> {
    fn context(self, operation: impl Into<String>) -> Result<T, DomainError> {
        self.map_err(|e| e.context(operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind_and_names_operation() {
        let err = DomainError::UpstreamStatus {
            endpoint: "users/v1/users/1".into(),
            status: 404,
        }
        .context("user info")
        .context("profile for user 1");

        assert_eq!(err.kind(), FailureKind::UpstreamStatus);
        assert_eq!(
            err.to_string(),
            "profile for user 1: user info: users/v1/users/1 returned HTTP 404"
        );
        assert!(matches!(err.root(), DomainError::UpstreamStatus { status: 404, .. }));
    }
}
