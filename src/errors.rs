use thiserror::Error;

/// Typed error hierarchy for the fetch/orchestration substrate.
///
/// Used at module boundaries (cache, robots, fetch, tools, schema,
/// orchestrator). Leaf/private helpers continue to return `anyhow::Result`
/// and convert via `?` through the `Internal` variant.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("policy denied: {0}")]
    Policy(String),

    #[error("network error: {message}")]
    Network { message: String, retryable: bool },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("budget exceeded: {0}")]
    Budget(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    pub fn policy(reason: impl Into<String>) -> Self {
        Self::Policy(reason.into())
    }

    pub fn network(message: impl Into<String>, retryable: bool) -> Self {
        Self::Network {
            message: message.into(),
            retryable,
        }
    }

    /// Whether this error is transient and the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { retryable, .. } => *retryable,
            Self::Policy(_) | Self::Protocol(_) | Self::Config(_) | Self::Budget(_) => false,
            Self::Internal(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
