use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Result alias for errors emitted by Unity Clippy internals.
pub type ClippyResult<T> = Result<T, UnityClippyError>;

/// Structured error type for Unity Clippy subsystems.
#[derive(Debug, Error)]
pub enum UnityClippyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("grammar error: {0}")]
    Grammar(String),

    #[error("parse failure: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

impl UnityClippyError {
    pub fn grammar(msg: impl Into<String>) -> Self {
        Self::Grammar(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Convert to anyhow::Error for interop with anyhow-based code.
    pub fn into_anyhow(self) -> AnyhowError {
        AnyhowError::new(self)
    }
}

impl From<AnyhowError> for UnityClippyError {
    fn from(err: AnyhowError) -> Self {
        UnityClippyError::other(err.to_string())
    }
}
