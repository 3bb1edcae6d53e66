//! Error classification shared by every step of the cancel workflow.

use std::fmt;

use thiserror::Error;

/// Prefix applied to failures that were not classified at the call site.
const UNEXPECTED_PREFIX: &str = "unexpected error: ";

/// Whether the invoking framework should reattempt the whole invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient failure (rate limiting, server-side 5xx).
    Retryable,
    /// Everything else: bad input, bad credentials, missing resource, conflict.
    Fatal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retryable => write!(f, "retryable"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors raised by the session cancel action.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Transient failure; the framework may retry the invocation.
    #[error("{0}")]
    Retryable(String),

    /// Terminal failure; retrying the invocation will not help.
    #[error("{0}")]
    Fatal(String),
}

impl ActionError {
    /// Build a retryable error.
    pub fn retryable(message: impl Into<String>) -> Self {
        Self::Retryable(message.into())
    }

    /// Build a fatal error.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }

    /// Wrap a failure that no call site classified.
    pub fn unexpected(err: impl fmt::Display) -> Self {
        Self::Fatal(format!("{UNEXPECTED_PREFIX}{err}"))
    }

    /// Classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Retryable(_) => ErrorKind::Retryable,
            Self::Fatal(_) => ErrorKind::Fatal,
        }
    }

    /// True if the invocation may be reattempted.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Retryable(message) | Self::Fatal(message) => message,
        }
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        Self::unexpected(err)
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected(err)
    }
}
