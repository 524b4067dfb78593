//! Error taxonomy for search invocations
//!
//! Every failure of the search pipeline is one of these variants. Each maps
//! to a stable `kind` string that callers can branch on.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Errors produced while building, dispatching, or shaping a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Caller parameters are missing or malformed.
    #[error("invalid parameter `{field}`: {message}")]
    Validation { field: String, message: String },

    /// The backend rejected the credential.
    #[error("credential rejected by backend: {0}")]
    Auth(String),

    /// The backend rejected the constructed query.
    #[error("backend rejected request: {0}")]
    BadRequest(String),

    /// The backend is throttling this credential.
    #[error("rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Connectivity failure, per-request timeout, or 5xx from the backend.
    #[error("transient network error: {0}")]
    TransientNetwork(String),

    /// The overall invocation deadline was exceeded.
    #[error("search timed out: {0}")]
    Timeout(String),
}

impl SearchError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::Auth(_) => ErrorKind::AuthError,
            Self::BadRequest(_) => ErrorKind::BadRequestError,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::TransientNetwork(_) => ErrorKind::TransientNetworkError,
            Self::Timeout(_) => ErrorKind::TimeoutError,
        }
    }

    /// Whether the dispatcher may try again after this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::TransientNetwork(_))
    }

    /// Backend-supplied hint for how long to wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Tag carried in structured error output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    AuthError,
    BadRequestError,
    RateLimited,
    TransientNetworkError,
    TimeoutError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::AuthError => "AuthError",
            Self::BadRequestError => "BadRequestError",
            Self::RateLimited => "RateLimited",
            Self::TransientNetworkError => "TransientNetworkError",
            Self::TimeoutError => "TimeoutError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error object returned to callers in place of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&SearchError> for ToolError {
    fn from(err: &SearchError) -> Self {
        let message = match err {
            SearchError::RateLimited { .. } => format!("{err}. Please try again later."),
            _ => err.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
        }
    }
}

impl From<SearchError> for ToolError {
    fn from(err: SearchError) -> Self {
        Self::from(&err)
    }
}

/// Convenience alias for search results.
pub type Result<T> = std::result::Result<T, SearchError>;
