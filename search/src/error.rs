//! Error types for search backends and dispatch
//!
//! A [`BackendError`] always names the backend that failed and carries an
//! [`ErrorKind`], so callers branch on the kind instead of matching strings.
//! [`DispatchError`] is what the [`BackendManager`](crate::BackendManager)
//! returns once its fallback chain is exhausted or misconfigured.

use std::fmt;

use thiserror::Error;

/// Classification of a single backend failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backend not configured; no request was attempted
    Unavailable,
    /// Transport failure, timeout, or unexpected HTTP status
    Network,
    /// HTTP 401/403
    Auth,
    /// HTTP 429
    RateLimit,
    /// Body did not match the expected schema
    InvalidResponse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate-limit",
            ErrorKind::InvalidResponse => "invalid-response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure from one specific backend
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{backend} backend: {message}")]
pub struct BackendError {
    /// Name of the backend that failed
    pub backend: String,
    pub kind: ErrorKind,
    /// HTTP status, when the failure came from a response
    pub status: Option<u16>,
    /// Underlying cause
    pub message: String,
}

impl BackendError {
    pub fn new(backend: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(backend, ErrorKind::Unavailable, message)
    }

    pub fn network(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(backend, ErrorKind::Network, message)
    }

    pub fn invalid_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(backend, ErrorKind::InvalidResponse, message)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// One step of a failed fallback chain
#[derive(Debug, Clone, PartialEq)]
pub enum FailedAttempt {
    /// The backend was called and failed
    Failed(BackendError),
    /// The backend was skipped because it is not configured
    NotConfigured(String),
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailedAttempt::Failed(err) => write!(f, "{}", err),
            FailedAttempt::NotConfigured(name) => write!(f, "{}: not configured", name),
        }
    }
}

fn join_attempts(attempts: &[FailedAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n  ")
}

/// Errors from the backend manager
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("no primary backend configured")]
    NoPrimary,

    #[error("unknown backend: {name} (available: {available})")]
    UnknownBackend { name: String, available: String },

    #[error("backend {0} is not configured (missing API key?)")]
    NotConfigured(String),

    /// Primary and every fallback failed, in the order attempted
    #[error("all backends failed:\n  {}", join_attempts(.0))]
    AllFailed(Vec<FailedAttempt>),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DispatchError {
    /// Kind of the underlying backend failure, for single-backend errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DispatchError::Backend(err) => Some(err.kind),
            DispatchError::NotConfigured(_) => Some(ErrorKind::Unavailable),
            _ => None,
        }
    }
}

/// A user-supplied option value outside its enumerated set
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidOption {
    #[error("Invalid category '{value}'. Supported categories are: {supported}")]
    Category { value: String, supported: String },

    #[error("Invalid time range '{value}'. Use: {supported}")]
    TimeRange { value: String, supported: String },

    #[error("Invalid safe search level '{0}'. Use: none, moderate, strict")]
    SafeSearch(String),

    #[error("Invalid HTTP method '{0}'. Use: GET, POST")]
    HttpMethod(String),
}
