//! HTTP plumbing shared by all backends
//!
//! Client construction and the failure classification every backend uses:
//! 401/403 map to auth, 429 to rate-limit, transport failures and other
//! non-2xx statuses to network, unparseable bodies to invalid-response.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{BackendError, ErrorKind};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent when a backend does not suppress it
pub const USER_AGENT: &str = concat!("sx/", env!("CARGO_PKG_VERSION"));

/// Longest response body quoted back in an error message
const MAX_ERROR_BODY: usize = 200;

/// Options for building a backend's HTTP client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
    pub user_agent: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
            user_agent: Some(USER_AGENT.to_string()),
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Build a client for `backend`; a build failure is reported as that
/// backend being unavailable
pub fn build_client(backend: &str, options: &ClientOptions) -> Result<Client, BackendError> {
    let mut builder = Client::builder()
        .timeout(options.timeout)
        .danger_accept_invalid_certs(options.accept_invalid_certs);

    if let Some(ua) = &options.user_agent {
        builder = builder.user_agent(ua.clone());
    }

    builder.build().map_err(|e| {
        BackendError::unavailable(backend, format!("failed to create HTTP client: {}", e))
    })
}

/// Classify a transport-level failure (DNS, connect, timeout, TLS)
pub fn transport_error(backend: &str, err: reqwest::Error) -> BackendError {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        format!("request failed: {}", err)
    };
    BackendError::network(backend, message)
}

/// Classify a non-success HTTP status
pub fn status_error(backend: &str, status: StatusCode, body: &str) -> BackendError {
    let body = truncate(body.trim(), MAX_ERROR_BODY);
    let (kind, message) = match status.as_u16() {
        401 | 403 => (ErrorKind::Auth, format!("authentication failed: {}", body)),
        429 => (ErrorKind::RateLimit, format!("rate limited: {}", body)),
        code => (ErrorKind::Network, format!("HTTP {}: {}", code, body)),
    };
    BackendError::new(backend, kind, message).with_status(status.as_u16())
}

/// Check the status of `response` and decode its JSON body as `T`
pub async fn read_json<T: DeserializeOwned>(
    backend: &str,
    response: Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| BackendError::network(backend, format!("failed to read response: {}", e)))?;

    if !status.is_success() {
        tracing::warn!(backend, status = %status, "backend returned error status");
        return Err(status_error(backend, status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        BackendError::invalid_response(backend, format!("failed to parse JSON: {}", e))
            .with_status(status.as_u16())
    })
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
