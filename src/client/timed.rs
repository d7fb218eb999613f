//! Deadline-bounded request execution.
//!
//! # Responsibilities
//! - Wrap every outbound call with a timeout
//! - Cancel the in-flight request when the deadline passes
//! - Resolve exactly once: response, timeout, or transport failure
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the transport future cancels the request
//! - The deadline covers the whole exchange, body included
//! - Timeout errors are distinct from network errors

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time;

use crate::client::transport::{HttpRequest, HttpResponse, Transport};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Why an exchange did not produce a usable response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Timeout,
    Network,
    /// A response arrived with a non-2xx status. Never produced by
    /// [`TimedRequestClient`] itself; callers classify status codes.
    #[serde(rename = "http-error")]
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub detail: String,
}

/// Result of one timed exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// A response of any status arrived before the deadline.
    Success(HttpResponse),
    Failure(RequestFailure),
}

/// Issues requests that always resolve within a bounded wall-clock duration.
#[derive(Clone)]
pub struct TimedRequestClient {
    transport: Arc<dyn Transport>,
}

impl TimedRequestClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `request`, giving up after `timeout_ms` milliseconds.
    pub async fn send(&self, request: HttpRequest, timeout_ms: u64) -> RequestOutcome {
        let method = request.method;
        let url = request.url.clone();
        let deadline = Duration::from_millis(timeout_ms);

        match time::timeout(deadline, self.transport.execute(request)).await {
            Ok(Ok(response)) => {
                tracing::debug!(%method, %url, status = response.status, "Request completed");
                RequestOutcome::Success(response)
            }
            Ok(Err(e)) => {
                tracing::debug!(%method, %url, error = %e, "Request failed");
                RequestOutcome::Failure(RequestFailure {
                    kind: FailureKind::Network,
                    detail: e.to_string(),
                })
            }
            Err(_) => {
                tracing::debug!(%method, %url, timeout_ms, "Request timed out");
                RequestOutcome::Failure(RequestFailure {
                    kind: FailureKind::Timeout,
                    detail: timeout_message(timeout_ms),
                })
            }
        }
    }
}

/// "Request timeout after 15 seconds"; fractional seconds are kept (e.g. 0.3).
pub fn timeout_message(timeout_ms: u64) -> String {
    format!("Request timeout after {} seconds", timeout_ms as f64 / 1000.0)
}
