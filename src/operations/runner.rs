//! On-demand backend operations.
//!
//! Each invocation goes `idle → in-flight → resolved`, exactly once, with no
//! retries. Nothing is retained between invocations.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{FailureKind, HttpRequest, RequestOutcome, TimedRequestClient};
use crate::client::timed::DEFAULT_TIMEOUT_MS;
use crate::observability::metrics;
use crate::operations::epoch_millis;
use crate::operations::routes::Operation;
use crate::target::BackendTarget;

/// Caller-supplied input for one operation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OperationParams {
    /// Record id substituted into `{id}` routes.
    pub id: Option<String>,
    /// Raw JSON text for create/update; wrapped as `{"data": ...}` on the wire.
    pub data: Option<String>,
}

impl OperationParams {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            data: None,
        }
    }

    pub fn data(mut self, raw: impl Into<String>) -> Self {
        self.data = Some(raw.into());
        self
    }
}

/// Why an operation did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Input rejected before any request was sent.
    Validation,
    Timeout,
    Network,
    /// Response received with a non-2xx status.
    #[serde(rename = "http-error")]
    Http,
}

impl From<FailureKind> for ErrorKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => ErrorKind::Timeout,
            FailureKind::Network => ErrorKind::Network,
            FailureKind::Http => ErrorKind::Http,
        }
    }
}

/// Uniform record of one operation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation_name: String,
    pub target: String,
    pub success: bool,
    pub payload: Option<Value>,
    pub error_kind: Option<ErrorKind>,
    pub error_message: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl OperationResult {
    fn success(target: &BackendTarget, operation: Operation, payload: Option<Value>) -> Self {
        Self {
            operation_name: operation.label().to_string(),
            target: target.name.clone(),
            success: true,
            payload,
            error_kind: None,
            error_message: None,
            timestamp: epoch_millis(),
        }
    }

    fn failure(
        target: &BackendTarget,
        operation: Operation,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation_name: operation.label().to_string(),
            target: target.name.clone(),
            success: false,
            payload: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
            timestamp: epoch_millis(),
        }
    }
}

/// Runs health/get/create/update/delete against a target.
#[derive(Clone)]
pub struct BackendOperationRunner {
    client: TimedRequestClient,
    timeout_ms: u64,
}

impl BackendOperationRunner {
    pub fn new(client: TimedRequestClient) -> Self {
        Self {
            client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub async fn run(
        &self,
        target: &BackendTarget,
        operation: Operation,
        params: &OperationParams,
    ) -> OperationResult {
        let start = Instant::now();

        let result = match build_request(target, operation, params) {
            Ok(request) => {
                tracing::debug!(
                    target_name = %target.name,
                    %operation,
                    method = %request.method,
                    url = %request.url,
                    "Running backend operation"
                );
                let outcome = self.client.send(request, self.timeout_ms).await;
                normalize(target, operation, outcome)
            }
            Err(message) => {
                tracing::warn!(target_name = %target.name, %operation, error = %message, "Rejected operation input");
                OperationResult::failure(target, operation, ErrorKind::Validation, message)
            }
        };

        if result.success {
            tracing::info!(target_name = %target.name, %operation, "Operation succeeded");
        } else {
            tracing::warn!(
                target_name = %target.name,
                %operation,
                kind = ?result.error_kind,
                error = result.error_message.as_deref().unwrap_or(""),
                "Operation failed"
            );
        }
        metrics::record_operation(&target.name, operation, result.success, start);

        result
    }
}

/// Resolve the route and body, rejecting malformed input before any I/O.
fn build_request(
    target: &BackendTarget,
    operation: Operation,
    params: &OperationParams,
) -> Result<HttpRequest, String> {
    let route = target.routes.route(operation);

    let path = if route.needs_id() {
        let id = params
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or("User ID is required")?;
        route.render(id)
    } else {
        route.path.clone()
    };

    let request = HttpRequest::new(route.method, target.url_for(&path));
    if !operation.requires_body() {
        return Ok(request);
    }

    let raw = params.data.as_deref().ok_or("User data is required")?;
    let data: Value =
        serde_json::from_str(raw).map_err(|e| format!("Invalid JSON data: {}", e))?;
    Ok(request.json_body(&json!({ "data": data })))
}

fn normalize(target: &BackendTarget, operation: Operation, outcome: RequestOutcome) -> OperationResult {
    match outcome {
        RequestOutcome::Success(response) if response.is_success() => {
            if response.body.trim().is_empty() {
                return OperationResult::success(target, operation, None);
            }
            match serde_json::from_str::<Value>(&response.body) {
                Ok(payload) => OperationResult::success(target, operation, Some(payload)),
                Err(e) => OperationResult::failure(
                    target,
                    operation,
                    ErrorKind::Http,
                    format!("Invalid JSON response: {}", e),
                ),
            }
        }
        RequestOutcome::Success(response) => {
            let body = response.body.trim();
            let message = if body.is_empty() {
                format!("HTTP {}", response.status_line())
            } else {
                format!("HTTP {}: {}", response.status_line(), body)
            };
            OperationResult::failure(target, operation, ErrorKind::Http, message)
        }
        RequestOutcome::Failure(failure) => {
            OperationResult::failure(target, operation, failure.kind.into(), failure.detail)
        }
    }
}
