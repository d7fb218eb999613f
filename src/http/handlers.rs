//! Control API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::context::{ContextError, ContextSnapshot};
use crate::health::HealthState;
use crate::http::response::ApiError;
use crate::lifecycle::Harness;
use crate::operations::routes::UnknownOperation;
use crate::operations::{Operation, OperationParams, OperationResult, ResultEntry};
use crate::sdk::SdkOperationError;
use crate::target::TargetSummary;

pub type AppState = Arc<Harness>;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub monitor_running: bool,
}

#[derive(Serialize)]
pub struct BackendStatus {
    #[serde(flatten)]
    pub target: TargetSummary,
    pub state: HealthState,
}

/// Body of `POST /backends/{name}/{operation}`.
#[derive(Debug, Default, Deserialize)]
pub struct OperationRequest {
    pub id: Option<String>,
    /// Raw JSON text, or any JSON value (serialized before validation).
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ContextUpdate {
    pub user_context: Value,
    pub app_context: Value,
}

/// Body of `POST /sdk/{operation}`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SdkRequest {
    pub doc_type: String,
    pub doc_id: String,
    pub data: Value,
    pub constraints: Value,
    pub limit: usize,
}

impl Default for SdkRequest {
    fn default() -> Self {
        Self {
            doc_type: "Users".to_string(),
            doc_id: String::new(),
            data: Value::String("{}".to_string()),
            constraints: json!({ "AND": [["doc_type", "==", "Users"]] }),
            limit: 10,
        }
    }
}

#[derive(Serialize)]
pub struct ResultsView {
    pub count: usize,
    pub latest: Option<ResultEntry>,
    pub entries: Vec<ResultEntry>,
}

/// Strings pass through untouched so malformed JSON text reaches validation.
fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        monitor_running: state.monitor.is_running(),
    })
}

pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .targets
        .iter()
        .map(|t| BackendStatus {
            target: t.summary(),
            state: state.monitor.current_state(&t.name),
        })
        .collect();
    Json(statuses)
}

pub async fn run_operation(
    State(state): State<AppState>,
    Path((name, operation)): Path<(String, String)>,
    body: Option<Json<OperationRequest>>,
) -> Result<Json<OperationResult>, ApiError> {
    let target = state
        .target(&name)
        .ok_or_else(|| ApiError::not_found(format!("unknown target '{}'", name)))?;
    let operation: Operation = operation
        .parse()
        .map_err(|e: UnknownOperation| ApiError::bad_request(e.to_string()))?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    let params = OperationParams {
        id: request.id,
        data: request.data.as_ref().map(raw_text),
    };

    let result = state.runner.run(target, operation, &params).await;
    state.results.record_backend(
        json!({ "id": params.id, "data": params.data }),
        &result,
    );
    Ok(Json(result))
}

pub async fn get_context(State(state): State<AppState>) -> Json<ContextSnapshot> {
    Json(state.context.snapshot())
}

pub async fn put_context(
    State(state): State<AppState>,
    Json(update): Json<ContextUpdate>,
) -> Result<Json<ContextSnapshot>, ApiError> {
    state
        .context
        .save(&raw_text(&update.user_context), &raw_text(&update.app_context))
        .map_err(context_error)?;
    Ok(Json(state.context.snapshot()))
}

pub async fn reset_context(State(state): State<AppState>) -> Result<Json<ContextSnapshot>, ApiError> {
    state.context.reset().map_err(context_error)?;
    Ok(Json(state.context.snapshot()))
}

fn context_error(e: ContextError) -> ApiError {
    match e {
        ContextError::InvalidJson(_) => ApiError::bad_request(e.to_string()),
        other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub async fn run_sdk_operation(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    body: Option<Json<SdkRequest>>,
) -> Result<Json<Value>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let ops = &state.sdk;

    let outcome = match operation.as_str() {
        "context" => ops.context().await,
        "get" => ops.get_data(&req.doc_type, &req.doc_id).await,
        "create" => ops.create_data(&req.doc_type, &req.doc_id, &raw_text(&req.data)).await,
        "update" => ops.update_data(&req.doc_type, &req.doc_id, &raw_text(&req.data)).await,
        "delete" => ops.delete_data(&req.doc_type, &req.doc_id).await,
        "search" => ops.search_data(&raw_text(&req.constraints), req.limit).await,
        "token" => ops.issue_token().await,
        other => return Err(ApiError::bad_request(format!("unknown SDK operation '{}'", other))),
    };

    match outcome {
        Ok(result) => Ok(Json(json!({ "result": result }))),
        Err(e @ SdkOperationError::Validation(_)) => Err(ApiError::bad_request(e.to_string())),
        Err(e @ SdkOperationError::Sdk(_)) => Err(ApiError::new(StatusCode::BAD_GATEWAY, e.to_string())),
    }
}

pub async fn get_results(State(state): State<AppState>) -> Json<ResultsView> {
    Json(ResultsView {
        count: state.results.len(),
        latest: state.results.latest(),
        entries: state.results.entries(),
    })
}

pub async fn clear_results(State(state): State<AppState>) -> Json<Value> {
    let cleared = state.results.clear();
    Json(json!({ "cleared": cleared }))
}
