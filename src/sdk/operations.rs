//! User-facing SDK operations.
//!
//! Input is validated first; a rejected input never reaches the SDK and is not
//! logged. Every SDK call, successful or not, lands in the result log.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::operations::history::ResultLog;
use crate::sdk::capability::{SdkCapability, SdkError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkOperationError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Sdk(#[from] SdkError),
}

pub struct SdkOperations {
    sdk: Arc<dyn SdkCapability>,
    log: Arc<ResultLog>,
}

impl SdkOperations {
    pub fn new(sdk: Arc<dyn SdkCapability>, log: Arc<ResultLog>) -> Self {
        Self { sdk, log }
    }

    pub async fn context(&self) -> Result<Value, SdkOperationError> {
        let outcome = self
            .sdk
            .context()
            .await
            .and_then(|ctx| serde_json::to_value(ctx).map_err(|e| SdkError::Failed(e.to_string())));
        self.finish("context", json!({}), outcome)
    }

    pub async fn get_data(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkOperationError> {
        let doc_id = require_id(doc_id)?;
        let outcome = self.sdk.get(doc_type, doc_id).await;
        self.finish("getData", json!({ "doc_type": doc_type, "doc_id": doc_id }), outcome)
    }

    pub async fn create_data(
        &self,
        doc_type: &str,
        doc_id: &str,
        raw_data: &str,
    ) -> Result<Value, SdkOperationError> {
        let doc_id = require_id(doc_id)?;
        let data = parse_json(raw_data, "Invalid JSON data")?;
        let params = json!({ "doc_type": doc_type, "doc_id": doc_id, "data": data });
        let outcome = self.sdk.create(doc_type, doc_id, data).await;
        self.finish("createData", params, outcome)
    }

    pub async fn update_data(
        &self,
        doc_type: &str,
        doc_id: &str,
        raw_data: &str,
    ) -> Result<Value, SdkOperationError> {
        let doc_id = require_id(doc_id)?;
        let data = parse_json(raw_data, "Invalid JSON data")?;
        let params = json!({ "doc_type": doc_type, "doc_id": doc_id, "data": data });
        let outcome = self.sdk.update(doc_type, doc_id, data).await;
        self.finish("updateData", params, outcome)
    }

    pub async fn delete_data(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkOperationError> {
        let doc_id = require_id(doc_id)?;
        let outcome = self.sdk.delete(doc_type, doc_id).await;
        self.finish("deleteData", json!({ "doc_type": doc_type, "doc_id": doc_id }), outcome)
    }

    pub async fn search_data(&self, raw_constraints: &str, limit: usize) -> Result<Value, SdkOperationError> {
        let constraints = parse_json(raw_constraints, "Invalid query constraints JSON")?;
        if limit == 0 {
            return Err(SdkOperationError::Validation("Limit must be at least 1".into()));
        }
        let params = json!({ "query_constraints": constraints, "limit": limit });
        let outcome = self.sdk.search(constraints, limit).await;
        self.finish("searchData", params, outcome)
    }

    pub async fn issue_token(&self) -> Result<Value, SdkOperationError> {
        let outcome = self.sdk.issue_token().await;
        self.finish("issueToken", json!({}), outcome)
    }

    fn finish(
        &self,
        operation: &str,
        params: Value,
        outcome: Result<Value, SdkError>,
    ) -> Result<Value, SdkOperationError> {
        match &outcome {
            Ok(_) => tracing::info!(operation, "SDK operation succeeded"),
            Err(e) => tracing::warn!(operation, error = %e, "SDK operation failed"),
        }
        self.log.record(
            operation,
            params,
            outcome.clone().map_err(|e| e.to_string()),
        );
        outcome.map_err(SdkOperationError::from)
    }
}

fn require_id(doc_id: &str) -> Result<&str, SdkOperationError> {
    let doc_id = doc_id.trim();
    if doc_id.is_empty() {
        Err(SdkOperationError::Validation("Please enter a document ID".into()))
    } else {
        Ok(doc_id)
    }
}

fn parse_json(raw: &str, what: &str) -> Result<Value, SdkOperationError> {
    serde_json::from_str(raw).map_err(|e| SdkOperationError::Validation(format!("{}: {}", what, e)))
}
