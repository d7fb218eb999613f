//! The SDK capability consumed by the harness.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Opaque SDK failure. The message is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    #[error("SDK not initialized")]
    NotInitialized,

    #[error("{0}")]
    Failed(String),
}

/// Everything the SDK knows about the current user and application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SdkContext {
    pub user_id: Option<String>,
    pub user_role: Option<String>,
    pub org_role: Option<String>,
    pub user_org_hkey: Option<String>,
    pub user_context: Value,
    pub application_id: Option<String>,
    pub application_name: Option<String>,
    pub application_org_hkey: Option<String>,
    pub application_meta: Value,
}

/// Context introspection and document operations.
#[async_trait]
pub trait SdkCapability: Send + Sync {
    async fn user_id(&self) -> Result<Option<String>, SdkError>;
    async fn user_role(&self) -> Result<Option<String>, SdkError>;
    async fn org_role(&self) -> Result<Option<String>, SdkError>;
    async fn user_org_hkey(&self) -> Result<Option<String>, SdkError>;
    async fn user_context(&self) -> Result<Value, SdkError>;
    async fn application_id(&self) -> Result<Option<String>, SdkError>;
    async fn application_name(&self) -> Result<Option<String>, SdkError>;
    async fn application_org_hkey(&self) -> Result<Option<String>, SdkError>;
    async fn application_meta(&self) -> Result<Value, SdkError>;

    async fn get(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkError>;
    async fn create(&self, doc_type: &str, doc_id: &str, data: Value) -> Result<Value, SdkError>;
    async fn update(&self, doc_type: &str, doc_id: &str, data: Value) -> Result<Value, SdkError>;
    async fn delete(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkError>;
    async fn search(&self, constraints: Value, limit: usize) -> Result<Value, SdkError>;
    async fn issue_token(&self) -> Result<Value, SdkError>;

    /// Collect every context accessor into one record.
    async fn context(&self) -> Result<SdkContext, SdkError> {
        Ok(SdkContext {
            user_id: self.user_id().await?,
            user_role: self.user_role().await?,
            org_role: self.org_role().await?,
            user_org_hkey: self.user_org_hkey().await?,
            user_context: self.user_context().await?,
            application_id: self.application_id().await?,
            application_name: self.application_name().await?,
            application_org_hkey: self.application_org_hkey().await?,
            application_meta: self.application_meta().await?,
        })
    }
}
