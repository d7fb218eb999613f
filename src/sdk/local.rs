//! In-process SDK used in local mode.
//!
//! Context comes from the [`ContextStore`]; documents live in a concurrent map
//! keyed by `(doc_type, doc_id)` and vanish with the process.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::{ContextKey, ContextStore};
use crate::sdk::capability::{SdkCapability, SdkError};
use crate::sdk::query::Query;

type DocKey = (String, String);

pub struct LocalSdk {
    context: Arc<ContextStore>,
    documents: DashMap<DocKey, Value>,
}

impl LocalSdk {
    pub fn new(context: Arc<ContextStore>) -> Self {
        Self {
            context,
            documents: DashMap::new(),
        }
    }

    /// A context blob that is not a JSON object leaves the SDK uninitialized.
    fn blob(&self, key: ContextKey) -> Result<Value, SdkError> {
        let value = self.context.get(key);
        if value.is_object() {
            Ok(value)
        } else {
            Err(SdkError::NotInitialized)
        }
    }

    fn field(&self, key: ContextKey, name: &str) -> Result<Option<String>, SdkError> {
        Ok(self
            .blob(key)?
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn key(doc_type: &str, doc_id: &str) -> DocKey {
        (doc_type.to_string(), doc_id.to_string())
    }
}

fn document(doc_type: &str, doc_id: &str, data: &Value) -> Value {
    json!({ "doc_type": doc_type, "doc_id": doc_id, "data": data })
}

fn not_found(doc_type: &str, doc_id: &str) -> SdkError {
    SdkError::Failed(format!("Document {}/{} not found", doc_type, doc_id))
}

#[async_trait]
impl SdkCapability for LocalSdk {
    async fn user_id(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::UserContext, "user_id")
    }

    async fn user_role(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::UserContext, "user_role")
    }

    async fn org_role(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::UserContext, "org_role")
    }

    async fn user_org_hkey(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::UserContext, "org_hkey")
    }

    async fn user_context(&self) -> Result<Value, SdkError> {
        self.blob(ContextKey::UserContext)
    }

    async fn application_id(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::AppContext, "doc_id")
    }

    async fn application_name(&self) -> Result<Option<String>, SdkError> {
        Ok(self
            .field(ContextKey::AppContext, "application_name")?
            .or(self.field(ContextKey::AppContext, "application_url_prefix")?))
    }

    async fn application_org_hkey(&self) -> Result<Option<String>, SdkError> {
        self.field(ContextKey::AppContext, "org_hkey")
    }

    async fn application_meta(&self) -> Result<Value, SdkError> {
        Ok(self
            .blob(ContextKey::AppContext)?
            .get("application_meta")
            .cloned()
            .unwrap_or(Value::Null))
    }

    async fn get(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkError> {
        self.documents
            .get(&Self::key(doc_type, doc_id))
            .map(|r| r.value().clone())
            .ok_or_else(|| not_found(doc_type, doc_id))
    }

    async fn create(&self, doc_type: &str, doc_id: &str, data: Value) -> Result<Value, SdkError> {
        use dashmap::mapref::entry::Entry;

        match self.documents.entry(Self::key(doc_type, doc_id)) {
            Entry::Occupied(_) => Err(SdkError::Failed(format!(
                "Document {}/{} already exists",
                doc_type, doc_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(data.clone());
                Ok(document(doc_type, doc_id, &data))
            }
        }
    }

    async fn update(&self, doc_type: &str, doc_id: &str, data: Value) -> Result<Value, SdkError> {
        let mut existing = self
            .documents
            .get_mut(&Self::key(doc_type, doc_id))
            .ok_or_else(|| not_found(doc_type, doc_id))?;

        // Objects merge field by field; anything else replaces the document.
        match (existing.value_mut(), data) {
            (Value::Object(current), Value::Object(changes)) => {
                for (k, v) in changes {
                    current.insert(k, v);
                }
            }
            (current, replacement) => *current = replacement,
        }
        Ok(document(doc_type, doc_id, existing.value()))
    }

    async fn delete(&self, doc_type: &str, doc_id: &str) -> Result<Value, SdkError> {
        self.documents
            .remove(&Self::key(doc_type, doc_id))
            .map(|_| json!({ "status": "deleted", "doc_type": doc_type, "doc_id": doc_id }))
            .ok_or_else(|| not_found(doc_type, doc_id))
    }

    async fn search(&self, constraints: Value, limit: usize) -> Result<Value, SdkError> {
        let query = Query::parse(&constraints).map_err(|e| SdkError::Failed(e.to_string()))?;

        let mut hits: Vec<Value> = self
            .documents
            .iter()
            .filter(|r| query.matches(&r.key().0, r.value()))
            .map(|r| document(&r.key().0, &r.key().1, r.value()))
            .collect();
        hits.sort_by(|a, b| {
            (a["doc_type"].as_str(), a["doc_id"].as_str())
                .cmp(&(b["doc_type"].as_str(), b["doc_id"].as_str()))
        });
        hits.truncate(limit);

        Ok(Value::Array(hits))
    }

    async fn issue_token(&self) -> Result<Value, SdkError> {
        let user_id = self
            .field(ContextKey::UserContext, "user_id")?
            .ok_or_else(|| SdkError::Failed("user_context has no user_id".into()))?;
        Ok(json!({
            "token": format!("local-{}", Uuid::new_v4()),
            "user_id": user_id,
        }))
    }
}
