//! Context key-value store and persistence.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// The two keys the SDK reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKey {
    UserContext,
    AppContext,
}

impl ContextKey {
    pub const ALL: [ContextKey; 2] = [ContextKey::UserContext, ContextKey::AppContext];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKey::UserContext => "user_context",
            ContextKey::AppContext => "app_context",
        }
    }

    /// Example values used until the user saves their own.
    pub fn default_value(&self) -> Value {
        match self {
            ContextKey::UserContext => json!({
                "user_id": "test-user-123",
                "org_hkey": "org.456",
                "user_role": "admin",
                "org_role": "owner",
                "id_token": "test-token-here",
            }),
            ContextKey::AppContext => json!({
                "doc_id": "test-app-789",
                "org_hkey": "org.456",
                "application_url_prefix": "test-app",
            }),
        }
    }
}

impl std::fmt::Display for ContextKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from saving or persisting context.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// One entry per key whose text was not valid JSON. Nothing was stored.
    #[error("Invalid JSON format: {}", describe(.0))]
    InvalidJson(Vec<(ContextKey, String)>),
}

fn describe(errors: &[(ContextKey, String)]) -> String {
    errors
        .iter()
        .map(|(key, message)| format!("{} ({})", key, message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Both blobs at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub user_context: Value,
    pub app_context: Value,
}

/// Thread-safe holder of the context blobs.
#[derive(Debug)]
pub struct ContextStore {
    inner: DashMap<ContextKey, Value>,
    persistence_path: Option<PathBuf>,
}

impl ContextStore {
    /// Store seeded with default values.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        let inner = DashMap::new();
        for key in ContextKey::ALL {
            inner.insert(key, key.default_value());
        }
        Self {
            inner,
            persistence_path,
        }
    }

    /// Load from file if it exists; keys missing from the file keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ContextError> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let stored: HashMap<ContextKey, Value> = serde_json::from_reader(reader)?;
            for (key, value) in stored {
                store.inner.insert(key, value);
            }
            tracing::info!(path = %path.display(), "Loaded context from file");
        }
        Ok(store)
    }

    /// Write both blobs to the persistence file, if one is configured.
    pub fn save_to_file(&self) -> Result<(), ContextError> {
        self.write_file(&self.current())
    }

    fn current(&self) -> HashMap<ContextKey, Value> {
        self.inner
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    fn write_file(&self, map: &HashMap<ContextKey, Value>) -> Result<(), ContextError> {
        if let Some(path) = &self.persistence_path {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, map)?;
            writer.flush()?;
            tracing::info!(path = %path.display(), "Saved context to file");
        }
        Ok(())
    }

    /// Persist `next`, then make it visible. Memory is untouched if the write fails.
    fn commit(&self, next: HashMap<ContextKey, Value>) -> Result<(), ContextError> {
        self.write_file(&next)?;
        for (key, value) in next {
            self.inner.insert(key, value);
        }
        Ok(())
    }

    pub fn get(&self, key: ContextKey) -> Value {
        self.inner
            .get(&key)
            .map(|r| r.value().clone())
            .unwrap_or_else(|| key.default_value())
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            user_context: self.get(ContextKey::UserContext),
            app_context: self.get(ContextKey::AppContext),
        }
    }

    /// Replace both blobs from raw JSON text. Either both are stored or neither is.
    pub fn save(&self, user_context: &str, app_context: &str) -> Result<(), ContextError> {
        let mut parsed = Vec::new();
        let mut errors = Vec::new();

        for (key, raw) in [
            (ContextKey::UserContext, user_context),
            (ContextKey::AppContext, app_context),
        ] {
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => parsed.push((key, value)),
                Err(e) => errors.push((key, e.to_string())),
            }
        }

        if !errors.is_empty() {
            return Err(ContextError::InvalidJson(errors));
        }

        let mut next = self.current();
        next.extend(parsed);
        self.commit(next)
    }

    /// Restore the default blobs.
    pub fn reset(&self) -> Result<(), ContextError> {
        let defaults = ContextKey::ALL
            .iter()
            .map(|key| (*key, key.default_value()))
            .collect();
        self.commit(defaults)?;
        tracing::info!("Context reset to defaults");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = ContextStore::new(None);
        assert_eq!(store.get(ContextKey::UserContext)["user_id"], "test-user-123");
        assert_eq!(store.get(ContextKey::AppContext)["doc_id"], "test-app-789");
    }

    #[test]
    fn test_save_is_all_or_nothing() {
        let store = ContextStore::new(None);
        let err = store
            .save(r#"{"user_id":"someone"}"#, "{broken")
            .unwrap_err();

        match &err {
            ContextError::InvalidJson(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].0, ContextKey::AppContext);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().starts_with("Invalid JSON format: app_context"));
        assert_eq!(store.get(ContextKey::UserContext)["user_id"], "test-user-123");
    }

    #[test]
    fn test_failed_write_keeps_previous_blobs() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a file, so every write fails.
        let store = ContextStore::new(Some(dir.path().to_path_buf()));

        let err = store.save(r#"{"user_id":"someone"}"#, r#"{"doc_id":"x"}"#).unwrap_err();
        assert!(matches!(err, ContextError::Io(_)));
        assert_eq!(store.get(ContextKey::UserContext)["user_id"], "test-user-123");
        assert_eq!(store.get(ContextKey::AppContext)["doc_id"], "test-app-789");

        assert!(store.reset().is_err());
        assert_eq!(store.snapshot().app_context, ContextKey::AppContext.default_value());
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.json");

        let store = ContextStore::load_from_file(&path).unwrap();
        store
            .save(r#"{"user_id":"u-9","user_role":"viewer"}"#, r#"{"doc_id":"app-1"}"#)
            .unwrap();

        let loaded = ContextStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.get(ContextKey::UserContext)["user_role"], "viewer");
        assert_eq!(loaded.get(ContextKey::AppContext)["doc_id"], "app-1");

        loaded.reset().unwrap();
        let reloaded = ContextStore::load_from_file(&path).unwrap();
        assert_eq!(reloaded.snapshot().user_context, ContextKey::UserContext.default_value());
    }
}
