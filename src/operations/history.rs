//! Running log of operation results.
//!
//! Entries are kept newest-last and bounded; the oldest entry is evicted once
//! the log is full.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::operations::epoch_millis;
use crate::operations::runner::OperationResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub id: Uuid,
    pub operation: String,
    pub params: Value,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub timestamp: u64,
}

impl ResultEntry {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug)]
pub struct ResultLog {
    entries: Mutex<VecDeque<ResultEntry>>,
    capacity: usize,
}

impl ResultLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append one outcome and return the stored entry.
    pub fn record(
        &self,
        operation: impl Into<String>,
        params: Value,
        outcome: Result<Value, String>,
    ) -> ResultEntry {
        let (result, error) = match outcome {
            Ok(value) => (Some(value), None),
            Err(message) => (None, Some(message)),
        };
        self.push(ResultEntry {
            id: Uuid::new_v4(),
            operation: operation.into(),
            params,
            result,
            error,
            timestamp: epoch_millis(),
        })
    }

    /// Append a backend operation result, keeping its original timestamp.
    pub fn record_backend(&self, params: Value, result: &OperationResult) -> ResultEntry {
        let error = if result.success {
            None
        } else {
            Some(result.error_message.clone().unwrap_or_default())
        };
        self.push(ResultEntry {
            id: Uuid::new_v4(),
            operation: format!("{}: {}", result.target, result.operation_name),
            params,
            result: if result.success {
                Some(result.payload.clone().unwrap_or(Value::Null))
            } else {
                None
            },
            error,
            timestamp: result.timestamp,
        })
    }

    fn push(&self, entry: ResultEntry) -> ResultEntry {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        entry
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<ResultEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn latest(&self) -> Option<ResultEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        removed
    }
}
