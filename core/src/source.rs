//! The record source seam.
//!
//! Network transport is outside this crate. Whatever fetches tickets
//! implements RecordSource; the refresh runner only sees raw JSON batches.

use crate::{
    error::RetrievalError,
    normalizer::{flatten_payload, normalize},
    types::ALL_SCOPE,
};
use serde_json::Value;
use std::path::PathBuf;

/// Raw tickets for one scope plus the backend's own accuracy ratio, when it
/// reports one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub records:           Vec<Value>,
    pub reported_accuracy: Option<f64>,
}

impl RecordBatch {
    pub fn new(records: Vec<Value>) -> Self {
        Self {
            records,
            reported_accuracy: None,
        }
    }

    /// Build from a response body. A top-level numeric `accuracy` is taken
    /// as the reported ratio.
    pub fn from_payload(payload: Value) -> Self {
        let reported_accuracy = payload.get("accuracy").and_then(Value::as_f64);
        Self {
            records: flatten_payload(payload),
            reported_accuracy,
        }
    }

    /// Only the tickets belonging to `scope`. The "all" scope keeps
    /// everything. The reported ratio is global, so a narrowed batch drops it.
    pub fn for_scope(&self, scope: &str) -> Self {
        if scope == ALL_SCOPE {
            return self.clone();
        }
        Self::new(
            self.records
                .iter()
                .filter(|raw| normalize(raw).department_id.as_deref() == Some(scope))
                .cloned()
                .collect(),
        )
    }
}

pub trait RecordSource {
    fn fetch(&mut self, scope: &str) -> Result<RecordBatch, RetrievalError>;
}

/// Serves a fixed batch. Used by the runner's demo mode and by tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    batch: RecordBatch,
}

impl StaticSource {
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn replace(&mut self, batch: RecordBatch) {
        self.batch = batch;
    }
}

impl RecordSource for StaticSource {
    fn fetch(&mut self, scope: &str) -> Result<RecordBatch, RetrievalError> {
        Ok(self.batch.for_scope(scope))
    }
}

/// Re-reads a JSON export on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonFileSource {
    fn fetch(&mut self, scope: &str) -> Result<RecordBatch, RetrievalError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            RetrievalError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        let payload: Value = serde_json::from_str(&content).map_err(|e| {
            RetrievalError::Malformed(format!("{}: {e}", self.path.display()))
        })?;
        Ok(RecordBatch::from_payload(payload).for_scope(scope))
    }
}
