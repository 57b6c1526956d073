//! Analysis Store abstraction.
//!
//! Document persistence keyed by session id, one namespace per
//! [`Collection`]. Records are JSON objects. Every write attaches a
//! server-side timestamp: inserts stamp `created_at` and `updated_at`,
//! updates stamp `updated_at`.

mod file;
mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use file::FileAnalysisStore;
pub use memory::MemoryAnalysisStore;

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Record namespaces written by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Analysis,
    RiskAnalysis,
    BenchmarkAnalysis,
    WeightedScores,
    DealNote,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Analysis,
        Collection::RiskAnalysis,
        Collection::BenchmarkAnalysis,
        Collection::WeightedScores,
        Collection::DealNote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Analysis => "analysis",
            Collection::RiskAnalysis => "risk_analysis",
            Collection::BenchmarkAnalysis => "benchmark_analysis",
            Collection::WeightedScores => "weighted_scores",
            Collection::DealNote => "deal_note",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistence backend for analysis records.
///
/// Implementations must be safe to share between concurrently running
/// sessions; the orchestrator never locks around store calls.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Insert a new record. Fails with [`StoreError::AlreadyExists`] on a duplicate id.
    async fn insert(&self, collection: Collection, id: &str, record: Value) -> StoreResult<()>;

    /// Merge top-level keys of `partial` into an existing record.
    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()>;

    /// Point lookup.
    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>>;
}

pub(crate) fn into_object(value: Value) -> StoreResult<Map<String, Value>> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::NotAnObject(other.to_string())),
    }
}

pub(crate) fn stamp_insert(record: Value) -> StoreResult<Map<String, Value>> {
    let mut map = into_object(record)?;
    let now = Value::String(Utc::now().to_rfc3339());
    map.insert("created_at".to_string(), now.clone());
    map.insert("updated_at".to_string(), now);
    Ok(map)
}

pub(crate) fn merge_update(
    existing: &mut Map<String, Value>,
    partial: Value,
) -> StoreResult<()> {
    for (key, value) in into_object(partial)? {
        existing.insert(key, value);
    }
    existing.insert(
        "updated_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    Ok(())
}
