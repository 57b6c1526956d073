//! In-memory AnalysisStore implementation
//!
//! Records live in a HashMap behind a tokio RwLock. Used by tests and
//! embedded callers that do not need durability.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{AnalysisStore, Collection, StoreResult, merge_update, stamp_insert};
use crate::error::StoreError;

/// In-memory implementation of AnalysisStore
#[derive(Default)]
pub struct MemoryAnalysisStore {
    records: RwLock<HashMap<(Collection, String), Map<String, Value>>>,
}

impl MemoryAnalysisStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records across all collections.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AnalysisStore for MemoryAnalysisStore {
    async fn insert(&self, collection: Collection, id: &str, record: Value) -> StoreResult<()> {
        let stamped = stamp_insert(record)?;
        let mut records = self.records.write().await;
        let key = (collection, id.to_string());
        if records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        records.insert(key, stamped);
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let existing = records
            .get_mut(&(collection, id.to_string()))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        merge_update(existing, partial)
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(collection, id.to_string()))
            .cloned()
            .map(Value::Object))
    }
}
