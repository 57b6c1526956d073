//! File-backed AnalysisStore.
//!
//! One pretty-printed JSON document per record at
//! `<root>/<collection>/<id>.json`. Writes go to a temp file in the same
//! directory and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{AnalysisStore, Collection, StoreResult, merge_update, stamp_insert};
use crate::error::StoreError;

/// AnalysisStore writing JSON files under a root directory.
pub struct FileAnalysisStore {
    root: PathBuf,
    // Serializes read-modify-write cycles on update.
    write_lock: Mutex<()>,
}

impl FileAnalysisStore {
    /// Open a store rooted at `root`, creating collection directories.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        for collection in Collection::ALL {
            tokio::fs::create_dir_all(root.join(collection.as_str())).await?;
        }
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, collection: Collection, id: &str) -> StoreResult<PathBuf> {
        // Ids become file names; reject anything that could escape the collection dir.
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StoreError::Backend(format!("invalid record id: {id:?}")));
        }
        Ok(self
            .root
            .join(collection.as_str())
            .join(format!("{id}.json")))
    }

    async fn read(&self, path: &Path) -> StoreResult<Option<Value>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &Path, value: &Value) -> StoreResult<()> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(value)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for FileAnalysisStore {
    async fn insert(&self, collection: Collection, id: &str, record: Value) -> StoreResult<()> {
        let path = self.record_path(collection, id)?;
        let stamped = Value::Object(stamp_insert(record)?);

        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        self.write(&path, &stamped).await
    }

    async fn update(&self, collection: Collection, id: &str, partial: Value) -> StoreResult<()> {
        let path = self.record_path(collection, id)?;

        let _guard = self.write_lock.lock().await;
        let Some(Value::Object(mut existing)) = self.read(&path).await? else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };
        merge_update(&mut existing, partial)?;
        self.write(&path, &Value::Object(existing)).await
    }

    async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
        let path = self.record_path(collection, id)?;
        self.read(&path).await
    }
}
