//! Storage adapters for persisted memory
//!
//! The pipeline only needs `get`/`set` of whole JSON values under a key. The
//! host decides where they live; two adapters ship here, an in-memory one for
//! tests and embedding, and a directory of JSON files.

use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key-value storage port consumed by the memory store
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Read the value under `key`, `None` if nothing was stored
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value under `key`
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// In-memory storage
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// One pretty-printed JSON file per key inside a directory
///
/// Writes go to a temporary sibling file that is then renamed over the
/// target, so readers see either the old or the new value.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
}

impl JsonFileStorage {
    /// Storage rooted at `root`; the directory is created on first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(Error::Storage(format!("invalid storage key: {:?}", key)));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl StorageAdapter for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;

        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = serde_json::from_str(&json).map_err(|e| {
            Error::Deserialization(format!("{}: {}", path.display(), e))
        })?;

        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let json = serde_json::to_string_pretty(&value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;

        Ok(())
    }
}
