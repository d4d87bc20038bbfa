//! Whole-document persistence for the GPU inventory.
//!
//! Every operation loads the full document and writes the full document back.
//! There is no caching, locking or atomic rename: two concurrent writers can
//! lose an update, and a crash mid-write can leave a truncated file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::{StoreError, StoreResult};
use crate::models::GpuDocument;

/// Load/save contract the inventory operations are written against.
#[async_trait]
pub trait Store: Send + Sync {
    async fn load(&self) -> StoreResult<GpuDocument>;
    async fn save(&self, document: &GpuDocument) -> StoreResult<()>;
}

/// The data file on disk, pretty-printed with two-space indentation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self) -> StoreResult<GpuDocument> {
        let bytes = fs::read(&self.path).await.map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, document: &GpuDocument) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(document).map_err(StoreError::Serialize)?;
        fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// In-memory stand-in used by the operation and router tests.
#[cfg(test)]
pub struct MemoryStore {
    document: tokio::sync::RwLock<GpuDocument>,
    fail_saves: bool,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(document: GpuDocument) -> Self {
        Self {
            document: tokio::sync::RwLock::new(document),
            fail_saves: false,
        }
    }

    /// Every `save` fails with a write error; `load` still works.
    pub fn failing_saves(document: GpuDocument) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(document)
        }
    }

    pub async fn snapshot(&self) -> GpuDocument {
        self.document.read().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> StoreResult<GpuDocument> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &GpuDocument) -> StoreResult<()> {
        if self.fail_saves {
            return Err(StoreError::Write {
                path: PathBuf::from("memory"),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only store",
                ),
            });
        }
        *self.document.write().await = document.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("gpu_database_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn load_missing_file_is_read_error() {
        let store = JsonFileStore::new(temp_path());
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn load_malformed_json_is_parse_error() {
        let path = temp_path();
        tokio::fs::write(&path, b"{ \"gpu_database\": ").await.unwrap();
        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got {err:?}");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn load_wrong_shape_is_parse_error() {
        let path = temp_path();
        tokio::fs::write(&path, br#"{"gpus": []}"#).await.unwrap();
        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }), "got {err:?}");
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn save_then_load_keeps_unknown_keys() -> anyhow::Result<()> {
        let path = temp_path();
        let raw = json!({
            "gpu_database": {
                "gpus": [{
                    "id": 1, "vendor": "NVIDIA", "name": "V100", "generation": "Volta",
                    "serial_number": "SN-1", "owner": "lab", "borrowee": null,
                    "status": "available", "additional_info": {}, "rack": "B2"
                }],
                "updated": "2024-01-01"
            }
        });
        tokio::fs::write(&path, serde_json::to_vec(&raw)?).await?;

        let store = JsonFileStore::new(&path);
        let doc = store.load().await?;
        store.save(&doc).await?;

        let written: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&path).await?)?;
        assert_eq!(written, raw);

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_writes_two_space_pretty_json() -> anyhow::Result<()> {
        let path = temp_path();
        let store = JsonFileStore::new(&path);
        store.save(&GpuDocument::default()).await?;

        let text = tokio::fs::read_to_string(&path).await?;
        assert_eq!(text, "{\n  \"gpu_database\": {\n    \"gpus\": []\n  }\n}");

        let _ = tokio::fs::remove_file(&path).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_into_missing_directory_is_write_error() {
        let path = std::env::temp_dir()
            .join(format!("no_such_dir_{}", uuid::Uuid::new_v4()))
            .join("gpu_database.json");
        let err = JsonFileStore::new(path)
            .save(&GpuDocument::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }), "got {err:?}");
    }
}
