use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Store, Updater};
use crate::error::DatabaseError;

/// One pretty-printed `{key}.json` per key under a data directory.
///
/// Writes go to `{key}.json.tmp` first and are renamed into place, so a crash
/// mid-write leaves the previous document intact.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the directory cannot be created.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "file store opened");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, DatabaseError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DatabaseError::Store(format!("invalid store key '{key}'")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    async fn read(path: &Path) -> Result<Option<Value>, DatabaseError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        let path = self.path_for(key)?;
        Self::read(&path).await
    }

    async fn set(&self, key: &str, updater: Updater) -> Result<(), DatabaseError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;

        let next = updater(Self::read(&path).await?)?;
        let bytes = serde_json::to_vec_pretty(&next)?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn documents_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).await.unwrap();
            store
                .set("inspections", Box::new(|_| Ok(json!([{"id": "ins-1"}]))))
                .await
                .unwrap();
        }
        let store = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            store.get("inspections").await.unwrap(),
            Some(json!([{"id": "ins-1"}]))
        );
        assert!(dir.path().join("inspections.json").exists());
        assert!(!dir.path().join("inspections.json.tmp").exists());
    }

    #[tokio::test]
    async fn path_like_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.get("../etc/passwd").await,
            Err(DatabaseError::Store(_))
        ));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("maintenance_actions.json"), b"{not json").unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.get("maintenance_actions").await,
            Err(DatabaseError::Serialization(_))
        ));
    }
}
