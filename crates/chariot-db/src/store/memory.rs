use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Store, Updater};
use crate::error::DatabaseError;

/// In-process store for tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        Ok(self.docs.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, updater: Updater) -> Result<(), DatabaseError> {
        let mut docs = self.docs.lock().await;
        let next = updater(docs.get(key).cloned())?;
        docs.insert(key.to_string(), next);
        Ok(())
    }
}
