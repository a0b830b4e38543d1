//! # chariot-db
//!
//! Persistence and orchestration for Chariot.
//!
//! Inspections and maintenance tickets live as two JSON collections in a
//! [`store::Store`]. [`service::ChariotService`] drives the inspection
//! workflow on top of it: draw questions, run the session, persist the
//! record and its tickets together, append the JSONL change log, and notify
//! the operator.

pub mod error;
pub mod identity;
pub mod notify;
pub mod repos;
pub mod service;
pub mod store;
pub mod trail;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::oneshot;

use error::DatabaseError;
use store::{FileStore, MemoryStore, Store};

/// Store key for completed inspections.
pub const COLLECTION_INSPECTIONS: &str = "inspections";
/// Store key for maintenance tickets.
pub const COLLECTION_TICKETS: &str = "maintenance_actions";

/// Typed collection access over a [`Store`].
///
/// Every collection is a JSON array. A key that was never written reads as
/// the empty list.
#[derive(Clone)]
pub struct ChariotDb {
    store: Arc<dyn Store>,
}

impl ChariotDb {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Open a file-backed database under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if the directory cannot be created.
    pub async fn open_dir(data_dir: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        Ok(Self::new(Arc::new(FileStore::open(data_dir).await?)))
    }

    /// Read the whole collection at `key`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the store fails or the document does not
    /// decode as a list of `T`.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, DatabaseError> {
        match self.store.get(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Mutate the collection at `key` in one atomic store update.
    ///
    /// If `f` fails nothing is written and its error is returned.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or `DatabaseError` if the store fails.
    pub async fn update<T, R, F>(&self, key: &str, f: F) -> Result<R, DatabaseError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        R: Send + 'static,
        F: FnOnce(&mut Vec<T>) -> Result<R, DatabaseError> + Send + 'static,
    {
        let (tx, mut rx) = oneshot::channel();
        self.store
            .set(
                key,
                Box::new(move |current| {
                    let mut items: Vec<T> = match current {
                        Some(value) => serde_json::from_value(value)?,
                        None => Vec::new(),
                    };
                    let out = f(&mut items)?;
                    let next = serde_json::to_value(&items)?;
                    let _ = tx.send(out);
                    Ok(next)
                }),
            )
            .await?;
        rx.try_recv()
            .map_err(|_| DatabaseError::Store(format!("update of '{key}' returned no result")))
    }
}
