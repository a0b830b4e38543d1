//! Key/value document store.
//!
//! Each key holds one JSON document. `set` runs a read-modify-write under the
//! store's own lock, so concurrent updates to one key never interleave.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DatabaseError;

/// Read-modify-write callback. Returning `Err` leaves the key untouched.
pub type Updater = Box<dyn FnOnce(Option<Value>) -> Result<Value, DatabaseError> + Send>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Current document at `key`, or `None` if never written.
    async fn get(&self, key: &str) -> Result<Option<Value>, DatabaseError>;

    /// Replace the document at `key` with the updater's result.
    async fn set(&self, key: &str, updater: Updater) -> Result<(), DatabaseError>;
}
