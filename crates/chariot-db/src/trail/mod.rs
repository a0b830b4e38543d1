//! JSONL change log.
//!
//! One file per UTC day in the trail directory. The store stays the source
//! of truth; the log is an append-only audit record.

pub mod writer;
