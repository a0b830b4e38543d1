//! JSONL change-log envelope.
//!
//! Every persisted mutation is appended as a `TrailOperation` to
//! `{trail_dir}/{YYYY-MM-DD}.jsonl`. The store stays authoritative; the trail
//! is an audit record for supervisors.
//!
//! Lines without a `v` field deserialize with `v == 1`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, TrailOp};

const fn default_trail_version() -> u32 {
    1
}

/// A single operation recorded in the change log.
///
/// `data` holds the full record for `Create`, the new record for `Update`,
/// and `{from, to, ...}` for `Transition`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrailOperation {
    #[serde(default = "default_trail_version")]
    pub v: u32,

    /// RFC 3339 timestamp of the operation.
    pub ts: String,

    /// Operator or supervisor who caused the change.
    pub actor: String,

    pub op: TrailOp,
    pub entity: EntityType,
    pub id: String,
    pub data: serde_json::Value,
}
