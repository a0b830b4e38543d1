//! Error types for Chariot's domain rules.
//!
//! Every variant is a local, recoverable condition surfaced to the caller for
//! operator-facing correction. Storage and identity failures live in
//! `chariot-db` and wrap this type.

use thiserror::Error;

use crate::enums::{EntityType, EquipmentCategory};

#[derive(Debug, Error)]
pub enum CoreError {
    /// Required free text or selection is missing or blank.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced record is absent from the catalog or the store.
    #[error("Not found: {entity_type} {id}")]
    NotFound { entity_type: EntityType, id: String },

    /// Operation attempted from a state that does not allow it.
    #[error("Invalid state for {entity_type} {id}: {reason}")]
    InvalidState {
        entity_type: EntityType,
        id: String,
        reason: String,
    },

    /// No question is eligible for the requested category.
    #[error("No eligible questions for category {category}")]
    EmptyPool { category: EquipmentCategory },

    /// Equipment or question definitions violate catalog invariants.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn invalid_state(
        entity_type: EntityType,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            entity_type,
            id: id.into(),
            reason: reason.into(),
        }
    }
}
