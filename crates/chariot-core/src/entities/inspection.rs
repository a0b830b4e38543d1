use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Equipment, QuestionResponse};
use crate::enums::{EquipmentCategory, InspectionStatus};
use crate::status::compute_status;

/// A completed inspection run. Written once at completion, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Inspection {
    pub id: String,
    pub equipment_id: String,
    pub equipment_name: String,
    pub category: EquipmentCategory,
    pub operator_name: String,
    /// Equipment record as it was when the session started.
    pub started_equipment_snapshot: Equipment,
    pub responses: Vec<QuestionResponse>,
    pub status: InspectionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl Inspection {
    /// Assemble the record, deriving `status` from `responses`.
    #[must_use]
    pub fn assemble(
        id: String,
        equipment: Equipment,
        operator_name: String,
        responses: Vec<QuestionResponse>,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let status = compute_status(&responses);
        Self {
            id,
            equipment_id: equipment.id.clone(),
            equipment_name: equipment.name.clone(),
            category: equipment.category,
            operator_name,
            started_equipment_snapshot: equipment,
            responses,
            status,
            started_at,
            completed_at,
        }
    }

    pub fn defects(&self) -> impl Iterator<Item = &QuestionResponse> {
        self.responses.iter().filter(|r| !r.is_acceptable())
    }

    #[must_use]
    pub fn defect_count(&self) -> usize {
        self.defects().count()
    }
}
