use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EquipmentCategory;

/// An inspectable unit of the fleet. Reference data, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub category: EquipmentCategory,
}
