//! Equipment catalog: the static lookup table of inspectable units.

use std::collections::HashSet;

use serde::Deserialize;

use crate::entities::Equipment;
use crate::enums::{EntityType, EquipmentCategory};
use crate::errors::CoreError;

const BUILTIN_EQUIPMENT: &str = include_str!("../data/equipment.toml");

#[derive(Deserialize)]
struct EquipmentFile {
    equipment: Vec<Equipment>,
}

/// Immutable set of units, in authoring order.
#[derive(Debug, Clone)]
pub struct EquipmentCatalog {
    equipment: Vec<Equipment>,
}

impl EquipmentCatalog {
    /// The fleet shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` if the embedded data is malformed.
    pub fn builtin() -> Result<Self, CoreError> {
        Self::from_toml_str(BUILTIN_EQUIPMENT)
    }

    /// Parse a catalog from `[[equipment]]` TOML tables.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` on parse failure or invariant violation.
    pub fn from_toml_str(source: &str) -> Result<Self, CoreError> {
        let file: EquipmentFile = toml::from_str(source)
            .map_err(|e| CoreError::Catalog(format!("invalid equipment TOML: {e}")))?;
        Self::from_equipment(file.equipment)
    }

    /// Build a catalog from already-parsed units.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Catalog` for blank ids/names or duplicate ids.
    pub fn from_equipment(equipment: Vec<Equipment>) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for unit in &equipment {
            if unit.id.trim().is_empty() || unit.name.trim().is_empty() {
                return Err(CoreError::Catalog(format!(
                    "equipment '{}' has a blank id or name",
                    unit.id
                )));
            }
            if !seen.insert(unit.id.as_str()) {
                return Err(CoreError::Catalog(format!(
                    "duplicate equipment id '{}'",
                    unit.id
                )));
            }
        }
        Ok(Self { equipment })
    }

    #[must_use]
    pub fn all(&self) -> &[Equipment] {
        &self.equipment
    }

    #[must_use]
    pub fn by_category(&self, category: EquipmentCategory) -> Vec<&Equipment> {
        self.equipment
            .iter()
            .filter(|unit| unit.category == category)
            .collect()
    }

    /// Look up a unit by id.
    ///
    /// # Errors
    ///
    /// `CoreError::Validation` for a blank id, `CoreError::NotFound` if absent.
    pub fn get(&self, id: &str) -> Result<&Equipment, CoreError> {
        if id.trim().is_empty() {
            return Err(CoreError::Validation("equipment id is required".into()));
        }
        self.equipment
            .iter()
            .find(|unit| unit.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Equipment, id))
    }
}
