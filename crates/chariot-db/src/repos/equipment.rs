//! Equipment selection.

use chariot_core::entities::Equipment;
use chariot_core::enums::EquipmentCategory;

use crate::error::DatabaseError;
use crate::service::ChariotService;

impl ChariotService {
    /// Units of `category` in catalog order.
    #[must_use]
    pub fn list_equipment_by_category(&self, category: EquipmentCategory) -> Vec<Equipment> {
        self.catalog()
            .by_category(category)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every unit, grouped by category in tier order.
    #[must_use]
    pub fn list_equipment(&self) -> Vec<Equipment> {
        EquipmentCategory::ALL
            .into_iter()
            .flat_map(|category| self.list_equipment_by_category(category))
            .collect()
    }

    /// Look up the unit an operator picked.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank id, `NotFound` for an unknown one.
    pub fn select_equipment(&self, id: &str) -> Result<Equipment, DatabaseError> {
        Ok(self.catalog().get(id)?.clone())
    }
}
