//! Inspection draw configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const fn default_question_count() -> usize {
    8
}

const fn default_shuffle_choices() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InspectionConfig {
    /// Questions drawn per inspection. Smaller pools yield every eligible question.
    #[serde(default = "default_question_count")]
    pub question_count: usize,

    /// Fixed RNG seed for reproducible draws.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Shuffle answer choices before presenting them.
    #[serde(default = "default_shuffle_choices")]
    pub shuffle_choices: bool,

    /// Replacement for the built-in equipment catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_file: Option<PathBuf>,

    /// Replacement for the built-in question bank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_file: Option<PathBuf>,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            seed: None,
            shuffle_choices: default_shuffle_choices(),
            equipment_file: None,
            question_file: None,
        }
    }
}

impl InspectionConfig {
    #[must_use]
    pub const fn has_custom_catalog(&self) -> bool {
        self.equipment_file.is_some() || self.question_file.is_some()
    }
}
