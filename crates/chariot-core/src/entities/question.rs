use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EquipmentCategory, Severity};

/// Which equipment a question applies to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", content = "categories", rename_all = "snake_case")]
pub enum QuestionScope {
    /// Asked for every category.
    Common,
    /// Asked only for the listed categories.
    Categories(BTreeSet<EquipmentCategory>),
}

impl QuestionScope {
    #[must_use]
    pub fn only(category: EquipmentCategory) -> Self {
        Self::Categories(BTreeSet::from([category]))
    }

    #[must_use]
    pub fn applies_to(&self, category: EquipmentCategory) -> bool {
        match self {
            Self::Common => true,
            Self::Categories(set) => set.contains(&category),
        }
    }
}

/// One selectable answer to a checklist question.
///
/// `severity` is present exactly when `is_acceptable` is false.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnswerChoice {
    pub id: String,
    pub text: String,
    pub is_acceptable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// A checklist question with its answer choices in authoring order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InspectionQuestion {
    pub id: String,
    pub text: String,
    pub scope: QuestionScope,
    pub choices: Vec<AnswerChoice>,
}

impl InspectionQuestion {
    /// Build the two-choice yes/no form of a question.
    ///
    /// Choice ids are `{id}-yes` (acceptable) and `{id}-no` (defect with
    /// `defect_severity`).
    #[must_use]
    pub fn yes_no(
        id: impl Into<String>,
        text: impl Into<String>,
        scope: QuestionScope,
        defect_severity: Severity,
    ) -> Self {
        let id = id.into();
        Self {
            choices: vec![
                AnswerChoice {
                    id: format!("{id}-yes"),
                    text: "Yes".to_string(),
                    is_acceptable: true,
                    severity: None,
                },
                AnswerChoice {
                    id: format!("{id}-no"),
                    text: "No".to_string(),
                    is_acceptable: false,
                    severity: Some(defect_severity),
                },
            ],
            id,
            text: text.into(),
            scope,
        }
    }

    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&AnswerChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    /// The choice that represents "no defect".
    #[must_use]
    pub fn acceptable_choice(&self) -> Option<&AnswerChoice> {
        self.choices.iter().find(|c| c.is_acceptable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_has_one_acceptable_and_one_defect() {
        let q = InspectionQuestion::yes_no(
            "Q900",
            "Horn works?",
            QuestionScope::Common,
            Severity::Critical,
        );
        assert_eq!(q.choices.len(), 2);
        assert_eq!(q.acceptable_choice().unwrap().id, "Q900-yes");
        let no = q.choice("Q900-no").unwrap();
        assert!(!no.is_acceptable);
        assert_eq!(no.severity, Some(Severity::Critical));
    }

    #[test]
    fn scope_applies_to_listed_categories_only() {
        let scope = QuestionScope::only(EquipmentCategory::Tier2);
        assert!(scope.applies_to(EquipmentCategory::Tier2));
        assert!(!scope.applies_to(EquipmentCategory::Tier1));
        assert!(QuestionScope::Common.applies_to(EquipmentCategory::Tier3));
    }

    #[test]
    fn scope_serializes_with_kind_tag() {
        let json = serde_json::to_value(QuestionScope::only(EquipmentCategory::Tier1)).unwrap();
        assert_eq!(json["kind"], "categories");
        assert_eq!(json["categories"][0], "tier_1");
        let common = serde_json::to_value(QuestionScope::Common).unwrap();
        assert_eq!(common, serde_json::json!({"kind": "common"}));
    }
}
