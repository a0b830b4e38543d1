use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Severity;

/// Whether an answer passed, and if not, the defect detail.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseOutcome {
    Acceptable,
    Defect {
        severity: Severity,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        comment: Option<String>,
    },
}

/// One operator answer. Question and choice text are snapshotted at answer
/// time so later catalog edits never alter history.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct QuestionResponse {
    pub question_id: String,
    pub question_text: String,
    pub choice_id: String,
    pub choice_text: String,
    pub outcome: ResponseOutcome,
    pub answered_at: DateTime<Utc>,
}

impl QuestionResponse {
    #[must_use]
    pub const fn is_acceptable(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Acceptable)
    }

    #[must_use]
    pub const fn severity(&self) -> Option<Severity> {
        match self.outcome {
            ResponseOutcome::Acceptable => None,
            ResponseOutcome::Defect { severity, .. } => Some(severity),
        }
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        match &self.outcome {
            ResponseOutcome::Acceptable => None,
            ResponseOutcome::Defect { comment, .. } => comment.as_deref(),
        }
    }
}
