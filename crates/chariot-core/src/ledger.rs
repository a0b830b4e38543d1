//! Maintenance ticket derivation and lifecycle.
//!
//! ```text
//! pending --start(assignee?)--> in_progress
//! in_progress --complete(resolution, resolved_by)--> completed
//! pending | in_progress --cancel--> cancelled
//! ```
//!
//! Notes may change in any non-terminal state and never touch `status`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Inspection, MaintenanceAction, QuestionResponse};
use crate::enums::{EntityType, TicketStatus};
use crate::errors::CoreError;

/// A requested change to a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TicketTransition {
    Start { assignee: Option<String> },
    Complete { resolution: String },
    Cancel,
    Notes { notes: Option<String> },
}

impl TicketTransition {
    /// Whether applying this transition needs the acting identity.
    #[must_use]
    pub const fn needs_actor(&self) -> bool {
        matches!(self, Self::Start { .. } | Self::Complete { .. })
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Complete { .. } => "complete",
            Self::Cancel => "cancel",
            Self::Notes { .. } => "notes",
        }
    }
}

/// Description stored on a ticket: `question: answer` plus ` - comment`.
#[must_use]
pub fn defect_description(response: &QuestionResponse) -> String {
    match response.comment() {
        Some(comment) => format!(
            "{}: {} - {comment}",
            response.question_text, response.choice_text
        ),
        None => format!("{}: {}", response.question_text, response.choice_text),
    }
}

/// One `pending` ticket per defect of `inspection`, in response order.
///
/// Not idempotent: call once per inspection.
pub fn open_tickets_for(
    inspection: &Inspection,
    mut next_id: impl FnMut() -> String,
    now: DateTime<Utc>,
) -> Vec<MaintenanceAction> {
    inspection
        .responses
        .iter()
        .filter_map(|response| {
            let severity = response.severity()?;
            Some(MaintenanceAction {
                id: next_id(),
                inspection_id: inspection.id.clone(),
                equipment_id: inspection.equipment_id.clone(),
                equipment_name: inspection.equipment_name.clone(),
                defect_description: defect_description(response),
                severity,
                status: TicketStatus::Pending,
                created_at: now,
                updated_at: now,
                assigned_to: None,
                resolution: None,
                resolved_at: None,
                resolved_by: None,
                notes: None,
            })
        })
        .collect()
}

impl MaintenanceAction {
    /// `pending → in_progress`. Without an assignee the actor is recorded.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the ticket is pending.
    pub fn start(
        &mut self,
        assignee: Option<&str>,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.ensure_can_move_to(TicketStatus::InProgress)?;
        let assignee = assignee
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(actor);
        self.assigned_to = Some(assignee.to_string());
        self.status = TicketStatus::InProgress;
        self.updated_at = now;
        Ok(())
    }

    /// `in_progress → completed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless in progress, and `Validation` for blank
    /// resolution text. The ticket is unchanged on error.
    pub fn complete(
        &mut self,
        resolution: &str,
        resolved_by: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        self.ensure_can_move_to(TicketStatus::Completed)?;
        let resolution = resolution.trim();
        if resolution.is_empty() {
            return Err(CoreError::Validation(format!(
                "ticket {}: resolution text is required",
                self.id
            )));
        }
        self.resolution = Some(resolution.to_string());
        self.resolved_by = Some(resolved_by.to_string());
        self.resolved_at = Some(now);
        self.status = TicketStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    /// `pending | in_progress → cancelled`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` from a terminal state.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.ensure_can_move_to(TicketStatus::Cancelled)?;
        self.status = TicketStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Replace free-text notes. A blank value clears them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` from a terminal state.
    pub fn set_notes(&mut self, notes: Option<&str>, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(self.state_error(format!("notes are frozen once {}", self.status)));
        }
        self.notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        self.updated_at = now;
        Ok(())
    }

    /// Apply a [`TicketTransition`] on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// See the individual transition methods.
    pub fn apply(
        &mut self,
        transition: &TicketTransition,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        match transition {
            TicketTransition::Start { assignee } => self.start(assignee.as_deref(), actor, now),
            TicketTransition::Complete { resolution } => self.complete(resolution, actor, now),
            TicketTransition::Cancel => self.cancel(now),
            TicketTransition::Notes { notes } => self.set_notes(notes.as_deref(), now),
        }
    }

    fn ensure_can_move_to(&self, next: TicketStatus) -> Result<(), CoreError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(self.state_error(format!("cannot move from {} to {next}", self.status)))
        }
    }

    fn state_error(&self, reason: String) -> CoreError {
        CoreError::invalid_state(EntityType::Ticket, &self.id, reason)
    }
}
