//! One-question-at-a-time inspection state machine.
//!
//! ```text
//! AwaitingAnswer(i) --acceptable choice--> AwaitingAnswer(i+1) | Completed
//! AwaitingAnswer(i) --defect choice------> AwaitingDefectDetail(i, choice)
//! AwaitingDefectDetail(i, choice) --confirm/skip--> AwaitingAnswer(i+1) | Completed
//! ```
//!
//! Severity is intrinsic to the chosen answer. An operator-supplied severity
//! is only accepted when it matches the choice.
//!
//! A session is consumed by [`InspectionSession::finish`] or
//! [`InspectionSession::cancel`], so completion side effects can run at most
//! once and an abandoned session leaves nothing behind.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AnswerChoice, Equipment, InspectionQuestion, QuestionResponse, ResponseOutcome};
use crate::enums::{EntityType, Severity};
use crate::errors::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    AwaitingAnswer { index: usize },
    AwaitingDefectDetail { index: usize, choice_id: String },
    Completed,
}

/// Output of a finished session, ready for aggregation and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSession {
    pub session_id: String,
    pub equipment: Equipment,
    pub questions_drawn: usize,
    pub responses: Vec<QuestionResponse>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct InspectionSession {
    id: String,
    equipment: Equipment,
    questions: Vec<InspectionQuestion>,
    responses: Vec<QuestionResponse>,
    state: SessionState,
    started_at: DateTime<Utc>,
}

impl InspectionSession {
    /// Bind equipment and a drawn question list. Starts at `AwaitingAnswer(0)`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `questions` is empty.
    pub fn start(
        id: impl Into<String>,
        equipment: Equipment,
        questions: Vec<InspectionQuestion>,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if questions.is_empty() {
            return Err(CoreError::Validation(
                "an inspection needs at least one question".into(),
            ));
        }
        let id = id.into();
        tracing::debug!(session = %id, equipment = %equipment.id, questions = questions.len(), "inspection session started");
        Ok(Self {
            id,
            equipment,
            questions,
            responses: Vec::new(),
            state: SessionState::AwaitingAnswer { index: 0 },
            started_at: now,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    #[must_use]
    pub fn questions(&self) -> &[InspectionQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn responses(&self) -> &[QuestionResponse] {
        &self.responses
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.state, SessionState::Completed)
    }

    /// `(answered, total)`.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        (self.responses.len(), self.questions.len())
    }

    /// The question awaiting an answer or defect detail.
    #[must_use]
    pub fn current_question(&self) -> Option<&InspectionQuestion> {
        match &self.state {
            SessionState::AwaitingAnswer { index }
            | SessionState::AwaitingDefectDetail { index, .. } => self.questions.get(*index),
            SessionState::Completed => None,
        }
    }

    /// Record the operator's choice for `question_id`.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank choice id.
    /// - `InvalidState` if not awaiting an answer, or `question_id` is not
    ///   the current question.
    /// - `NotFound` for an unknown question or choice.
    pub fn select_choice(
        &mut self,
        question_id: &str,
        choice_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&SessionState, CoreError> {
        let index = self.expect_awaiting_answer()?;
        let question = &self.questions[index];
        if question.id != question_id {
            if self.questions.iter().any(|q| q.id == question_id) {
                return Err(self.state_error(format!(
                    "question {question_id} answered out of order; current question is {}",
                    question.id
                )));
            }
            return Err(CoreError::not_found(EntityType::Question, question_id));
        }
        let choice = lookup_choice(question, choice_id)?.clone();

        if choice.is_acceptable {
            self.record(index, &choice, ResponseOutcome::Acceptable, now);
        } else {
            tracing::debug!(session = %self.id, question = %question_id, choice = %choice.id, "defect selected");
            self.state = SessionState::AwaitingDefectDetail {
                index,
                choice_id: choice.id,
            };
        }
        Ok(&self.state)
    }

    /// Confirm a pending defect with an optional comment.
    ///
    /// A blank comment is treated as no comment.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if no defect is pending.
    /// - `Validation` if `severity` disagrees with the chosen answer.
    pub fn confirm_defect(
        &mut self,
        comment: Option<&str>,
        severity: Option<Severity>,
        now: DateTime<Utc>,
    ) -> Result<&SessionState, CoreError> {
        let SessionState::AwaitingDefectDetail { index, choice_id } = &self.state else {
            return Err(self.state_error("no defect is awaiting detail"));
        };
        let index = *index;
        let choice = lookup_choice(&self.questions[index], choice_id)?.clone();
        let fixed = intrinsic_severity(&choice)?;
        check_severity(&choice, fixed, severity)?;

        let comment = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);
        self.record(
            index,
            &choice,
            ResponseOutcome::Defect {
                severity: fixed,
                comment,
            },
            now,
        );
        Ok(&self.state)
    }

    /// Confirm a pending defect without a comment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if no defect is pending.
    pub fn skip_comment(&mut self, now: DateTime<Utc>) -> Result<&SessionState, CoreError> {
        self.confirm_defect(None, None, now)
    }

    /// Answer the current question in one step.
    ///
    /// For a defect choice the comment and severity are applied immediately.
    /// Nothing is recorded if validation fails.
    ///
    /// # Errors
    ///
    /// Same as [`Self::select_choice`] and [`Self::confirm_defect`]. Passing
    /// a severity for an acceptable choice is a `Validation` error.
    pub fn answer(
        &mut self,
        choice_id: &str,
        comment: Option<&str>,
        severity: Option<Severity>,
        now: DateTime<Utc>,
    ) -> Result<&SessionState, CoreError> {
        let index = self.expect_awaiting_answer()?;
        let question = &self.questions[index];
        let choice = lookup_choice(question, choice_id)?;
        if choice.is_acceptable {
            if severity.is_some() {
                return Err(CoreError::Validation(format!(
                    "choice {} reports no defect; a severity cannot be given",
                    choice.id
                )));
            }
        } else {
            check_severity(choice, intrinsic_severity(choice)?, severity)?;
        }

        let question_id = question.id.clone();
        let is_acceptable = choice.is_acceptable;
        self.select_choice(&question_id, choice_id, now)?;
        if !is_acceptable {
            self.confirm_defect(comment, severity, now)?;
        }
        Ok(&self.state)
    }

    /// Abandon the session, discarding every response gathered so far.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the session already completed.
    pub fn cancel(self) -> Result<usize, CoreError> {
        if self.is_completed() {
            return Err(self.state_error("session already completed"));
        }
        let discarded = self.responses.len();
        tracing::debug!(session = %self.id, discarded, "inspection session abandoned");
        Ok(discarded)
    }

    /// Hand over the completed response sequence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while questions remain unanswered.
    pub fn finish(self) -> Result<CompletedSession, CoreError> {
        if !self.is_completed() {
            let (answered, total) = self.progress();
            return Err(self.state_error(format!(
                "session not complete: {answered} of {total} questions answered"
            )));
        }
        Ok(CompletedSession {
            session_id: self.id,
            equipment: self.equipment,
            questions_drawn: self.questions.len(),
            responses: self.responses,
            started_at: self.started_at,
        })
    }

    fn expect_awaiting_answer(&self) -> Result<usize, CoreError> {
        match &self.state {
            SessionState::AwaitingAnswer { index } => Ok(*index),
            SessionState::AwaitingDefectDetail { index, .. } => Err(self.state_error(format!(
                "defect detail pending for question {}",
                self.questions[*index].id
            ))),
            SessionState::Completed => Err(self.state_error("session already completed")),
        }
    }

    fn record(
        &mut self,
        index: usize,
        choice: &AnswerChoice,
        outcome: ResponseOutcome,
        now: DateTime<Utc>,
    ) {
        let question = &self.questions[index];
        self.responses.push(QuestionResponse {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            choice_id: choice.id.clone(),
            choice_text: choice.text.clone(),
            outcome,
            answered_at: now,
        });
        self.state = if index + 1 < self.questions.len() {
            SessionState::AwaitingAnswer { index: index + 1 }
        } else {
            SessionState::Completed
        };
    }

    fn state_error(&self, reason: impl Into<String>) -> CoreError {
        CoreError::invalid_state(EntityType::Session, &self.id, reason)
    }
}

fn lookup_choice<'q>(
    question: &'q InspectionQuestion,
    choice_id: &str,
) -> Result<&'q AnswerChoice, CoreError> {
    if choice_id.trim().is_empty() {
        return Err(CoreError::Validation("an answer choice is required".into()));
    }
    question
        .choice(choice_id)
        .ok_or_else(|| CoreError::not_found(EntityType::Choice, choice_id))
}

fn intrinsic_severity(choice: &AnswerChoice) -> Result<Severity, CoreError> {
    choice.severity.ok_or_else(|| {
        CoreError::Catalog(format!("defect choice {} has no severity", choice.id))
    })
}

fn check_severity(
    choice: &AnswerChoice,
    fixed: Severity,
    requested: Option<Severity>,
) -> Result<(), CoreError> {
    match requested {
        Some(requested) if requested != fixed => Err(CoreError::Validation(format!(
            "severity of choice {} is fixed at {fixed}; got {requested}",
            choice.id
        ))),
        _ => Ok(()),
    }
}
