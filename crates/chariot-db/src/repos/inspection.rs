//! Inspection workflow: start, answer, complete, and history.

use std::collections::HashSet;

use chariot_core::entities::{Equipment, Inspection, MaintenanceAction};
use chariot_core::enums::{EntityType, Severity, TrailOp};
use chariot_core::errors::CoreError;
use chariot_core::guard;
use chariot_core::ids::{PREFIX_INSPECTION, PREFIX_SESSION, PREFIX_TICKET, generate_id};
use chariot_core::ledger::open_tickets_for;
use chariot_core::question_bank::shuffle_choices;
use chariot_core::responses::InspectionCompletion;
use chariot_core::session::{CompletedSession, InspectionSession, SessionState};
use chrono::{DateTime, Local, TimeZone, Utc};

use crate::error::{CompletionError, DatabaseError};
use crate::notify::notify_status;
use crate::service::ChariotService;
use crate::{COLLECTION_INSPECTIONS, COLLECTION_TICKETS};

/// Result of asking to start an inspection.
#[derive(Debug)]
pub enum StartOutcome {
    Started(InspectionSession),
    /// The unit was already inspected today. Ask the operator, then call
    /// again with `confirm_duplicate = true`.
    NeedsConfirmation {
        equipment: Equipment,
        previous: Inspection,
    },
}

/// History query for [`ChariotService::list_inspections`].
#[derive(Debug, Clone, Default)]
pub struct InspectionFilter {
    pub equipment_id: Option<String>,
    pub limit: Option<usize>,
}

impl ChariotService {
    /// Start an inspection of `equipment_id` against the local clock.
    ///
    /// # Errors
    ///
    /// `NotFound`/`Validation` for the equipment id, `EmptyPool` if no
    /// question applies, or a store error.
    pub async fn start_inspection(
        &self,
        equipment_id: &str,
        confirm_duplicate: bool,
    ) -> Result<StartOutcome, DatabaseError> {
        self.start_inspection_at(equipment_id, confirm_duplicate, Local::now())
            .await
    }

    /// [`Self::start_inspection`] with an explicit `now`. The day boundary
    /// is local midnight in `now`'s timezone, so pass a zone that knows its
    /// daylight-saving rules rather than a fixed offset.
    ///
    /// # Errors
    ///
    /// See [`Self::start_inspection`].
    pub async fn start_inspection_at<Tz>(
        &self,
        equipment_id: &str,
        confirm_duplicate: bool,
        now: DateTime<Tz>,
    ) -> Result<StartOutcome, DatabaseError>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let equipment = self.select_equipment(equipment_id)?;

        if !confirm_duplicate {
            let history: Vec<Inspection> = self.db().load(COLLECTION_INSPECTIONS).await?;
            if let Some(previous) = guard::inspected_today(&history, &equipment.id, &now) {
                tracing::info!(
                    equipment = %equipment.id,
                    previous = %previous.id,
                    "equipment already inspected today; confirmation required"
                );
                return Ok(StartOutcome::NeedsConfirmation {
                    equipment,
                    previous: previous.clone(),
                });
            }
        }

        let questions = {
            let mut rng = self.rng().await;
            let mut drawn = self.questions().select_questions(
                equipment.category,
                self.settings().question_count,
                &mut *rng,
            )?;
            if self.settings().shuffle_choices {
                for question in &mut drawn {
                    question.choices = shuffle_choices(&question.choices, &mut *rng);
                }
            }
            drawn
        };

        let session = InspectionSession::start(
            generate_id(PREFIX_SESSION),
            equipment,
            questions,
            now.with_timezone(&Utc),
        )?;
        Ok(StartOutcome::Started(session))
    }

    /// Answer the current question of `session`.
    ///
    /// # Errors
    ///
    /// Any session error; the session is unchanged on error.
    pub fn answer(
        &self,
        session: &mut InspectionSession,
        choice_id: &str,
        comment: Option<&str>,
        severity: Option<Severity>,
    ) -> Result<SessionState, DatabaseError> {
        Ok(session
            .answer(choice_id, comment, severity, Utc::now())?
            .clone())
    }

    /// Abandon `session`. Nothing is persisted. Returns how many answers
    /// were discarded.
    ///
    /// # Errors
    ///
    /// `InvalidState` if the session already completed.
    pub fn cancel_inspection(&self, session: InspectionSession) -> Result<usize, DatabaseError> {
        let id = session.id().to_string();
        let discarded = session.cancel()?;
        tracing::info!(session = %id, discarded, "inspection abandoned");
        Ok(discarded)
    }

    /// Persist a finished session as an inspection plus one ticket per
    /// defect, then notify the operator.
    ///
    /// # Errors
    ///
    /// `Unfinished` if questions remain, `Unsaved` if the store write failed.
    pub async fn complete_inspection(
        &self,
        session: InspectionSession,
    ) -> Result<InspectionCompletion, CompletionError> {
        let done = session.finish()?;
        self.save_completed(done).await
    }

    /// Store a finished session. On failure nothing is kept and `done` comes
    /// back inside [`CompletionError::Unsaved`], so the write can be retried
    /// without asking the questions again.
    ///
    /// The inspection and its tickets are stored together: if the ticket
    /// write fails the inspection is removed again.
    ///
    /// # Errors
    ///
    /// `Unsaved` with the store error.
    pub async fn save_completed(
        &self,
        done: CompletedSession,
    ) -> Result<InspectionCompletion, CompletionError> {
        let operator = self.current_operator().await;
        let completion = match self.persist(&done, &operator).await {
            Ok(completion) => completion,
            Err(source) => {
                return Err(CompletionError::Unsaved {
                    completed: Box::new(done),
                    source,
                });
            }
        };

        let inspection = &completion.inspection;
        tracing::info!(
            inspection = %inspection.id,
            equipment = %inspection.equipment_id,
            status = %inspection.status,
            tickets = completion.tickets_opened.len(),
            "inspection completed"
        );
        notify_status(self.notifier(), inspection.status);
        Ok(completion)
    }

    async fn persist(
        &self,
        done: &CompletedSession,
        operator: &str,
    ) -> Result<InspectionCompletion, DatabaseError> {
        let now = Utc::now();
        let _guard = self.write_lock().await;

        let history: Vec<Inspection> = self.db().load(COLLECTION_INSPECTIONS).await?;
        let mut taken: HashSet<String> = history.into_iter().map(|i| i.id).collect();
        let inspection = Inspection::assemble(
            self.unique_id(PREFIX_INSPECTION, &mut taken)?,
            done.equipment.clone(),
            operator.to_string(),
            done.responses.clone(),
            done.started_at,
            now,
        );

        let mut ticket_ids = Vec::with_capacity(inspection.defect_count());
        if inspection.defect_count() > 0 {
            let existing: Vec<MaintenanceAction> = self.db().load(COLLECTION_TICKETS).await?;
            let mut taken: HashSet<String> = existing.into_iter().map(|t| t.id).collect();
            for _ in 0..inspection.defect_count() {
                ticket_ids.push(self.unique_id(PREFIX_TICKET, &mut taken)?);
            }
        }
        let mut ticket_ids = ticket_ids.into_iter();
        let tickets = open_tickets_for(&inspection, || ticket_ids.next().unwrap_or_default(), now);

        let stored = inspection.clone();
        self.db()
            .update::<Inspection, _, _>(COLLECTION_INSPECTIONS, move |all| {
                ensure_unused(all.iter().map(|i| i.id.as_str()), &stored.id)?;
                all.push(stored);
                Ok(())
            })
            .await?;

        if !tickets.is_empty() {
            let opened = tickets.clone();
            let written = self
                .db()
                .update::<MaintenanceAction, _, _>(COLLECTION_TICKETS, move |all| {
                    for ticket in &opened {
                        ensure_unused(all.iter().map(|t| t.id.as_str()), &ticket.id)?;
                    }
                    all.extend(opened);
                    Ok(())
                })
                .await;
            if let Err(error) = written {
                tracing::warn!(%error, inspection = %inspection.id, "ticket write failed; removing inspection");
                self.remove_inspection(&inspection.id).await;
                return Err(error);
            }
        }

        self.record(operator, TrailOp::Create, EntityType::Inspection, &inspection.id, &inspection, now);
        for ticket in &tickets {
            self.record(operator, TrailOp::Create, EntityType::Ticket, &ticket.id, ticket, now);
        }

        Ok(InspectionCompletion {
            inspection,
            tickets_opened: tickets,
        })
    }

    /// Completed inspections, newest first.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_inspections(
        &self,
        filter: &InspectionFilter,
    ) -> Result<Vec<Inspection>, DatabaseError> {
        let mut all: Vec<Inspection> = self.db().load(COLLECTION_INSPECTIONS).await?;
        if let Some(equipment_id) = &filter.equipment_id {
            all.retain(|i| &i.equipment_id == equipment_id);
        }
        all.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        if let Some(limit) = filter.limit {
            all.truncate(limit);
        }
        Ok(all)
    }

    /// # Errors
    ///
    /// `NotFound` if no inspection has `id`, or a store error.
    pub async fn get_inspection(&self, id: &str) -> Result<Inspection, DatabaseError> {
        let all: Vec<Inspection> = self.db().load(COLLECTION_INSPECTIONS).await?;
        all.into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Inspection, id).into())
    }

    async fn remove_inspection(&self, id: &str) {
        let target = id.to_string();
        let removed = self
            .db()
            .update::<Inspection, _, _>(COLLECTION_INSPECTIONS, move |all| {
                all.retain(|i| i.id != target);
                Ok(())
            })
            .await;
        if let Err(error) = removed {
            tracing::error!(%error, inspection = id, "rollback failed; inspection left without tickets");
        }
    }
}

fn ensure_unused<'a>(
    mut stored: impl Iterator<Item = &'a str>,
    id: &str,
) -> Result<(), DatabaseError> {
    if stored.any(|existing| existing == id) {
        return Err(DatabaseError::Store(format!("id {id} is already stored")));
    }
    Ok(())
}
