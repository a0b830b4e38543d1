//! Maintenance tickets: listing, counts, and lifecycle transitions.

use chariot_core::entities::MaintenanceAction;
use chariot_core::enums::{EntityType, TicketStatus, TrailOp};
use chariot_core::errors::CoreError;
use chariot_core::ledger::TicketTransition;
use chariot_core::responses::TicketCounts;
use chrono::Utc;

use crate::COLLECTION_TICKETS;
use crate::error::DatabaseError;
use crate::service::ChariotService;

impl ChariotService {
    /// Tickets newest first, optionally only those in `status`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_tickets(
        &self,
        status: Option<TicketStatus>,
    ) -> Result<Vec<MaintenanceAction>, DatabaseError> {
        let mut all: Vec<MaintenanceAction> = self.db().load(COLLECTION_TICKETS).await?;
        if let Some(status) = status {
            all.retain(|t| t.status == status);
        }
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    /// # Errors
    ///
    /// `NotFound` if no ticket has `id`, or a store error.
    pub async fn get_ticket(&self, id: &str) -> Result<MaintenanceAction, DatabaseError> {
        let all: Vec<MaintenanceAction> = self.db().load(COLLECTION_TICKETS).await?;
        all.into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found(EntityType::Ticket, id).into())
    }

    /// # Errors
    ///
    /// Returns a store error.
    pub async fn ticket_counts(&self) -> Result<TicketCounts, DatabaseError> {
        let all: Vec<MaintenanceAction> = self.db().load(COLLECTION_TICKETS).await?;
        Ok(TicketCounts::tally(&all))
    }

    /// Apply `transition` to ticket `ticket_id`. Nothing is written if the
    /// transition is rejected.
    ///
    /// Only `start` and `complete` look up the current operator; `cancel`
    /// and notes are logged under the placeholder operator.
    ///
    /// # Errors
    ///
    /// `NotFound`, `InvalidState`, or `Validation` from the ticket rules, or
    /// a store error.
    pub async fn update_ticket(
        &self,
        ticket_id: &str,
        transition: TicketTransition,
    ) -> Result<MaintenanceAction, DatabaseError> {
        let actor = if transition.needs_actor() {
            self.current_operator().await
        } else {
            self.settings().placeholder_operator.clone()
        };
        let now = Utc::now();
        let _guard = self.write_lock().await;

        let id = ticket_id.to_string();
        let change = transition.clone();
        let by = actor.clone();
        let (from, ticket) = self
            .db()
            .update::<MaintenanceAction, _, _>(COLLECTION_TICKETS, move |all| {
                let ticket = all
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or_else(|| CoreError::not_found(EntityType::Ticket, &id))?;
                let from = ticket.status;
                ticket.apply(&change, &by, now)?;
                Ok((from, ticket.clone()))
            })
            .await?;

        if let TicketTransition::Notes { .. } = transition {
            self.record(&actor, TrailOp::Update, EntityType::Ticket, &ticket.id, &ticket, now);
        } else {
            let data = serde_json::json!({
                "action": transition.as_str(),
                "from": from,
                "to": ticket.status,
                "ticket": &ticket,
            });
            self.record(&actor, TrailOp::Transition, EntityType::Ticket, &ticket.id, &data, now);
        }

        tracing::info!(
            ticket = %ticket.id,
            action = transition.as_str(),
            %from,
            to = %ticket.status,
            actor = %actor,
            "ticket updated"
        );
        Ok(ticket)
    }
}
