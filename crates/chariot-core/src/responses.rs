//! Response types returned by service operations and rendered by `chk`.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Equipment, Inspection, MaintenanceAction};
use crate::enums::{EquipmentCategory, InspectionStatus, TicketStatus};

/// Result of completing an inspection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InspectionCompletion {
    pub inspection: Inspection,
    pub tickets_opened: Vec<MaintenanceAction>,
}

/// Ticket count per status, for the maintenance view header.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TicketCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total: usize,
}

impl TicketCounts {
    #[must_use]
    pub fn tally<'a>(tickets: impl IntoIterator<Item = &'a MaintenanceAction>) -> Self {
        let mut counts = Self::default();
        for ticket in tickets {
            match ticket.status {
                TicketStatus::Pending => counts.pending += 1,
                TicketStatus::InProgress => counts.in_progress += 1,
                TicketStatus::Completed => counts.completed += 1,
                TicketStatus::Cancelled => counts.cancelled += 1,
            }
            counts.total += 1;
        }
        counts
    }

    #[must_use]
    pub const fn open(&self) -> usize {
        self.pending + self.in_progress
    }
}

/// Latest known state of one unit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EquipmentStatusRow {
    pub equipment_id: String,
    pub name: String,
    pub category: EquipmentCategory,
    pub last_status: Option<InspectionStatus>,
    pub last_inspected_at: Option<DateTime<Utc>>,
    pub last_operator: Option<String>,
    pub open_tickets: usize,
}

/// Supervisor overview for one local calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FleetSummary {
    pub date: NaiveDate,
    pub inspections_today: usize,
    pub with_defects_today: usize,
    pub critical_today: usize,
    pub equipment: Vec<EquipmentStatusRow>,
}

impl FleetSummary {
    /// Build the overview for the local day of `now`. Rows follow `equipment`
    /// order.
    pub fn compute<Tz: TimeZone>(
        equipment: &[Equipment],
        inspections: &[Inspection],
        tickets: &[MaintenanceAction],
        now: &DateTime<Tz>,
    ) -> Self {
        let tz = now.timezone();
        let date = now.date_naive();
        let today: Vec<&Inspection> = inspections
            .iter()
            .filter(|i| i.completed_at.with_timezone(&tz).date_naive() == date)
            .collect();

        let mut latest: HashMap<&str, &Inspection> = HashMap::new();
        for inspection in inspections {
            latest
                .entry(inspection.equipment_id.as_str())
                .and_modify(|current| {
                    if inspection.completed_at > current.completed_at {
                        *current = inspection;
                    }
                })
                .or_insert(inspection);
        }

        let mut open: HashMap<&str, usize> = HashMap::new();
        for ticket in tickets.iter().filter(|t| !t.status.is_terminal()) {
            *open.entry(ticket.equipment_id.as_str()).or_default() += 1;
        }

        let rows = equipment
            .iter()
            .map(|unit| {
                let last = latest.get(unit.id.as_str());
                EquipmentStatusRow {
                    equipment_id: unit.id.clone(),
                    name: unit.name.clone(),
                    category: unit.category,
                    last_status: last.map(|i| i.status),
                    last_inspected_at: last.map(|i| i.completed_at),
                    last_operator: last.map(|i| i.operator_name.clone()),
                    open_tickets: open.get(unit.id.as_str()).copied().unwrap_or(0),
                }
            })
            .collect();

        Self {
            date,
            inspections_today: today.len(),
            with_defects_today: today.iter().filter(|i| i.defect_count() > 0).count(),
            critical_today: today
                .iter()
                .filter(|i| i.status == InspectionStatus::Critical)
                .count(),
            equipment: rows,
        }
    }
}
