//! Supervisor overview.

use chariot_core::entities::{Inspection, MaintenanceAction};
use chariot_core::responses::FleetSummary;
use chrono::{DateTime, TimeZone};

use crate::error::DatabaseError;
use crate::service::ChariotService;
use crate::{COLLECTION_INSPECTIONS, COLLECTION_TICKETS};

impl ChariotService {
    /// Today's inspection counts and the latest status of every unit, for
    /// the local day of `now`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn fleet_summary<Tz>(&self, now: DateTime<Tz>) -> Result<FleetSummary, DatabaseError>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let inspections: Vec<Inspection> = self.db().load(COLLECTION_INSPECTIONS).await?;
        let tickets: Vec<MaintenanceAction> = self.db().load(COLLECTION_TICKETS).await?;
        Ok(FleetSummary::compute(
            &self.list_equipment(),
            &inspections,
            &tickets,
            &now,
        ))
    }
}

#[cfg(test)]
mod tests {
    use chariot_core::enums::InspectionStatus;

    use crate::repos::inspection::StartOutcome;
    use crate::test_support::helpers::{answer_all, test_service};

    #[tokio::test]
    async fn summary_reflects_completed_runs() {
        let svc = test_service();
        let StartOutcome::Started(mut session) = svc.start_inspection("C5-202", false).await.unwrap() else {
            panic!("fresh store");
        };
        answer_all(&mut session, &[]);
        let done = svc.complete_inspection(session).await.unwrap();

        let summary = svc
            .fleet_summary(done.inspection.completed_at.fixed_offset())
            .await
            .unwrap();
        assert_eq!(summary.inspections_today, 1);
        assert_eq!(summary.with_defects_today, 0);
        assert_eq!(summary.equipment.len(), 10);
        let row = summary
            .equipment
            .iter()
            .find(|r| r.equipment_id == "C5-202")
            .unwrap();
        assert_eq!(row.last_status, Some(InspectionStatus::Ok));
        assert_eq!(row.last_operator.as_deref(), Some("Alex"));
    }
}
