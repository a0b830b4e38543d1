//! End-to-end inspection workflow over the public service API.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chariot_core::catalog::EquipmentCatalog;
use chariot_core::entities::{Inspection, InspectionQuestion, MaintenanceAction};
use chariot_core::enums::{EquipmentCategory, InspectionStatus, NotificationLevel, Severity, TicketStatus};
use chariot_core::errors::CoreError;
use chariot_core::guard::has_run_today;
use chariot_core::ledger::TicketTransition;
use chariot_core::question_bank::QuestionBank;
use chariot_core::session::InspectionSession;
use chariot_db::error::{CompletionError, DatabaseError};
use chariot_db::identity::StaticIdentity;
use chariot_db::notify::RecordingNotifier;
use chariot_db::repos::inspection::{InspectionFilter, StartOutcome};
use chariot_db::service::{ChariotService, IdSource};
use chariot_db::store::{MemoryStore, Store, Updater};
use chariot_db::trail::writer::TrailWriter;
use chariot_db::{COLLECTION_INSPECTIONS, COLLECTION_TICKETS, ChariotDb};
use chrono::offset::LocalResult;
use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::Value;

fn service_over(db: ChariotDb) -> (ChariotService, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let svc = ChariotService::new(
        db,
        TrailWriter::disabled(),
        EquipmentCatalog::builtin().unwrap(),
        QuestionBank::builtin().unwrap(),
    )
    .with_identity(Arc::new(StaticIdentity::named("Alex")))
    .with_notifier(notifier.clone())
    .with_seed(2024);
    (svc, notifier)
}

async fn start(svc: &ChariotService, equipment_id: &str) -> InspectionSession {
    match svc.start_inspection(equipment_id, true).await.unwrap() {
        StartOutcome::Started(session) => session,
        StartOutcome::NeedsConfirmation { .. } => panic!("confirmed start must not prompt"),
    }
}

/// Answer every question; `pick` may return a defect severity for a
/// question index, otherwise the acceptable choice is used.
fn run(
    svc: &ChariotService,
    session: &mut InspectionSession,
    pick: impl Fn(usize, &InspectionQuestion) -> Option<Severity>,
) {
    let mut index = 0;
    while let Some(question) = session.current_question().cloned() {
        let choice = match pick(index, &question) {
            Some(severity) => question
                .choices
                .iter()
                .find(|c| c.severity == Some(severity))
                .unwrap(),
            None => question.acceptable_choice().unwrap(),
        };
        svc.answer(session, &choice.id, Some("seen at start of shift"), None)
            .unwrap();
        index += 1;
    }
}

fn has(question: &InspectionQuestion, severity: Severity) -> bool {
    question.choices.iter().any(|c| c.severity == Some(severity))
}

#[tokio::test]
async fn scenario_a_all_acceptable() {
    let (svc, notifier) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C1-001").await;
    assert_eq!(session.questions().len(), 8);
    assert!(
        session
            .questions()
            .iter()
            .all(|q| q.scope.applies_to(EquipmentCategory::Tier1))
    );

    run(&svc, &mut session, |_, _| None);
    let done = svc.complete_inspection(session).await.unwrap();

    assert_eq!(done.inspection.status, InspectionStatus::Ok);
    assert_eq!(done.inspection.responses.len(), 8);
    assert!(done.tickets_opened.is_empty());
    assert!(svc.list_tickets(None).await.unwrap().is_empty());
    assert_eq!(notifier.events()[0].0, NotificationLevel::Success);
}

#[tokio::test]
async fn scenario_b_one_minor_defect() {
    let (svc, notifier) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C1-001").await;
    let target = session
        .questions()
        .iter()
        .position(|q| has(q, Severity::Minor))
        .unwrap();

    run(&svc, &mut session, |i, _| (i == target).then_some(Severity::Minor));
    let done = svc.complete_inspection(session).await.unwrap();

    assert_eq!(done.inspection.status, InspectionStatus::Warning);
    assert_eq!(done.tickets_opened.len(), 1);
    let ticket = &done.tickets_opened[0];
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(ticket.severity, Severity::Minor);
    assert_eq!(ticket.inspection_id, done.inspection.id);
    assert!(ticket.defect_description.ends_with(" - seen at start of shift"));
    assert_eq!(
        notifier.events(),
        vec![(
            NotificationLevel::Warning,
            "Minor defects reported: notify a supervisor before use".to_string()
        )]
    );
}

#[tokio::test]
async fn scenario_c_critical_and_minor() {
    let (svc, notifier) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C3-102").await;
    let questions = session.questions().to_vec();
    let critical = questions.iter().position(|q| has(q, Severity::Critical)).unwrap();
    let minor = questions
        .iter()
        .enumerate()
        .position(|(i, q)| i != critical && has(q, Severity::Minor))
        .unwrap();

    run(&svc, &mut session, |i, _| {
        if i == critical {
            Some(Severity::Critical)
        } else if i == minor {
            Some(Severity::Minor)
        } else {
            None
        }
    });
    let done = svc.complete_inspection(session).await.unwrap();

    assert_eq!(done.inspection.status, InspectionStatus::Critical);
    assert_eq!(done.tickets_opened.len(), 2);
    let mut severities: Vec<_> = done.tickets_opened.iter().map(|t| t.severity).collect();
    severities.sort();
    assert_eq!(severities, vec![Severity::Minor, Severity::Critical]);
    assert_eq!(svc.list_tickets(Some(TicketStatus::Pending)).await.unwrap().len(), 2);
    assert_eq!(notifier.events()[0].0, NotificationLevel::Error);
}

#[tokio::test]
async fn scenario_d_duplicate_guard_uses_calendar_day() {
    let (svc, _) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C1-002").await;
    run(&svc, &mut session, |_, _| None);
    let mut inspection = svc.complete_inspection(session).await.unwrap().inspection;

    let tz = FixedOffset::east_opt(3600).unwrap();
    inspection.completed_at = tz
        .with_ymd_and_hms(2026, 3, 2, 9, 0, 0)
        .unwrap()
        .with_timezone(&chrono::Utc);
    let history = [inspection];

    let same_day = tz.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap();
    let next_day = tz.with_ymd_and_hms(2026, 3, 3, 0, 30, 0).unwrap();
    assert!(has_run_today(&history, "C1-002", &same_day));
    assert!(!has_run_today(&history, "C1-002", &next_day));
}

#[tokio::test]
async fn scenario_d_service_prompts_before_second_run() {
    let (svc, _) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C5-201").await;
    run(&svc, &mut session, |_, _| None);
    let first = svc.complete_inspection(session).await.unwrap().inspection;

    let later = first.completed_at.fixed_offset();
    let outcome = svc.start_inspection_at("C5-201", false, later).await.unwrap();
    let StartOutcome::NeedsConfirmation { previous, .. } = outcome else {
        panic!("expected a confirmation prompt");
    };
    assert_eq!(previous.id, first.id);
}

#[tokio::test]
async fn scenario_e_ticket_lifecycle() {
    let (svc, _) = service_over(ChariotDb::in_memory());
    let mut session = start(&svc, "C1-003").await;
    let target = session
        .questions()
        .iter()
        .position(|q| has(q, Severity::Minor))
        .unwrap();
    run(&svc, &mut session, |i, _| (i == target).then_some(Severity::Minor));
    let ticket = svc
        .complete_inspection(session)
        .await
        .unwrap()
        .tickets_opened
        .remove(0);
    assert_eq!(ticket.status, TicketStatus::Pending);

    svc.update_ticket(
        &ticket.id,
        TicketTransition::Start {
            assignee: Some("Alex".into()),
        },
    )
    .await
    .unwrap();
    let done = svc
        .update_ticket(
            &ticket.id,
            TicketTransition::Complete {
                resolution: "replaced fork".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, TicketStatus::Completed);
    assert_eq!(done.assigned_to.as_deref(), Some("Alex"));
    assert_eq!(done.resolution.as_deref(), Some("replaced fork"));
    assert!(done.resolved_by.is_some());
    assert!(done.resolved_at.is_some());

    let err = svc
        .update_ticket(&ticket.id, TicketTransition::Start { assignee: None })
        .await
        .unwrap_err();
    assert!(matches!(err.as_core(), Some(CoreError::InvalidState { .. })));
}

/// Memory store that refuses writes to one key, `failures` times.
struct FailingStore {
    inner: MemoryStore,
    failing_key: &'static str,
    failures: AtomicUsize,
}

impl FailingStore {
    fn always(failing_key: &'static str) -> Arc<Self> {
        Self::times(failing_key, usize::MAX)
    }

    fn times(failing_key: &'static str, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            failing_key,
            failures: AtomicUsize::new(failures),
        })
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, updater: Updater) -> Result<(), DatabaseError> {
        let refused = key == self.failing_key
            && self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
                .is_ok();
        if refused {
            return Err(DatabaseError::Store(format!("disk full writing {key}")));
        }
        self.inner.set(key, updater).await
    }
}

/// Hands out the scripted ids in order, then random ones.
struct ScriptedIds(Mutex<VecDeque<String>>);

impl ScriptedIds {
    fn new(ids: &[&str]) -> Arc<Self> {
        Arc::new(Self(Mutex::new(ids.iter().map(ToString::to_string).collect())))
    }
}

impl IdSource for ScriptedIds {
    fn next_id(&self, prefix: &str) -> String {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| chariot_core::ids::generate_id(prefix))
    }
}

fn first_defect(svc: &ChariotService, session: &mut InspectionSession) {
    run(svc, session, |i, q| {
        (i == 0).then(|| if has(q, Severity::Critical) { Severity::Critical } else { Severity::Minor })
    });
}

#[tokio::test]
async fn failed_ticket_write_rolls_back_inspection() {
    let (svc, notifier) = service_over(ChariotDb::new(FailingStore::always(COLLECTION_TICKETS)));
    let mut session = start(&svc, "C3-101").await;
    first_defect(&svc, &mut session);

    let err = svc.complete_inspection(session).await.unwrap_err();
    assert!(matches!(
        err,
        CompletionError::Unsaved {
            source: DatabaseError::Store(_),
            ..
        }
    ));
    assert!(
        svc.list_inspections(&InspectionFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn unsaved_answers_can_be_saved_again() {
    let (svc, notifier) = service_over(ChariotDb::new(FailingStore::times(COLLECTION_TICKETS, 1)));
    let mut session = start(&svc, "C3-101").await;
    first_defect(&svc, &mut session);
    let answered = session.responses().to_vec();

    let CompletionError::Unsaved { completed, .. } = svc.complete_inspection(session).await.unwrap_err() else {
        panic!("expected the store failure to hand the answers back");
    };
    assert_eq!(completed.responses, answered);

    let done = svc.save_completed(*completed).await.unwrap();
    assert_eq!(done.inspection.responses, answered);
    assert_eq!(done.tickets_opened.len(), 1);
    assert_eq!(
        svc.list_inspections(&InspectionFilter::default()).await.unwrap(),
        vec![done.inspection]
    );
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn clean_run_survives_failing_ticket_store() {
    let (svc, _) = service_over(ChariotDb::new(FailingStore::always(COLLECTION_TICKETS)));
    let mut session = start(&svc, "C3-101").await;
    run(&svc, &mut session, |_, _| None);
    let done = svc.complete_inspection(session).await.unwrap();
    assert_eq!(
        svc.list_inspections(&InspectionFilter::default()).await.unwrap(),
        vec![done.inspection]
    );
}

#[tokio::test]
async fn colliding_ids_are_drawn_again() {
    let (svc, _) = service_over(ChariotDb::in_memory());
    let svc = svc.with_id_source(ScriptedIds::new(&[
        "ins-00000001",
        "mnt-00000001",
        "ins-00000001",
        "ins-00000002",
        "mnt-00000001",
        "mnt-00000002",
    ]));

    let mut first = start(&svc, "C3-101").await;
    first_defect(&svc, &mut first);
    let first = svc.complete_inspection(first).await.unwrap();

    let mut second = start(&svc, "C3-102").await;
    first_defect(&svc, &mut second);
    let second = svc.complete_inspection(second).await.unwrap();

    assert_eq!(first.inspection.id, "ins-00000001");
    assert_eq!(second.inspection.id, "ins-00000002");
    assert_eq!(first.tickets_opened[0].id, "mnt-00000001");
    assert_eq!(second.tickets_opened[0].id, "mnt-00000002");
    assert_eq!(svc.ticket_counts().await.unwrap().total, 2);
}

/// Always returns the same id.
struct StuckIds;

impl IdSource for StuckIds {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-00000001")
    }
}

#[tokio::test]
async fn exhausted_ids_fail_without_overwriting() {
    let (svc, notifier) = service_over(ChariotDb::in_memory());
    let svc = svc.with_id_source(Arc::new(StuckIds));

    let mut first = start(&svc, "C1-001").await;
    run(&svc, &mut first, |_, _| None);
    let first = svc.complete_inspection(first).await.unwrap();

    let mut second = start(&svc, "C1-002").await;
    run(&svc, &mut second, |_, _| None);
    let err = svc.complete_inspection(second).await.unwrap_err();

    assert!(matches!(
        err,
        CompletionError::Unsaved {
            source: DatabaseError::Store(_),
            ..
        }
    ));
    assert_eq!(
        svc.list_inspections(&InspectionFilter::default()).await.unwrap(),
        vec![first.inspection]
    );
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn file_store_keeps_records_between_services() {
    let dir = tempfile::tempdir().unwrap();
    let ticket: MaintenanceAction = {
        let (svc, _) = service_over(ChariotDb::open_dir(dir.path()).await.unwrap());
        let mut session = start(&svc, "C5-203").await;
        run(&svc, &mut session, |i, q| {
            (i == 0).then(|| if has(q, Severity::Minor) { Severity::Minor } else { Severity::Critical })
        });
        svc.complete_inspection(session)
            .await
            .unwrap()
            .tickets_opened
            .remove(0)
    };

    let (svc, _) = service_over(ChariotDb::open_dir(dir.path()).await.unwrap());
    assert_eq!(svc.get_ticket(&ticket.id).await.unwrap(), ticket);
    assert_eq!(
        svc.get_inspection(&ticket.inspection_id).await.unwrap().equipment_id,
        "C5-203"
    );
    let counts = svc.ticket_counts().await.unwrap();
    assert_eq!(counts.pending, 1);
}

/// Paris around the 2026 autumn clock change: +02:00 until
/// 2026-10-25T01:00Z, +01:00 from then on.
#[derive(Debug, Clone, Copy)]
struct ParisAutumn;

impl ParisAutumn {
    fn change() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 25)
            .unwrap()
            .and_hms_opt(1, 0, 0)
            .unwrap()
    }

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn winter() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }
}

impl TimeZone for ParisAutumn {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        Self
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        let as_summer = *local - Duration::hours(2) < Self::change();
        let as_winter = *local - Duration::hours(1) >= Self::change();
        match (as_summer, as_winter) {
            (true, true) => LocalResult::Ambiguous(Self::summer(), Self::winter()),
            (true, false) => LocalResult::Single(Self::summer()),
            (false, true) => LocalResult::Single(Self::winter()),
            (false, false) => LocalResult::None,
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        if *utc < Self::change() {
            Self::summer()
        } else {
            Self::winter()
        }
    }
}

#[tokio::test]
async fn clock_change_day_counts_the_early_inspection() {
    let db = ChariotDb::in_memory();
    let (svc, _) = service_over(db.clone());
    let equipment = EquipmentCatalog::builtin().unwrap().get("C1-001").unwrap().clone();
    let completed_at = Utc.with_ymd_and_hms(2026, 10, 24, 22, 30, 0).unwrap();
    let early = Inspection::assemble(
        "ins-early001".to_string(),
        equipment,
        "Alex".to_string(),
        Vec::new(),
        completed_at - Duration::minutes(10),
        completed_at,
    );
    db.update::<Inspection, _, _>(COLLECTION_INSPECTIONS, move |all| {
        all.push(early);
        Ok(())
    })
    .await
    .unwrap();

    // 00:30 local on the day the clocks go back; 17:00 is in winter time.
    let afternoon = ParisAutumn.with_ymd_and_hms(2026, 10, 25, 17, 0, 0).unwrap();
    assert!(matches!(
        svc.start_inspection_at("C1-001", false, afternoon).await.unwrap(),
        StartOutcome::NeedsConfirmation { .. }
    ));
    assert_eq!(svc.fleet_summary(afternoon).await.unwrap().inspections_today, 1);

    let next_day = ParisAutumn.with_ymd_and_hms(2026, 10, 26, 0, 30, 0).unwrap();
    assert!(matches!(
        svc.start_inspection_at("C1-001", false, next_day).await.unwrap(),
        StartOutcome::Started(_)
    ));
    assert_eq!(svc.fleet_summary(next_day).await.unwrap().inspections_today, 0);
}
