//! Shared test utilities for chariot-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chariot_core::catalog::EquipmentCatalog;
    use chariot_core::question_bank::QuestionBank;
    use chariot_core::session::{InspectionSession, SessionState};

    use crate::ChariotDb;
    use crate::identity::StaticIdentity;
    use crate::notify::RecordingNotifier;
    use crate::service::ChariotService;
    use crate::trail::writer::TrailWriter;

    /// In-memory service with trail disabled, operator "Alex" and a fixed seed.
    pub fn test_service() -> ChariotService {
        ChariotService::new(
            ChariotDb::in_memory(),
            TrailWriter::disabled(),
            EquipmentCatalog::builtin().unwrap(),
            QuestionBank::builtin().unwrap(),
        )
        .with_identity(Arc::new(StaticIdentity::named("Alex")))
        .with_seed(7)
    }

    /// Like [`test_service`] but keeping notifications.
    pub fn test_service_with_notifier() -> (ChariotService, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let svc = test_service().with_notifier(notifier.clone());
        (svc, notifier)
    }

    /// Like [`test_service`] but writing the change log to `trail_dir`.
    pub fn test_service_with_trail(trail_dir: std::path::PathBuf) -> ChariotService {
        ChariotService::new(
            ChariotDb::in_memory(),
            TrailWriter::new(trail_dir).unwrap(),
            EquipmentCatalog::builtin().unwrap(),
            QuestionBank::builtin().unwrap(),
        )
        .with_identity(Arc::new(StaticIdentity::named("Alex")))
        .with_seed(7)
    }

    /// Answer every remaining question. Questions whose id is in `defects`
    /// get their first defect choice; the rest get the acceptable one.
    pub fn answer_all(session: &mut InspectionSession, defects: &[&str]) {
        while let Some(question) = session.current_question().cloned() {
            let choice = if defects.contains(&question.id.as_str()) {
                question.choices.iter().find(|c| !c.is_acceptable).unwrap()
            } else {
                question.acceptable_choice().unwrap()
            };
            session
                .answer(&choice.id, None, None, chrono::Utc::now())
                .unwrap();
        }
        assert_eq!(session.state(), &SessionState::Completed);
    }
}
