//! Service layer orchestrating the inspection workflow.
//!
//! `ChariotService` wraps `ChariotDb` (collections), `TrailWriter` (JSONL
//! change log), the catalogs, and the identity and notification seams. All
//! operations are implemented as `impl ChariotService` blocks in `repos`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chariot_config::ChariotConfig;
use chariot_core::catalog::EquipmentCatalog;
use chariot_core::enums::{EntityType, TrailOp};
use chariot_core::ids::{MAX_ID_ATTEMPTS, fresh_id, generate_id};
use chariot_core::question_bank::QuestionBank;
use chariot_core::trail::TrailOperation;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::ChariotDb;
use crate::error::DatabaseError;
use crate::identity::{EnvIdentity, IdentityProvider, resolve_operator};
use crate::notify::{Notifier, TracingNotifier};
use crate::trail::writer::TrailWriter;

/// Knobs for drawing and presenting questions.
#[derive(Debug, Clone)]
pub struct InspectionSettings {
    pub question_count: usize,
    pub shuffle_choices: bool,
    pub placeholder_operator: String,
}

impl Default for InspectionSettings {
    fn default() -> Self {
        Self {
            question_count: 8,
            shuffle_choices: true,
            placeholder_operator: "Operator".to_string(),
        }
    }
}

impl From<&ChariotConfig> for InspectionSettings {
    fn from(config: &ChariotConfig) -> Self {
        Self {
            question_count: config.inspection.question_count,
            shuffle_choices: config.inspection.shuffle_choices,
            placeholder_operator: config.general.placeholder_operator.clone(),
        }
    }
}

/// Orchestrates inspections and tickets with change log and notifications.
///
/// Every mutation follows this protocol:
/// 1. Take the service write lock
/// 2. Update the store collection(s)
/// 3. Append the change-log operation(s)
/// 4. Release the lock, then log and notify
pub struct ChariotService {
    db: ChariotDb,
    trail: TrailWriter,
    catalog: EquipmentCatalog,
    questions: QuestionBank,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    settings: InspectionSettings,
    ids: Arc<dyn IdSource>,
    rng: Mutex<StdRng>,
    write_lock: Mutex<()>,
}

impl ChariotService {
    /// Assemble a service from parts. Identity comes from the environment
    /// and notifications go to `tracing` until replaced.
    #[must_use]
    pub fn new(
        db: ChariotDb,
        trail: TrailWriter,
        catalog: EquipmentCatalog,
        questions: QuestionBank,
    ) -> Self {
        Self {
            db,
            trail,
            catalog,
            questions,
            identity: Arc::new(EnvIdentity::default()),
            notifier: Arc::new(TracingNotifier),
            settings: InspectionSettings::default(),
            ids: Arc::new(RandomIds),
            rng: Mutex::new(StdRng::from_entropy()),
            write_lock: Mutex::new(()),
        }
    }

    /// Build the file-backed service described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a directory cannot be created or a custom
    /// catalog file cannot be read or fails validation.
    pub async fn from_config(config: &ChariotConfig) -> Result<Self, DatabaseError> {
        let db = ChariotDb::open_dir(&config.store.data_dir).await?;
        let trail = if config.store.trail_enabled {
            TrailWriter::new(config.store.trail_dir.clone())?
        } else {
            TrailWriter::disabled()
        };
        let catalog = match &config.inspection.equipment_file {
            Some(path) => EquipmentCatalog::from_toml_str(&read_catalog_file(path).await?)?,
            None => EquipmentCatalog::builtin()?,
        };
        let questions = match &config.inspection.question_file {
            Some(path) => QuestionBank::from_toml_str(&read_catalog_file(path).await?)?,
            None => QuestionBank::builtin()?,
        };

        let service = Self::new(db, trail, catalog, questions)
            .with_settings(InspectionSettings::from(config));
        Ok(match config.inspection.seed {
            Some(seed) => service.with_seed(seed),
            None => service,
        })
    }

    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: InspectionSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Make question draws and choice shuffles reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    #[must_use]
    pub const fn db(&self) -> &ChariotDb {
        &self.db
    }

    #[must_use]
    pub const fn trail(&self) -> &TrailWriter {
        &self.trail
    }

    #[must_use]
    pub const fn catalog(&self) -> &EquipmentCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn questions(&self) -> &QuestionBank {
        &self.questions
    }

    #[must_use]
    pub const fn settings(&self) -> &InspectionSettings {
        &self.settings
    }

    pub(crate) async fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().await
    }

    pub(crate) async fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Display name of whoever is acting now.
    pub async fn current_operator(&self) -> String {
        resolve_operator(self.identity.as_ref(), &self.settings.placeholder_operator).await
    }

    /// A `prefix` id not in `taken`, which then records it.
    ///
    /// The store has no key constraint, so every stored id is checked here.
    pub(crate) fn unique_id(
        &self,
        prefix: &str,
        taken: &mut HashSet<String>,
    ) -> Result<String, DatabaseError> {
        let id = fresh_id(|| self.ids.next_id(prefix), |id| taken.contains(id)).ok_or_else(|| {
            DatabaseError::Store(format!(
                "no unused {prefix} id after {MAX_ID_ATTEMPTS} attempts"
            ))
        })?;
        taken.insert(id.clone());
        Ok(id)
    }

    /// Append one change-log operation. A failed append is logged and does
    /// not undo the stored change.
    pub(crate) fn record<T: Serialize>(
        &self,
        actor: &str,
        op: TrailOp,
        entity: EntityType,
        id: &str,
        data: &T,
        now: DateTime<Utc>,
    ) {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(%error, %entity, id, "change-log payload not serializable");
                return;
            }
        };
        let entry = TrailOperation {
            v: 1,
            ts: now.to_rfc3339(),
            actor: actor.to_string(),
            op,
            entity,
            id: id.to_string(),
            data,
        };
        if let Err(error) = self.trail.append(&entry) {
            tracing::warn!(%error, %entity, id, "change-log append failed");
        }
    }
}

/// Candidate ids for stored records.
pub trait IdSource: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Random `{prefix}-{8 hex}` ids.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self, prefix: &str) -> String {
        generate_id(prefix)
    }
}

async fn read_catalog_file(path: &Path) -> Result<String, DatabaseError> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        DatabaseError::Other(anyhow::Error::new(e).context(format!("reading {}", path.display())))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn from_config_uses_builtin_catalogs_and_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ChariotConfig::default();
        config.store.data_dir = dir.path().join("data");
        config.store.trail_dir = dir.path().join("trail");
        config.inspection.question_count = 5;

        let svc = ChariotService::from_config(&config).await.unwrap();
        assert_eq!(svc.catalog().all().len(), 10);
        assert_eq!(svc.questions().all().len(), 20);
        assert_eq!(svc.settings().question_count, 5);
        assert!(svc.trail().is_enabled());
        assert!(dir.path().join("data").is_dir());
        assert!(dir.path().join("trail").is_dir());
    }

    #[tokio::test]
    async fn custom_equipment_file_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("yard.toml");
        std::fs::write(
            &file,
            r#"
[[equipment]]
id = "Y-1"
name = "Yard tug"
category = "tier_2"
"#,
        )
        .unwrap();
        let mut config = ChariotConfig::default();
        config.store.data_dir = dir.path().join("data");
        config.store.trail_enabled = false;
        config.inspection.equipment_file = Some(file);

        let svc = ChariotService::from_config(&config).await.unwrap();
        assert_eq!(svc.catalog().all().len(), 1);
        assert!(!svc.trail().is_enabled());
    }

    #[tokio::test]
    async fn missing_question_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ChariotConfig::default();
        config.store.data_dir = dir.path().join("data");
        config.store.trail_enabled = false;
        config.inspection.question_file = Some(PathBuf::from("/nonexistent/questions.toml"));

        let err = ChariotService::from_config(&config).await.err().unwrap();
        assert!(format!("{err:#}").contains("questions.toml"));
    }
}
