//! Durable storage for the plan document, plus the export/import codec.

use crate::error::{PlanError, Result};
use crate::plan::Plan;
use crate::seed;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// A single-slot store for the serialized plan document.
pub trait Storage: Send + Sync {
    /// The stored document, or `None` if nothing has been saved yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, data: &str) -> Result<()>;
}

/// The plan document as a file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        crate::io::read_if_exists(&self.path)
    }

    fn write(&self, data: &str) -> Result<()> {
        crate::io::atomic_write(&self.path, data.as_bytes())
    }
}

/// In-process storage, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<Option<String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: impl Into<String>) -> Self {
        Self {
            data: Mutex::new(Some(data.into())),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contents(&self) -> Option<String> {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, data: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PlanError::StorageWriteFailure(
                "memory storage is read-only".to_string(),
            ));
        }
        *self.data.lock().unwrap_or_else(|e| e.into_inner()) = Some(data.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document codec
// ---------------------------------------------------------------------------

/// Serialize the whole plan as a transportable JSON document.
pub fn export_document(plan: &Plan) -> Result<String> {
    Ok(serde_json::to_string_pretty(plan)?)
}

/// Parse and validate a plan document. Nothing is applied here; the caller
/// dispatches `ImportState` with the result.
pub fn import_document(raw: &str) -> Result<Plan> {
    let plan: Plan = serde_json::from_str(raw).map_err(PlanError::MalformedDocument)?;
    plan.validate()?;
    Ok(plan)
}

// ---------------------------------------------------------------------------
// PersistenceGateway
// ---------------------------------------------------------------------------

/// The only writer of durable storage.
#[derive(Clone)]
pub struct PersistenceGateway {
    storage: Arc<dyn Storage>,
}

impl PersistenceGateway {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileStorage::new(path)))
    }

    /// The stored plan, or a fresh copy of the seed when storage is empty,
    /// unreadable, or holds a document that fails to parse or validate.
    pub fn load(&self) -> Plan {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no stored plan, starting from seed");
                return seed::plan();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored plan, starting from seed");
                return seed::plan();
            }
        };
        match import_document(&raw) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(error = %e, "stored plan is unusable, starting from seed");
                seed::plan()
            }
        }
    }

    /// Write `plan` immediately.
    pub fn save(&self, plan: &Plan) -> Result<()> {
        let data = export_document(plan)?;
        self.storage
            .write(&data)
            .map_err(|e| match e {
                PlanError::StorageWriteFailure(_) => e,
                other => PlanError::StorageWriteFailure(other.to_string()),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::store::PlanStore;
    use crate::types::TaskStatus;
    use tempfile::TempDir;

    fn memory(storage: MemoryStorage) -> (Arc<MemoryStorage>, PersistenceGateway) {
        let storage = Arc::new(storage);
        let gateway = PersistenceGateway::new(storage.clone());
        (storage, gateway)
    }

    #[test]
    fn export_import_roundtrip() {
        let mut plan = seed::plan();
        let task = plan.quarters[1].blocks[0].tasks[0].id.clone();
        let t = plan.find_task_mut(&task).unwrap();
        t.set_status(TaskStatus::Completed, chrono::Utc::now());
        t.add_note("done early", chrono::Utc::now());
        t.links.push(serde_json::json!({"url": "https://example.com"}));
        plan.settings.start_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 6);
        plan.meta.extra.insert("owner".to_string(), serde_json::json!("me"));

        let doc = export_document(&plan).unwrap();
        assert_eq!(import_document(&doc).unwrap(), plan);
    }

    #[test]
    fn out_of_range_weeks_survive_export_and_reload() {
        let mut store = PlanStore::new(seed::plan());
        let first = store.plan().quarters[0].blocks[0].tasks[0].id.clone();
        let second = store.plan().quarters[0].blocks[0].tasks[1].id.clone();
        store.dispatch(Command::MoveTask {
            task_id: first.clone(),
            to_week: 60,
        });
        store.dispatch(Command::SetTaskStatus {
            task_id: second.clone(),
            status: TaskStatus::Completed,
        });
        let applied = store.dispatch(Command::DeferTask {
            task_id: second.clone(),
            to_week: 0,
        });
        assert!(applied.changed);
        let plan = applied.plan;
        assert_eq!(plan.find_task(&first).unwrap().due_week, 60);

        let doc = export_document(&plan).unwrap();
        assert_eq!(import_document(&doc).unwrap(), *plan);

        let (_, gateway) = memory(MemoryStorage::new());
        gateway.save(&plan).unwrap();
        let reloaded = gateway.load();
        assert_eq!(reloaded, *plan);
        let task = reloaded.find_task(&second).unwrap();
        assert_eq!(task.status, TaskStatus::Deferred);
        assert_eq!(task.deferred_to_week, Some(0));
        assert!(task.date_completed.is_some());
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(
            import_document("not json"),
            Err(PlanError::MalformedDocument(_))
        ));
    }

    #[test]
    fn import_rejects_unknown_enum_values() {
        let mut value = serde_json::to_value(seed::plan()).unwrap();
        value["quarters"][0]["blocks"][0]["tasks"][0]["status"] = "blocked".into();
        let raw = value.to_string();
        assert!(matches!(
            import_document(&raw),
            Err(PlanError::MalformedDocument(_))
        ));
    }

    #[test]
    fn import_rejects_structural_problems() {
        let mut plan = seed::plan();
        plan.quarters.truncate(3);
        let raw = serde_json::to_string(&plan).unwrap();
        assert!(matches!(
            import_document(&raw),
            Err(PlanError::InvalidDocument(_))
        ));
    }

    #[test]
    fn load_empty_storage_gives_seed() {
        let (_, gateway) = memory(MemoryStorage::new());
        assert_eq!(gateway.load(), seed::plan());
    }

    #[test]
    fn load_corrupt_storage_gives_seed() {
        let (_, gateway) = memory(MemoryStorage::with_contents("{ truncated"));
        assert_eq!(gateway.load(), seed::plan());
    }

    #[test]
    fn save_then_load() {
        let (storage, gateway) = memory(MemoryStorage::new());
        let mut plan = seed::plan();
        plan.meta.goal = Some("Changed".to_string());
        gateway.save(&plan).unwrap();
        assert_eq!(storage.writes(), 1);
        assert_eq!(gateway.load(), plan);
    }

    #[test]
    fn failed_write_is_reported_as_storage_failure() {
        let (storage, gateway) = memory(MemoryStorage::new());
        storage.fail_writes(true);
        assert!(matches!(
            gateway.save(&seed::plan()),
            Err(PlanError::StorageWriteFailure(_))
        ));
        assert!(storage.contents().is_none());
    }

    #[test]
    fn file_storage_roundtrip() {
        let dir = TempDir::new().unwrap();
        let gateway = PersistenceGateway::file(dir.path().join("nested/plan.json"));
        assert_eq!(gateway.load(), seed::plan());

        let mut plan = seed::plan();
        plan.settings.theme = Some("light".to_string());
        gateway.save(&plan).unwrap();
        assert!(dir.path().join("nested/plan.json").exists());
        assert_eq!(gateway.load(), plan);
    }
}
