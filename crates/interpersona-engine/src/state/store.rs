use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use interpersona_core::errors::StoreError;
use interpersona_core::state::{PersistedReport, ReportKey};
use interpersona_core::traits::{ReportStore, SaveOutcome};
use tracing::debug;

use super::atomic::{atomic_write, AdvisoryLock};

/// One JSON file per report key under a directory.
#[derive(Debug, Clone)]
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &ReportKey) -> PathBuf {
        self.dir.join(format!("{}.report.json", key.cache_id()))
    }
}

fn io_err(e: anyhow::Error) -> StoreError {
    StoreError::Io(format!("{e:#}"))
}

impl ReportStore for FileReportStore {
    fn load(&self, key: &ReportKey) -> Result<Option<PersistedReport>, StoreError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(format!("{}: {e}", path.display()))),
        };
        let report: PersistedReport = serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        if report.key != *key {
            return Err(StoreError::Corrupt(format!(
                "{}: stored under a different key",
                path.display()
            )));
        }
        Ok(Some(report))
    }

    /// Write once per key. An existing file, or a lock held by a concurrent
    /// writer, leaves the store untouched.
    fn save(&self, report: &PersistedReport) -> Result<SaveOutcome, StoreError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::Io(format!("{}: {e}", self.dir.display())))?;
        let path = self.path_for(&report.key);
        if path.exists() {
            return Ok(SaveOutcome::AlreadyExists);
        }

        let Some(lock) = AdvisoryLock::try_acquire(&path).map_err(io_err)? else {
            debug!(path = %path.display(), "report lock held elsewhere");
            return Ok(SaveOutcome::Contended);
        };
        // the previous holder may have finished between the check and the lock
        if path.exists() {
            lock.release().map_err(io_err)?;
            return Ok(SaveOutcome::AlreadyExists);
        }

        let json = serde_json::to_vec_pretty(report)
            .map_err(|e| StoreError::Io(format!("cannot serialize report: {e}")))?;
        atomic_write(&path, &json).map_err(io_err)?;
        lock.release().map_err(io_err)?;
        debug!(path = %path.display(), "report written");
        Ok(SaveOutcome::Written)
    }
}

/// Process-local store, for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<ReportKey, PersistedReport>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Io("report store mutex poisoned".to_string())
}

impl ReportStore for MemoryReportStore {
    fn load(&self, key: &ReportKey) -> Result<Option<PersistedReport>, StoreError> {
        Ok(self.reports.lock().map_err(poisoned)?.get(key).cloned())
    }

    fn save(&self, report: &PersistedReport) -> Result<SaveOutcome, StoreError> {
        let mut reports = self.reports.lock().map_err(poisoned)?;
        if reports.contains_key(&report.key) {
            return Ok(SaveOutcome::AlreadyExists);
        }
        reports.insert(report.key.clone(), report.clone());
        Ok(SaveOutcome::Written)
    }
}
