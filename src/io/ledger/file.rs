//! Ledger persisted as a single JSON document.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{AssignmentSummary, LedgerState, SubmissionLedger};
use crate::core::config::StorageConfig;
use crate::core::errors::{PlagiarismError, Result};
use crate::core::records::{Report, Submission, WorkId};

const COLLABORATOR: &str = "ledger";

/// Ledger stored at `<data_dir>/ledger.json`.
///
/// The whole document is rewritten on every append through a temporary file
/// and a rename. A failed write leaves both the file and the in-memory view
/// unchanged.
///
/// Writers take an exclusive lock on `ledger.json.lock` next to the document
/// and reload it before changing anything, so processes sharing a data
/// directory never overwrite each other's records.
/// [`SubmissionLedger::exclusive`] keeps the lock for a whole analysis.
/// Plain reads serve the view from the last load, refresh or append.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    lock_path: PathBuf,
    state: RwLock<LedgerState>,
    writer: ReentrantMutex<RefCell<WriterLock>>,
}

/// Lock file handle of the active writer and its nesting depth.
#[derive(Debug, Default)]
struct WriterLock {
    depth: usize,
    file: Option<File>,
}

/// One level of the writer lock; the outermost level owns the lock file.
struct WriterGuard<'a> {
    gate: ReentrantMutexGuard<'a, RefCell<WriterLock>>,
}

impl Drop for WriterGuard<'_> {
    fn drop(&mut self) {
        let mut held = self.gate.borrow_mut();
        held.depth = held.depth.saturating_sub(1);
        if held.depth == 0 {
            // Closing the handle releases the file lock.
            held.file = None;
        }
    }
}

impl JsonFileLedger {
    /// Open the ledger configured by `config`, creating the data directory.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        Self::at_path(config.ledger_path())
    }

    /// Open a ledger at an explicit path. A missing file is an empty ledger.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                PlagiarismError::io(
                    format!("Failed to create ledger directory {}", parent.display()),
                    e,
                )
            })?;
        }

        let state = load_state(&path)?;
        info!(
            path = %path.display(),
            submissions = state.submissions.len(),
            "Opened submission ledger"
        );

        let mut lock_path = OsString::from(path.as_os_str());
        lock_path.push(".lock");

        Ok(Self {
            path,
            lock_path: PathBuf::from(lock_path),
            state: RwLock::new(state),
            writer: ReentrantMutex::new(RefCell::new(WriterLock::default())),
        })
    }

    /// Location of the ledger document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload the document from disk, replacing the in-memory view.
    pub fn refresh(&self) -> Result<()> {
        let state = load_state(&self.path)?;
        *self.state.write() = state;
        Ok(())
    }

    fn hold(&self) -> Result<WriterGuard<'_>> {
        let gate = self.writer.lock();
        {
            let mut held = gate.borrow_mut();
            if held.depth == 0 {
                let file = lock_file(&self.lock_path)?;
                self.refresh()?;
                held.file = Some(file);
            }
            held.depth += 1;
        }
        Ok(WriterGuard { gate })
    }

    fn persist(&self, state: &LedgerState) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(state)?;
        fs::write(&tmp_path, bytes)
            .and_then(|()| fs::rename(&tmp_path, &self.path))
            .map_err(|e| {
                PlagiarismError::upstream(
                    COLLABORATOR,
                    format!("failed to write {}: {e}", self.path.display()),
                )
            })
    }
}

fn lock_file(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(|e| {
            PlagiarismError::upstream(
                COLLABORATOR,
                format!("cannot open lock file {}: {e}", path.display()),
            )
        })?;

    FileExt::lock_exclusive(&file).map_err(|e| {
        PlagiarismError::upstream(
            COLLABORATOR,
            format!("cannot lock {}: {e}", path.display()),
        )
    })?;
    debug!(path = %path.display(), "Acquired ledger lock");
    Ok(file)
}

fn load_state(path: &Path) -> Result<LedgerState> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(LedgerState::new()),
        Err(e) => {
            return Err(PlagiarismError::upstream(
                COLLABORATOR,
                format!("{} unreadable: {e}", path.display()),
            ))
        }
    };

    let state: LedgerState = serde_json::from_slice(&raw).map_err(|e| {
        PlagiarismError::upstream(
            COLLABORATOR,
            format!("{} is corrupt: {e}", path.display()),
        )
    })?;

    if state.version != LedgerState::format_version() {
        warn!(
            found = state.version,
            expected = LedgerState::format_version(),
            "Ledger format version differs; reading anyway"
        );
    }
    Ok(state)
}

impl SubmissionLedger for JsonFileLedger {
    fn next_work_id(&self) -> WorkId {
        format!("work_{}", Uuid::new_v4().simple())
    }

    fn append(&self, submission: Submission, report: Report) -> Result<()> {
        let _writer = self.hold()?;
        let mut state = self.state.write();
        let work_id = submission.work_id.clone();
        state.insert(submission, report)?;

        if let Err(err) = self.persist(&state) {
            state.remove(&work_id);
            return Err(err);
        }

        debug!(work_id = %work_id, "Persisted ledger entry");
        Ok(())
    }

    fn list(&self, assignment_id: &str) -> Result<Vec<Submission>> {
        Ok(self.state.read().list(assignment_id))
    }

    fn get(&self, work_id: &str) -> Result<Option<Submission>> {
        Ok(self.state.read().submissions.get(work_id).cloned())
    }

    fn report(&self, work_id: &str) -> Result<Option<Report>> {
        Ok(self.state.read().reports.get(work_id).cloned())
    }

    fn assignments(&self) -> Result<Vec<AssignmentSummary>> {
        Ok(self.state.read().assignments())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.state.read().submissions.len())
    }

    fn exclusive<T, F>(&self, cycle: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce() -> Result<T>,
    {
        let _writer = self.hold()?;
        cycle()
    }
}
