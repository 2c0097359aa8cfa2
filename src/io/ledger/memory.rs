//! In-process submission ledger.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::{AssignmentSummary, LedgerState, SubmissionLedger};
use crate::core::errors::Result;
use crate::core::records::{Report, Submission, WorkId};

/// Ledger kept entirely in memory.
///
/// Work ids are `work_<n>` from an atomic counter starting at 1.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    next_id: AtomicU64,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl SubmissionLedger for InMemoryLedger {
    fn next_work_id(&self) -> WorkId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        format!("work_{n}")
    }

    fn append(&self, submission: Submission, report: Report) -> Result<()> {
        self.state.write().insert(submission, report)
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
}
