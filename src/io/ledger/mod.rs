//! Submission ledger: the only shared mutable state of the system.
//!
//! A ledger owns every [`Submission`] and its [`Report`]. The pair is
//! appended in one atomic step, so readers see either both records or
//! neither. Work ids come from the ledger itself and never collide.
//! [`SubmissionLedger::exclusive`] brackets a whole analysis so that
//! processes sharing one ledger file never lose each other's records.

mod file;
mod memory;

pub use file::JsonFileLedger;
pub use memory::InMemoryLedger;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::errors::{PlagiarismError, Result};
use crate::core::records::{AssignmentId, Report, Submission, WorkId};

/// Per-assignment submission count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSummary {
    pub assignment_id: AssignmentId,
    pub submissions: usize,
}

/// Persistent history of analyzed submissions.
pub trait SubmissionLedger: Send + Sync {
    /// Allocate a fresh, never-reused work id.
    fn next_work_id(&self) -> WorkId;

    /// Append a submission together with its report.
    ///
    /// Fails without side effects when the work id is already present or
    /// the report does not belong to the submission.
    fn append(&self, submission: Submission, report: Report) -> Result<()>;

    /// Submissions of one assignment, in append order.
    fn list(&self, assignment_id: &str) -> Result<Vec<Submission>>;

    /// Look up a submission.
    fn get(&self, work_id: &str) -> Result<Option<Submission>>;

    /// Look up the report of a submission.
    fn report(&self, work_id: &str) -> Result<Option<Report>>;

    /// Assignments with at least one submission, in first-seen order.
    fn assignments(&self) -> Result<Vec<AssignmentSummary>>;

    /// Total number of stored submissions.
    fn len(&self) -> Result<usize>;

    /// Whether the ledger is empty.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Run one read-score-append cycle with exclusive access to the ledger.
    ///
    /// Reads and appends made by `cycle` through this ledger see every record
    /// appended before the cycle started, and no other cycle interleaves.
    /// In-process ledgers rely on the caller's own locking. Backends shared
    /// between processes lock and refresh here.
    fn exclusive<T, F>(&self, cycle: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce() -> Result<T>,
    {
        cycle()
    }
}

/// Serializable ledger contents shared by the ledger backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    #[serde(default = "LedgerState::format_version")]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) submissions: IndexMap<WorkId, Submission>,
    #[serde(default)]
    pub(crate) reports: IndexMap<WorkId, Report>,
}

impl LedgerState {
    pub(crate) const fn format_version() -> u32 {
        1
    }

    pub(crate) fn new() -> Self {
        Self {
            version: Self::format_version(),
            ..Self::default()
        }
    }

    pub(crate) fn check_append(&self, submission: &Submission, report: &Report) -> Result<()> {
        if report.work_id != submission.work_id {
            return Err(PlagiarismError::validation_field(
                format!(
                    "report {} belongs to {}, not {}",
                    report.report_id, report.work_id, submission.work_id
                ),
                "work_id",
            ));
        }
        if self.submissions.contains_key(&submission.work_id) {
            return Err(PlagiarismError::validation_field(
                format!("submission {} already recorded", submission.work_id),
                "work_id",
            ));
        }
        Ok(())
    }

    pub(crate) fn insert(&mut self, submission: Submission, report: Report) -> Result<()> {
        self.check_append(&submission, &report)?;
        self.reports.insert(report.work_id.clone(), report);
        self.submissions
            .insert(submission.work_id.clone(), submission);
        Ok(())
    }

    pub(crate) fn remove(&mut self, work_id: &str) {
        self.submissions.shift_remove(work_id);
        self.reports.shift_remove(work_id);
    }

    pub(crate) fn list(&self, assignment_id: &str) -> Vec<Submission> {
        self.submissions
            .values()
            .filter(|s| s.assignment_id == assignment_id)
            .cloned()
            .collect()
    }

    pub(crate) fn assignments(&self) -> Vec<AssignmentSummary> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for submission in self.submissions.values() {
            *counts.entry(submission.assignment_id.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(assignment_id, submissions)| AssignmentSummary {
                assignment_id: assignment_id.to_string(),
                submissions,
            })
            .collect()
    }
}
