//! Submission and report records.
//!
//! Both records are immutable once created. The ledger owns them; the
//! similarity core only reads submissions and produces reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detectors::fingerprint::Fingerprint;

/// Ledger-assigned submission identifier.
pub type WorkId = String;
/// Opaque content store identifier.
pub type FileId = String;
/// Caller-supplied student identifier.
pub type StudentId = String;
/// Caller-supplied assignment identifier; comparisons never cross it.
pub type AssignmentId = String;

/// Size-based structural metrics captured from the content store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Payload size in bytes
    pub file_size: u64,
    /// Number of `\n`-separated lines, blank ones included
    pub total_lines: usize,
    /// Non-blank lines that are not comment lines
    pub code_lines: usize,
    /// Lines starting with a comment marker
    pub comment_lines: usize,
    /// `comment_lines / code_lines`, rounded to 3 places
    pub comment_ratio: f64,
}

/// A single analyzed submission kept as comparison history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub work_id: WorkId,
    pub student_id: StudentId,
    pub assignment_id: AssignmentId,
    pub file_id: FileId,
    /// Shingle set computed at creation
    pub fingerprint: Fingerprint,
    /// Structural snapshot taken at creation
    pub metrics: Metrics,
    pub submission_time: DateTime<Utc>,
}

/// Plagiarism verdict for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub report_id: String,
    pub work_id: WorkId,
    pub is_plagiarism: bool,
    pub similarity_score: f64,
    pub jaccard_similarity: f64,
    pub structural_similarity: f64,
    /// Best-matching earlier submission, absent without comparable history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_work_id: Option<WorkId>,
    pub matched_shingle_count: usize,
    pub analysis_time: DateTime<Utc>,
}

impl Report {
    /// Report id derived from the submission it describes.
    pub fn id_for(work_id: &str) -> String {
        format!("report_{work_id}")
    }
}

/// Lightweight listing row for a stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub work_id: WorkId,
    pub student_id: StudentId,
    pub file_id: FileId,
    pub shingle_count: usize,
    pub submission_time: DateTime<Utc>,
    pub is_plagiarism: Option<bool>,
    pub similarity_score: Option<f64>,
}

impl SubmissionSummary {
    /// Combine a submission with its report, if one is known.
    pub fn new(submission: &Submission, report: Option<&Report>) -> Self {
        Self {
            work_id: submission.work_id.clone(),
            student_id: submission.student_id.clone(),
            file_id: submission.file_id.clone(),
            shingle_count: submission.fingerprint.len(),
            submission_time: submission.submission_time,
            is_plagiarism: report.map(|r| r.is_plagiarism),
            similarity_score: report.map(|r| r.similarity_score),
        }
    }
}
