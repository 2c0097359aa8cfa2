//! Request and response types of the engine API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::{PlagiarismError, Result};
use crate::core::records::{AssignmentId, FileId, Report, StudentId, WorkId};

/// Request to analyze a previously stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub file_id: FileId,
    pub student_id: StudentId,
    pub assignment_id: AssignmentId,
}

impl AnalysisRequest {
    pub fn new(
        file_id: impl Into<FileId>,
        student_id: impl Into<StudentId>,
        assignment_id: impl Into<AssignmentId>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            student_id: student_id.into(),
            assignment_id: assignment_id.into(),
        }
    }

    /// Reject blank identifiers.
    pub fn validate(&self) -> Result<()> {
        require_id("file_id", &self.file_id)?;
        require_id("student_id", &self.student_id)?;
        require_id("assignment_id", &self.assignment_id)
    }
}

/// Fail with a validation error when `value` is blank.
pub fn require_id(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlagiarismError::validation_field(
            format!("{field} must not be empty"),
            field,
        ));
    }
    Ok(())
}

/// Outcome of an upload-and-analyze submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub work_id: WorkId,
    pub file_id: FileId,
    pub student_id: StudentId,
    pub assignment_id: AssignmentId,
    pub report: Report,
}

/// Result of an engine health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// True when no check failed
    pub healthy: bool,

    /// Individual component checks
    pub checks: Vec<HealthCheck>,

    /// Submissions currently recorded
    pub submissions: usize,

    /// Assignments with at least one submission
    pub assignments: usize,

    pub timestamp: DateTime<Utc>,
}

/// Individual health check result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthCheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    pub(crate) fn passed(name: &str, message: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status: HealthCheckStatus::Passed,
            message,
        }
    }

    pub(crate) fn failed(name: &str, err: &PlagiarismError) -> Self {
        Self {
            name: name.to_string(),
            status: HealthCheckStatus::Failed,
            message: Some(err.to_string()),
        }
    }
}

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckStatus {
    Passed,
    Failed,
}
