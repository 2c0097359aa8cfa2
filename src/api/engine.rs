//! Plagiarism analysis engine.
//!
//! The engine wires the content store, the fingerprinting core and the
//! submission ledger together. Each analysis reads the assignment's history,
//! scores against it and appends the new record as one unit, serialized per
//! assignment and inside the ledger's exclusive cycle. With an in-memory
//! ledger, analyses of different assignments do not block each other.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::api::results::{
    require_id, AnalysisRequest, HealthCheck, HealthCheckStatus, HealthStatus, SubmissionReceipt,
};
use crate::core::config::PlagiscanConfig;
use crate::core::errors::{PlagiarismError, Result};
use crate::core::records::{AssignmentId, Report, Submission, SubmissionSummary};
use crate::detectors::fingerprint::ShingleGenerator;
use crate::detectors::similarity::SimilarityMatcher;
use crate::io::content_store::{ContentStore, FsContentStore, StoredFile};
use crate::io::ledger::{JsonFileLedger, SubmissionLedger};

/// Engine backed by the on-disk store and ledger under `storage.data_dir`.
pub type LocalEngine = PlagiarismEngine<FsContentStore, JsonFileLedger>;

/// Main plagiarism analysis engine
pub struct PlagiarismEngine<S, L> {
    config: Arc<PlagiscanConfig>,
    store: S,
    ledger: L,
    generator: ShingleGenerator,
    assignment_locks: DashMap<AssignmentId, Arc<Mutex<()>>>,
}

impl LocalEngine {
    /// Open the on-disk store and ledger described by `config`.
    pub fn open(config: PlagiscanConfig) -> Result<Self> {
        config.validate()?;
        let store = FsContentStore::open(&config.storage)?;
        let ledger = JsonFileLedger::open(&config.storage)?;
        Self::new(config, store, ledger)
    }
}

impl<S: ContentStore, L: SubmissionLedger> PlagiarismEngine<S, L> {
    /// Create an engine over explicit collaborators.
    pub fn new(config: PlagiscanConfig, store: S, ledger: L) -> Result<Self> {
        config.validate()?;

        let generator = ShingleGenerator::new(config.fingerprint.shingle_size);
        info!(
            shingle_size = generator.shingle_size(),
            threshold = config.scoring.plagiarism_threshold,
            "Plagiarism engine initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            ledger,
            generator,
            assignment_locks: DashMap::new(),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PlagiscanConfig {
        &self.config
    }

    /// Content store holding uploaded files
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ledger of analyzed submissions and their reports
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Store an upload without analyzing it.
    pub fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        self.store.put(file_name, bytes)
    }

    /// Analyze a stored file against its assignment's history and record it.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<Report> {
        request.validate()?;

        let file = self.store.fetch(&request.file_id)?;
        let fingerprint = self.generator.fingerprint_source(&file.content);

        let lock = self.assignment_lock(&request.assignment_id);
        let guard = lock.lock();

        let outcome = self.ledger.exclusive(|| {
            let history = self.ledger.list(&request.assignment_id)?;
            let work_id = self.ledger.next_work_id();
            debug!(
                work_id = %work_id,
                assignment_id = %request.assignment_id,
                history = history.len(),
                "Scoring submission"
            );

            let report = SimilarityMatcher::new(&self.config.scoring).analyze(
                &work_id,
                &request.assignment_id,
                &fingerprint,
                &file.metrics,
                &history,
            );

            let submission = Submission {
                work_id: work_id.clone(),
                student_id: request.student_id.clone(),
                assignment_id: request.assignment_id.clone(),
                file_id: request.file_id.clone(),
                fingerprint,
                metrics: file.metrics,
                submission_time: Utc::now(),
            };
            self.ledger.append(submission, report.clone())?;
            Ok((work_id, report))
        });

        drop(guard);
        drop(lock);
        self.release_assignment_lock(&request.assignment_id);
        let (work_id, report) = outcome?;

        info!(
            work_id = %work_id,
            assignment_id = %request.assignment_id,
            similarity = report.similarity_score,
            plagiarism = report.is_plagiarism,
            "Submission analyzed"
        );
        Ok(report)
    }

    /// Upload a file and analyze it in one step.
    pub fn submit(
        &self,
        file_name: &str,
        bytes: &[u8],
        student_id: &str,
        assignment_id: &str,
    ) -> Result<SubmissionReceipt> {
        require_id("student_id", student_id)?;
        require_id("assignment_id", assignment_id)?;

        let stored = self.upload(file_name, bytes)?;
        let request = AnalysisRequest::new(stored.file_id, student_id, assignment_id);
        let report = self.analyze(&request)?;

        Ok(SubmissionReceipt {
            work_id: report.work_id.clone(),
            file_id: request.file_id,
            student_id: request.student_id,
            assignment_id: request.assignment_id,
            report,
        })
    }

    /// Report of a recorded submission.
    pub fn report(&self, work_id: &str) -> Result<Report> {
        self.ledger
            .report(work_id)?
            .ok_or_else(|| PlagiarismError::not_found("report", work_id))
    }

    /// Listing of an assignment's submissions, in submission order.
    pub fn submissions(&self, assignment_id: &str) -> Result<Vec<SubmissionSummary>> {
        self.ledger
            .list(assignment_id)?
            .iter()
            .map(|submission| {
                let report = self.ledger.report(&submission.work_id)?;
                Ok(SubmissionSummary::new(submission, report.as_ref()))
            })
            .collect()
    }

    /// Check configuration, store and ledger.
    pub fn health(&self) -> HealthStatus {
        let mut checks = Vec::new();

        checks.push(match self.config.validate() {
            Ok(()) => HealthCheck::passed("configuration", None),
            Err(e) => HealthCheck::failed("configuration", &e),
        });

        checks.push(match self.store.ping() {
            Ok(()) => HealthCheck::passed("content store", None),
            Err(e) => HealthCheck::failed("content store", &e),
        });

        let (submissions, assignments) = match (self.ledger.len(), self.ledger.assignments()) {
            (Ok(submissions), Ok(assignments)) => {
                checks.push(HealthCheck::passed(
                    "ledger",
                    Some(format!(
                        "{submissions} submissions across {} assignments",
                        assignments.len()
                    )),
                ));
                (submissions, assignments.len())
            }
            (Err(e), _) | (_, Err(e)) => {
                checks.push(HealthCheck::failed("ledger", &e));
                (0, 0)
            }
        };

        HealthStatus {
            healthy: checks
                .iter()
                .all(|check| check.status == HealthCheckStatus::Passed),
            checks,
            submissions,
            assignments,
            timestamp: Utc::now(),
        }
    }

    fn assignment_lock(&self, assignment_id: &str) -> Arc<Mutex<()>> {
        self.assignment_locks
            .entry(assignment_id.to_string())
            .or_default()
            .clone()
    }

    // Drop the entry once no analysis of the assignment holds or awaits it.
    fn release_assignment_lock(&self, assignment_id: &str) {
        self.assignment_locks
            .remove_if(assignment_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
