//! End-to-end engine behaviour over in-memory collaborators.

use std::sync::Arc;
use std::thread;

use approx::assert_abs_diff_eq;
use plagiscan::{
    AnalysisRequest, ErrorKind, InMemoryContentStore, InMemoryLedger, PlagiarismEngine,
    PlagiscanConfig, SubmissionLedger,
};

type MemoryEngine = PlagiarismEngine<InMemoryContentStore, InMemoryLedger>;

fn engine_with(config: PlagiscanConfig, max_upload: u64) -> MemoryEngine {
    PlagiarismEngine::new(
        config,
        InMemoryContentStore::new(max_upload),
        InMemoryLedger::new(),
    )
    .unwrap()
}

fn engine() -> MemoryEngine {
    engine_with(PlagiscanConfig::default(), 1024 * 1024)
}

const SOLUTION: &str = r#"
# Compute the n-th fibonacci number
def fib(n):
    a, b = 0, 1
    for _ in range(n):
        a, b = b, a + b  # advance
    return a

print(fib(10))
"#;

#[test]
fn identical_resubmission_is_flagged() {
    let engine = engine();
    let first = engine.submit("a.txt", b"A B C D E", "alice", "hw1").unwrap();
    let second = engine.submit("b.txt", b"a  b\nc d e", "bob", "hw1").unwrap();

    // Same single shingle; the byte sizes differ so compare structure separately.
    let report = &second.report;
    assert_eq!(report.jaccard_similarity, 1.0);
    assert_eq!(report.matched_work_id.as_deref(), Some(first.work_id.as_str()));
    assert_eq!(report.matched_shingle_count, 1);
    assert!(report.is_plagiarism);

    let third = engine.submit("c.txt", b"A B C D E", "carol", "hw1").unwrap();
    assert_eq!(third.report.structural_similarity, 1.0);
    assert_eq!(third.report.similarity_score, 1.0);
    assert_eq!(third.report.matched_work_id.as_deref(), Some(first.work_id.as_str()));
}

#[test]
fn first_submission_has_no_match() {
    let engine = engine();
    let receipt = engine.submit("fib.py", SOLUTION.as_bytes(), "alice", "hw1").unwrap();

    assert_eq!(receipt.report.similarity_score, 0.0);
    assert!(!receipt.report.is_plagiarism);
    assert!(receipt.report.matched_work_id.is_none());
    assert_eq!(receipt.report.matched_shingle_count, 0);
}

#[test]
fn assignments_are_isolated() {
    let engine = engine();
    engine.submit("fib.py", SOLUTION.as_bytes(), "alice", "hw1").unwrap();
    let other = engine.submit("fib.py", SOLUTION.as_bytes(), "bob", "hw2").unwrap();

    assert!(other.report.matched_work_id.is_none());
    assert!(!other.report.is_plagiarism);
}

#[test]
fn disjoint_content_scores_on_structure_only() {
    let engine = engine();
    engine
        .submit("short.py", b"alpha beta gamma delta epsilon", "alice", "hw1")
        .unwrap();

    let long: String = (0..100).map(|i| format!("value_{i} = compute({i})\n")).collect();
    let receipt = engine.submit("long.py", long.as_bytes(), "bob", "hw1").unwrap();
    let report = receipt.report;

    assert_eq!(report.jaccard_similarity, 0.0);
    assert!(report.structural_similarity < 0.1);
    assert_abs_diff_eq!(
        report.similarity_score,
        0.2 * report.structural_similarity,
        epsilon = 1e-4
    );
    assert!(!report.is_plagiarism);
}

#[test]
fn comments_and_formatting_do_not_hide_copies() {
    let engine = engine();
    let original = engine.submit("orig.py", SOLUTION.as_bytes(), "alice", "hw1").unwrap();

    let disguised = SOLUTION
        .replace("# Compute the n-th fibonacci number", "# my own work, promise")
        .replace("# advance", "")
        .replace("    ", "\t");
    let copy = engine.submit("copy.py", disguised.as_bytes(), "bob", "hw1").unwrap();

    assert_eq!(copy.report.jaccard_similarity, 1.0);
    assert!(copy.report.is_plagiarism);
    assert_eq!(copy.report.matched_work_id, Some(original.work_id));
}

#[test]
fn carriage_return_line_endings_do_not_hide_copies() {
    let engine = engine();
    let original = engine.submit("orig.py", SOLUTION.as_bytes(), "alice", "hw1").unwrap();

    let cr_only = SOLUTION.replace('\n', "\r");
    let copy = engine.submit("copy.py", cr_only.as_bytes(), "bob", "hw1").unwrap();

    assert_eq!(copy.report.jaccard_similarity, 1.0);
    assert!(copy.report.is_plagiarism);
    assert_eq!(copy.report.matched_work_id, Some(original.work_id));
}

#[test]
fn analyze_reuses_uploaded_file() {
    let engine = engine();
    let stored = engine.upload("fib.py", SOLUTION.as_bytes()).unwrap();
    assert_eq!(stored.metrics.comment_lines, 1);

    let first = engine
        .analyze(&AnalysisRequest::new(stored.file_id.clone(), "alice", "hw1"))
        .unwrap();
    let second = engine
        .analyze(&AnalysisRequest::new(stored.file_id, "alice", "hw1"))
        .unwrap();

    assert!(first.matched_work_id.is_none());
    assert_eq!(second.matched_work_id, Some(first.work_id));
    assert_eq!(engine.ledger().len().unwrap(), 2);
}

#[test]
fn unknown_ids_are_not_found() {
    let engine = engine();
    let err = engine
        .analyze(&AnalysisRequest::new("no-such-file", "alice", "hw1"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = engine.report("work_42").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn invalid_uploads_are_rejected_before_analysis() {
    let engine = engine_with(PlagiscanConfig::default(), 16);

    let err = engine
        .submit("big.py", &[b'x'; 17], "alice", "hw1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let err = engine
        .submit("bin.dat", &[0xff, 0xfe, 0x00], "alice", "hw1")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert!(engine.store().is_empty());
    assert!(engine.ledger().is_empty().unwrap());
}

#[test]
fn custom_threshold_changes_classification() {
    let mut config = PlagiscanConfig::default();
    config.scoring.plagiarism_threshold = 0.05;
    let engine = engine_with(config, 1024 * 1024);

    engine
        .submit("a.py", b"alpha beta gamma delta epsilon", "alice", "hw1")
        .unwrap();
    let receipt = engine
        .submit("b.py", b"zeta eta theta iota kappa", "bob", "hw1")
        .unwrap();

    // Disjoint shingles, near-identical sizes: 0.2 * S is above 0.05.
    assert_eq!(receipt.report.jaccard_similarity, 0.0);
    assert!(receipt.report.similarity_score > 0.05);
    assert!(receipt.report.is_plagiarism);
}

#[test]
fn concurrent_identical_submissions_see_each_other() {
    let engine = Arc::new(engine());
    let workers = 8;

    let reports: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|i| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    engine
                        .submit("fib.py", SOLUTION.as_bytes(), &format!("student{i}"), "hw1")
                        .unwrap()
                        .report
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unmatched = reports.iter().filter(|r| r.matched_work_id.is_none()).count();
    assert_eq!(unmatched, 1, "exactly one submission came first");
    assert_eq!(
        reports.iter().filter(|r| r.is_plagiarism).count(),
        workers - 1
    );
    assert_eq!(engine.ledger().len().unwrap(), workers);
}

#[test]
fn concurrent_assignments_do_not_interfere() {
    let engine = Arc::new(engine());

    let reports: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    engine
                        .submit("fib.py", SOLUTION.as_bytes(), "alice", &format!("hw{i}"))
                        .unwrap()
                        .report
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(reports.iter().all(|r| r.matched_work_id.is_none()));
    assert_eq!(engine.ledger().assignments().unwrap().len(), 6);
}

#[test]
fn listing_reflects_reports() {
    let engine = engine();
    engine.submit("a.py", SOLUTION.as_bytes(), "alice", "hw1").unwrap();
    engine.submit("b.py", SOLUTION.as_bytes(), "bob", "hw1").unwrap();

    let listing = engine.submissions("hw1").unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].is_plagiarism, Some(false));
    assert_eq!(listing[1].is_plagiarism, Some(true));
    assert_eq!(listing[1].similarity_score, Some(1.0));
    assert!(listing[0].shingle_count > 0);
}
