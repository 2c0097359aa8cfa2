//! Best-match search across an assignment's submission history.
//!
//! Every eligible historical submission (same assignment, not the new
//! submission itself) is scored once. The strictly greatest combined score
//! wins; on ties the candidate seen first in the provided history keeps the
//! match. The search starts from a best score of 0.0, so a candidate only
//! becomes the match when it scores above zero.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::debug;

use super::{jaccard_similarity, round_score, structural_similarity};
use crate::core::config::ScoringConfig;
use crate::core::records::{Metrics, Report, Submission, WorkId};
use crate::detectors::fingerprint::Fingerprint;

/// Scores for one (new, historical) submission pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairScore {
    /// Rounded Jaccard similarity of the fingerprints
    pub jaccard: f64,
    /// Rounded structural similarity of the metrics
    pub structural: f64,
    /// Weighted blend of the two, unrounded
    pub combined: f64,
}

/// Score one pair of fingerprints and metrics.
pub fn score_pair(
    config: &ScoringConfig,
    fingerprint: &Fingerprint,
    metrics: &Metrics,
    other_fingerprint: &Fingerprint,
    other_metrics: &Metrics,
) -> PairScore {
    let jaccard = jaccard_similarity(fingerprint, other_fingerprint);
    let structural = structural_similarity(metrics, other_metrics);

    PairScore {
        jaccard,
        structural,
        combined: jaccard * config.jaccard_weight + structural * config.structural_weight,
    }
}

/// Plagiarism classification; a score equal to the threshold is not flagged.
pub fn classify(score: f64, threshold: f64) -> bool {
    score > threshold
}

/// Result of the best-match search, before it becomes a [`Report`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    /// Best combined score, unrounded (0.0 without a match)
    pub similarity_score: f64,
    /// Jaccard similarity against the match
    pub jaccard_similarity: f64,
    /// Structural similarity against the match
    pub structural_similarity: f64,
    /// Winning historical submission
    pub matched_work_id: Option<WorkId>,
    /// Shingles shared with the winning submission
    pub matched_shingle_count: usize,
    /// Number of historical submissions that were scored
    pub candidates_scored: usize,
}

impl MatchOutcome {
    fn unmatched(candidates_scored: usize) -> Self {
        Self {
            similarity_score: 0.0,
            jaccard_similarity: 0.0,
            structural_similarity: 0.0,
            matched_work_id: None,
            matched_shingle_count: 0,
            candidates_scored,
        }
    }

    /// Turn the outcome into the immutable report for `work_id`.
    pub fn into_report(
        self,
        work_id: &str,
        threshold: f64,
        analysis_time: DateTime<Utc>,
    ) -> Report {
        Report {
            report_id: Report::id_for(work_id),
            work_id: work_id.to_string(),
            is_plagiarism: classify(self.similarity_score, threshold),
            similarity_score: round_score(self.similarity_score),
            jaccard_similarity: round_score(self.jaccard_similarity),
            structural_similarity: round_score(self.structural_similarity),
            matched_work_id: self.matched_work_id,
            matched_shingle_count: self.matched_shingle_count,
            analysis_time,
        }
    }
}

/// Linear best-match search over a submission history.
pub struct SimilarityMatcher<'a> {
    config: &'a ScoringConfig,
}

impl<'a> SimilarityMatcher<'a> {
    /// Create a matcher using the given scoring configuration.
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self { config }
    }

    /// Find the best match for a new submission.
    ///
    /// `history` may contain submissions of other assignments and the new
    /// submission itself; both are skipped.
    pub fn find_best_match(
        &self,
        work_id: &str,
        assignment_id: &str,
        fingerprint: &Fingerprint,
        metrics: &Metrics,
        history: &[Submission],
    ) -> MatchOutcome {
        let eligible: Vec<&Submission> = history
            .iter()
            .filter(|prev| prev.assignment_id == assignment_id && prev.work_id != work_id)
            .collect();

        let score = |prev: &&Submission| {
            score_pair(
                self.config,
                fingerprint,
                metrics,
                &prev.fingerprint,
                &prev.metrics,
            )
        };

        // Collecting keeps history order, so the sequential pick below stays first-seen.
        let scores: Vec<PairScore> = if eligible.len() >= self.config.parallel_threshold {
            eligible.par_iter().map(score).collect()
        } else {
            eligible.iter().map(score).collect()
        };

        let mut best_score = 0.0;
        let mut best: Option<(usize, PairScore)> = None;
        for (index, pair) in scores.iter().enumerate() {
            if pair.combined > best_score {
                best_score = pair.combined;
                best = Some((index, *pair));
            }
        }

        let Some((index, pair)) = best else {
            debug!(
                work_id,
                assignment_id,
                candidates = eligible.len(),
                "No prior submission scored above zero"
            );
            return MatchOutcome::unmatched(eligible.len());
        };

        let matched = eligible[index];
        let matched_shingle_count = fingerprint.intersection_count(&matched.fingerprint);

        debug!(
            work_id,
            assignment_id,
            matched_work_id = %matched.work_id,
            combined = pair.combined,
            candidates = eligible.len(),
            "Best match selected"
        );

        MatchOutcome {
            similarity_score: pair.combined,
            jaccard_similarity: pair.jaccard,
            structural_similarity: pair.structural,
            matched_work_id: Some(matched.work_id.clone()),
            matched_shingle_count,
            candidates_scored: eligible.len(),
        }
    }

    /// Run the best-match search and assemble the report in one step.
    pub fn analyze(
        &self,
        work_id: &str,
        assignment_id: &str,
        fingerprint: &Fingerprint,
        metrics: &Metrics,
        history: &[Submission],
    ) -> Report {
        self.find_best_match(work_id, assignment_id, fingerprint, metrics, history)
            .into_report(work_id, self.config.plagiarism_threshold, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(items: &[&str]) -> Fingerprint {
        items.iter().copied().collect()
    }

    fn metrics(file_size: u64, code_lines: usize) -> Metrics {
        Metrics {
            file_size,
            code_lines,
            ..Metrics::default()
        }
    }

    fn submission(
        work_id: &str,
        assignment_id: &str,
        fingerprint: Fingerprint,
        m: Metrics,
    ) -> Submission {
        Submission {
            work_id: work_id.to_string(),
            student_id: format!("student-{work_id}"),
            assignment_id: assignment_id.to_string(),
            file_id: format!("file-{work_id}"),
            fingerprint,
            metrics: m,
            submission_time: Utc::now(),
        }
    }

    #[test]
    fn test_classification_threshold_is_strict() {
        assert!(!classify(0.65, 0.65));
        assert!(classify(0.6501, 0.65));
        assert!(!classify(0.0, 0.65));
    }

    #[test]
    fn test_no_history_means_no_match() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let report = matcher.analyze("work_1", "hw1", &fp(&["a b c d e"]), &metrics(10, 1), &[]);

        assert_eq!(report.matched_work_id, None);
        assert_eq!(report.similarity_score, 0.0);
        assert_eq!(report.matched_shingle_count, 0);
        assert!(!report.is_plagiarism);
    }

    #[test]
    fn test_identical_resubmission_is_flagged() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let history = vec![submission("work_1", "hw1", fp(&["a b c d e"]), metrics(10, 1))];

        let report = matcher.analyze(
            "work_2",
            "hw1",
            &fp(&["a b c d e"]),
            &metrics(10, 1),
            &history,
        );

        assert_eq!(report.jaccard_similarity, 1.0);
        assert_eq!(report.structural_similarity, 1.0);
        assert_eq!(report.similarity_score, 1.0);
        assert!(report.is_plagiarism);
        assert_eq!(report.matched_work_id.as_deref(), Some("work_1"));
        assert_eq!(report.matched_shingle_count, 1);
        assert_eq!(report.report_id, "report_work_2");
    }

    #[test]
    fn test_skips_self_and_other_assignments() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let same = fp(&["same"]);
        let history = vec![
            submission("work_1", "hw2", same.clone(), metrics(10, 1)),
            submission("work_2", "hw1", same.clone(), metrics(10, 1)),
        ];

        let outcome = matcher.find_best_match("work_2", "hw1", &same, &metrics(10, 1), &history);
        assert_eq!(outcome.matched_work_id, None);
        assert_eq!(outcome.candidates_scored, 0);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let shared = fp(&["x y", "y z"]);
        let history = vec![
            submission("work_a", "hw1", shared.clone(), metrics(100, 10)),
            submission("work_b", "hw1", shared.clone(), metrics(100, 10)),
        ];

        let outcome = matcher.find_best_match(
            "work_new",
            "hw1",
            &shared,
            &metrics(100, 10),
            &history,
        );
        assert_eq!(outcome.matched_work_id.as_deref(), Some("work_a"));
    }

    #[test]
    fn test_strictly_better_later_candidate_wins() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let new_fp = fp(&["a", "b", "c", "d"]);
        let history = vec![
            submission("work_1", "hw1", fp(&["a", "q"]), metrics(100, 10)),
            submission("work_2", "hw1", fp(&["a", "b", "c"]), metrics(100, 10)),
            submission("work_3", "hw1", fp(&["a", "b"]), metrics(100, 10)),
        ];

        let outcome = matcher.find_best_match(
            "work_4",
            "hw1",
            &new_fp,
            &metrics(100, 10),
            &history,
        );
        assert_eq!(outcome.matched_work_id.as_deref(), Some("work_2"));
        assert_eq!(outcome.matched_shingle_count, 3);
        assert_eq!(outcome.jaccard_similarity, 0.75);
        assert_eq!(outcome.candidates_scored, 3);
    }

    #[test]
    fn test_disjoint_content_driven_by_structure_only() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let history = vec![submission("work_1", "hw1", fp(&["p q r s t"]), metrics(1000, 50))];

        let report = matcher.analyze(
            "work_2",
            "hw1",
            &fp(&["a b c d e"]),
            &metrics(500, 25),
            &history,
        );

        assert_eq!(report.jaccard_similarity, 0.0);
        assert_eq!(report.structural_similarity, 0.5);
        assert_eq!(report.similarity_score, 0.1);
        assert!(!report.is_plagiarism);
    }

    #[test]
    fn test_zero_scores_never_match() {
        let config = ScoringConfig::default();
        let matcher = SimilarityMatcher::new(&config);
        let history = vec![submission("work_1", "hw1", fp(&["p"]), metrics(0, 0))];

        let outcome = matcher.find_best_match(
            "work_2",
            "hw1",
            &fp(&["a"]),
            &metrics(800, 30),
            &history,
        );
        assert_eq!(outcome.matched_work_id, None);
        assert_eq!(outcome.candidates_scored, 1);
    }

    #[test]
    fn test_parallel_scoring_keeps_first_seen_order() {
        let config = ScoringConfig {
            parallel_threshold: 1,
            ..ScoringConfig::default()
        };
        let matcher = SimilarityMatcher::new(&config);
        let shared = fp(&["k1", "k2", "k3"]);
        let history: Vec<Submission> = (0..64)
            .map(|i| submission(&format!("work_{i}"), "hw1", shared.clone(), metrics(64, 8)))
            .collect();

        let outcome = matcher.find_best_match(
            "work_new",
            "hw1",
            &shared,
            &metrics(64, 8),
            &history,
        );
        assert_eq!(outcome.matched_work_id.as_deref(), Some("work_0"));
        assert_eq!(outcome.candidates_scored, 64);
    }

    #[test]
    fn test_tied_jaccard_rounds_to_even_before_blending() {
        // 21 shared shingles out of 32 distinct: J is exactly 0.65625.
        let shared: Vec<String> = (0..21).map(|i| format!("s{i}")).collect();
        let new_fp: Fingerprint = shared
            .iter()
            .cloned()
            .chain((0..5).map(|i| format!("a{i}")))
            .collect();
        let old_fp: Fingerprint = shared
            .iter()
            .cloned()
            .chain((0..6).map(|i| format!("b{i}")))
            .collect();
        assert_eq!(new_fp.len(), 26);
        assert_eq!(old_fp.len(), 27);

        let config = ScoringConfig::default();
        let history = vec![submission("work_1", "hw1", old_fp, metrics(100, 4))];
        let report = SimilarityMatcher::new(&config).analyze(
            "work_2",
            "hw1",
            &new_fp,
            &metrics(100, 1),
            &history,
        );

        assert_eq!(report.jaccard_similarity, 0.6562);
        assert_eq!(report.structural_similarity, 0.625);
        assert_eq!(report.similarity_score, 0.65);
        assert!(!report.is_plagiarism);
        assert_eq!(report.matched_work_id.as_deref(), Some("work_1"));
        assert_eq!(report.matched_shingle_count, 21);
    }

    #[test]
    fn test_custom_weights_change_combined_score() {
        let config = ScoringConfig {
            jaccard_weight: 0.5,
            structural_weight: 0.5,
            ..ScoringConfig::default()
        };
        let pair = score_pair(
            &config,
            &fp(&["a", "b"]),
            &metrics(100, 10),
            &fp(&["a", "c"]),
            &metrics(100, 10),
        );
        assert_eq!(pair.jaccard, 0.3333);
        assert_eq!(pair.structural, 1.0);
        approx::assert_relative_eq!(pair.combined, 0.666_65, epsilon = 1e-9);
    }
}
