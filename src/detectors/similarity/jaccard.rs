//! Jaccard similarity over shingle fingerprints.

use super::round_score;
use crate::detectors::fingerprint::Fingerprint;

/// `|A ∩ B| / |A ∪ B|`, rounded to the reported precision.
///
/// Two empty sets are identical (1.0); exactly one empty set shares nothing
/// (0.0).
pub fn jaccard_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    let intersection = a.intersection_count(b);
    let union = a.len() + b.len() - intersection;

    round_score(intersection as f64 / union as f64)
}
