//! Structural similarity from coarse size metrics.

use super::round_score;
use crate::core::records::Metrics;

/// Mean of the file-size and code-line similarities, rounded.
///
/// Each component is `1 - |v1 - v2| / max(v1, v2, 1)`.
pub fn structural_similarity(m1: &Metrics, m2: &Metrics) -> f64 {
    let size = component_similarity(m1.file_size as f64, m2.file_size as f64);
    let lines = component_similarity(m1.code_lines as f64, m2.code_lines as f64);

    round_score((size + lines) / 2.0)
}

fn component_similarity(v1: f64, v2: f64) -> f64 {
    let denominator = v1.max(v2).max(1.0);
    1.0 - (v1 - v2).abs() / denominator
}
