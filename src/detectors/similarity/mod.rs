//! Pairwise similarity scoring and best-match search.
//!
//! Lexical overlap is measured with Jaccard similarity over shingle sets and
//! blended with a coarse structural similarity over file size and code line
//! counts. All reported scores are rounded to [`SCORE_DECIMALS`] places.

pub mod jaccard;
pub mod matcher;
pub mod structural;

pub use jaccard::jaccard_similarity;
pub use matcher::{classify, score_pair, MatchOutcome, PairScore, SimilarityMatcher};
pub use structural::structural_similarity;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept in every reported score.
pub const SCORE_DECIMALS: u32 = 4;

/// Round `value` to `decimals` places.
///
/// Rounds the exact binary value of `value`, with exact ties going to the
/// even digit. `1.0 / 32.0` becomes `0.0312`, and `2.675` (stored slightly
/// below 2.675) becomes `2.67` at two places. Non-finite input is returned
/// unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    let rounded = exact.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven);
    // Parsing the decimal text yields the double nearest to the rounded value.
    rounded
        .to_string()
        .parse::<f64>()
        .ok()
        .or_else(|| rounded.to_f64())
        .unwrap_or(value)
}

/// Round a score to the reported precision.
pub fn round_score(value: f64) -> f64 {
    round_to(value, SCORE_DECIMALS)
}
