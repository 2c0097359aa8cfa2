//! Shingle creation from normalized text.
//!
//! A shingle is a window of exactly `k` consecutive whitespace-separated
//! tokens joined with single spaces. Texts with fewer than `k` tokens get a
//! single-element fingerprint holding the whole normalized string so that no
//! submission ever ends up with an empty fingerprint.

use tracing::debug;

use super::normalize::{normalize_code, tokens};
use super::Fingerprint;

/// Shingle generator for creating k-token fingerprints from source code.
#[derive(Debug, Clone, Copy)]
pub struct ShingleGenerator {
    /// Shingle size (number of tokens per shingle)
    shingle_size: usize,
}

impl Default for ShingleGenerator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl ShingleGenerator {
    /// Create a new shingle generator with the given shingle size.
    ///
    /// A size of zero is treated as one.
    pub fn new(shingle_size: usize) -> Self {
        Self {
            shingle_size: shingle_size.max(1),
        }
    }

    /// Tokens per shingle.
    pub fn shingle_size(&self) -> usize {
        self.shingle_size
    }

    /// Fingerprint already-normalized text.
    pub fn shingles(&self, normalized: &str) -> Fingerprint {
        shingles(normalized, self.shingle_size)
    }

    /// Normalize raw source code and fingerprint the result.
    pub fn fingerprint_source(&self, source_code: &str) -> Fingerprint {
        let normalized = normalize_code(source_code);
        let fingerprint = self.shingles(&normalized);
        debug!(
            tokens = count_tokens(&normalized),
            shingles = fingerprint.len(),
            "Fingerprinted source"
        );
        fingerprint
    }
}

/// Build the distinct k-token shingle set of `normalized`.
pub fn shingles(normalized: &str, k: usize) -> Fingerprint {
    let k = k.max(1);
    let tokens: Vec<&str> = tokens(normalized).collect();

    if tokens.len() < k {
        return Fingerprint::from_iter([normalized.to_string()]);
    }

    tokens.windows(k).map(|window| window.join(" ")).collect()
}

/// Count whitespace-separated tokens.
pub fn count_tokens(text: &str) -> usize {
    tokens(text).count()
}
