//! Lexical fingerprinting of submissions.
//!
//! This module contains:
//! - Comment stripping and whitespace canonicalization
//! - k-token shingle extraction
//! - The [`Fingerprint`] set shared by the ledger and the similarity detectors

pub mod normalize;
pub mod shingles;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub use normalize::normalize_code;
pub use shingles::{count_tokens, shingles, ShingleGenerator};

/// Set of distinct shingles derived from one normalized text.
///
/// Insertion order (first window occurrence) is kept for stable
/// serialization; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint {
    shingles: IndexSet<String>,
}

impl Fingerprint {
    /// Number of distinct shingles.
    pub fn len(&self) -> usize {
        self.shingles.len()
    }

    /// Whether the fingerprint holds no shingles at all.
    pub fn is_empty(&self) -> bool {
        self.shingles.is_empty()
    }

    /// Whether `shingle` is part of the fingerprint.
    pub fn contains(&self, shingle: &str) -> bool {
        self.shingles.contains(shingle)
    }

    /// Iterate shingles in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.shingles.iter().map(String::as_str)
    }

    /// Number of shingles present in both fingerprints.
    pub fn intersection_count(&self, other: &Self) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .shingles
            .iter()
            .filter(|shingle| large.shingles.contains(shingle.as_str()))
            .count()
    }
}

impl FromIterator<String> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            shingles: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for Fingerprint {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}
