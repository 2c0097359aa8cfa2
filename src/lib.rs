//! # Plagiscan: Near-Duplicate Detection for Code Submissions
//!
//! Plagiscan flags submissions that are lexically and structurally close to
//! an earlier submission of the same assignment. The library provides:
//!
//! - **Normalization**: comment stripping, lowercasing and whitespace collapse
//! - **Fingerprinting**: sets of distinct k-token shingles
//! - **Similarity Scoring**: Jaccard overlap blended with size similarity
//! - **Storage**: a content store for uploads and an append-only submission ledger
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                         API Layer                         │
//! ├───────────────────────────────────────────────────────────┤
//! │  Core           │  Detectors        │  I/O & Storage      │
//! │                 │                   │                     │
//! │ • Config        │ • Normalization   │ • Content store     │
//! │ • Errors        │ • Shingles        │ • Submission ledger │
//! │ • Records       │ • Similarity      │                     │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plagiscan::{
//!     InMemoryContentStore, InMemoryLedger, PlagiarismEngine, PlagiscanConfig,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = PlagiarismEngine::new(
//!         PlagiscanConfig::default(),
//!         InMemoryContentStore::default(),
//!         InMemoryLedger::new(),
//!     )?;
//!
//!     let receipt = engine.submit("main.py", b"print('hello')", "alice", "hw1")?;
//!     println!("{} plagiarism: {}", receipt.work_id, receipt.report.is_plagiarism);
//!     Ok(())
//! }
//! ```

#![warn(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "mimalloc")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

// Configuration, errors and shared records
pub mod core {
    //! Core data structures shared by every layer.

    pub mod config;
    pub mod errors;
    pub mod records;
}

// Fingerprinting and scoring
pub mod detectors {
    //! Normalization, shingle fingerprints and similarity scoring.

    pub mod fingerprint;
    pub mod similarity;
}

// Collaborators holding uploads and history
pub mod io {
    //! Content store and submission ledger.

    pub mod content_store;
    pub mod ledger;
}

// Public API and engine interface
pub mod api {
    //! High-level API and engine interface.

    pub mod engine;
    pub mod results;
}

// Re-export primary types for convenience
pub use api::engine::{LocalEngine, PlagiarismEngine};
pub use api::results::{AnalysisRequest, HealthStatus, SubmissionReceipt};
pub use core::config::PlagiscanConfig;
pub use core::errors::{ErrorKind, PlagiarismError, PlagiarismResultExt, Result};
pub use core::records::{Metrics, Report, Submission, SubmissionSummary};
pub use detectors::fingerprint::{normalize_code, Fingerprint, ShingleGenerator};
pub use detectors::similarity::{jaccard_similarity, structural_similarity, SimilarityMatcher};
pub use io::content_store::{ContentStore, FsContentStore, InMemoryContentStore, StoredFile};
pub use io::ledger::{InMemoryLedger, JsonFileLedger, SubmissionLedger};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
