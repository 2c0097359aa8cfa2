//! Configuration types and management for plagiscan.
//!
//! Defaults reproduce the reference scoring model: 5-token shingles, a
//! 0.8/0.2 lexical/structural blend and a strict 0.65 plagiarism threshold.

pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{PlagiarismError, Result};

pub use validation::{
    validate_positive_u64, validate_positive_usize, validate_unit_range, validate_weights_sum,
};

/// Implicit configuration files looked up in the working directory.
pub const IMPLICIT_CONFIG_FILES: [&str; 2] = [".plagiscan.yml", ".plagiscan.yaml"];

/// Environment variable overriding the storage directory.
pub const DATA_DIR_ENV: &str = "PLAGISCAN_DATA_DIR";

/// Main configuration for the plagiarism detection engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlagiscanConfig {
    /// Shingle fingerprint settings
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Pairwise scoring and classification settings
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Content store and ledger locations
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Shingle fingerprint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintConfig {
    /// Number of tokens per shingle (k)
    #[serde(default = "FingerprintConfig::default_shingle_size")]
    pub shingle_size: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            shingle_size: Self::default_shingle_size(),
        }
    }
}

impl FingerprintConfig {
    const fn default_shingle_size() -> usize {
        5
    }

    /// Validate fingerprint configuration
    pub fn validate(&self) -> Result<()> {
        validate_positive_usize(self.shingle_size, "fingerprint.shingle_size")
    }
}

/// Scoring configuration for the best-match search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Weight of the Jaccard (lexical) score in the combined score
    #[serde(default = "ScoringConfig::default_jaccard_weight")]
    pub jaccard_weight: f64,

    /// Weight of the structural score in the combined score
    #[serde(default = "ScoringConfig::default_structural_weight")]
    pub structural_weight: f64,

    /// Combined score strictly above this value is flagged as plagiarism
    #[serde(default = "ScoringConfig::default_plagiarism_threshold")]
    pub plagiarism_threshold: f64,

    /// History size from which pairwise scores are computed on the rayon pool
    #[serde(default = "ScoringConfig::default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            jaccard_weight: Self::default_jaccard_weight(),
            structural_weight: Self::default_structural_weight(),
            plagiarism_threshold: Self::default_plagiarism_threshold(),
            parallel_threshold: Self::default_parallel_threshold(),
        }
    }
}

impl ScoringConfig {
    const fn default_jaccard_weight() -> f64 {
        0.8
    }

    const fn default_structural_weight() -> f64 {
        0.2
    }

    const fn default_plagiarism_threshold() -> f64 {
        0.65
    }

    const fn default_parallel_threshold() -> usize {
        256
    }

    /// Validate scoring configuration
    pub fn validate(&self) -> Result<()> {
        validate_unit_range(self.jaccard_weight, "scoring.jaccard_weight")?;
        validate_unit_range(self.structural_weight, "scoring.structural_weight")?;
        validate_weights_sum(
            &[self.jaccard_weight, self.structural_weight],
            1e-6,
            "scoring weights",
        )?;
        validate_unit_range(self.plagiarism_threshold, "scoring.plagiarism_threshold")?;
        validate_positive_usize(self.parallel_threshold, "scoring.parallel_threshold")?;
        Ok(())
    }
}

/// Storage configuration for the file-backed collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding uploaded files and the ledger
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,

    /// Uploads larger than this are rejected
    #[serde(default = "StorageConfig::default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            max_file_size_bytes: Self::default_max_file_size_bytes(),
        }
    }
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf {
        PathBuf::from(".plagiscan")
    }

    const fn default_max_file_size_bytes() -> u64 {
        5 * 1024 * 1024
    }

    /// Directory holding uploaded file bodies and metadata sidecars
    pub fn files_dir(&self) -> PathBuf {
        self.data_dir.join("files")
    }

    /// Path of the JSON submission ledger
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.json")
    }

    /// Validate storage configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(PlagiarismError::config_field(
                "storage.data_dir must not be empty",
                "storage.data_dir",
            ));
        }
        validate_positive_u64(self.max_file_size_bytes, "storage.max_file_size_bytes")
    }
}

impl PlagiscanConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config_text(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Load configuration from a file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = read_config_text(path)?;
                serde_json::from_str(&content).map_err(Into::into)
            }
            _ => Self::from_yaml_file(path),
        }
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|e| {
            PlagiarismError::io(
                format!("Failed to write config file: {}", path.display()),
                e,
            )
        })
    }

    /// First implicit config file present in `dir`, if any
    pub fn find_implicit(dir: impl AsRef<Path>) -> Option<PathBuf> {
        IMPLICIT_CONFIG_FILES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Validate the complete configuration
    pub fn validate(&self) -> Result<()> {
        self.fingerprint.validate()?;
        self.scoring.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

fn read_config_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        PlagiarismError::io(format!("Failed to read config file: {}", path.display()), e)
    })
}
