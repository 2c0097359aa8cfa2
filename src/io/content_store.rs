//! Content store: uploaded file bodies plus their structural metrics.
//!
//! Metrics are computed once at upload time and returned with every fetch,
//! so the similarity core never re-derives them.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::errors::{PlagiarismError, Result};
use crate::core::records::{FileId, Metrics};
use crate::detectors::similarity::round_to;

const COLLABORATOR: &str = "content store";

/// Metadata recorded for every stored upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub file_id: FileId,
    pub file_name: String,
    pub file_size: u64,
    pub upload_time: DateTime<Utc>,
    pub metrics: Metrics,
}

/// Text content of a stored file together with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FileContent {
    pub content: String,
    pub metrics: Metrics,
}

/// Storage for submitted files.
pub trait ContentStore: Send + Sync {
    /// Store an upload and compute its metrics.
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile>;

    /// Metadata of a stored file.
    fn metadata(&self, file_id: &str) -> Result<StoredFile>;

    /// Text and metrics of a stored file.
    fn fetch(&self, file_id: &str) -> Result<FileContent>;

    /// Check that the store is reachable.
    fn ping(&self) -> Result<()>;
}

/// Line-based structural metrics of `content`.
///
/// Blank lines count toward `total_lines` only. A non-blank line whose
/// trimmed form starts with `#`, `//` or `/*` is a comment line; every other
/// non-blank line is a code line.
pub fn analyze_structure(content: &str, file_size: u64) -> Metrics {
    let mut total_lines = 0;
    let mut code_lines = 0;
    let mut comment_lines = 0;

    for line in content.split('\n') {
        total_lines += 1;
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        if stripped.starts_with('#') || stripped.starts_with("//") || stripped.starts_with("/*") {
            comment_lines += 1;
        } else {
            code_lines += 1;
        }
    }

    let comment_ratio = if code_lines > 0 {
        round_to(comment_lines as f64 / code_lines as f64, 3)
    } else {
        0.0
    };

    Metrics {
        file_size,
        total_lines,
        code_lines,
        comment_lines,
        comment_ratio,
    }
}

/// Translate `\r\n` and lone `\r` line endings to `\n`.
///
/// Stored bodies keep their original bytes. Content handed to analysis is
/// read with this translation, so CR-only files split into lines before the
/// line-comment passes run.
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Reject uploads that are too large or are not text.
pub fn validate_upload(bytes: &[u8], max_file_size_bytes: u64) -> Result<String> {
    if bytes.len() as u64 > max_file_size_bytes {
        return Err(PlagiarismError::validation_field(
            format!(
                "upload of {} bytes exceeds the {} byte limit",
                bytes.len(),
                max_file_size_bytes
            ),
            "content",
        ));
    }

    let content = std::str::from_utf8(bytes)?;
    if content.contains('\0') {
        return Err(PlagiarismError::validation_field(
            "content looks binary (contains NUL bytes)",
            "content",
        ));
    }

    Ok(content.to_string())
}

fn new_stored_file(file_name: &str, bytes: &[u8], content: &str) -> StoredFile {
    let file_size = bytes.len() as u64;
    StoredFile {
        file_id: Uuid::new_v4().to_string(),
        file_name: file_name.to_string(),
        file_size,
        upload_time: Utc::now(),
        metrics: analyze_structure(content, file_size),
    }
}

/// Directory-backed content store.
///
/// Each upload is written as `<root>/<uuid>` with a `<uuid>.json` metadata
/// sidecar. The sidecar is written last, so a file is only visible once its
/// body is complete.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
    max_file_size_bytes: u64,
}

impl FsContentStore {
    /// Open (and create if needed) the store described by `config`.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        Self::with_root(config.files_dir(), config.max_file_size_bytes)
    }

    /// Open a store rooted at an explicit directory.
    pub fn with_root(root: impl Into<PathBuf>, max_file_size_bytes: u64) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            PlagiarismError::io(
                format!("Failed to create content store at {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            max_file_size_bytes,
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // Only canonical UUIDs map to paths; anything else cannot exist here.
    fn checked_id(&self, file_id: &str) -> Result<Uuid> {
        Uuid::parse_str(file_id).map_err(|_| PlagiarismError::not_found("file", file_id))
    }

    fn body_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn meta_path(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl ContentStore for FsContentStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let content = validate_upload(bytes, self.max_file_size_bytes)?;
        let stored = new_stored_file(file_name, bytes, &content);
        let id = self.checked_id(&stored.file_id)?;

        fs::write(self.body_path(&id), bytes)
            .map_err(|e| PlagiarismError::io("Failed to write uploaded file", e))?;

        let meta_path = self.meta_path(&id);
        let tmp_path = meta_path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(&stored)?)
            .and_then(|()| fs::rename(&tmp_path, &meta_path))
            .map_err(|e| PlagiarismError::io("Failed to write file metadata", e))?;

        info!(
            file_id = %stored.file_id,
            file_name,
            file_size = stored.file_size,
            "Stored upload"
        );
        Ok(stored)
    }

    fn metadata(&self, file_id: &str) -> Result<StoredFile> {
        let id = self.checked_id(file_id)?;
        let raw = match fs::read(self.meta_path(&id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                return Err(PlagiarismError::not_found("file", file_id))
            }
            Err(e) => {
                return Err(PlagiarismError::upstream(
                    COLLABORATOR,
                    format!("metadata for {file_id} unreadable: {e}"),
                ))
            }
        };

        serde_json::from_slice(&raw).map_err(|e| {
            PlagiarismError::upstream(
                COLLABORATOR,
                format!("metadata for {file_id} is corrupt: {e}"),
            )
        })
    }

    fn fetch(&self, file_id: &str) -> Result<FileContent> {
        let stored = self.metadata(file_id)?;
        let id = self.checked_id(file_id)?;

        let bytes = fs::read(self.body_path(&id)).map_err(|e| {
            PlagiarismError::upstream(COLLABORATOR, format!("body of {file_id} unreadable: {e}"))
        })?;
        let content = String::from_utf8(bytes).map_err(|_| {
            PlagiarismError::upstream(COLLABORATOR, format!("body of {file_id} is not UTF-8"))
        })?;

        debug!(file_id, bytes = content.len(), "Fetched stored file");
        Ok(FileContent {
            content: normalize_line_endings(&content),
            metrics: stored.metrics,
        })
    }

    fn ping(&self) -> Result<()> {
        fs::read_dir(&self.root).map(|_| ()).map_err(|e| {
            PlagiarismError::upstream(
                COLLABORATOR,
                format!("{} not readable: {e}", self.root.display()),
            )
        })
    }
}

/// In-process content store for tests and embedding.
#[derive(Debug)]
pub struct InMemoryContentStore {
    files: RwLock<HashMap<FileId, (StoredFile, String)>>,
    max_file_size_bytes: u64,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new(StorageConfig::default().max_file_size_bytes)
    }
}

impl InMemoryContentStore {
    /// Create an empty store with the given upload size limit.
    pub fn new(max_file_size_bytes: u64) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            max_file_size_bytes,
        }
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Whether no file has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let content = validate_upload(bytes, self.max_file_size_bytes)?;
        let stored = new_stored_file(file_name, bytes, &content);
        self.files
            .write()
            .insert(stored.file_id.clone(), (stored.clone(), content));
        Ok(stored)
    }

    fn metadata(&self, file_id: &str) -> Result<StoredFile> {
        self.files
            .read()
            .get(file_id)
            .map(|(stored, _)| stored.clone())
            .ok_or_else(|| PlagiarismError::not_found("file", file_id))
    }

    fn fetch(&self, file_id: &str) -> Result<FileContent> {
        self.files
            .read()
            .get(file_id)
            .map(|(stored, content)| FileContent {
                content: normalize_line_endings(content),
                metrics: stored.metrics,
            })
            .ok_or_else(|| PlagiarismError::not_found("file", file_id))
    }

    fn ping(&self) -> Result<()> {
        Ok(())
    }
}
