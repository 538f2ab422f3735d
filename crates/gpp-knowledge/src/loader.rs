//! JSON record loading

use crate::error::{LoadError, RecordKind};
use crate::model::{Criterion, PatchTemplate, ReferenceDocument};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Directory searched when no paths are configured
pub const DEFAULT_KNOWLEDGE_DIR: &str = "domain_knowledge";

/// Locations of the three record files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePaths {
    /// Reference documents JSON
    pub documents: PathBuf,
    /// Criteria JSON
    pub criteria: PathBuf,
    /// Patch templates JSON
    pub patches: PathBuf,
}

impl Default for KnowledgePaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_KNOWLEDGE_DIR))
    }
}

impl KnowledgePaths {
    /// Create from explicit paths
    #[must_use]
    pub fn new(
        documents: impl Into<PathBuf>,
        criteria: impl Into<PathBuf>,
        patches: impl Into<PathBuf>,
    ) -> Self {
        Self {
            documents: documents.into(),
            criteria: criteria.into(),
            patches: patches.into(),
        }
    }

    /// Conventional file names inside one directory
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join("gpp_documents.json"),
            dir.join("gpp_criteria.json"),
            dir.join("gpp_patches.json"),
        )
    }
}

/// Load reference documents
///
/// # Errors
/// Returns [`LoadError`] naming the documents collection.
pub fn load_documents(path: &Path) -> Result<Vec<ReferenceDocument>, LoadError> {
    load_records(path, RecordKind::Documents)
}

/// Load criteria
///
/// # Errors
/// Returns [`LoadError`] naming the criteria collection.
pub fn load_criteria(path: &Path) -> Result<Vec<Criterion>, LoadError> {
    load_records(path, RecordKind::Criteria)
}

/// Load patch templates
///
/// # Errors
/// Returns [`LoadError`] naming the patches collection.
pub fn load_patches(path: &Path) -> Result<Vec<PatchTemplate>, LoadError> {
    load_records(path, RecordKind::Patches)
}

fn load_records<T: DeserializeOwned>(path: &Path, kind: RecordKind) -> Result<Vec<T>, LoadError> {
    if !path.is_file() {
        error!(%kind, path = %path.display(), "record file not found");
        return Err(LoadError::InvalidPath {
            kind,
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        kind,
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<T> = serde_json::from_str(&text).map_err(|source| {
        error!(%kind, path = %path.display(), %source, "record file is malformed");
        LoadError::Parse {
            kind,
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(%kind, count = records.len(), "records loaded");
    Ok(records)
}
