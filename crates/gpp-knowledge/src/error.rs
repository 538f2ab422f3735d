//! Error types for domain knowledge

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

/// Which record collection an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Reference documents
    Documents,
    /// Criteria
    Criteria,
    /// Patch templates
    Patches,
}

impl RecordKind {
    /// Name used in messages
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Documents => "GPP documents",
            Self::Criteria => "GPP criteria",
            Self::Patches => "GPP patches",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors while loading a record collection
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Path does not name a readable file
    #[error("invalid {kind} file path: {}", path.display())]
    InvalidPath { kind: RecordKind, path: PathBuf },

    /// File exists but could not be read
    #[error("failed to read {kind} file {}: {source}", path.display())]
    Io {
        kind: RecordKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a JSON array of the expected records
    #[error("failed to parse {kind} file {}: {source}", path.display())]
    Parse {
        kind: RecordKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Collection the error concerns
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::InvalidPath { kind, .. } | Self::Io { kind, .. } | Self::Parse { kind, .. } => {
                *kind
            }
        }
    }
}

/// Errors while suggesting patches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestError {
    /// Template prerequisites loop back on themselves
    #[error("dependency cycle at patch template '{template}' for lot {lot_id}")]
    DependencyCycle { template: String, lot_id: String },
}

/// Ambition level text is not `core`, `comprehensive` or `both`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ambition level: {0}")]
pub struct UnknownAmbitionLevel(pub String);
