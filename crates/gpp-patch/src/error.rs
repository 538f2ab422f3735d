//! Error types for patch handling

use gpp_notice::XmlError;
use std::path::PathBuf;

/// Errors while building or reading patches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Operation is not one of create, update or remove
    #[error("invalid patch operation: {0}")]
    InvalidOperation(String),

    /// Builder was missing a required field
    #[error("missing patch field: {0}")]
    MissingField(&'static str),
}

/// Errors while applying one patch to a notice
///
/// Each variant names the id, path or value that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// No lot with the patch's lot id
    #[error("lot not found for id: {0}")]
    LotNotFound(String),

    /// Path does not compile or does not resolve to an insertion point
    #[error("invalid patch path: {0}")]
    InvalidPath(String),

    /// Value is not a well-formed fragment
    #[error("invalid patch value: {value}")]
    InvalidValue {
        value: String,
        #[source]
        source: XmlError,
    },

    /// Update target does not exist
    #[error("node not found at path: {0}")]
    NodeNotFound(String),

    /// Update target has no parent to re-insert into
    #[error("parent node not found for path: {0}")]
    ParentNotFound(String),
}

/// Errors while loading the schema order
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema file could not be read
    #[error("failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Schema file is not well-formed
    #[error("failed to parse schema: {0}")]
    Xml(#[from] XmlError),

    /// No complex type with that name
    #[error("complex type not found in schema: {0}")]
    TypeNotFound(String),

    /// An element reference uses an undeclared prefix
    #[error("unbound prefix in element reference: {0}")]
    UnboundPrefix(String),
}
