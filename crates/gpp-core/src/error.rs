//! Error types for the analyzer
//!
//! Every failure reaching a caller is either a bad request (the input was
//! wrong) or internal (the analyzer or its data was). The `From`
//! conversions pick the category for each lower-level error.

use crate::config::ConfigError;
use gpp_knowledge::{LoadError, SuggestError};
use gpp_notice::NoticeError;
use gpp_patch::{ApplyError, PatchError, SchemaError};

/// Analyzer error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GppError {
    /// Input was invalid
    #[error("{0}")]
    BadRequest(String),

    /// Analysis failed for reasons outside the input
    #[error("{0}")]
    Internal(String),
}

impl GppError {
    /// Bad request with message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Internal error with message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if the caller's input was at fault
    #[inline]
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }

    /// Message without category
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message) | Self::Internal(message) => message,
        }
    }
}

impl From<NoticeError> for GppError {
    fn from(err: NoticeError) -> Self {
        match err {
            NoticeError::Xml(e) => Self::BadRequest(format!("invalid notice xml string: {e}")),
            NoticeError::Layout(e) => Self::Internal(format!("invalid notice layout: {e}")),
        }
    }
}

impl From<LoadError> for GppError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::InvalidPath { .. } => Self::BadRequest(err.to_string()),
            LoadError::Io { .. } | LoadError::Parse { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<SchemaError> for GppError {
    fn from(err: SchemaError) -> Self {
        Self::Internal(format!("failed to load schema order: {err}"))
    }
}

impl From<SuggestError> for GppError {
    fn from(err: SuggestError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ApplyError> for GppError {
    fn from(err: ApplyError) -> Self {
        Self::BadRequest(format!("invalid patch: {err}"))
    }
}

impl From<PatchError> for GppError {
    fn from(err: PatchError) -> Self {
        Self::BadRequest(format!("invalid patch: {err}"))
    }
}

impl From<ConfigError> for GppError {
    fn from(err: ConfigError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
