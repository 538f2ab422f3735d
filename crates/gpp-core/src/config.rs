//! Analyzer configuration
//!
//! Every field has a default, so a TOML file only needs the entries it
//! changes:
//!
//! ```toml
//! ambition_level = "comprehensive"
//! gpp_weight_share = 30
//!
//! [knowledge]
//! documents = "/srv/gpp/gpp_documents.json"
//! criteria = "/srv/gpp/gpp_criteria.json"
//! patches = "/srv/gpp/gpp_patches.json"
//! ```

use gpp_knowledge::{AmbitionLevel, KnowledgePaths};
use gpp_notice::{NamespaceMap, NoticeLayout};
use gpp_patch::{schema_path, DEFAULT_GPP_WEIGHT_SHARE, DEFAULT_SDK_VERSION, DEFAULT_TYPE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding `v{version}/schemas/common/` by default
pub const DEFAULT_SDK_ROOT: &str = "eForms-SDK";

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Errors while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("invalid configuration file path: {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text is not valid configuration
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Analyzer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Record files
    pub knowledge: KnowledgePaths,
    /// eForms SDK checkout
    pub sdk_root: PathBuf,
    /// SDK version, e.g. `1.13`
    pub sdk_version: String,
    /// Complex type whose child order places created fragments
    pub schema_type: String,
    /// Level criteria are selected at
    pub ambition_level: AmbitionLevel,
    /// Total weight given to new award criteria
    pub gpp_weight_share: u32,
    /// Filter directive when `RUST_LOG` is unset
    pub log_filter: String,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Prefix table for notices and path expressions
    pub namespaces: NamespaceMap,
    /// Locations of notice elements
    pub layout: NoticeLayout,
}

impl AnalyzerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on invalid text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Location of the schema file for the configured SDK
    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        schema_path(&self.sdk_root, &self.sdk_version)
    }

    /// With record files
    #[inline]
    #[must_use]
    pub fn with_knowledge_paths(mut self, paths: KnowledgePaths) -> Self {
        self.knowledge = paths;
        self
    }

    /// With SDK root directory
    #[inline]
    #[must_use]
    pub fn with_sdk_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sdk_root = root.into();
        self
    }

    /// With SDK version
    #[inline]
    #[must_use]
    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = version.into();
        self
    }

    /// With ordered schema type
    #[inline]
    #[must_use]
    pub fn with_schema_type(mut self, type_name: impl Into<String>) -> Self {
        self.schema_type = type_name.into();
        self
    }

    /// With ambition level
    #[inline]
    #[must_use]
    pub fn with_ambition_level(mut self, level: AmbitionLevel) -> Self {
        self.ambition_level = level;
        self
    }

    /// With GPP weight share
    #[inline]
    #[must_use]
    pub fn with_gpp_weight_share(mut self, share: u32) -> Self {
        self.gpp_weight_share = share;
        self
    }

    /// With log filter
    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// With JSON logging
    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// With namespace table
    #[inline]
    #[must_use]
    pub fn with_namespaces(mut self, namespaces: NamespaceMap) -> Self {
        self.namespaces = namespaces;
        self
    }

    /// With notice layout
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: NoticeLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            knowledge: KnowledgePaths::default(),
            sdk_root: PathBuf::from(DEFAULT_SDK_ROOT),
            sdk_version: DEFAULT_SDK_VERSION.to_string(),
            schema_type: DEFAULT_TYPE_NAME.to_string(),
            ambition_level: AmbitionLevel::Core,
            gpp_weight_share: DEFAULT_GPP_WEIGHT_SHARE,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
            namespaces: NamespaceMap::eforms(),
            layout: NoticeLayout::default(),
        }
    }
}
