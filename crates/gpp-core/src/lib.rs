//! GPP Core - Notice Analyzer
//!
//! The entry point for callers:
//! - Loads domain knowledge and the eForms schema order from configuration
//! - Parses notices
//! - Finds the GPP documents and criteria relevant to each lot
//! - Suggests patches for the criteria a caller selects
//! - Applies patches and resolves award criterion weights
//!
//! # Example
//!
//! ```rust,ignore
//! use gpp_core::{AnalyzerConfig, DefaultNoticeAnalyzer, NoticeAnalyzer};
//!
//! let config = AnalyzerConfig::from_file("gpp.toml".as_ref())?;
//! gpp_core::logging::init(&config)?;
//! let analyzer = DefaultNoticeAnalyzer::new(config)?;
//!
//! let mut notice = analyzer.load_notice(&xml)?;
//! let analysis = analyzer.analyze_notice(&notice);
//! let patches = analyzer.suggest_patches(&notice, &analysis.suggested_gpp_criteria)?;
//! analyzer.apply_patches(&mut notice, &patches)?;
//! println!("{}", notice.to_xml_string());
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod result;

// Re-exports for convenience
pub use analyzer::{DefaultNoticeAnalyzer, NoticeAnalyzer};
pub use config::{AnalyzerConfig, ConfigError, DEFAULT_LOG_FILTER, DEFAULT_SDK_ROOT};
pub use error::GppError;
pub use result::AnalysisResult;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for analyzing notices
    pub use crate::{AnalysisResult, AnalyzerConfig, DefaultNoticeAnalyzer, GppError, NoticeAnalyzer};
    pub use gpp_knowledge::{AmbitionLevel, SuggestedCriterion};
    pub use gpp_notice::Notice;
    pub use gpp_patch::{PatchOperation, SuggestedPatch};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
