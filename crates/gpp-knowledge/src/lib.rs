//! GPP Domain Knowledge
//!
//! Reference documents, criteria and patch templates, and the logic that
//! turns the criteria relevant to a lot into patches for that lot.
//!
//! # Core Concepts
//!
//! - **CPV matching**: a criterion code covers a notice code when it is equal
//!   or a zero-padded ancestor ([`matching_codes`], [`has_match`])
//! - [`DomainKnowledgeIndex`]: Read-only lookup over the three record kinds
//! - [`SuggestedCriterion`]: A criterion projected onto one lot
//! - [`ClauseType`]: Which template a criterion is rendered with
//! - [`PatchSuggester`]: Produces ordered, deduplicated patches per lot
//!
//! # Example
//!
//! ```rust,ignore
//! use gpp_knowledge::{AmbitionLevel, DomainKnowledgeIndex, KnowledgePaths};
//!
//! let index = DomainKnowledgeIndex::load(&KnowledgePaths::in_dir(&data_dir))?;
//! let codes = notice.effective_lot_codes("LOT-0001");
//! let criteria = index.relevant_criteria(&codes, AmbitionLevel::Core);
//! let suggested = index.to_suggested_criteria(&criteria, "LOT-0001", &codes);
//! let patches = index.suggest_patches(&notice, &suggested)?;
//! ```

#![warn(unreachable_pub)]

// Core modules
mod clause;
mod cpv;
mod error;
mod index;
mod loader;
mod model;
mod suggester;

// Re-exports
pub use clause::{
    ClauseType, AWARD_CRITERION_TEMPLATE, CONTRACT_PERFORMANCE_TEMPLATE,
    SELECTION_CRITERION_TEMPLATE,
};
pub use cpv::{has_match, matching_codes};
pub use error::{LoadError, RecordKind, SuggestError, UnknownAmbitionLevel};
pub use index::DomainKnowledgeIndex;
pub use loader::{
    load_criteria, load_documents, load_patches, KnowledgePaths, DEFAULT_KNOWLEDGE_DIR,
};
pub use model::{AmbitionLevel, Criterion, PatchTemplate, ReferenceDocument, SuggestedCriterion};
pub use suggester::{
    PatchSuggester, DEFAULT_LANGUAGE, IMPACT_TEMPLATE, SOURCE_TEMPLATE, STRATEGIC_TEMPLATE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
