//! GPP Patch Engine
//!
//! Suggested patches and the machinery that applies them to a notice.
//!
//! # Core Concepts
//!
//! - [`SuggestedPatch`]: Template instantiated for one lot
//! - [`PatchOperation`]: create, update or remove
//! - [`SchemaOrder`]: Child order of a schema type, used to place fragments
//! - [`PatchApplier`]: Applies patches to a [`gpp_notice::Notice`]
//! - [`WeightRedistributor`]: Resolves placeholder award criterion weights
//!
//! # Example
//!
//! ```rust,ignore
//! use gpp_patch::{PatchApplier, SchemaOrder, WeightRedistributor};
//!
//! let schema = SchemaOrder::load(&sdk_root, "1.13", "ProcurementProjectType")?;
//! let applier = PatchApplier::with_schema(schema);
//!
//! let original = notice.clone();
//! applier.apply_all(&mut notice, &patches)?;
//! WeightRedistributor::default().redistribute(&mut notice, &original);
//! ```

#![warn(unreachable_pub)]

// Core modules
mod applier;
mod error;
mod patch;
mod schema;
mod template;
mod weights;

// Re-exports
pub use applier::{ApplyOutcome, PatchApplier};
pub use error::{ApplyError, PatchError, SchemaError};
pub use patch::{dedup_patches, PatchOperation, SuggestedPatch, SuggestedPatchBuilder};
pub use schema::{schema_path, SchemaOrder, DEFAULT_SDK_VERSION, DEFAULT_TYPE_NAME, XSD_NAMESPACE};
pub use template::{substitute, TemplateVars};
pub use weights::{WeightRedistributor, DEFAULT_GPP_WEIGHT_SHARE, PLACEHOLDER_WEIGHT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
