//! GPP Notice Model
//!
//! Namespaced document tree for eForms procurement notices, with a small
//! path language for addressing nodes and lot-level read accessors.
//!
//! # Core Concepts
//!
//! - [`Document`]: Arena-backed element/text tree with one root
//! - [`NamespaceMap`]: Prefix table shared by parsing and path evaluation
//! - [`NodePath`]: Relative path expression with predicates
//! - [`Notice`]: Lot and classification-code accessors over a [`Document`]
//! - [`NoticeLayout`]: Configurable locations of notice elements
//!
//! # Example
//!
//! ```rust,ignore
//! use gpp_notice::{Notice, NodePath};
//!
//! let notice = Notice::parse(xml)?;
//! for lot in notice.lot_ids() {
//!     println!("{lot}: {:?}", notice.effective_lot_codes(&lot));
//! }
//! let terms: NodePath = "cac:TenderingTerms".parse()?;
//! assert!(!notice.path_exists_in_lot("LOT-0001", &terms));
//! ```

#![warn(unreachable_pub)]

// Core modules
mod layout;
mod namespace;
mod notice;
mod ops;
mod path;
mod tree;
mod xml;

// Re-exports
pub use layout::{NoticeLayout, NoticePaths};
pub use namespace::{NamespaceMap, DEFAULT_NAMESPACE_KEY, XML_NAMESPACE};
pub use notice::{Notice, NoticeError};
pub use path::{NodePath, PathError};
pub use tree::{Attribute, Document, Element, ExpandedName, NamespaceDecl, NodeId, NodeKind};
pub use xml::{escape_text, XmlError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
