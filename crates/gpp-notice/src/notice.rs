//! Read-side accessor over a procurement notice
//!
//! A [`Notice`] pairs a [`Document`] with the compiled [`NoticePaths`] it is
//! read through. Reads never mutate; structural edits go through
//! [`Notice::document_mut`].

use crate::layout::{NoticeLayout, NoticePaths};
use crate::namespace::NamespaceMap;
use crate::path::{NodePath, PathError};
use crate::tree::{Document, NodeId};
use crate::xml::XmlError;
use std::fmt::{self, Display, Formatter};

/// Errors while building a [`Notice`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoticeError {
    /// Notice text is not well-formed
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// A layout entry does not compile
    #[error("invalid notice layout: {0}")]
    Layout(#[from] PathError),
}

/// Procurement notice with lot-level accessors
#[derive(Debug, Clone)]
pub struct Notice {
    document: Document,
    paths: NoticePaths,
}

impl Notice {
    /// Parse an eForms notice with the default namespace table and layout
    ///
    /// # Errors
    /// Returns [`NoticeError::Xml`] when the text is not well-formed.
    pub fn parse(xml: &str) -> Result<Self, NoticeError> {
        Self::parse_with(xml, &NamespaceMap::eforms(), &NoticeLayout::default())
    }

    /// Parse with an explicit namespace table and layout
    ///
    /// # Errors
    /// Returns [`NoticeError`] on malformed text or an invalid layout entry.
    pub fn parse_with(
        xml: &str,
        namespaces: &NamespaceMap,
        layout: &NoticeLayout,
    ) -> Result<Self, NoticeError> {
        let document = Document::parse(xml, namespaces)?;
        Self::from_document(document, layout)
    }

    /// Wrap an already parsed document
    ///
    /// # Errors
    /// Returns [`NoticeError::Layout`] if a layout entry does not compile.
    pub fn from_document(document: Document, layout: &NoticeLayout) -> Result<Self, NoticeError> {
        Ok(Self {
            document,
            paths: NoticePaths::compile(layout)?,
        })
    }

    /// Underlying tree
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable tree, for patching
    #[inline]
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Compiled layout
    #[inline]
    #[must_use]
    pub fn paths(&self) -> &NoticePaths {
        &self.paths
    }

    /// Main CPV code of the procurement project
    #[must_use]
    pub fn main_code(&self) -> Option<String> {
        self.root_value(&self.paths.project_main_code)
    }

    /// Additional CPV codes of the procurement project
    #[must_use]
    pub fn additional_codes(&self) -> Vec<String> {
        self.root_values(&self.paths.project_additional_codes)
    }

    /// Main code followed by additional codes
    #[must_use]
    pub fn all_project_codes(&self) -> Vec<String> {
        self.main_code()
            .into_iter()
            .chain(self.additional_codes())
            .collect()
    }

    /// Lot element with identifier `lot_id`, ignoring ASCII case
    #[must_use]
    pub fn lot(&self, lot_id: &str) -> Option<NodeId> {
        self.lots().into_iter().find(|&lot| {
            self.document
                .value_at(lot, &self.paths.lot_id)
                .is_some_and(|id| id.eq_ignore_ascii_case(lot_id))
        })
    }

    /// Non-empty lot identifiers in document order
    #[must_use]
    pub fn lot_ids(&self) -> Vec<String> {
        self.lots()
            .into_iter()
            .filter_map(|lot| self.document.value_at(lot, &self.paths.lot_id))
            .filter(|id| !id.is_empty())
            .collect()
    }

    /// Main CPV code of a lot
    #[must_use]
    pub fn lot_main_code(&self, lot_id: &str) -> Option<String> {
        let lot = self.lot(lot_id)?;
        self.document
            .value_at(lot, &self.paths.lot_main_code)
            .filter(|code| !code.is_empty())
    }

    /// Additional CPV codes of a lot, empty when the lot is absent
    #[must_use]
    pub fn lot_additional_codes(&self, lot_id: &str) -> Vec<String> {
        self.lot(lot_id)
            .map(|lot| non_empty(self.document.values_at(lot, &self.paths.lot_additional_codes)))
            .unwrap_or_default()
    }

    /// Main code followed by additional codes of a lot
    #[must_use]
    pub fn all_lot_codes(&self, lot_id: &str) -> Vec<String> {
        self.lot_main_code(lot_id)
            .into_iter()
            .chain(self.lot_additional_codes(lot_id))
            .collect()
    }

    /// Lot codes, or the project codes when the lot declares none
    #[must_use]
    pub fn effective_lot_codes(&self, lot_id: &str) -> Vec<String> {
        let codes = self.all_lot_codes(lot_id);
        if codes.is_empty() {
            self.all_project_codes()
        } else {
            codes
        }
    }

    /// Whether `path` matches inside lot `lot_id`
    #[must_use]
    pub fn path_exists_in_lot(&self, lot_id: &str, path: &NodePath) -> bool {
        self.lot(lot_id)
            .is_some_and(|lot| self.document.exists_at(lot, path))
    }

    /// Notice language code, e.g. `ENG`
    #[must_use]
    pub fn notice_language(&self) -> Option<String> {
        self.root_value(&self.paths.notice_language)
    }

    /// eForms SDK customization id, e.g. `eforms-sdk-1.13`
    #[must_use]
    pub fn schema_version(&self) -> Option<String> {
        self.root_value(&self.paths.schema_version)
    }

    /// Serialize the whole notice
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        self.document.to_xml_string()
    }

    fn lots(&self) -> Vec<NodeId> {
        self.document.nodes_at(self.document.root(), &self.paths.lot)
    }

    fn root_value(&self, path: &NodePath) -> Option<String> {
        self.document
            .value_at(self.document.root(), path)
            .filter(|value| !value.is_empty())
    }

    fn root_values(&self, path: &NodePath) -> Vec<String> {
        non_empty(self.document.values_at(self.document.root(), path))
    }
}

fn non_empty(values: Vec<String>) -> Vec<String> {
    values.into_iter().filter(|v| !v.is_empty()).collect()
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Notice(lang={}, sdk={}, lots=[{}])",
            self.notice_language().as_deref().unwrap_or("-"),
            self.schema_version().as_deref().unwrap_or("-"),
            self.lot_ids().join(", ")
        )
    }
}
