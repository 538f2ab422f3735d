//! Prefix to namespace-URI table
//!
//! Every prefixed name in a path expression, and every undeclared prefix met
//! while parsing a fragment, is resolved through a [`NamespaceMap`]. The map is
//! injected into each [`Document`](crate::Document) so several tables can be
//! used side by side.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key under which the notice's default (unprefixed) namespace is stored
pub const DEFAULT_NAMESPACE_KEY: &str = "default";

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Ordered prefix → namespace-URI table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceMap(IndexMap<String, String>);

impl NamespaceMap {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Table used by eForms contract notices
    #[must_use]
    pub fn eforms() -> Self {
        [
            (
                DEFAULT_NAMESPACE_KEY,
                "urn:oasis:names:specification:ubl:schema:xsd:ContractNotice-2",
            ),
            (
                "cac",
                "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2",
            ),
            (
                "cbc",
                "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2",
            ),
            (
                "efac",
                "http://data.europa.eu/p27/eforms-ubl-extension-aggregate-components/1",
            ),
            (
                "efbc",
                "http://data.europa.eu/p27/eforms-ubl-extension-basic-components/1",
            ),
            ("efext", "http://data.europa.eu/p27/eforms-ubl-extensions/1"),
            (
                "ext",
                "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2",
            ),
            ("xsd", "http://www.w3.org/2001/XMLSchema"),
            ("xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ]
        .into_iter()
        .collect()
    }

    /// Bind a prefix, returning the previous URI if any
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Option<String> {
        self.0.insert(prefix.into(), uri.into())
    }

    /// With an extra binding
    #[inline]
    #[must_use]
    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.insert(prefix, uri);
        self
    }

    /// URI bound to `prefix`
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.0.get(prefix).map(String::as_str)
    }

    /// First prefix bound to `uri`, skipping the default-namespace key
    #[must_use]
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(prefix, bound)| prefix.as_str() != DEFAULT_NAMESPACE_KEY && bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Real prefixes (the default-namespace key excluded) with their URIs
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter(|(prefix, _)| prefix.as_str() != DEFAULT_NAMESPACE_KEY)
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Number of bindings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for NamespaceMap {
    fn default() -> Self {
        Self::eforms()
    }
}

impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for NamespaceMap {
    fn from_iter<I: IntoIterator<Item = (P, U)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(prefix, uri)| (prefix.into(), uri.into()))
                .collect(),
        )
    }
}
