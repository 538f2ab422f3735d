//! Child element order of one schema complex type
//!
//! Read from the eForms SDK copy of the UBL common aggregate components XSD.
//! The order decides where a created fragment goes among existing siblings.

use crate::error::SchemaError;
use gpp_notice::{Document, ExpandedName, NamespaceMap, NodeId};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// W3C XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// SDK version used when none is configured
pub const DEFAULT_SDK_VERSION: &str = "1.13";

/// Complex type whose children are ordered by default
pub const DEFAULT_TYPE_NAME: &str = "ProcurementProjectType";

const SCHEMA_FILE: &str = "UBL-CommonAggregateComponents-2.3.xsd";

/// Ordered direct children of a complex type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOrder {
    type_name: String,
    names: Vec<String>,
    expanded: Vec<ExpandedName>,
}

impl SchemaOrder {
    /// Load from an SDK checkout laid out as `{root}/v{version}/schemas/common/`
    ///
    /// # Errors
    /// Returns [`SchemaError`] if the file cannot be read or parsed, or the
    /// type is missing.
    pub fn load(sdk_root: &Path, version: &str, type_name: &str) -> Result<Self, SchemaError> {
        Self::from_file(&schema_path(sdk_root, version), type_name)
    }

    /// Load from an XSD file
    ///
    /// # Errors
    /// See [`SchemaOrder::load`].
    pub fn from_file(path: &Path, type_name: &str) -> Result<Self, SchemaError> {
        debug!(path = %path.display(), type_name, "loading schema order");
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_xsd_str(&text, type_name)
    }

    /// Extract the order from XSD text
    ///
    /// # Errors
    /// See [`SchemaOrder::load`].
    pub fn from_xsd_str(xsd: &str, type_name: &str) -> Result<Self, SchemaError> {
        let namespaces = NamespaceMap::new().with("xsd", XSD_NAMESPACE);
        let doc = Document::parse(xsd, &namespaces)?;

        let complex_type = find_child(&doc, doc.root(), "complexType", |node| {
            attribute(&doc, node, "name") == Some(type_name)
        })
        .ok_or_else(|| SchemaError::TypeNotFound(type_name.to_string()))?;

        let mut names = Vec::new();
        let mut expanded = Vec::new();
        if let Some(sequence) = find_child(&doc, complex_type, "sequence", |_| true) {
            for element in xsd_children(&doc, sequence, "element") {
                let Some(reference) = attribute(&doc, element, "ref") else {
                    continue;
                };
                let (prefix, local) = match reference.split_once(':') {
                    Some((prefix, local)) => (Some(prefix), local),
                    None => (None, reference),
                };
                let namespace = match doc.lookup_namespace(element, prefix) {
                    Some(uri) => Some(uri.to_string()),
                    None if prefix.is_none() => None,
                    None => return Err(SchemaError::UnboundPrefix(reference.to_string())),
                };
                names.push(reference.to_string());
                expanded.push(ExpandedName::new(namespace, local));
            }
        }

        info!(type_name, children = names.len(), "schema order loaded");
        Ok(Self {
            type_name: type_name.to_string(),
            names,
            expanded,
        })
    }

    /// Complex type the order belongs to
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Child references as written, e.g. `cac:MainCommodityClassification`
    #[inline]
    #[must_use]
    pub fn ordered_child_names(&self) -> &[String] {
        &self.names
    }

    /// Names declared after `name`; empty when `name` is last or unknown
    #[must_use]
    pub fn successors_of(&self, name: &ExpandedName) -> &[ExpandedName] {
        match self.expanded.iter().position(|n| n == name) {
            Some(index) => &self.expanded[index + 1..],
            None => &[],
        }
    }
}

/// Location of the aggregate components XSD inside an SDK checkout
#[must_use]
pub fn schema_path(sdk_root: &Path, version: &str) -> PathBuf {
    sdk_root
        .join(format!("v{version}"))
        .join("schemas")
        .join("common")
        .join(SCHEMA_FILE)
}

fn xsd_children<'d>(
    doc: &'d Document,
    parent: NodeId,
    local: &'d str,
) -> impl Iterator<Item = NodeId> + 'd {
    doc.child_elements(parent).filter(move |&child| {
        doc.element(child).is_some_and(|e| {
            e.name().namespace() == Some(XSD_NAMESPACE) && e.name().local_name() == local
        })
    })
}

fn find_child(
    doc: &Document,
    parent: NodeId,
    local: &str,
    mut predicate: impl FnMut(NodeId) -> bool,
) -> Option<NodeId> {
    xsd_children(doc, parent, local).find(|&node| predicate(node))
}

fn attribute<'d>(doc: &'d Document, node: NodeId, local: &str) -> Option<&'d str> {
    doc.element(node)?.attribute(&ExpandedName::local(local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpp_test_utils::{fixtures, sdk_root, CAC, CBC};
    use pretty_assertions::assert_eq;

    fn order() -> SchemaOrder {
        SchemaOrder::from_xsd_str(fixtures::COMMON_AGGREGATE_XSD, DEFAULT_TYPE_NAME).unwrap()
    }

    #[test]
    fn reads_children_in_declaration_order() {
        let order = order();
        let names = order.ordered_child_names();
        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "ext:UBLExtensions");
        assert_eq!(names[13], "cac:ProcurementAdditionalType");
        assert_eq!(names[20], "cac:RequestForTenderLine");
    }

    #[test]
    fn resolves_reference_prefixes() {
        let order = order();
        // cbc:ID is second of 21, so a resolved name sees the other 19 after it
        let id = ExpandedName::new(Some(CBC.to_string()), "ID");
        assert_eq!(order.successors_of(&id).len(), 19);
        assert!(order.successors_of(&ExpandedName::local("ID")).is_empty());
    }

    #[test]
    fn successors_follow_the_element() {
        let order = order();
        let additional = ExpandedName::new(Some(CAC.to_string()), "ProcurementAdditionalType");
        let successors = order.successors_of(&additional);
        assert_eq!(successors.len(), 7);
        assert_eq!(successors[0].local_name(), "RequestedTenderTotal");

        let last = ExpandedName::new(Some(CAC.to_string()), "RequestForTenderLine");
        assert!(order.successors_of(&last).is_empty());
        let unknown = ExpandedName::new(Some(CAC.to_string()), "TenderingTerms");
        assert!(order.successors_of(&unknown).is_empty());
    }

    #[test]
    fn selects_the_named_type_only() {
        let order =
            SchemaOrder::from_xsd_str(fixtures::COMMON_AGGREGATE_XSD, "ProcurementProjectLotType")
                .unwrap();
        assert_eq!(
            order.ordered_child_names(),
            &["ext:UBLExtensions", "cbc:ID", "cac:TenderingTerms", "cac:TenderingProcess", "cac:ProcurementProject"]
        );
    }

    #[test]
    fn loads_from_sdk_layout() {
        let order = SchemaOrder::load(&sdk_root(), DEFAULT_SDK_VERSION, DEFAULT_TYPE_NAME).unwrap();
        assert_eq!(order.type_name(), DEFAULT_TYPE_NAME);
        assert_eq!(order.ordered_child_names().len(), 21);
    }

    #[test]
    fn missing_version_is_io_error() {
        let err = SchemaOrder::load(&sdk_root(), "0.0", DEFAULT_TYPE_NAME).unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }), "{err}");
    }

    #[test]
    fn missing_type_is_fatal() {
        let err = SchemaOrder::from_xsd_str(fixtures::COMMON_AGGREGATE_XSD, "NoSuchType").unwrap_err();
        assert_eq!(err.to_string(), "complex type not found in schema: NoSuchType");
    }

    #[test]
    fn malformed_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xsd");
        std::fs::write(&path, "<xsd:schema xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\">").unwrap();
        let err = SchemaOrder::from_file(&path, DEFAULT_TYPE_NAME).unwrap_err();
        assert!(matches!(err, SchemaError::Xml(_)), "{err}");
    }

    #[test]
    fn unbound_reference_prefix_is_fatal() {
        let xsd = r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema">
            <xsd:complexType name="T"><xsd:sequence><xsd:element ref="zz:A"/></xsd:sequence></xsd:complexType>
        </xsd:schema>"#;
        let err = SchemaOrder::from_xsd_str(xsd, "T").unwrap_err();
        assert!(matches!(err, SchemaError::UnboundPrefix(ref r) if r == "zz:A"));
    }
}
