//! Path-addressed reads and structural edits on a [`Document`]

use crate::path::NodePath;
use crate::tree::{Document, ExpandedName, NodeId};
use tracing::trace;

impl Document {
    /// First element matching `path` from `context`
    #[must_use]
    pub fn node_at(&self, context: NodeId, path: &NodePath) -> Option<NodeId> {
        path.select_first(self, context)
    }

    /// All elements matching `path` from `context`, in document order
    #[must_use]
    pub fn nodes_at(&self, context: NodeId, path: &NodePath) -> Vec<NodeId> {
        path.select(self, context)
    }

    /// Trimmed string value of the first match
    #[must_use]
    pub fn value_at(&self, context: NodeId, path: &NodePath) -> Option<String> {
        path.value(self, context)
    }

    /// Trimmed string values of all matches
    #[must_use]
    pub fn values_at(&self, context: NodeId, path: &NodePath) -> Vec<String> {
        path.values(self, context)
    }

    /// Whether `path` matches anything from `context`
    #[must_use]
    pub fn exists_at(&self, context: NodeId, path: &NodePath) -> bool {
        !path.select(self, context).is_empty()
    }

    /// Append the root of `fragment` as last child of `parent`
    pub fn insert_fragment(&mut self, parent: NodeId, fragment: &Document) -> NodeId {
        let copy = self.import(fragment, fragment.root());
        self.append_child(parent, copy);
        copy
    }

    /// Insert the root of `fragment` under `parent` before the first child
    /// whose name appears in `successors`
    ///
    /// `successors` is scanned in order; the first name with a matching direct
    /// child wins. Falls back to appending.
    pub fn insert_fragment_before(
        &mut self,
        parent: NodeId,
        fragment: &Document,
        successors: &[ExpandedName],
    ) -> NodeId {
        let anchor = successors.iter().find_map(|name| {
            self.child_elements(parent)
                .find(|&child| self.element(child).is_some_and(|e| e.name() == name))
        });

        let copy = self.import(fragment, fragment.root());
        match anchor {
            Some(reference) => {
                trace!(%reference, "inserting fragment before existing sibling");
                self.insert_before(parent, copy, reference);
            }
            None => self.append_child(parent, copy),
        }
        copy
    }

    /// Detach the first node matching `path`
    ///
    /// Returns `false` if nothing matched or the match is the root.
    pub fn remove_at(&mut self, context: NodeId, path: &NodePath) -> bool {
        match path.select_first(self, context) {
            Some(node) => self.detach(node),
            None => false,
        }
    }

    /// Swap `target` for a copy of `fragment`'s root, keeping its position
    ///
    /// Returns `None` when `target` has no parent.
    pub fn replace_node(&mut self, target: NodeId, fragment: &Document) -> Option<NodeId> {
        let parent = self.parent(target)?;
        let next = self.next_sibling(target);
        let copy = self.import(fragment, fragment.root());
        self.detach(target);
        match next {
            Some(reference) => self.insert_before(parent, copy, reference),
            None => self.append_child(parent, copy),
        }
        Some(copy)
    }
}

#[cfg(test)]
mod tests {
    use crate::namespace::NamespaceMap;
    use crate::path::NodePath;
    use crate::tree::{Document, ExpandedName};
    use pretty_assertions::assert_eq;

    const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    const CAC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";

    fn project() -> Document {
        Document::parse(
            r#"<cac:ProcurementProject xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
                  xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
                <cbc:ID>P1</cbc:ID>
                <cbc:Name>Chairs</cbc:Name>
                <cac:MainCommodityClassification>
                  <cbc:ItemClassificationCode listName="cpv">39110000</cbc:ItemClassificationCode>
                </cac:MainCommodityClassification>
              </cac:ProcurementProject>"#,
            &NamespaceMap::eforms(),
        )
        .unwrap()
    }

    fn fragment(xml: &str) -> Document {
        Document::parse(xml, &NamespaceMap::eforms()).unwrap()
    }

    fn path(text: &str) -> NodePath {
        text.parse().unwrap()
    }

    fn child_names(doc: &Document) -> Vec<String> {
        doc.child_elements(doc.root())
            .map(|c| doc.element(c).unwrap().qualified_name())
            .collect()
    }

    #[test]
    fn reads_values_and_existence() {
        let doc = project();
        let root = doc.root();
        assert_eq!(doc.value_at(root, &path("cbc:ID")), Some("P1".to_string()));
        assert!(doc.exists_at(root, &path("cac:MainCommodityClassification")));
        assert!(!doc.exists_at(root, &path("cac:AdditionalCommodityClassification")));
        assert_eq!(
            doc.values_at(root, &path("cac:MainCommodityClassification/cbc:ItemClassificationCode")),
            vec!["39110000".to_string()]
        );
        assert_eq!(
            doc.values_at(root, &path("cac:MainCommodityClassification/cbc:ItemClassificationCode/@listName")),
            vec!["cpv".to_string()]
        );
    }

    #[test]
    fn insert_fragment_appends() {
        let mut doc = project();
        let root = doc.root();
        doc.insert_fragment(root, &fragment("<cbc:Note>n</cbc:Note>"));
        assert_eq!(child_names(&doc).last().map(String::as_str), Some("cbc:Note"));
    }

    #[test]
    fn insert_before_first_present_successor() {
        let mut doc = project();
        let root = doc.root();
        let successors = [
            ExpandedName::new(Some(CBC.to_string()), "Description"),
            ExpandedName::new(Some(CAC.to_string()), "MainCommodityClassification"),
        ];
        doc.insert_fragment_before(
            root,
            &fragment("<cac:ProcurementAdditionalType/>"),
            &successors,
        );
        assert_eq!(
            child_names(&doc),
            vec![
                "cbc:ID",
                "cbc:Name",
                "cac:ProcurementAdditionalType",
                "cac:MainCommodityClassification"
            ]
        );
    }

    #[test]
    fn insert_before_without_successor_appends() {
        let mut doc = project();
        let root = doc.root();
        doc.insert_fragment_before(root, &fragment("<cac:RealizedLocation/>"), &[]);
        assert_eq!(child_names(&doc).last().map(String::as_str), Some("cac:RealizedLocation"));
    }

    #[test]
    fn remove_detaches_first_match() {
        let mut doc = project();
        let root = doc.root();
        assert!(doc.remove_at(root, &path("cbc:Name")));
        assert!(!doc.remove_at(root, &path("cbc:Name")));
        assert!(!doc.remove_at(root, &path(".")));
        assert_eq!(child_names(&doc), vec!["cbc:ID", "cac:MainCommodityClassification"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut doc = project();
        let root = doc.root();
        let name = doc.node_at(root, &path("cbc:Name")).unwrap();
        let new = doc.replace_node(name, &fragment("<cbc:Name>Tables</cbc:Name>"));
        assert!(new.is_some());
        assert!(!doc.is_attached(name));
        assert_eq!(
            child_names(&doc),
            vec!["cbc:ID", "cbc:Name", "cac:MainCommodityClassification"]
        );
        assert_eq!(doc.value_at(root, &path("cbc:Name")), Some("Tables".to_string()));
    }

    #[test]
    fn replacing_the_root_is_none() {
        let mut doc = project();
        let root = doc.root();
        assert!(doc.replace_node(root, &fragment("<cbc:Note/>")).is_none());
        assert_eq!(doc.root(), root);
    }

    #[test]
    fn inserted_fragment_serializes_with_declarations() {
        let mut doc = fragment("<Root/>");
        let root = doc.root();
        doc.insert_fragment(root, &fragment("<cbc:Note>x</cbc:Note>"));
        let xml = doc.to_xml_string();
        assert!(xml.contains("xmlns:cbc="), "{xml}");
        let reparsed = Document::parse(&xml, &NamespaceMap::new()).unwrap();
        assert_eq!(reparsed.value_at(reparsed.root(), &path("*")), Some("x".to_string()));
    }
}
