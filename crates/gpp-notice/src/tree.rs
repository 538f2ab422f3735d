//! Arena-backed document tree
//!
//! [`Document`] keeps every node in a flat arena addressed by [`NodeId`].
//! Detaching a node unlinks it from its parent; the node stays in the arena
//! but is no longer reachable from the root.
//!
//! # Panics
//! A [`NodeId`] is only meaningful for the document that created it. Passing
//! an id from another document indexes out of bounds.

use crate::namespace::NamespaceMap;
use std::fmt::{self, Display, Formatter};

/// Handle to a node inside one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena slot
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Namespace-qualified name, independent of the prefix used to write it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpandedName {
    namespace: Option<String>,
    local: String,
}

impl ExpandedName {
    /// Create name in `namespace`
    #[inline]
    #[must_use]
    pub fn new(namespace: Option<String>, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }

    /// Create name without namespace
    #[inline]
    #[must_use]
    pub fn local(local: impl Into<String>) -> Self {
        Self::new(None, local)
    }

    /// Namespace URI
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local part
    #[inline]
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local
    }
}

impl Display for ExpandedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Element attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Expanded name
    pub name: ExpandedName,
    /// Prefix as written
    pub prefix: Option<String>,
    /// Unescaped value
    pub value: String,
}

impl Attribute {
    /// Unprefixed attribute
    #[must_use]
    pub fn new(local: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: ExpandedName::local(local),
            prefix: None,
            value: value.into(),
        }
    }

    /// Name as written, `prefix:local` or `local`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), self.name.local_name())
    }
}

/// `xmlns` / `xmlns:prefix` declaration carried by an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix, `None` for the default namespace
    pub prefix: Option<String>,
    /// Bound URI (empty string undeclares the default namespace)
    pub uri: String,
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: ExpandedName,
    prefix: Option<String>,
    attributes: Vec<Attribute>,
    namespace_decls: Vec<NamespaceDecl>,
}

impl Element {
    /// Create element with no attributes
    #[inline]
    #[must_use]
    pub fn new(name: ExpandedName, prefix: Option<String>) -> Self {
        Self {
            name,
            prefix,
            attributes: Vec::new(),
            namespace_decls: Vec::new(),
        }
    }

    /// Expanded name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &ExpandedName {
        &self.name
    }

    /// Prefix as written
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Name as written, `prefix:local` or `local`
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), self.name.local_name())
    }

    /// All attributes in source order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Value of the attribute with `name`
    #[must_use]
    pub fn attribute(&self, name: &ExpandedName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| &attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set (or replace) an attribute
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Namespace declarations written on this element
    #[inline]
    #[must_use]
    pub fn namespace_decls(&self) -> &[NamespaceDecl] {
        &self.namespace_decls
    }

    /// Add a namespace declaration
    pub fn declare_namespace(&mut self, prefix: Option<String>, uri: impl Into<String>) {
        self.namespace_decls.push(NamespaceDecl {
            prefix,
            uri: uri.into(),
        });
    }
}

/// Node payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Element with children
    Element(Element),
    /// Character data
    Text(String),
    /// Comment body
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Ordered, namespaced tree with exactly one root element
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    namespaces: NamespaceMap,
}

impl Document {
    /// Create document holding only `root`
    #[must_use]
    pub fn new(root: Element, namespaces: NamespaceMap) -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Element(root),
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            namespaces,
        }
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Prefix table used for path expressions
    #[inline]
    #[must_use]
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Node payload
    #[inline]
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element payload, `None` for text and comments
    #[inline]
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Mutable element payload
    #[inline]
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Parent, `None` for the root and detached nodes
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Children in order
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in order
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(move |child| matches!(self.nodes[child.0].kind, NodeKind::Element(_)))
    }

    /// Node following `id` under the same parent
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let position = siblings.iter().position(|&s| s == id)?;
        siblings.get(position + 1).copied()
    }

    /// Whether `id` is reachable from the root
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Concatenated text of all descendant text nodes
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(_) => {}
            NodeKind::Element(_) => {
                for &child in &self.nodes[id.0].children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Replace all children of `id` with a single text node
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text = self.push(NodeKind::Text(text.into()));
        self.append_child(id, text);
    }

    /// Allocate a detached element
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.push(NodeKind::Element(element))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Allocate a detached comment
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(text.into()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Insert `child` before `reference` under `parent`
    ///
    /// Appends when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference);
        self.nodes[child.0].parent = Some(parent);
        match position {
            Some(index) => self.nodes[parent.0].children.insert(index, child),
            None => self.nodes[parent.0].children.push(child),
        }
    }

    /// Unlink `id` from its parent
    ///
    /// Returns `false` for the root and for nodes that were already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&c| c != id);
        true
    }

    /// Deep-copy `node` of `other` into this arena, returning the detached copy
    pub fn import(&mut self, other: &Document, node: NodeId) -> NodeId {
        let copy = self.push(other.kind(node).clone());
        for &child in other.children(node) {
            let child_copy = self.import(other, child);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }

    /// Namespace bound to `prefix` by declarations on `id` or its ancestors
    #[must_use]
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(element) = self.element(node) {
                if let Some(decl) = element
                    .namespace_decls
                    .iter()
                    .find(|d| d.prefix.as_deref() == prefix)
                {
                    return Some(decl.uri.as_str()).filter(|uri| !uri.is_empty());
                }
            }
            current = self.parent(node);
        }
        None
    }

    /// Attached element count (root included)
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.count_elements(self.root)
    }

    fn count_elements(&self, id: NodeId) -> usize {
        1 + self
            .child_elements(id)
            .map(|child| self.count_elements(child))
            .sum::<usize>()
    }
}

pub(crate) fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}
