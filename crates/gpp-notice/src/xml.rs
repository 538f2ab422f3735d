//! XML text codec for [`Document`]
//!
//! Parsing is event-based via `quick-xml`. Whitespace-only text between
//! elements is dropped and remaining text is trimmed, so serialization can
//! re-indent freely. Prefixes resolve through in-scope `xmlns` declarations
//! first and through the document's [`NamespaceMap`] second, which lets
//! template fragments omit their declarations.

use crate::namespace::NamespaceMap;
use crate::tree::{Attribute, Document, Element, ExpandedName, NodeId, NodeKind};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Errors while reading XML text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    /// Tokenizer or encoding error
    #[error("malformed xml: {0}")]
    Malformed(String),

    /// Input holds no element
    #[error("document has no root element")]
    NoRoot,

    /// A second top-level element was found
    #[error("document has more than one root element: '{0}'")]
    MultipleRoots(String),

    /// Character data outside the root element
    #[error("text outside the root element: '{0}'")]
    TextOutsideRoot(String),

    /// Input ended inside an element
    #[error("unclosed element: '{0}'")]
    Unclosed(String),

    /// End tag without a matching start tag
    #[error("unexpected end tag")]
    UnexpectedEnd,

    /// Prefix bound neither in scope nor in the namespace table
    #[error("unbound namespace prefix: '{0}'")]
    UnboundPrefix(String),
}

impl Document {
    /// Parse XML text, resolving undeclared prefixes through `namespaces`
    ///
    /// # Errors
    /// Returns [`XmlError`] for malformed markup, missing or duplicated roots,
    /// stray text, unclosed elements and unbound prefixes.
    pub fn parse(text: &str, namespaces: &NamespaceMap) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut builder = TreeBuilder::new(namespaces);
        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => builder.open(&start, false)?,
                Ok(Event::Empty(start)) => builder.open(&start, true)?,
                Ok(Event::End(_)) => builder.close()?,
                Ok(Event::Text(text)) => {
                    let text = text.unescape().map_err(malformed)?;
                    builder.text(&text)?;
                }
                Ok(Event::CData(data)) => {
                    let raw = data.into_inner();
                    builder.text(&String::from_utf8_lossy(&raw))?;
                }
                Ok(Event::Comment(comment)) => {
                    builder.comment(&String::from_utf8_lossy(&comment));
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(malformed(e)),
            }
        }
        builder.finish()
    }

    /// Serialize with an XML declaration and two-space indentation
    #[must_use]
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let mut scope = Vec::new();
        self.write_node(self.root(), 0, &mut scope, &mut out);
        out
    }

    /// Serialize the subtree at `node` without declaration
    #[must_use]
    pub fn fragment_to_string(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut scope = Vec::new();
        self.write_node(node, 0, &mut scope, &mut out);
        out
    }

    fn write_node(
        &self,
        id: NodeId,
        depth: usize,
        scope: &mut Vec<(Option<String>, String)>,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        let element = match self.kind(id) {
            NodeKind::Text(text) => {
                out.push_str(&indent);
                out.push_str(&escape_text(text));
                out.push('\n');
                return;
            }
            NodeKind::Comment(comment) => {
                out.push_str(&indent);
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->\n");
                return;
            }
            NodeKind::Element(element) => element,
        };

        let mark = scope.len();
        let mut decls = String::new();
        for decl in element.namespace_decls() {
            write_decl(&mut decls, decl.prefix.as_deref(), &decl.uri);
            scope.push((decl.prefix.clone(), decl.uri.clone()));
        }
        bind_if_needed(
            scope,
            &mut decls,
            element.prefix(),
            element.name().namespace().unwrap_or(""),
        );
        for attr in element.attributes() {
            if let (Some(prefix), Some(ns)) = (attr.prefix.as_deref(), attr.name.namespace()) {
                bind_if_needed(scope, &mut decls, Some(prefix), ns);
            }
        }

        let name = element.qualified_name();
        out.push_str(&indent);
        out.push('<');
        out.push_str(&name);
        out.push_str(&decls);
        for attr in element.attributes() {
            out.push(' ');
            out.push_str(&attr.qualified_name());
            out.push_str("=\"");
            out.push_str(&escape_text(&attr.value));
            out.push('"');
        }

        let children = self.children(id);
        match children {
            [] => out.push_str("/>\n"),
            [only] if matches!(self.kind(*only), NodeKind::Text(_)) => {
                out.push('>');
                out.push_str(&escape_text(&self.text_content(*only)));
                out.push_str("</");
                out.push_str(&name);
                out.push_str(">\n");
            }
            _ => {
                out.push_str(">\n");
                for &child in children {
                    self.write_node(child, depth + 1, scope, out);
                }
                out.push_str(&indent);
                out.push_str("</");
                out.push_str(&name);
                out.push_str(">\n");
            }
        }
        scope.truncate(mark);
    }
}

/// Escape `&`, `<`, `>`, `'` and `"` for use in text or attribute values
#[must_use]
pub fn escape_text(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

fn malformed(error: impl std::fmt::Display) -> XmlError {
    XmlError::Malformed(error.to_string())
}

fn write_decl(out: &mut String, prefix: Option<&str>, uri: &str) {
    match prefix {
        Some(prefix) => out.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape_text(uri))),
        None => out.push_str(&format!(" xmlns=\"{}\"", escape_text(uri))),
    }
}

fn bind_if_needed(
    scope: &mut Vec<(Option<String>, String)>,
    decls: &mut String,
    prefix: Option<&str>,
    namespace: &str,
) {
    if prefix == Some("xml") {
        return;
    }
    let bound = scope
        .iter()
        .rev()
        .find(|(p, _)| p.as_deref() == prefix)
        .map_or("", |(_, uri)| uri.as_str());
    if bound != namespace {
        write_decl(decls, prefix, namespace);
        scope.push((prefix.map(str::to_string), namespace.to_string()));
    }
}

/// Incremental tree construction from reader events
struct TreeBuilder<'a> {
    namespaces: &'a NamespaceMap,
    document: Option<Document>,
    stack: Vec<NodeId>,
}

struct RawName {
    prefix: Option<String>,
    local: String,
}

impl<'a> TreeBuilder<'a> {
    fn new(namespaces: &'a NamespaceMap) -> Self {
        Self {
            namespaces,
            document: None,
            stack: Vec::new(),
        }
    }

    fn open(&mut self, start: &BytesStart<'_>, empty: bool) -> Result<(), XmlError> {
        let raw = split_name(start.name().as_ref())?;

        let mut decls = Vec::new();
        let mut raw_attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(malformed)?;
            let key = split_name(attr.key.as_ref())?;
            let value = attr.unescape_value().map_err(malformed)?.into_owned();
            match (key.prefix.as_deref(), key.local.as_str()) {
                (None, "xmlns") => decls.push((None, value)),
                (Some("xmlns"), _) => decls.push((Some(key.local), value)),
                _ => raw_attrs.push((key, value)),
            }
        }

        let namespace = self.resolve(&decls, raw.prefix.as_deref())?;
        let mut element = Element::new(ExpandedName::new(namespace, raw.local), raw.prefix);
        for (key, value) in raw_attrs {
            let namespace = match key.prefix.as_deref() {
                Some(_) => self.resolve(&decls, key.prefix.as_deref())?,
                None => None,
            };
            element.set_attribute(Attribute {
                name: ExpandedName::new(namespace, key.local),
                prefix: key.prefix,
                value,
            });
        }
        for (prefix, uri) in decls {
            element.declare_namespace(prefix, uri);
        }

        let id = if let Some(document) = self.document.as_mut() {
            let Some(&parent) = self.stack.last() else {
                return Err(XmlError::MultipleRoots(element.qualified_name()));
            };
            let id = document.create_element(element);
            document.append_child(parent, id);
            id
        } else {
            let document = Document::new(element, self.namespaces.clone());
            let root = document.root();
            self.document = Some(document);
            root
        };
        if !empty {
            self.stack.push(id);
        }
        Ok(())
    }

    fn resolve(
        &self,
        own: &[(Option<String>, String)],
        prefix: Option<&str>,
    ) -> Result<Option<String>, XmlError> {
        if let Some((_, uri)) = own.iter().find(|(p, _)| p.as_deref() == prefix) {
            return Ok(Some(uri.clone()).filter(|uri| !uri.is_empty()));
        }
        if let (Some(document), Some(&parent)) = (&self.document, self.stack.last()) {
            if let Some(uri) = document.lookup_namespace(parent, prefix) {
                return Ok(Some(uri.to_string()));
            }
        }
        match prefix {
            None => Ok(None),
            Some(prefix) => self
                .namespaces
                .get(prefix)
                .map(|uri| Some(uri.to_string()))
                .ok_or_else(|| XmlError::UnboundPrefix(prefix.to_string())),
        }
    }

    fn close(&mut self) -> Result<(), XmlError> {
        self.stack.pop().map(|_| ()).ok_or(XmlError::UnexpectedEnd)
    }

    fn text(&mut self, text: &str) -> Result<(), XmlError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        match (&mut self.document, self.stack.last()) {
            (Some(document), Some(&parent)) => {
                let id = document.create_text(text);
                document.append_child(parent, id);
                Ok(())
            }
            _ => Err(XmlError::TextOutsideRoot(text.to_string())),
        }
    }

    fn comment(&mut self, text: &str) {
        if let (Some(document), Some(&parent)) = (&mut self.document, self.stack.last()) {
            let id = document.create_comment(text);
            document.append_child(parent, id);
        }
    }

    fn finish(self) -> Result<Document, XmlError> {
        let document = self.document.ok_or(XmlError::NoRoot)?;
        if let Some(&open) = self.stack.last() {
            let name = document
                .element(open)
                .map_or_else(String::new, Element::qualified_name);
            return Err(XmlError::Unclosed(name));
        }
        Ok(document)
    }
}

fn split_name(raw: &[u8]) -> Result<RawName, XmlError> {
    let name = std::str::from_utf8(raw).map_err(malformed)?;
    Ok(match name.split_once(':') {
        Some((prefix, local)) => RawName {
            prefix: Some(prefix.to_string()),
            local: local.to_string(),
        },
        None => RawName {
            prefix: None,
            local: name.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";

    fn parse(text: &str) -> Result<Document, XmlError> {
        Document::parse(text, &NamespaceMap::eforms())
    }

    #[test]
    fn parses_declared_namespaces() {
        let doc = parse(&format!(
            r#"<root xmlns:cbc="{CBC}"><cbc:ID schemeName="Lot">LOT-1</cbc:ID></root>"#
        ))
        .unwrap();
        let id = doc.child_elements(doc.root()).next().unwrap();
        let element = doc.element(id).unwrap();
        assert_eq!(element.name().namespace(), Some(CBC));
        assert_eq!(element.name().local_name(), "ID");
        assert_eq!(element.attribute(&ExpandedName::local("schemeName")), Some("Lot"));
        assert_eq!(doc.text_content(id), "LOT-1");
    }

    #[test]
    fn undeclared_prefix_falls_back_to_table() {
        let doc = parse("<cbc:Note>hello</cbc:Note>").unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.name().namespace(), Some(CBC));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert_eq!(
            parse("<zz:Note/>").unwrap_err(),
            XmlError::UnboundPrefix("zz".into())
        );
    }

    #[test]
    fn unprefixed_names_have_no_namespace() {
        let doc = parse("<dummyValue><internal>broccoli</internal></dummyValue>").unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.name(), &ExpandedName::local("dummyValue"));
    }

    #[test]
    fn default_namespace_applies_to_descendants() {
        let doc = parse(r#"<a xmlns="urn:d"><b/></a>"#).unwrap();
        let b = doc.child_elements(doc.root()).next().unwrap();
        assert_eq!(doc.element(b).unwrap().name().namespace(), Some("urn:d"));
    }

    #[test]
    fn rejects_truncated_markup() {
        assert!(parse("<hola....").is_err());
        assert!(parse("<invalid...").is_err());
    }

    #[test]
    fn rejects_plain_text() {
        assert!(matches!(
            parse("potato"),
            Err(XmlError::TextOutsideRoot(_) | XmlError::NoRoot)
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse("   ").unwrap_err(), XmlError::NoRoot);
    }

    #[test]
    fn rejects_second_root() {
        assert!(matches!(parse("<a/><b/>"), Err(XmlError::MultipleRoots(_))));
    }

    #[test]
    fn rejects_unclosed_element() {
        assert!(parse("<a><b></b>").is_err());
    }

    #[test]
    fn unescapes_text_and_attributes() {
        let doc = parse(r#"<a k="x &amp; y">1 &lt; 2</a>"#).unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.attribute(&ExpandedName::local("k")), Some("x & y"));
        assert_eq!(doc.text_content(doc.root()), "1 < 2");
    }

    #[test]
    fn serializes_with_indentation() {
        let doc = parse("<a><b>1</b><c/></a>").unwrap();
        assert_eq!(
            doc.to_xml_string(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<a>\n  <b>1</b>\n  <c/>\n</a>\n"
        );
    }

    #[test]
    fn built_document_serializes_from_its_root() {
        let mut doc = Document::new(
            Element::new(ExpandedName::local("notice"), None),
            NamespaceMap::eforms(),
        );
        let lot = doc.create_element(Element::new(ExpandedName::local("lot"), None));
        let text = doc.create_text("LOT-1");
        doc.append_child(lot, text);
        doc.append_child(doc.root(), lot);
        assert_eq!(
            doc.to_xml_string(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<notice>\n  <lot>LOT-1</lot>\n</notice>\n"
        );
    }

    #[test]
    fn serialization_declares_missing_prefixes() {
        let doc = parse("<cbc:Note>x</cbc:Note>").unwrap();
        let text = doc.fragment_to_string(doc.root());
        assert_eq!(text, format!("<cbc:Note xmlns:cbc=\"{CBC}\">x</cbc:Note>\n"));
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn serialization_roundtrips_structure() {
        let source = format!(
            r#"<root xmlns:cbc="{CBC}"><!--note--><cbc:ID schemeName="Lot">L &amp; 1</cbc:ID></root>"#
        );
        let first = parse(&source).unwrap();
        let second = parse(&first.to_xml_string()).unwrap();
        assert_eq!(first.to_xml_string(), second.to_xml_string());
        assert_eq!(second.element_count(), 2);
    }

    #[test]
    fn escape_text_escapes_markup() {
        assert_eq!(escape_text("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
