//! Path expressions for addressing nodes inside a [`Document`]
//!
//! Provides [`NodePath`], a small subset of XPath 1.0 location paths:
//!
//! - `/`-separated steps: `.`, `..`, `*` or a (prefixed) element name
//! - predicates: `[@attr='v']`, `[rel='v']`, `[rel]`, `[n]`
//! - an optional trailing `@attr` addressing an attribute value
//!
//! Paths are always relative to a context node. Prefixes resolve through the
//! document's [`NamespaceMap`](crate::NamespaceMap); an unknown prefix matches
//! nothing.

use crate::tree::{Document, ExpandedName, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Compiled relative path expression
///
/// # Examples
/// - `cac:ProcurementProject/cbc:ID`
/// - `cac:ProcurementProjectLot[cbc:ID/@schemeName='Lot']`
/// - `cbc:ID/@schemeName`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    source: String,
    steps: Vec<Step>,
    attribute: Option<NameTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Current,
    Parent,
    Child {
        test: NameTest,
        predicates: Vec<Predicate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    Exists(NodePath),
    Equals(NodePath, String),
}

/// Name test of one step, `*` matching any local name
#[derive(Debug, Clone, PartialEq, Eq)]
struct NameTest {
    prefix: Option<String>,
    local: String,
}

impl NameTest {
    fn matches(&self, doc: &Document, name: &ExpandedName) -> bool {
        if self.local != "*" && self.local != name.local_name() {
            return false;
        }
        match &self.prefix {
            Some(prefix) => doc
                .namespaces()
                .get(prefix)
                .is_some_and(|uri| name.namespace() == Some(uri)),
            None => self.local == "*" || name.namespace().is_none(),
        }
    }
}

impl NodePath {
    /// Path text as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the path addresses an attribute value
    #[inline]
    #[must_use]
    pub fn is_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    /// All matching elements in document order, without duplicates
    ///
    /// For attribute paths, the elements that carry the attribute.
    #[must_use]
    pub fn select(&self, doc: &Document, context: NodeId) -> Vec<NodeId> {
        let mut current = vec![context];
        for step in &self.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &node in &current {
                for candidate in step.apply(doc, node) {
                    if seen.insert(candidate) {
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }

        match &self.attribute {
            Some(test) => current
                .into_iter()
                .filter(|&node| attribute_value(doc, node, test).is_some())
                .collect(),
            None => current,
        }
    }

    /// First match
    #[must_use]
    pub fn select_first(&self, doc: &Document, context: NodeId) -> Option<NodeId> {
        self.select(doc, context).into_iter().next()
    }

    /// Trimmed text (or attribute value) of the first match
    #[must_use]
    pub fn value(&self, doc: &Document, context: NodeId) -> Option<String> {
        self.string_values(doc, context)
            .into_iter()
            .next()
            .map(|value| value.trim().to_string())
    }

    /// Trimmed text (or attribute value) of every match
    #[must_use]
    pub fn values(&self, doc: &Document, context: NodeId) -> Vec<String> {
        self.string_values(doc, context)
            .into_iter()
            .map(|value| value.trim().to_string())
            .collect()
    }

    /// String value of every match
    fn string_values(&self, doc: &Document, context: NodeId) -> Vec<String> {
        let nodes = self.select(doc, context);
        match &self.attribute {
            Some(test) => nodes
                .into_iter()
                .filter_map(|node| attribute_value(doc, node, test))
                .collect(),
            None => nodes.into_iter().map(|node| doc.text_content(node)).collect(),
        }
    }
}

impl Step {
    fn apply(&self, doc: &Document, node: NodeId) -> Vec<NodeId> {
        match self {
            Self::Current => vec![node],
            Self::Parent => doc.parent(node).into_iter().collect(),
            Self::Child { test, predicates } => {
                let mut matched: Vec<NodeId> = doc
                    .child_elements(node)
                    .filter(|&child| {
                        doc.element(child)
                            .is_some_and(|element| test.matches(doc, element.name()))
                    })
                    .collect();
                for predicate in predicates {
                    matched = predicate.filter(doc, matched);
                }
                matched
            }
        }
    }
}

impl Predicate {
    fn filter(&self, doc: &Document, nodes: Vec<NodeId>) -> Vec<NodeId> {
        match self {
            Self::Position(position) => nodes.get(position - 1).copied().into_iter().collect(),
            Self::Exists(path) => nodes
                .into_iter()
                .filter(|&node| !path.select(doc, node).is_empty())
                .collect(),
            Self::Equals(path, literal) => nodes
                .into_iter()
                .filter(|&node| path.string_values(doc, node).iter().any(|v| v == literal))
                .collect(),
        }
    }
}

fn attribute_value(doc: &Document, node: NodeId, test: &NameTest) -> Option<String> {
    doc.element(node)?
        .attributes()
        .iter()
        .find(|attr| test.matches(doc, &attr.name))
        .map(|attr| attr.value.clone())
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let mut parser = Parser::new(text);
        let path = parser.parse_path(&[])?;
        if let Some(ch) = parser.peek() {
            return Err(PathError::UnexpectedChar {
                path: text.to_string(),
                position: parser.pos,
                found: ch,
            });
        }
        Ok(path)
    }
}

impl TryFrom<String> for NodePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.source
    }
}

/// Errors while compiling a path expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Blank path text
    #[error("path is empty")]
    Empty,

    /// Absolute paths are not supported
    #[error("path must be relative: '{0}'")]
    Absolute(String),

    /// Two separators in a row or a trailing separator
    #[error("path '{0}' contains an empty step")]
    EmptyStep(String),

    /// Character not allowed at this position
    #[error("unexpected '{found}' at offset {position} in path '{path}'")]
    UnexpectedChar {
        path: String,
        position: usize,
        found: char,
    },

    /// Input ended early
    #[error("unexpected end of path '{0}'")]
    UnexpectedEnd(String),

    /// An attribute step must be the last step
    #[error("attribute step must be last in path '{0}'")]
    AttributeNotLast(String),

    /// Position predicates are 1-based
    #[error("invalid position predicate in path '{0}'")]
    InvalidPosition(String),
}

struct Parser<'s> {
    source: &'s str,
    chars: Vec<char>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> PathError {
        match self.peek() {
            Some(found) => PathError::UnexpectedChar {
                path: self.source.to_string(),
                position: self.pos,
                found,
            },
            None => PathError::UnexpectedEnd(self.source.to_string()),
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), PathError> {
        if self.peek() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Parse steps until end of input or one of `stops`
    fn parse_path(&mut self, stops: &[char]) -> Result<NodePath, PathError> {
        let start = self.pos;
        self.skip_ws();
        match self.peek() {
            None => return Err(PathError::Empty),
            Some('/') => return Err(PathError::Absolute(self.source.to_string())),
            Some(ch) if stops.contains(&ch) => return Err(PathError::Empty),
            _ => {}
        }

        let mut steps = Vec::new();
        let mut attribute = None;
        loop {
            if attribute.is_some() {
                return Err(PathError::AttributeNotLast(self.source.to_string()));
            }
            match self.peek() {
                Some('.') if self.peek_at(1) == Some('.') => {
                    self.pos += 2;
                    steps.push(Step::Parent);
                }
                Some('.') => {
                    self.pos += 1;
                    steps.push(Step::Current);
                }
                Some('@') => {
                    self.pos += 1;
                    attribute = Some(self.parse_name_test()?);
                }
                Some('/') | None => return Err(PathError::EmptyStep(self.source.to_string())),
                Some(_) => {
                    let test = self.parse_name_test()?;
                    let mut predicates = Vec::new();
                    while self.peek() == Some('[') {
                        predicates.push(self.parse_predicate()?);
                    }
                    steps.push(Step::Child { test, predicates });
                }
            }

            match self.peek() {
                Some('/') => self.pos += 1,
                None => break,
                Some(ch) if stops.contains(&ch) || ch.is_whitespace() => break,
                Some(_) => return Err(self.unexpected()),
            }
        }

        let source: String = self.chars[start..self.pos].iter().collect();
        Ok(NodePath {
            source: source.trim().to_string(),
            steps,
            attribute,
        })
    }

    fn parse_name_test(&mut self) -> Result<NameTest, PathError> {
        if self.peek() == Some('*') {
            self.pos += 1;
            return Ok(NameTest {
                prefix: None,
                local: "*".to_string(),
            });
        }
        let first = self.parse_ncname()?;
        if self.peek() == Some(':') {
            self.pos += 1;
            let local = if self.peek() == Some('*') {
                self.pos += 1;
                "*".to_string()
            } else {
                self.parse_ncname()?
            };
            return Ok(NameTest {
                prefix: Some(first),
                local,
            });
        }
        Ok(NameTest {
            prefix: None,
            local: first,
        })
    }

    fn parse_ncname(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch.is_alphabetic() || ch == '_' => self.pos += 1,
            _ => return Err(self.unexpected()),
        }
        while self
            .peek()
            .is_some_and(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        {
            self.pos += 1;
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_predicate(&mut self) -> Result<Predicate, PathError> {
        self.expect('[')?;
        self.skip_ws();

        if self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            let position = digits
                .parse::<usize>()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| PathError::InvalidPosition(self.source.to_string()))?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(Predicate::Position(position));
        }

        let path = self.parse_path(&['=', ']'])?;
        self.skip_ws();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(Predicate::Exists(path))
            }
            Some('=') => {
                self.pos += 1;
                self.skip_ws();
                let literal = self.parse_literal()?;
                self.skip_ws();
                self.expect(']')?;
                Ok(Predicate::Equals(path, literal))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_literal(&mut self) -> Result<String, PathError> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|ch| ch != quote) {
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(PathError::UnexpectedEnd(self.source.to_string()));
        }
        let literal = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(literal)
    }
}
