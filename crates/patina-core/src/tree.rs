//! Immutable syntax tree model
//!
//! Trees are produced by an external parser behind the [`SourceParser`]
//! boundary and consumed read-only by the pattern matcher. A node carries a
//! kind tag, an ordered child list, and the byte span it covers in the
//! source buffer. Children are owned by their parent; the tree is strictly
//! a tree (no sharing, no cycles) and lives for one analysis pass.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Half-open byte range into one source buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    /// Zero-width span at a single offset, used for insertions
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// True if the two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest span covering both
    pub fn join(&self, other: &Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One slot in a node's child list
///
/// Ruby-shaped trees mix node children with bare literals (a `send` node
/// holds its selector as a symbol, not as a nested node) and use an absent
/// slot for things like an implicit receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Node(Node),
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl Value {
    pub fn sym(name: impl Into<String>) -> Self {
        Value::Sym(name.into())
    }

    pub fn str(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    pub fn node(node: Node) -> Self {
        Value::Node(node)
    }

    /// True for the absent-child slot
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match self {
            Value::Sym(name) => Some(name),
            _ => None,
        }
    }
}

/// Immutable syntax tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    kind: String,
    children: Vec<Value>,
    span: Span,
}

impl Node {
    pub fn new(kind: impl Into<String>, children: Vec<Value>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            children,
            span,
        }
    }

    /// Leaf node with no children
    pub fn leaf(kind: impl Into<String>, span: Span) -> Self {
        Self::new(kind, Vec::new(), span)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn children(&self) -> &[Value] {
        &self.children
    }

    pub fn child(&self, index: usize) -> Option<&Value> {
        self.children.get(index)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Look up a child through the per-kind named-accessor table
    /// (e.g. `named("receiver")` on a `send` node)
    pub fn named(&self, name: &str) -> Option<&Value> {
        let accessors = NAMED_ACCESSORS.get(self.kind.as_str())?;
        let (_, index) = accessors.iter().find(|(n, _)| *n == name)?;
        self.children.get(*index)
    }

    /// Pre-order iterator over this node and every descendant node.
    /// Driven by an explicit stack so source nesting depth cannot
    /// overflow the call stack.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Render as an s-expression, for diagnostics and tests
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(&self.kind);
        for child in &self.children {
            out.push(' ');
            match child {
                Value::Node(node) => node.write_sexp(out),
                Value::Sym(name) => {
                    out.push(':');
                    out.push_str(name);
                }
                Value::Str(text) => {
                    out.push('"');
                    out.push_str(text);
                    out.push('"');
                }
                Value::Int(n) => out.push_str(&n.to_string()),
                Value::Float(n) => out.push_str(&n.to_string()),
                Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
                Value::None => out.push_str("nil"),
            }
        }
        out.push(')');
    }
}

/// Pre-order traversal over a subtree
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            if let Value::Node(child_node) = child {
                self.stack.push(child_node);
            }
        }
        Some(node)
    }
}

/// Boundary contract with the external parser.
///
/// The engine never parses Ruby itself; it accepts any producer of spanned
/// trees. A syntax error surfaces as [`crate::PatinaError::Parse`] and
/// short-circuits the whole pipeline for that file.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<Node>;
}

/// Per-kind named accessors, mapping accessor names to child indices.
/// Covers the node kinds the built-in rules and tests traffic in; unknown
/// kinds simply have no named accessors.
static NAMED_ACCESSORS: Lazy<HashMap<&'static str, &'static [(&'static str, usize)]>> =
    Lazy::new(|| {
        let mut table: HashMap<&'static str, &'static [(&'static str, usize)]> = HashMap::new();
        const SEND: &[(&str, usize)] = &[("receiver", 0), ("selector", 1)];
        table.insert("send", SEND);
        table.insert("csend", SEND);
        const DEF: &[(&str, usize)] = &[("name", 0), ("args", 1), ("body", 2)];
        table.insert("def", DEF);
        const DEFS: &[(&str, usize)] =
            &[("receiver", 0), ("name", 1), ("args", 2), ("body", 3)];
        table.insert("defs", DEFS);
        const BLOCK: &[(&str, usize)] = &[("call", 0), ("args", 1), ("body", 2)];
        table.insert("block", BLOCK);
        const IF: &[(&str, usize)] = &[("condition", 0), ("then", 1), ("else", 2)];
        table.insert("if", IF);
        const LOOP: &[(&str, usize)] = &[("condition", 0), ("body", 1)];
        table.insert("while", LOOP);
        table.insert("until", LOOP);
        const PAIR: &[(&str, usize)] = &[("key", 0), ("value", 1)];
        table.insert("pair", PAIR);
        const CONST: &[(&str, usize)] = &[("scope", 0), ("name", 1)];
        table.insert("const", CONST);
        const ASGN: &[(&str, usize)] = &[("name", 0), ("value", 1)];
        table.insert("lvasgn", ASGN);
        table.insert("ivasgn", ASGN);
        table.insert("gvasgn", ASGN);
        table
    });
