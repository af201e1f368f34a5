//! Pattern execution against immutable syntax trees
//!
//! A [`Pattern`] is compiled once and shared read-only between threads.
//! Matching is deterministic: alternation takes the first branch that
//! succeeds, `...` gaps are split greedily at a single point, and captures
//! come back in the order their `$` markers appear in the pattern source.
//!
//! Failure to match is a `None`, never an error. Errors exist only at
//! compile time.

use std::collections::HashMap;

use patina_core::{Node, Result, Value};
use tracing::warn;

use super::lexer::tokenize;
use super::parser::{count_captures, parse, Arg, Lit, Pat};

/// A compiled node pattern
#[derive(Debug)]
pub struct Pattern {
    source: String,
    root: Pat,
    captures: usize,
}

/// What a pattern element is currently being tested against: a tree node or
/// a bare child slot (symbol, literal, absent).
#[derive(Debug, Clone, Copy)]
pub enum MatchTarget<'a> {
    Node(&'a Node),
    Value(&'a Value),
}

impl<'a> MatchTarget<'a> {
    /// The node behind this target, unwrapping a node-valued child slot
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            MatchTarget::Node(node) => Some(node),
            MatchTarget::Value(value) => value.as_node(),
        }
    }

    fn capture(&self) -> Capture<'a> {
        match self {
            MatchTarget::Node(node) => Capture::Node(node),
            MatchTarget::Value(Value::Node(node)) => Capture::Node(node),
            MatchTarget::Value(value) => Capture::Value(value),
        }
    }
}

/// One bound capture
#[derive(Debug, Clone, Copy)]
pub enum Capture<'a> {
    Node(&'a Node),
    Value(&'a Value),
    /// A captured `...` gap, the run of children it absorbed
    Seq(&'a [Value]),
}

impl<'a> Capture<'a> {
    pub fn as_node(&self) -> Option<&'a Node> {
        match self {
            Capture::Node(node) => Some(node),
            Capture::Value(value) => value.as_node(),
            Capture::Seq(_) => None,
        }
    }

    pub fn as_seq(&self) -> Option<&'a [Value]> {
        match self {
            Capture::Seq(values) => Some(values),
            _ => None,
        }
    }
}

/// Captures bound by one successful match, in pattern source order
#[derive(Debug)]
pub struct MatchResult<'a> {
    captures: Vec<Capture<'a>>,
}

impl<'a> MatchResult<'a> {
    pub fn get(&self, index: usize) -> Option<Capture<'a>> {
        self.captures.get(index).copied()
    }

    /// Shorthand for the common node-valued capture
    pub fn node(&self, index: usize) -> Option<&'a Node> {
        self.get(index)?.as_node()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}

/// Resolves `#name` predicates at match time
pub trait PredicateResolver {
    fn call(&self, name: &str, target: MatchTarget<'_>, args: &[Lit]) -> bool;
}

/// Resolver for patterns that use no predicates; any `#name` reference is
/// reported once and fails the match.
pub struct NoPredicates;

impl PredicateResolver for NoPredicates {
    fn call(&self, name: &str, _target: MatchTarget<'_>, _args: &[Lit]) -> bool {
        warn!(predicate = name, "unknown pattern predicate, treating as no match");
        false
    }
}

type PredicateFn = Box<dyn Fn(MatchTarget<'_>, &[Lit]) -> bool + Send + Sync>;

/// Name-indexed table of predicate closures
#[derive(Default)]
pub struct PredicateTable {
    entries: HashMap<String, PredicateFn>,
}

impl PredicateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(MatchTarget<'_>, &[Lit]) -> bool + Send + Sync + 'static,
    ) {
        self.entries.insert(name.into(), Box::new(f));
    }
}

impl PredicateResolver for PredicateTable {
    fn call(&self, name: &str, target: MatchTarget<'_>, args: &[Lit]) -> bool {
        match self.entries.get(name) {
            Some(f) => f(target, args),
            None => {
                warn!(predicate = name, "unknown pattern predicate, treating as no match");
                false
            }
        }
    }
}

static NO_PREDICATES: NoPredicates = NoPredicates;

/// Per-match inputs: `%n` parameters and the predicate resolver
pub struct MatchContext<'a> {
    pub params: &'a [Lit],
    pub predicates: &'a dyn PredicateResolver,
}

impl Default for MatchContext<'_> {
    fn default() -> Self {
        Self { params: &[], predicates: &NO_PREDICATES }
    }
}

impl<'a> MatchContext<'a> {
    pub fn with_params(params: &'a [Lit]) -> Self {
        Self { params, predicates: &NO_PREDICATES }
    }

    pub fn with_predicates(predicates: &'a dyn PredicateResolver) -> Self {
        Self { params: &[], predicates }
    }
}

impl Pattern {
    /// Compile pattern source, or fail with the offset of the first problem
    pub fn compile(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let root = parse(&tokens, source.len())?;
        let captures = count_captures(&root);
        Ok(Self { source: source.to_string(), root, captures })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of captures a successful match will bind
    pub fn capture_count(&self) -> usize {
        self.captures
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.match_node(node).is_some()
    }

    /// Match against a single node; `None` means no match
    pub fn match_node<'a>(&self, node: &'a Node) -> Option<MatchResult<'a>> {
        self.match_with(node, &MatchContext::default())
    }

    pub fn match_with<'a>(
        &self,
        node: &'a Node,
        ctx: &MatchContext<'_>,
    ) -> Option<MatchResult<'a>> {
        let mut caps = Vec::with_capacity(self.captures);
        if match_pat(&self.root, MatchTarget::Node(node), ctx, &mut caps) {
            Some(MatchResult { captures: caps })
        } else {
            None
        }
    }

    /// First matching node in a pre-order walk of `root`'s subtree
    pub fn search<'a>(
        &self,
        root: &'a Node,
        ctx: &MatchContext<'_>,
    ) -> Option<(&'a Node, MatchResult<'a>)> {
        root.descendants()
            .find_map(|node| self.match_with(node, ctx).map(|result| (node, result)))
    }

    /// Every matching node in a pre-order walk of `root`'s subtree
    pub fn search_all<'a>(
        &self,
        root: &'a Node,
        ctx: &MatchContext<'_>,
    ) -> Vec<(&'a Node, MatchResult<'a>)> {
        root.descendants()
            .filter_map(|node| self.match_with(node, ctx).map(|result| (node, result)))
            .collect()
    }
}

fn match_pat<'a>(
    pat: &Pat,
    target: MatchTarget<'a>,
    ctx: &MatchContext<'_>,
    caps: &mut Vec<Capture<'a>>,
) -> bool {
    match pat {
        Pat::Wildcard => true,
        Pat::NilPred => matches!(target, MatchTarget::Value(Value::None)),
        Pat::KindIs(kind) => target.as_node().is_some_and(|n| n.kind() == kind),
        Pat::Lit(lit) => lit_matches(lit, target),
        Pat::Param(index) => match ctx.params.get(index - 1) {
            Some(lit) => lit_matches(lit, target),
            None => {
                warn!(param = index, "pattern parameter not supplied, treating as no match");
                false
            }
        },
        Pat::Node { kind, children } => {
            let Some(node) = target.as_node() else {
                return false;
            };
            if let Some(kind) = kind {
                if node.kind() != kind {
                    return false;
                }
            }
            match_children(children, node.children(), ctx, caps)
        }
        Pat::Any(branches) => {
            let checkpoint = caps.len();
            for branch in branches {
                if match_pat(branch, target, ctx, caps) {
                    return true;
                }
                caps.truncate(checkpoint);
            }
            false
        }
        Pat::All(branches) => {
            let checkpoint = caps.len();
            for branch in branches {
                if !match_pat(branch, target, ctx, caps) {
                    caps.truncate(checkpoint);
                    return false;
                }
            }
            true
        }
        Pat::Capture(inner) => {
            // The capture slot is claimed before the inner pattern runs so
            // nested captures land after their enclosing one.
            caps.push(target.capture());
            match_pat(inner, target, ctx, caps)
        }
        Pat::Not(inner) => {
            let checkpoint = caps.len();
            let matched = match_pat(inner, target, ctx, caps);
            caps.truncate(checkpoint);
            !matched
        }
        Pat::Predicate { name, args } => {
            let mut resolved = Vec::with_capacity(args.len());
            for arg in args {
                match arg {
                    Arg::Lit(lit) => resolved.push(lit.clone()),
                    Arg::Param(index) => match ctx.params.get(index - 1) {
                        Some(lit) => resolved.push(lit.clone()),
                        None => {
                            warn!(
                                param = index,
                                "pattern parameter not supplied, treating as no match"
                            );
                            return false;
                        }
                    },
                }
            }
            ctx.predicates.call(name, target, &resolved)
        }
        // Rest is consumed by match_children; reaching it here means the
        // parser let one through, which it does not.
        Pat::Rest => false,
    }
}

fn lit_matches(lit: &Lit, target: MatchTarget<'_>) -> bool {
    match target {
        MatchTarget::Value(value) => match (lit, value) {
            (Lit::Sym(a), Value::Sym(b)) => a == b,
            (Lit::Str(a), Value::Str(b)) => a == b,
            (Lit::Int(a), Value::Int(b)) => a == b,
            (Lit::Float(a), Value::Float(b)) => a == b,
            (Lit::Bool(a), Value::Bool(b)) => a == b,
            (Lit::Nil, Value::None) => true,
            // Parsers represent literal `nil`/`true`/`false` expressions as
            // leaf nodes; accept those spellings too.
            (Lit::Nil, Value::Node(node)) => node.kind() == "nil",
            (Lit::Bool(true), Value::Node(node)) => node.kind() == "true",
            (Lit::Bool(false), Value::Node(node)) => node.kind() == "false",
            _ => false,
        },
        MatchTarget::Node(node) => match lit {
            Lit::Nil => node.kind() == "nil",
            Lit::Bool(true) => node.kind() == "true",
            Lit::Bool(false) => node.kind() == "false",
            _ => false,
        },
    }
}

/// Match a child pattern list against a node's children. With no `...` the
/// arity must be exact; with one, the gap absorbs whatever the fixed prefix
/// and suffix leave over.
fn match_children<'a>(
    pats: &[Pat],
    values: &'a [Value],
    ctx: &MatchContext<'_>,
    caps: &mut Vec<Capture<'a>>,
) -> bool {
    let rest_at = pats.iter().position(is_rest_pat);

    let Some(rest_at) = rest_at else {
        if pats.len() != values.len() {
            return false;
        }
        let checkpoint = caps.len();
        for (pat, value) in pats.iter().zip(values) {
            if !match_pat(pat, MatchTarget::Value(value), ctx, caps) {
                caps.truncate(checkpoint);
                return false;
            }
        }
        return true;
    };

    let prefix = &pats[..rest_at];
    let suffix = &pats[rest_at + 1..];
    if values.len() < prefix.len() + suffix.len() {
        return false;
    }

    let checkpoint = caps.len();
    for (pat, value) in prefix.iter().zip(values) {
        if !match_pat(pat, MatchTarget::Value(value), ctx, caps) {
            caps.truncate(checkpoint);
            return false;
        }
    }

    let gap_end = values.len() - suffix.len();
    let mut rest = &pats[rest_at];
    while let Pat::Capture(inner) = rest {
        caps.push(Capture::Seq(&values[prefix.len()..gap_end]));
        rest = inner;
    }

    for (pat, value) in suffix.iter().zip(&values[gap_end..]) {
        if !match_pat(pat, MatchTarget::Value(value), ctx, caps) {
            caps.truncate(checkpoint);
            return false;
        }
    }
    true
}

fn is_rest_pat(pat: &Pat) -> bool {
    match pat {
        Pat::Rest => true,
        Pat::Capture(inner) => is_rest_pat(inner),
        _ => false,
    }
}
