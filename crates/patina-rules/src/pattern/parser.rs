//! Recursive-descent parser for the node-pattern DSL
//!
//! Produces the [`Pat`] tree the matcher walks. Structural validation
//! happens here rather than at match time: rest placement, alternation
//! capture balance, capture-under-negation, and nesting depth are all
//! rejected as [`PatinaError::PatternCompile`] before a pattern ever runs.

use patina_core::{PatinaError, Result};

use super::lexer::{Token, TokenKind};

/// Nesting guard; pattern sources are hand-written and shallow.
const MAX_DEPTH: usize = 64;

/// Literal value in pattern source
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
}

/// Argument to a caller-supplied predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Lit(Lit),
    Param(usize),
}

/// Compiled pattern tree
#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    /// `_`, matches any single child
    Wildcard,
    /// `...`, matches any run of children (including none)
    Rest,
    /// `nil?`, matches only the absent-child slot
    NilPred,
    /// `send?` / `str_type?`, matches a node by kind tag
    KindIs(String),
    Lit(Lit),
    /// `(kind children...)`; a `None` kind is the `(...)` any-node form
    Node { kind: Option<String>, children: Vec<Pat> },
    /// `{a b c}`, first branch that matches wins
    Any(Vec<Pat>),
    /// `[a b c]`, every branch must match
    All(Vec<Pat>),
    /// `$p`, records the matched target
    Capture(Box<Pat>),
    /// `!p`
    Not(Box<Pat>),
    /// `#name(args)`, deferred to the rule at match time
    Predicate { name: String, args: Vec<Arg> },
    /// `%n`, compared against the caller-supplied parameter list
    Param(usize),
}

impl Pat {
    /// Number of `$` captures in this subtree, in source order
    fn capture_count(&self) -> usize {
        match self {
            Pat::Capture(inner) => 1 + inner.capture_count(),
            Pat::Not(inner) => inner.capture_count(),
            Pat::Node { children, .. } | Pat::Any(children) | Pat::All(children) => {
                children.iter().map(Pat::capture_count).sum()
            }
            _ => 0,
        }
    }

    fn is_rest(&self) -> bool {
        match self {
            Pat::Rest => true,
            Pat::Capture(inner) => inner.is_rest(),
            _ => false,
        }
    }
}

pub fn parse(tokens: &[Token], source_len: usize) -> Result<Pat> {
    let mut parser = Parser { tokens, pos: 0, source_len };
    let root = parser.pattern(0, false)?;
    if let Some(token) = parser.peek() {
        return Err(PatinaError::pattern_compile(
            "unexpected trailing tokens after pattern",
            token.offset,
        ));
    }
    Ok(root)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source_len: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn offset(&self) -> usize {
        self.peek().map_or(self.source_len, |t| t.offset)
    }

    /// Parse one pattern element. `allow_rest` is true only directly inside
    /// a node's child list, the single place `...` is meaningful.
    fn pattern(&mut self, depth: usize, allow_rest: bool) -> Result<Pat> {
        if depth > MAX_DEPTH {
            return Err(PatinaError::pattern_compile(
                "pattern nesting too deep",
                self.offset(),
            ));
        }
        let token = self.next().ok_or_else(|| {
            PatinaError::pattern_compile("unexpected end of pattern", self.source_len)
        })?;
        match &token.kind {
            TokenKind::LParen => self.node(token.offset, depth),
            TokenKind::LBrace => self.group(token.offset, depth, TokenKind::RBrace),
            TokenKind::LBracket => self.group(token.offset, depth, TokenKind::RBracket),
            TokenKind::Dollar => {
                let inner = self.pattern(depth + 1, allow_rest)?;
                Ok(Pat::Capture(Box::new(inner)))
            }
            TokenKind::Bang => {
                let inner = self.pattern(depth + 1, false)?;
                if inner.capture_count() > 0 {
                    return Err(PatinaError::pattern_compile(
                        "captures inside `!` never bind and are rejected",
                        token.offset,
                    ));
                }
                Ok(Pat::Not(Box::new(inner)))
            }
            TokenKind::Wildcard => Ok(Pat::Wildcard),
            TokenKind::Rest => {
                if allow_rest {
                    Ok(Pat::Rest)
                } else {
                    Err(PatinaError::pattern_compile(
                        "`...` is only valid inside a node's child list",
                        token.offset,
                    ))
                }
            }
            TokenKind::NilPred => Ok(Pat::NilPred),
            TokenKind::TypePred(kind) => Ok(Pat::KindIs(kind.clone())),
            TokenKind::Predicate(name) => self.predicate(name.clone()),
            TokenKind::Param(index) => Ok(Pat::Param(*index)),
            TokenKind::Sym(name) => Ok(Pat::Lit(Lit::Sym(name.clone()))),
            TokenKind::Str(text) => Ok(Pat::Lit(Lit::Str(text.clone()))),
            TokenKind::Int(value) => Ok(Pat::Lit(Lit::Int(*value))),
            TokenKind::Float(value) => Ok(Pat::Lit(Lit::Float(*value))),
            TokenKind::Ident(name) => match name.as_str() {
                "true" => Ok(Pat::Lit(Lit::Bool(true))),
                "false" => Ok(Pat::Lit(Lit::Bool(false))),
                "nil" => Ok(Pat::Lit(Lit::Nil)),
                _ => Err(PatinaError::pattern_compile(
                    format!("bare identifier `{name}` outside node head position"),
                    token.offset,
                )),
            },
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => {
                Err(PatinaError::pattern_compile(
                    "unexpected closing delimiter",
                    token.offset,
                ))
            }
        }
    }

    /// `(kind children...)` or the any-node form `(...)`
    fn node(&mut self, open: usize, depth: usize) -> Result<Pat> {
        let kind = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Some(name)
            }
            Some(TokenKind::Rest) => None,
            Some(_) => {
                return Err(PatinaError::pattern_compile(
                    "expected node kind after `(`",
                    self.offset(),
                ));
            }
            None => {
                return Err(PatinaError::pattern_compile("unbalanced `(`", open));
            }
        };

        let mut children = Vec::new();
        let mut rest_seen = false;
        loop {
            match self.peek() {
                Some(token) if token.kind == TokenKind::RParen => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    let rest_offset = self.offset();
                    let child = self.pattern(depth + 1, true)?;
                    if child.is_rest() {
                        if rest_seen {
                            return Err(PatinaError::pattern_compile(
                                "at most one `...` per child list",
                                rest_offset,
                            ));
                        }
                        rest_seen = true;
                    }
                    children.push(child);
                }
                None => {
                    return Err(PatinaError::pattern_compile("unbalanced `(`", open));
                }
            }
        }

        Ok(Pat::Node { kind, children })
    }

    /// `{...}` alternation or `[...]` conjunction
    fn group(&mut self, open: usize, depth: usize, close: TokenKind) -> Result<Pat> {
        let mut branches = Vec::new();
        loop {
            match self.peek() {
                Some(token) if token.kind == close => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {
                    // Branches themselves cannot be `...`; a union of gaps
                    // has no sensible width.
                    branches.push(self.pattern(depth + 1, false)?);
                }
                None => {
                    return Err(PatinaError::pattern_compile("unbalanced group", open));
                }
            }
        }
        if branches.is_empty() {
            return Err(PatinaError::pattern_compile("empty group", open));
        }

        if close == TokenKind::RBrace {
            // Every branch must bind the same captures, so a match yields a
            // fixed-shape result no matter which branch fired.
            let expected = branches[0].capture_count();
            if branches.iter().any(|b| b.capture_count() != expected) {
                return Err(PatinaError::pattern_compile(
                    "alternation branches bind different capture counts",
                    open,
                ));
            }
            Ok(Pat::Any(branches))
        } else {
            Ok(Pat::All(branches))
        }
    }

    /// `#name` with an optional `(arg, ...)` list
    fn predicate(&mut self, name: String) -> Result<Pat> {
        let mut args = Vec::new();
        if self.peek().map(|t| &t.kind) == Some(&TokenKind::LParen) {
            let open = self.offset();
            self.pos += 1;
            loop {
                let token = self.next().ok_or_else(|| {
                    PatinaError::pattern_compile("unbalanced `(` in predicate arguments", open)
                })?;
                match &token.kind {
                    TokenKind::RParen => break,
                    TokenKind::Sym(s) => args.push(Arg::Lit(Lit::Sym(s.clone()))),
                    TokenKind::Str(s) => args.push(Arg::Lit(Lit::Str(s.clone()))),
                    TokenKind::Int(n) => args.push(Arg::Lit(Lit::Int(*n))),
                    TokenKind::Float(n) => args.push(Arg::Lit(Lit::Float(*n))),
                    TokenKind::Param(index) => args.push(Arg::Param(*index)),
                    TokenKind::Ident(name) => match name.as_str() {
                        "true" => args.push(Arg::Lit(Lit::Bool(true))),
                        "false" => args.push(Arg::Lit(Lit::Bool(false))),
                        "nil" => args.push(Arg::Lit(Lit::Nil)),
                        _ => {
                            return Err(PatinaError::pattern_compile(
                                "predicate arguments must be literals or parameters",
                                token.offset,
                            ));
                        }
                    },
                    _ => {
                        return Err(PatinaError::pattern_compile(
                            "predicate arguments must be literals or parameters",
                            token.offset,
                        ));
                    }
                }
            }
        }
        Ok(Pat::Predicate { name, args })
    }
}

/// Total number of captures a full pattern binds
pub fn count_captures(pat: &Pat) -> usize {
    pat.capture_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::lexer::tokenize;

    fn parse_str(source: &str) -> Result<Pat> {
        parse(&tokenize(source)?, source.len())
    }

    #[test]
    fn test_simple_node() {
        let pat = parse_str("(send _ :foo)").unwrap();
        assert_eq!(
            pat,
            Pat::Node {
                kind: Some("send".to_string()),
                children: vec![Pat::Wildcard, Pat::Lit(Lit::Sym("foo".to_string()))],
            }
        );
    }

    #[test]
    fn test_any_node_form() {
        let pat = parse_str("(...)").unwrap();
        assert_eq!(pat, Pat::Node { kind: None, children: vec![Pat::Rest] });
    }

    #[test]
    fn test_capture_and_alternation() {
        let pat = parse_str("(send $_ {:== :===} nil)").unwrap();
        match pat {
            Pat::Node { children, .. } => {
                assert!(matches!(children[0], Pat::Capture(_)));
                assert!(matches!(&children[1], Pat::Any(branches) if branches.len() == 2));
                assert_eq!(children[2], Pat::Lit(Lit::Nil));
            }
            other => panic!("unexpected pattern {other:?}"),
        }
    }

    #[test]
    fn test_captured_rest() {
        let pat = parse_str("(array $...)").unwrap();
        match pat {
            Pat::Node { children, .. } => {
                assert_eq!(children, vec![Pat::Capture(Box::new(Pat::Rest))]);
            }
            other => panic!("unexpected pattern {other:?}"),
        }
    }

    #[test]
    fn test_double_rest_rejected() {
        assert!(parse_str("(array ... _ ...)").is_err());
    }

    #[test]
    fn test_rest_outside_node_rejected() {
        assert!(parse_str("...").is_err());
        assert!(parse_str("{... _}").is_err());
    }

    #[test]
    fn test_unbalanced_alternation_captures_rejected() {
        let err = parse_str("{(send $_ :a) (send _ :b)}").unwrap_err();
        assert!(err.to_string().contains("capture counts"));
    }

    #[test]
    fn test_balanced_alternation_captures_accepted() {
        assert!(parse_str("{(send $_ :a) (send $_ :b)}").is_ok());
    }

    #[test]
    fn test_capture_under_negation_rejected() {
        assert!(parse_str("!(send $_ :foo)").is_err());
    }

    #[test]
    fn test_predicate_with_args() {
        let pat = parse_str("#allowed?(:verbose, 2, %1)").unwrap();
        assert_eq!(
            pat,
            Pat::Predicate {
                name: "allowed?".to_string(),
                args: vec![
                    Arg::Lit(Lit::Sym("verbose".to_string())),
                    Arg::Lit(Lit::Int(2)),
                    Arg::Param(1),
                ],
            }
        );
    }

    #[test]
    fn test_unbalanced_paren() {
        let err = parse_str("(send _").unwrap_err();
        assert!(matches!(err, PatinaError::PatternCompile { offset: 0, .. }));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse_str("(int 1) (int 2)").is_err());
    }

    #[test]
    fn test_deep_nesting_rejected() {
        let mut source = String::new();
        for _ in 0..100 {
            source.push_str("(begin ");
        }
        source.push('_');
        for _ in 0..100 {
            source.push(')');
        }
        let err = parse_str(&source).unwrap_err();
        assert!(err.to_string().contains("nesting"));
    }
}
