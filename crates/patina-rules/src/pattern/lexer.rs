//! Tokenizer for the node-pattern DSL
//!
//! Pattern sources are short and compiled once per rule, so the lexer is a
//! plain byte-offset scanner. Every token records the offset it started at,
//! which flows into [`PatinaError::PatternCompile`] diagnostics.

use patina_core::{PatinaError, Result};

/// One token of pattern source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    /// `$` capture marker
    Dollar,
    /// `!` negation
    Bang,
    /// `_` or `_name`, matches any single child
    Wildcard,
    /// `...` variadic gap
    Rest,
    /// Bare identifier, a node kind in head position
    Ident(String),
    /// `send?` or `str_type?` style kind check
    TypePred(String),
    /// `nil?`, matches only the absent-child slot
    NilPred,
    /// `#name`, caller-supplied predicate
    Predicate(String),
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    /// `%1` style positional parameter, 1-based
    Param(usize),
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let b = bytes[pos];
        match b {
            // Commas are separators in the surface syntax; treat like spaces.
            b' ' | b'\t' | b'\n' | b'\r' | b',' => {
                pos += 1;
            }
            b'(' => {
                tokens.push(Token { kind: TokenKind::LParen, offset: start });
                pos += 1;
            }
            b')' => {
                tokens.push(Token { kind: TokenKind::RParen, offset: start });
                pos += 1;
            }
            b'{' => {
                tokens.push(Token { kind: TokenKind::LBrace, offset: start });
                pos += 1;
            }
            b'}' => {
                tokens.push(Token { kind: TokenKind::RBrace, offset: start });
                pos += 1;
            }
            b'[' => {
                tokens.push(Token { kind: TokenKind::LBracket, offset: start });
                pos += 1;
            }
            b']' => {
                tokens.push(Token { kind: TokenKind::RBracket, offset: start });
                pos += 1;
            }
            b'$' => {
                tokens.push(Token { kind: TokenKind::Dollar, offset: start });
                pos += 1;
            }
            b'!' => {
                tokens.push(Token { kind: TokenKind::Bang, offset: start });
                pos += 1;
            }
            b'.' => {
                if bytes[pos..].starts_with(b"...") {
                    tokens.push(Token { kind: TokenKind::Rest, offset: start });
                    pos += 3;
                } else {
                    return Err(PatinaError::pattern_compile(
                        "expected `...`, found a lone `.`",
                        start,
                    ));
                }
            }
            b'_' => {
                pos += 1;
                // An optional name after the underscore is documentation only.
                while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                    pos += 1;
                }
                tokens.push(Token { kind: TokenKind::Wildcard, offset: start });
            }
            b':' => {
                pos += 1;
                let name_start = pos;
                while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                    pos += 1;
                }
                if pos == name_start {
                    // Operator selectors: `:==`, `:[]`, `:!`, `:<=>` and kin.
                    while pos < bytes.len() && is_operator_byte(bytes[pos]) {
                        pos += 1;
                    }
                }
                if pos == name_start {
                    return Err(PatinaError::pattern_compile("empty symbol literal", start));
                }
                // Predicate-named symbols like `:nil?`
                if pos < bytes.len() && (bytes[pos] == b'?' || bytes[pos] == b'!') {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Sym(source[name_start..pos].to_string()),
                    offset: start,
                });
            }
            b'"' => {
                pos += 1;
                let text_start = pos;
                while pos < bytes.len() && bytes[pos] != b'"' {
                    pos += 1;
                }
                if pos == bytes.len() {
                    return Err(PatinaError::pattern_compile(
                        "unterminated string literal",
                        start,
                    ));
                }
                tokens.push(Token {
                    kind: TokenKind::Str(source[text_start..pos].to_string()),
                    offset: start,
                });
                pos += 1;
            }
            b'#' => {
                pos += 1;
                let name_start = pos;
                while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                    pos += 1;
                }
                if pos < bytes.len() && bytes[pos] == b'?' {
                    pos += 1;
                }
                if pos == name_start {
                    return Err(PatinaError::pattern_compile(
                        "expected predicate name after `#`",
                        start,
                    ));
                }
                tokens.push(Token {
                    kind: TokenKind::Predicate(source[name_start..pos].to_string()),
                    offset: start,
                });
            }
            b'%' => {
                pos += 1;
                let digit_start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == digit_start {
                    return Err(PatinaError::pattern_compile(
                        "expected parameter index after `%`",
                        start,
                    ));
                }
                let index: usize = source[digit_start..pos].parse().map_err(|_| {
                    PatinaError::pattern_compile("parameter index out of range", start)
                })?;
                if index == 0 {
                    return Err(PatinaError::pattern_compile(
                        "parameter indices are 1-based",
                        start,
                    ));
                }
                tokens.push(Token { kind: TokenKind::Param(index), offset: start });
            }
            b'-' | b'0'..=b'9' => {
                pos = lex_number(source, bytes, start, &mut tokens)?;
            }
            b if b.is_ascii_alphabetic() => {
                pos += 1;
                while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                    pos += 1;
                }
                if pos < bytes.len() && bytes[pos] == b'?' {
                    let name = &source[start..pos];
                    pos += 1;
                    if name == "nil" {
                        tokens.push(Token { kind: TokenKind::NilPred, offset: start });
                    } else {
                        // `str_type?` and bare `send?` both check the kind tag.
                        let kind = name.strip_suffix("_type").unwrap_or(name);
                        tokens.push(Token {
                            kind: TokenKind::TypePred(kind.to_string()),
                            offset: start,
                        });
                    }
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Ident(source[start..pos].to_string()),
                        offset: start,
                    });
                }
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(PatinaError::pattern_compile(
                    format!("unexpected character `{ch}`"),
                    start,
                ));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(
    source: &str,
    bytes: &[u8],
    start: usize,
    tokens: &mut Vec<Token>,
) -> Result<usize> {
    let mut pos = start;
    if bytes[pos] == b'-' {
        pos += 1;
        if pos == bytes.len() || !bytes[pos].is_ascii_digit() {
            return Err(PatinaError::pattern_compile(
                "expected digits after `-`",
                start,
            ));
        }
    }
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    // A fractional part needs a digit after the dot, otherwise the dot
    // belongs to a following `...`.
    let is_float = pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit();
    if is_float {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let value: f64 = source[start..pos]
            .parse()
            .map_err(|_| PatinaError::pattern_compile("malformed float literal", start))?;
        tokens.push(Token { kind: TokenKind::Float(value), offset: start });
    } else {
        let value: i64 = source[start..pos]
            .parse()
            .map_err(|_| PatinaError::pattern_compile("integer literal out of range", start))?;
        tokens.push(Token { kind: TokenKind::Int(value), offset: start });
    }
    Ok(pos)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_operator_byte(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'<' | b'>' | b'=' | b'!' | b'&' | b'|' | b'^' | b'~'
            | b'[' | b']'
    )
}
