//! Error types and handling for the pattern engine and corrector

use std::path::PathBuf;
use thiserror::Error;

use crate::tree::Span;

/// Main error type for all Patina operations
#[derive(Debug, Error)]
pub enum PatinaError {
    /// Malformed pattern source, rejected at compile time
    #[error("Pattern compile error: {message} at offset {offset}")]
    PatternCompile { message: String, offset: usize },

    /// Syntax errors reported by the external source parser
    #[error("Parse error: {message} at offset {offset}")]
    Parse { message: String, offset: usize },

    /// Two edits in one edit set cover overlapping source ranges
    #[error("Conflicting edits: {first} overlaps {second}")]
    EditConflict { first: Span, second: Span },

    /// An edit range that does not address the source buffer cleanly
    #[error("Invalid edit range {span} for source of length {len}")]
    InvalidEdit { span: Span, len: usize },

    /// File system I/O errors
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rule registration or execution errors
    #[error("Rule error in '{rule_id}': {message}")]
    Rule { rule_id: String, message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PatternCompile,
    Parse,
    Edit,
    Io,
    Rule,
    Internal,
}

impl PatinaError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PatinaError::PatternCompile { .. } => ErrorKind::PatternCompile,
            PatinaError::Parse { .. } => ErrorKind::Parse,
            PatinaError::EditConflict { .. } | PatinaError::InvalidEdit { .. } => ErrorKind::Edit,
            PatinaError::Io { .. } => ErrorKind::Io,
            PatinaError::Rule { .. } => ErrorKind::Rule,
            PatinaError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Check if this error is recoverable (can continue processing other
    /// rules or files). A pattern that fails to compile halts registration
    /// for that rule; an edit conflict aborts only one file's rewrite.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Rule | ErrorKind::Edit)
    }

    /// Create a pattern compile error
    pub fn pattern_compile(message: impl Into<String>, offset: usize) -> Self {
        Self::PatternCompile {
            message: message.into(),
            offset,
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>, offset: usize) -> Self {
        Self::Parse {
            message: message.into(),
            offset,
        }
    }

    /// Create an edit conflict error
    pub fn edit_conflict(first: Span, second: Span) -> Self {
        Self::EditConflict { first, second }
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a rule error
    pub fn rule_error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for PatinaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}
