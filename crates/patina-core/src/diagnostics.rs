//! Diagnostic types and utilities

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::corrector::Edit;
use crate::source::SourceFile;
use crate::tree::Span;
use crate::Result;

/// Represents a diagnostic message from one rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique identifier for the rule that generated this diagnostic
    pub rule_id: String,
    /// Severity level of the diagnostic
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Location in the source file
    pub location: Location,
    /// Optional autocorrection paired with this diagnostic
    pub fix: Option<Fix>,
}

/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational messages
    Info,
    /// Hints for improvements
    Hint,
    /// Warnings that should be addressed
    Warning,
    /// Errors that must be fixed
    Error,
}

/// Whether an autocorrection can be applied without review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Applicability {
    /// Safe to apply automatically
    Always,
    /// Semantic change, requires review
    MaybeIncorrect,
}

/// Location information for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// Byte span in the file
    pub span: Span,
}

/// An autocorrection attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// Description of what the fix does
    pub description: String,
    /// The edits making up the fix
    pub edits: Vec<Edit>,
    /// Whether the fix is safe to apply automatically
    pub applicability: Applicability,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            location,
            fix: None,
        }
    }

    /// Attach an autocorrection
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn has_safe_fix(&self) -> bool {
        self.fix
            .as_ref()
            .is_some_and(|f| f.applicability == Applicability::Always)
    }
}

impl Location {
    /// Resolve a span against a source file
    pub fn from_span(file: &SourceFile, span: Span) -> Self {
        let (line, column) = file.offset_to_line_col(span.start);
        Self {
            file: file.path().to_path_buf(),
            line,
            column,
            span,
        }
    }
}

impl Fix {
    pub fn safe(description: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            description: description.into(),
            edits,
            applicability: Applicability::Always,
        }
    }

    pub fn unsafe_fix(description: impl Into<String>, edits: Vec<Edit>) -> Self {
        Self {
            description: description.into(),
            edits,
            applicability: Applicability::MaybeIncorrect,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Serialize diagnostics for machine-readable output
pub fn diagnostics_to_json(diagnostics: &[Diagnostic]) -> Result<String> {
    serde_json::to_string_pretty(diagnostics)
        .map_err(|e| crate::PatinaError::internal_error(format!("serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        let file = SourceFile::new("test.rb", "x == nil\n");
        Location::from_span(&file, Span::new(0, 8))
    }

    #[test]
    fn test_diagnostic_roundtrip() {
        let diag = Diagnostic::new(
            "Style/NilComparison",
            Severity::Warning,
            "Prefer the use of the `nil?` predicate.",
            location(),
        );
        let json = diagnostics_to_json(std::slice::from_ref(&diag)).unwrap();
        let parsed: Vec<Diagnostic> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![diag]);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Hint);
        assert!(Severity::Hint > Severity::Info);
    }

    #[test]
    fn test_safe_fix_detection() {
        let diag = Diagnostic::new("test-rule", Severity::Warning, "msg", location());
        assert!(!diag.has_safe_fix());
        let diag = diag.with_fix(Fix::safe("replace", vec![]));
        assert!(diag.has_safe_fix());
    }
}
