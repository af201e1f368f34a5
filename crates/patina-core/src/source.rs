//! Source buffer with line/column mapping

use std::path::{Path, PathBuf};

use crate::tree::Span;

/// One immutable source buffer plus a precomputed line index.
///
/// Built once per file and shared read-only for the duration of an
/// analysis pass; spans on tree nodes and edits index into `content`.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    content: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let content = content.into();
        let mut line_starts = vec![0];
        for (i, b) in content.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Source text covered by a span, or None when the span does not
    /// address the buffer cleanly
    pub fn slice(&self, span: Span) -> Option<&str> {
        self.content.get(span.start..span.end)
    }

    /// Convert a byte offset to 1-based line and column
    pub fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line + 1, offset - self.line_starts[line] + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_line_col() {
        let file = SourceFile::new("test.rb", "line 1\nline 2\nline 3");
        assert_eq!(file.offset_to_line_col(0), (1, 1));
        assert_eq!(file.offset_to_line_col(5), (1, 6));
        assert_eq!(file.offset_to_line_col(7), (2, 1));
        assert_eq!(file.offset_to_line_col(14), (3, 1));
    }

    #[test]
    fn test_slice() {
        let file = SourceFile::new("test.rb", "puts \"hi\"");
        assert_eq!(file.slice(Span::new(0, 4)), Some("puts"));
        assert_eq!(file.slice(Span::new(5, 9)), Some("\"hi\""));
        assert_eq!(file.slice(Span::new(5, 99)), None);
    }
}
