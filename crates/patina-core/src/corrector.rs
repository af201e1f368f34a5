//! Edit collector and source corrector
//!
//! A [`Corrector`] accumulates textual edits against one immutable source
//! buffer and applies them as a single consistent rewrite. Ranges may touch
//! at boundaries but must not overlap: two Replace/Remove spans that share
//! even one byte make the whole edit set fail with
//! [`PatinaError::EditConflict`], and no output is produced.
//!
//! Ordering at identical offsets is deterministic: InsertBefore edits apply
//! before a Replace/Remove starting there, InsertAfter edits apply after.
//! Edits added in any order produce the same output.

use serde::{Deserialize, Serialize};

use crate::error::PatinaError;
use crate::tree::Span;
use crate::Result;

/// The operation an edit performs at its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Substitute the range with the payload
    Replace,
    /// Delete the range
    Remove,
    /// Insert the payload at a zero-width position, before anything else
    /// anchored there
    InsertBefore,
    /// Insert the payload at a zero-width position, after anything else
    /// anchored there
    InsertAfter,
}

/// One textual edit against a source buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub span: Span,
    pub kind: EditKind,
    pub text: String,
}

impl Edit {
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            kind: EditKind::Replace,
            text: text.into(),
        }
    }

    pub fn remove(span: Span) -> Self {
        Self {
            span,
            kind: EditKind::Remove,
            text: String::new(),
        }
    }

    pub fn insert_before(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::at(offset),
            kind: EditKind::InsertBefore,
            text: text.into(),
        }
    }

    pub fn insert_after(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::at(offset),
            kind: EditKind::InsertAfter,
            text: text.into(),
        }
    }

    fn is_insert(&self) -> bool {
        matches!(self.kind, EditKind::InsertBefore | EditKind::InsertAfter)
    }

    /// Sort rank at identical offsets: InsertBefore < Replace/Remove <
    /// InsertAfter
    fn rank(&self) -> u8 {
        match self.kind {
            EditKind::InsertBefore => 0,
            EditKind::Replace | EditKind::Remove => 1,
            EditKind::InsertAfter => 2,
        }
    }
}

/// Accumulates edits for one source buffer and applies them atomically
#[derive(Debug, Clone, Default)]
pub struct Corrector {
    edits: Vec<Edit>,
}

impl Corrector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Append an edit; validation happens in [`Corrector::apply`]
    pub fn add(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    /// Append every edit of a fix
    pub fn extend(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.add(Edit::replace(span, text));
    }

    pub fn remove(&mut self, span: Span) {
        self.add(Edit::remove(span));
    }

    pub fn insert_before(&mut self, span: Span, text: impl Into<String>) {
        self.add(Edit::insert_before(span.start, text));
    }

    pub fn insert_after(&mut self, span: Span, text: impl Into<String>) {
        self.add(Edit::insert_after(span.end, text));
    }

    /// Surround a span with a prefix and a suffix
    pub fn wrap(&mut self, span: Span, before: impl Into<String>, after: impl Into<String>) {
        self.insert_before(span, before);
        self.insert_after(span, after);
    }

    /// Apply the collected edits to `source`, producing the rewritten
    /// string or failing with the first range conflict. All-or-nothing:
    /// on error the source is untouched and no partial output exists.
    pub fn apply(&self, source: &str) -> Result<String> {
        let order = self.sorted_order();
        self.validate(source, &order)?;

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for &i in &order {
            let edit = &self.edits[i];
            if edit.is_insert() {
                let pos = edit.span.start;
                if pos > cursor {
                    out.push_str(&source[cursor..pos]);
                    cursor = pos;
                }
                out.push_str(&edit.text);
            } else {
                out.push_str(&source[cursor..edit.span.start]);
                out.push_str(&edit.text);
                cursor = edit.span.end;
            }
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }

    /// Stable order by (position, kind rank); ties keep insertion order
    fn sorted_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.edits.len()).collect();
        order.sort_by_key(|&i| (self.edits[i].span.start, self.edits[i].rank()));
        order
    }

    fn validate(&self, source: &str, order: &[usize]) -> Result<()> {
        for edit in &self.edits {
            if source.get(edit.span.start..edit.span.end).is_none() {
                return Err(PatinaError::InvalidEdit {
                    span: edit.span,
                    len: source.len(),
                });
            }
        }

        // The replaced span reaching furthest right so far; any later edit
        // starting inside it conflicts.
        let mut open: Option<Span> = None;
        for &i in order {
            let edit = &self.edits[i];
            if edit.is_insert() {
                let pos = edit.span.start;
                if let Some(span) = open {
                    if pos > span.start && pos < span.end {
                        return Err(PatinaError::edit_conflict(span, edit.span));
                    }
                }
            } else {
                if let Some(span) = open {
                    if span.overlaps(&edit.span) {
                        return Err(PatinaError::edit_conflict(span, edit.span));
                    }
                }
                if open.is_none_or(|span| edit.span.end > span.end) {
                    open = Some(edit.span);
                }
            }
        }
        Ok(())
    }
}
