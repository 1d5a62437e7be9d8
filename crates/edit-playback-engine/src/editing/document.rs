use std::borrow::Cow;
use std::ops::Range;

use slotmap::SlotMap;
use thiserror::Error;
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::editing::{Decoration, DecorationId, Patch, Stickiness, TextEdit};
use crate::position::Position;
use crate::transform::{OffsetIndex, PositionOffsetTransformer, RangeError, check_column};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("range {start}..{end} is outside the document ({len} bytes)")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },
    #[error("range {start}..{end} ends before it starts")]
    ReversedRange { start: usize, end: usize },
    #[error("offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
}

/// A live, mutable text document.
///
/// The text lives in an `xi_rope::Rope`, so edits and line lookups stay cheap
/// as the document grows. Alongside the text the document owns a table of
/// [`Decoration`]s: tracked ranges addressed by [`DecorationId`] handles and
/// moved through every edit applied with [`Document::apply_edit`].
///
/// ```rust
/// # use edit_playback_engine::editing::{Document, Stickiness, TextEdit};
/// let mut doc = Document::new("hello world");
/// let anchor = doc
///     .add_decoration(6..11, Stickiness::GrowsOnlyWhenTypingAfter)
///     .unwrap();
///
/// let patch = doc.apply_edit(TextEdit::insert(11, "!")).unwrap();
///
/// assert_eq!(doc.text(), "hello world!");
/// assert_eq!(doc.decoration_range(anchor), Some(6..12));
/// assert_eq!(patch.version, doc.version());
/// ```
#[derive(Clone)]
pub struct Document {
    pub(crate) buffer: Rope,
    /// Incremented on each applied edit
    pub(crate) version: u64,
    pub(crate) decorations: SlotMap<DecorationId, Decoration>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            version: 0,
            decorations: SlotMap::with_key(),
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    /// Get the document's content as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn slice(&self, range: Range<usize>) -> Result<Cow<'_, str>, DocumentError> {
        self.check_range(&range)?;
        Ok(self.buffer.slice_to_cow(range))
    }

    pub fn transformer(&self) -> PositionOffsetTransformer<'_> {
        PositionOffsetTransformer::new(self)
    }

    /// Apply a single replace/insert to the document.
    ///
    /// Every decoration is moved through the edit according to its
    /// [`Stickiness`]. The returned [`Patch`] carries the inverse edit, so a
    /// caller can undo exactly this change.
    pub fn apply_edit(&mut self, edit: TextEdit) -> Result<Patch, DocumentError> {
        self.check_range(&edit.range)?;

        let removed = self.buffer.slice_to_cow(edit.range.clone()).into_owned();
        let inserted = edit.text.len();

        if !edit.is_noop() {
            let mut builder = Builder::new(self.buffer.len());
            builder.replace(edit.range.clone(), Rope::from(edit.text.as_str()));
            let delta = builder.build();
            self.buffer = delta.apply(&self.buffer);
        }

        self.transform_decorations(edit.range.clone(), inserted);
        self.version += 1;

        let changed = edit.range.start..edit.range.start + inserted;
        Ok(Patch {
            undo: vec![TextEdit::replace(changed.clone(), removed)],
            changed,
            version: self.version,
        })
    }

    /// Register a tracked range. The range must lie inside the document.
    pub fn add_decoration(
        &mut self,
        range: Range<usize>,
        stickiness: Stickiness,
    ) -> Result<DecorationId, DocumentError> {
        self.check_range(&range)?;
        let id = self
            .decorations
            .insert(Decoration::new(range.clone(), stickiness));
        log::trace!("added decoration {id:?} over {range:?}");
        Ok(id)
    }

    pub fn decoration(&self, id: DecorationId) -> Option<&Decoration> {
        self.decorations.get(id)
    }

    /// Current range of a decoration, or `None` once it has been removed.
    pub fn decoration_range(&self, id: DecorationId) -> Option<Range<usize>> {
        self.decorations.get(id).map(|d| d.range.clone())
    }

    /// Returns `false` if the decoration was already gone.
    pub fn remove_decoration(&mut self, id: DecorationId) -> bool {
        let removed = self.decorations.remove(id).is_some();
        if removed {
            log::trace!("removed decoration {id:?}");
        }
        removed
    }

    pub fn decoration_count(&self) -> usize {
        self.decorations.len()
    }

    pub(crate) fn transform_decorations(&mut self, edit: Range<usize>, inserted: usize) {
        crate::editing::decorations::transform_decorations(self, edit, inserted)
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), DocumentError> {
        let len = self.buffer.len();
        if range.start > range.end {
            return Err(DocumentError::ReversedRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > len {
            return Err(DocumentError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len,
            });
        }
        // Line lookups assume a codepoint boundary, so this check comes first
        for offset in [range.start, range.end] {
            if !self.buffer.is_codepoint_boundary(offset) {
                return Err(DocumentError::NotCharBoundary(offset));
            }
        }
        Ok(())
    }

    /// Byte offset of the end of a 0-based line, excluding its `\n`.
    fn line_content_end(&self, line: usize) -> usize {
        if line + 1 < self.line_count() {
            self.buffer.offset_of_line(line + 1) - 1
        } else {
            self.buffer.len()
        }
    }
}

impl OffsetIndex for Document {
    fn line_count(&self) -> usize {
        self.buffer.line_of_offset(self.buffer.len()) + 1
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn offset_at(&self, position: Position) -> Result<usize, RangeError> {
        let line_count = self.line_count();
        if position.line == 0 || position.line > line_count {
            return Err(RangeError::LineOutOfRange {
                line: position.line,
                line_count,
            });
        }

        let line = position.line - 1;
        let line_start = self.buffer.offset_of_line(line);
        check_column(position, self.line_content_end(line) - line_start)?;
        let offset = line_start + position.column - 1;
        if !self.buffer.is_codepoint_boundary(offset) {
            return Err(RangeError::NotCharBoundary { offset });
        }
        Ok(offset)
    }

    fn position_at(&self, offset: usize) -> Result<Position, RangeError> {
        let len = self.buffer.len();
        if offset > len {
            return Err(RangeError::OffsetOutOfRange { offset, len });
        }
        if !self.buffer.is_codepoint_boundary(offset) {
            return Err(RangeError::NotCharBoundary { offset });
        }

        let line = self.buffer.line_of_offset(offset);
        let line_start = self.buffer.offset_of_line(line);
        Ok(Position::new(line + 1, offset - line_start + 1))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.buffer.to_string())
            .field("version", &self.version)
            .field("decorations", &self.decorations)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        // Decoration tables are compared by content; handles are per-document
        self.buffer.to_string() == other.buffer.to_string()
            && self.version == other.version
            && self.decorations.values().eq(other.decorations.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::StaticText;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    // ============ Basic document tests ============

    #[test]
    fn test_document_from_bytes_valid_utf8() {
        let text = "# Hello World\n\nThis is a test document.";
        let doc = Document::from_bytes(text.as_bytes()).expect("Should create document");

        assert_eq!(doc.to_bytes(), text.as_bytes());
        assert_eq!(doc.version(), 0);
        assert_eq!(doc.decoration_count(), 0);
    }

    #[test]
    fn test_document_from_bytes_invalid_utf8() {
        let invalid_bytes = vec![0xFF, 0xFE, 0xFD];
        assert!(Document::from_bytes(&invalid_bytes).is_err());
    }

    #[test]
    fn test_document_with_unicode_and_line_endings() {
        let text = "Hello 世界! 🦀\r\nWindows line\nUnix line\n";
        let doc = Document::from_bytes(text.as_bytes()).expect("Should handle Unicode");
        assert_eq!(doc.text(), text);
    }

    // ============ Edit tests ============

    #[test]
    fn test_apply_edit_replaces_and_returns_inverse() {
        let mut doc = Document::new("hello world");

        let patch = doc.apply_edit(TextEdit::replace(0..5, "goodbye")).unwrap();

        assert_eq!(doc.text(), "goodbye world");
        assert_eq!(patch.changed, 0..7);
        assert_eq!(patch.undo, vec![TextEdit::replace(0..7, "hello")]);
        assert_eq!(patch.version, 1);

        for undo in patch.undo {
            doc.apply_edit(undo).unwrap();
        }
        assert_eq!(doc.text(), "hello world");
        assert_eq!(doc.version(), 2);
    }

    #[test]
    fn test_apply_edit_insert_and_delete() {
        let mut doc = Document::new("ac");
        doc.apply_edit(TextEdit::insert(1, "b")).unwrap();
        assert_eq!(doc.text(), "abc");
        let patch = doc.apply_edit(TextEdit::delete(0..2)).unwrap();
        assert_eq!(doc.text(), "c");
        assert_eq!(patch.changed, 0..0);
        assert_eq!(patch.undo, vec![TextEdit::replace(0..0, "ab")]);
    }

    #[test]
    fn test_noop_edit_still_bumps_version() {
        let mut doc = Document::new("abc");
        let patch = doc.apply_edit(TextEdit::insert(3, "")).unwrap();
        assert_eq!(doc.text(), "abc");
        assert_eq!(patch.version, 1);
    }

    #[rstest]
    #[case(2..9, DocumentError::RangeOutOfBounds { start: 2, end: 9, len: 8 })]
    #[case(5..3, DocumentError::ReversedRange { start: 5, end: 3 })]
    #[case(0..2, DocumentError::NotCharBoundary(2))]
    fn test_apply_edit_rejects_bad_ranges(
        #[case] range: std::ops::Range<usize>,
        #[case] error: DocumentError,
    ) {
        // "a世b\nc\n" is 8 bytes; byte 2 is inside 世
        let mut doc = Document::new("a世b\nc\n");
        let before = doc.text();
        assert_eq!(doc.apply_edit(TextEdit::replace(range, "x")), Err(error));
        assert_eq!(doc.text(), before);
        assert_eq!(doc.version(), 0);
    }

    // ============ Decoration tests ============

    #[test]
    fn test_decorations_follow_edits() {
        let mut doc = Document::new("one two three");
        let two = doc
            .add_decoration(4..7, Stickiness::NeverGrowsWhenTypingAtEdges)
            .unwrap();

        doc.apply_edit(TextEdit::insert(0, "zero ")).unwrap();
        assert_eq!(doc.decoration_range(two), Some(9..12));
        assert_eq!(doc.slice(9..12).unwrap(), "two");

        doc.apply_edit(TextEdit::insert(12, "!")).unwrap();
        assert_eq!(doc.decoration_range(two), Some(9..12));
    }

    #[test]
    fn test_removed_decoration_never_resolves() {
        let mut doc = Document::new("abc");
        let id = doc.add_decoration(0..1, Stickiness::default()).unwrap();

        assert!(doc.remove_decoration(id));
        assert!(!doc.remove_decoration(id));
        assert_eq!(doc.decoration_range(id), None);

        // A new decoration may reuse the slot but not the handle
        let other = doc.add_decoration(1..2, Stickiness::default()).unwrap();
        assert_ne!(id, other);
        assert_eq!(doc.decoration_range(id), None);
    }

    #[test]
    fn test_add_decoration_rejects_out_of_bounds() {
        let mut doc = Document::new("abc");
        assert!(doc.add_decoration(2..4, Stickiness::default()).is_err());
        assert_eq!(doc.decoration_count(), 0);
    }

    // ============ Offset index tests ============

    const TEXT: &str = "fn main() {\r\n    println!(\"é\");\n}\n";

    #[test]
    fn test_live_document_agrees_with_static_text() {
        let doc = Document::new(TEXT);
        let text = StaticText::new(TEXT);

        assert_eq!(doc.line_count(), text.line_count());
        for offset in 0..=TEXT.len() {
            let position = doc.position_at(offset);
            assert_eq!(position, text.position_at(offset), "offset {offset}");
            if let Ok(position) = position {
                assert_eq!(doc.offset_at(position), Ok(offset), "offset {offset}");
            }
        }
    }

    #[test]
    fn test_offsets_inside_a_character_are_errors() {
        let mut doc = Document::new("é");

        assert_eq!(
            doc.position_at(1),
            Err(RangeError::NotCharBoundary { offset: 1 })
        );
        assert_eq!(
            doc.transformer().offset(Position::new(1, 2)),
            Err(RangeError::NotCharBoundary { offset: 1 })
        );
        assert_eq!(doc.transformer().offset(Position::new(1, 3)), Ok(2));
        assert_eq!(
            doc.add_decoration(1..1, Stickiness::default()),
            Err(DocumentError::NotCharBoundary(1))
        );
        assert_eq!(doc.slice(0..1), Err(DocumentError::NotCharBoundary(1)));
        assert_eq!(doc.decoration_count(), 0);
    }

    #[test]
    fn test_offset_index_boundaries() {
        let doc = Document::new(TEXT);
        assert_eq!(doc.offset_at(Position::START), Ok(0));
        assert_eq!(doc.position_at(TEXT.len()), Ok(Position::new(4, 1)));
        assert_eq!(
            doc.offset_at(Position::new(5, 1)),
            Err(RangeError::LineOutOfRange {
                line: 5,
                line_count: 4
            })
        );
        assert_eq!(
            doc.offset_at(Position::new(3, 3)),
            Err(RangeError::ColumnOutOfRange {
                line: 3,
                column: 3,
                max_column: 2
            })
        );
        assert_eq!(
            doc.position_at(TEXT.len() + 1),
            Err(RangeError::OffsetOutOfRange {
                offset: TEXT.len() + 1,
                len: TEXT.len()
            })
        );
    }

    #[test]
    fn test_transformer_sees_live_edits() {
        let mut doc = Document::new("a\nb");
        assert_eq!(doc.transformer().offset(Position::new(2, 1)), Ok(2));

        doc.apply_edit(TextEdit::insert(0, "line\n")).unwrap();

        let transformer = doc.transformer();
        assert_eq!(transformer.offset(Position::new(2, 1)), Ok(5));
        assert_eq!(transformer.position(7), Ok(Position::new(3, 1)));
    }

    #[test]
    fn test_empty_document_has_one_line() {
        let doc = Document::default();
        assert!(doc.is_empty());
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.offset_at(Position::START), Ok(0));
    }
}
