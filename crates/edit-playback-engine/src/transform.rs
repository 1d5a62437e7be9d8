//! Conversion between line/column positions and byte offsets.
//!
//! [`PositionOffsetTransformer`] is a thin adapter over anything that
//! implements [`OffsetIndex`]. It keeps no line index of its own; every call
//! goes straight to the backing store, so a transformer over a live
//! [`Document`](crate::editing::Document) always sees the current text.
//! The borrow it holds ties its lifetime to the backing store.

use std::ops::Range;

use thiserror::Error;

use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("line {line} is outside the document (1..={line_count})")]
    LineOutOfRange { line: usize, line_count: usize },
    #[error("column {column} is outside line {line} (1..={max_column})")]
    ColumnOutOfRange {
        line: usize,
        column: usize,
        max_column: usize,
    },
    #[error("offset {offset} is past the end of the document ({len} bytes)")]
    OffsetOutOfRange { offset: usize, len: usize },
    #[error("offset {offset} is inside a multi-byte character")]
    NotCharBoundary { offset: usize },
}

/// Capability shared by every text store that can map positions to offsets.
///
/// Lines are separated by `\n` only. A `\r` is ordinary line content, which
/// keeps every offset in `0..=len()` addressable by exactly one position.
pub trait OffsetIndex {
    /// Number of lines; an empty text has one line.
    fn line_count(&self) -> usize;

    /// Length of the text in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn offset_at(&self, position: Position) -> Result<usize, RangeError>;

    fn position_at(&self, offset: usize) -> Result<Position, RangeError>;
}

/// Immutable text that answers position queries by scanning.
#[derive(Debug, Clone, Copy)]
pub struct StaticText<'a> {
    text: &'a str,
}

impl<'a> StaticText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn transformer(&self) -> PositionOffsetTransformer<'_> {
        PositionOffsetTransformer::new(self)
    }
}

impl OffsetIndex for StaticText<'_> {
    fn line_count(&self) -> usize {
        self.text.bytes().filter(|&b| b == b'\n').count() + 1
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn offset_at(&self, position: Position) -> Result<usize, RangeError> {
        let out_of_range = || RangeError::LineOutOfRange {
            line: position.line,
            line_count: self.line_count(),
        };
        if position.line == 0 {
            return Err(out_of_range());
        }

        let line_start = if position.line == 1 {
            0
        } else {
            self.text
                .match_indices('\n')
                .nth(position.line - 2)
                .map(|(newline, _)| newline + 1)
                .ok_or_else(out_of_range)?
        };

        let rest = &self.text[line_start..];
        let line_len = rest.find('\n').unwrap_or(rest.len());
        check_column(position, line_len)?;
        let offset = line_start + position.column - 1;
        if !self.text.is_char_boundary(offset) {
            return Err(RangeError::NotCharBoundary { offset });
        }
        Ok(offset)
    }

    fn position_at(&self, offset: usize) -> Result<Position, RangeError> {
        if offset > self.text.len() {
            return Err(RangeError::OffsetOutOfRange {
                offset,
                len: self.text.len(),
            });
        }
        if !self.text.is_char_boundary(offset) {
            return Err(RangeError::NotCharBoundary { offset });
        }

        let mut line = 1;
        let mut line_start = 0;
        for (i, &byte) in self.text.as_bytes().iter().enumerate().take(offset) {
            if byte == b'\n' {
                line += 1;
                line_start = i + 1;
            }
        }

        Ok(Position::new(line, offset - line_start + 1))
    }
}

/// Validates a 1-based column against a line of `line_len` bytes, excluding
/// the terminator. The column just past the last character is valid.
pub(crate) fn check_column(position: Position, line_len: usize) -> Result<(), RangeError> {
    let max_column = line_len + 1;
    if position.column == 0 || position.column > max_column {
        return Err(RangeError::ColumnOutOfRange {
            line: position.line,
            column: position.column,
            max_column,
        });
    }
    Ok(())
}

/// Bidirectional position/offset mapping bound to one backing store.
#[derive(Clone, Copy)]
pub struct PositionOffsetTransformer<'a> {
    source: &'a dyn OffsetIndex,
}

impl<'a> PositionOffsetTransformer<'a> {
    pub fn new(source: &'a dyn OffsetIndex) -> Self {
        Self { source }
    }

    pub fn offset(&self, position: Position) -> Result<usize, RangeError> {
        self.source.offset_at(position)
    }

    pub fn position(&self, offset: usize) -> Result<Position, RangeError> {
        self.source.position_at(offset)
    }

    /// Converts a pair of positions to an ordered byte range.
    pub fn offset_range(&self, start: Position, end: Position) -> Result<Range<usize>, RangeError> {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        Ok(self.offset(start)?..self.offset(end)?)
    }

    pub fn position_range(&self, range: Range<usize>) -> Result<(Position, Position), RangeError> {
        Ok((self.position(range.start)?, self.position(range.end)?))
    }
}
