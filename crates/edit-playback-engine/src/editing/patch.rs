use std::ops::Range;

use crate::editing::TextEdit;

/// Result of applying an edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte range now occupied by the inserted text.
    pub changed: Range<usize>,
    /// Edits that restore the text as it was before this one.
    pub undo: Vec<TextEdit>,
    pub version: u64,
}
