use crate::editing::{Document, DocumentError, TextEdit};
use crate::streaming::ProgressSink;

/// Collects the inverse edits of a whole progressive edit so it can be undone
/// as a single step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoGroup {
    steps: Vec<Vec<TextEdit>>,
}

impl UndoGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reverts every captured step, newest first.
    ///
    /// Only valid while nothing else has edited the document since the group
    /// was recorded.
    pub fn undo(self, doc: &mut Document) -> Result<(), DocumentError> {
        log::debug!("undoing {} captured steps", self.steps.len());
        for step in self.steps.into_iter().rev() {
            for edit in step.into_iter().rev() {
                doc.apply_edit(edit)?;
            }
        }
        Ok(())
    }
}

impl ProgressSink for UndoGroup {
    fn report(&mut self, undo: &[TextEdit]) {
        self.steps.push(undo.to_vec());
    }
}
