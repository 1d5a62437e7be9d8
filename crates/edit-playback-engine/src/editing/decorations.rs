use std::cmp::Ordering;
use std::ops::Range;

use slotmap::new_key_type;

use crate::editing::Document;

new_key_type! {
    /// Handle to a decoration owned by a [`Document`].
    ///
    /// Handles are generational: once the decoration is removed the handle
    /// never resolves again, even if its slot is reused.
    pub struct DecorationId;
}

/// How a decoration's boundaries react to text typed exactly at them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stickiness {
    #[default]
    AlwaysGrowsWhenTypingAtEdges,
    NeverGrowsWhenTypingAtEdges,
    GrowsOnlyWhenTypingBefore,
    GrowsOnlyWhenTypingAfter,
}

/// A tracked byte range that follows the text through edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub stickiness: Stickiness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerMove {
    /// The boundary's own stickiness decides.
    Defined,
    /// The boundary stays where it is.
    ForceStay,
}

/// Whether a boundary at `marker` keeps its place for an edit point at `check`.
fn stays_before(
    marker: usize,
    sticks_to_previous: bool,
    check: usize,
    semantics: MarkerMove,
) -> bool {
    match marker.cmp(&check) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match semantics {
            MarkerMove::ForceStay => true,
            MarkerMove::Defined => sticks_to_previous,
        },
    }
}

impl Decoration {
    pub fn new(range: Range<usize>, stickiness: Stickiness) -> Self {
        Self { range, stickiness }
    }

    /// Returns whether the start and end boundaries stick to the character
    /// before them.
    fn sticks_to_previous(&self) -> (bool, bool) {
        use Stickiness::*;

        // A collapsed anchor that grows only after keeps its start in place.
        let start = matches!(
            self.stickiness,
            AlwaysGrowsWhenTypingAtEdges | GrowsOnlyWhenTypingBefore
        ) || (self.stickiness == GrowsOnlyWhenTypingAfter && self.range.is_empty());
        let end = matches!(
            self.stickiness,
            NeverGrowsWhenTypingAtEdges | GrowsOnlyWhenTypingBefore
        );
        (start, end)
    }

    /// Moves the range through an edit that replaced `edit` with `inserted`
    /// bytes.
    pub(crate) fn accept_edit(&mut self, edit: Range<usize>, inserted: usize) {
        let (start_sticks, end_sticks) = self.sticks_to_previous();
        let deleted = edit.len();
        let common = deleted.min(inserted);

        let mut new_start = None;
        let mut new_end = None;

        // Boundaries at or before the edit start
        let semantics = if deleted > 0 {
            MarkerMove::ForceStay
        } else {
            MarkerMove::Defined
        };
        if stays_before(self.range.start, start_sticks, edit.start, semantics) {
            new_start = Some(self.range.start);
        }
        if stays_before(self.range.end, end_sticks, edit.start, semantics) {
            new_end = Some(self.range.end);
        }

        // Boundaries inside the overwritten prefix keep their offset
        if common > 0 {
            let semantics = if deleted > inserted {
                MarkerMove::ForceStay
            } else {
                MarkerMove::Defined
            };
            let check = edit.start + common;
            if new_start.is_none()
                && stays_before(self.range.start, start_sticks, check, semantics)
            {
                new_start = Some(self.range.start);
            }
            if new_end.is_none() && stays_before(self.range.end, end_sticks, check, semantics) {
                new_end = Some(self.range.end);
            }
        }

        // Boundaries up to the edit end land after the inserted text
        if new_start.is_none()
            && stays_before(self.range.start, start_sticks, edit.end, MarkerMove::Defined)
        {
            new_start = Some(edit.start + inserted);
        }
        if new_end.is_none()
            && stays_before(self.range.end, end_sticks, edit.end, MarkerMove::Defined)
        {
            new_end = Some(edit.start + inserted);
        }

        let delta = inserted as isize - deleted as isize;
        let start = new_start.unwrap_or_else(|| self.range.start.saturating_add_signed(delta));
        let end = new_end.unwrap_or_else(|| self.range.end.saturating_add_signed(delta));
        self.range = start..end.max(start);
    }
}

/// Move every decoration in the document through an applied edit
pub(crate) fn transform_decorations(doc: &mut Document, edit: Range<usize>, inserted: usize) {
    for (_, decoration) in doc.decorations.iter_mut() {
        decoration.accept_edit(edit.clone(), inserted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn after_edit(
        range: Range<usize>,
        stickiness: Stickiness,
        edit: Range<usize>,
        inserted: usize,
    ) -> Range<usize> {
        let mut decoration = Decoration::new(range, stickiness);
        decoration.accept_edit(edit, inserted);
        decoration.range
    }

    // Typing three bytes at the start (5) and end (10) of 5..10
    #[rstest]
    #[case(Stickiness::AlwaysGrowsWhenTypingAtEdges, 5, 5..13)]
    #[case(Stickiness::AlwaysGrowsWhenTypingAtEdges, 10, 5..13)]
    #[case(Stickiness::NeverGrowsWhenTypingAtEdges, 5, 8..13)]
    #[case(Stickiness::NeverGrowsWhenTypingAtEdges, 10, 5..10)]
    #[case(Stickiness::GrowsOnlyWhenTypingBefore, 5, 5..13)]
    #[case(Stickiness::GrowsOnlyWhenTypingBefore, 10, 5..10)]
    #[case(Stickiness::GrowsOnlyWhenTypingAfter, 5, 8..13)]
    #[case(Stickiness::GrowsOnlyWhenTypingAfter, 10, 5..13)]
    fn typing_at_edges_follows_stickiness(
        #[case] stickiness: Stickiness,
        #[case] at: usize,
        #[case] expected: Range<usize>,
    ) {
        assert_eq!(after_edit(5..10, stickiness, at..at, 3), expected);
    }

    #[test]
    fn edits_before_shift_and_edits_after_are_ignored() {
        let stickiness = Stickiness::GrowsOnlyWhenTypingAfter;
        assert_eq!(after_edit(5..10, stickiness, 0..2, 0), 3..8);
        assert_eq!(after_edit(5..10, stickiness, 1..1, 4), 9..14);
        assert_eq!(after_edit(5..10, stickiness, 12..15, 1), 5..10);
    }

    #[test]
    fn replacing_the_whole_range_keeps_start_and_tracks_new_end() {
        let stickiness = Stickiness::GrowsOnlyWhenTypingAfter;
        // longer, equal and shorter replacements
        assert_eq!(after_edit(0..11, stickiness, 0..11, 8), 0..8);
        assert_eq!(after_edit(4..8, stickiness, 4..8, 4), 4..8);
        assert_eq!(after_edit(4..8, stickiness, 4..8, 10), 4..14);
    }

    #[test]
    fn collapsed_anchor_growing_after_keeps_its_start() {
        let stickiness = Stickiness::GrowsOnlyWhenTypingAfter;
        assert_eq!(after_edit(6..6, stickiness, 6..6, 5), 6..11);
    }

    #[test]
    fn deleting_across_a_boundary_clamps_it() {
        let stickiness = Stickiness::AlwaysGrowsWhenTypingAtEdges;
        // delete 3..7 which covers the start of 5..10
        assert_eq!(after_edit(5..10, stickiness, 3..7, 0), 3..6);
        // delete everything the range covers and more
        assert_eq!(after_edit(5..10, stickiness, 2..12, 0), 2..2);
    }
}
