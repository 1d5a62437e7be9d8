use std::ops::Range;

use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::editing::{DecorationId, Document, DocumentError, Stickiness, TextEdit};
use crate::streaming::ChunkStream;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("anchor {0:?} no longer resolves to a range in the document")]
    AnchorLost(DecorationId),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Receives the inverse edits of every applied chunk.
pub trait ProgressSink {
    fn report(&mut self, undo: &[TextEdit]);
}

impl<F> ProgressSink for F
where
    F: FnMut(&[TextEdit]),
{
    fn report(&mut self, undo: &[TextEdit]) {
        self(undo)
    }
}

/// Notified immediately before and after each chunk mutates the document.
pub trait EditObserver {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Optional collaborators of a progressive edit.
#[derive(Default)]
pub struct EditHooks<'a> {
    pub progress: Option<&'a mut dyn ProgressSink>,
    pub observer: Option<&'a mut dyn EditObserver>,
}

impl<'a> EditHooks<'a> {
    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn EditObserver) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// One replacement being typed into a document chunk by chunk.
///
/// The target range is tracked by an anchor decoration that grows when text
/// is inserted at its end. The first chunk overwrites whatever the anchor
/// spans; every later chunk is inserted at the anchor's end as it stands at
/// that moment, so edits elsewhere in the document between chunks are
/// followed rather than clobbered.
#[derive(Debug)]
pub struct ProgressiveEdit {
    anchor: DecorationId,
    first_chunk_emitted: bool,
}

impl ProgressiveEdit {
    pub fn begin(doc: &mut Document, range: Range<usize>) -> Result<Self, EditError> {
        let anchor = doc.add_decoration(range.clone(), Stickiness::GrowsOnlyWhenTypingAfter)?;
        log::debug!("progressive edit started over {range:?} with anchor {anchor:?}");
        Ok(Self {
            anchor,
            first_chunk_emitted: false,
        })
    }

    pub fn anchor(&self) -> DecorationId {
        self.anchor
    }

    pub fn apply_chunk(
        &mut self,
        doc: &mut Document,
        chunk: &str,
        hooks: &mut EditHooks<'_>,
    ) -> Result<(), EditError> {
        let Some(range) = doc.decoration_range(self.anchor) else {
            log::warn!("anchor {:?} was removed mid-edit", self.anchor);
            return Err(EditError::AnchorLost(self.anchor));
        };

        let edit = if self.first_chunk_emitted {
            TextEdit::insert(range.end, chunk)
        } else {
            TextEdit::replace(range, chunk)
        };

        if let Some(observer) = hooks.observer.as_deref_mut() {
            observer.start();
        }
        let applied = doc.apply_edit(edit);
        if let Some(observer) = hooks.observer.as_deref_mut() {
            observer.stop();
        }
        let patch = applied?;

        self.first_chunk_emitted = true;
        if let Some(progress) = hooks.progress.as_deref_mut() {
            progress.report(&patch.undo);
        }
        Ok(())
    }

    /// Releases the anchor. Safe to call after the anchor was lost.
    pub fn finish(self, doc: &mut Document) {
        if doc.remove_decoration(self.anchor) {
            log::debug!("progressive edit finished, anchor {:?} released", self.anchor);
        }
    }
}

/// A replacement of `range` whose text arrives as a stream of chunks.
#[derive(Debug)]
pub struct AsyncTextEdit<S> {
    pub range: Range<usize>,
    pub chunks: S,
}

/// Turns a plain replacement into one that is played back at
/// `words_per_second`, one word per chunk, until `cancellation` fires.
pub fn as_progressive_edit(
    range: Range<usize>,
    text: impl Into<String>,
    words_per_second: u32,
    cancellation: &CancellationToken,
) -> AsyncTextEdit<ChunkStream> {
    AsyncTextEdit {
        range,
        chunks: ChunkStream::new(text, words_per_second, cancellation),
    }
}

/// Applies every chunk of `edit` to `doc` in order.
///
/// Each chunk is fully applied before the next one is pulled from the stream.
/// The anchor is released when the stream ends, whether it completed or was
/// cancelled, and also when a chunk fails to apply.
pub async fn perform_async_text_edit<S>(
    doc: &mut Document,
    edit: AsyncTextEdit<S>,
    hooks: &mut EditHooks<'_>,
) -> Result<(), EditError>
where
    S: Stream<Item = String> + Unpin,
{
    let AsyncTextEdit { range, mut chunks } = edit;
    let mut progressive = ProgressiveEdit::begin(doc, range)?;

    while let Some(chunk) = chunks.next().await {
        if let Err(err) = progressive.apply_chunk(doc, &chunk, hooks) {
            progressive.finish(doc);
            return Err(err);
        }
    }

    progressive.finish(doc);
    Ok(())
}
