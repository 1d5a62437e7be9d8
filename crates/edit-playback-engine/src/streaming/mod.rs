//! Progressive playback of text edits.
//!
//! A replacement is split into word chunks by a [`WordTokenizer`], paced by a
//! [`ChunkStream`] on a tokio interval, and applied to a [`Document`] one chunk
//! at a time by [`perform_async_text_edit`]. The target range is tracked by an
//! anchor decoration that is looked up fresh before every chunk.
//!
//! [`Document`]: crate::editing::Document

pub mod chunk_stream;
pub mod progressive;
pub mod undo;
pub mod words;

pub use chunk_stream::{ChunkStream, MIN_WORDS_PER_SECOND, StreamState, chunk_period};
pub use progressive::{
    AsyncTextEdit, EditError, EditHooks, EditObserver, ProgressSink, ProgressiveEdit,
    as_progressive_edit, perform_async_text_edit,
};
pub use undo::UndoGroup;
pub use words::{WhitespaceWords, WordChunk, WordTokenizer};
