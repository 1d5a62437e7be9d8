pub mod editing;
pub mod position;
pub mod streaming;
pub mod transform;


// Re-export key types for easier usage
pub use editing::{Decoration, DecorationId, Document, DocumentError, Patch, Stickiness, TextEdit};
pub use position::Position;
pub use streaming::{
    AsyncTextEdit, ChunkStream, EditError, EditHooks, EditObserver, ProgressSink, ProgressiveEdit,
    UndoGroup, as_progressive_edit, perform_async_text_edit,
};
pub use transform::{OffsetIndex, PositionOffsetTransformer, RangeError, StaticText};
