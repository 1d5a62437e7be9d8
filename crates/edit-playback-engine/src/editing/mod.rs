/*!
 * # Editing Core Module
 *
 * The live side of the engine: a mutable text document plus the tracked
 * ranges ("decorations") that follow its text through edits.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: xi-rope Buffer
 * - The entire document is stored in a single **`xi_rope::Rope`** buffer
 * - Each edit is compiled to an xi-rope **Delta** and applied in one step
 * - Line lookups use the rope's line metric, so position/offset conversion
 *   stays incremental as the document changes
 *
 * ### 2. One Edit at a Time
 * - Every mutation is a single [`TextEdit`] (replace or insert)
 * - Applying it returns a [`Patch`] with the inverse edit, which is all a
 *   caller needs to build undo on top
 *
 * ### 3. Decorations as Handles
 * - Decorations live in an arena owned by the document and are addressed by
 *   generational [`DecorationId`] handles
 * - Their ranges are moved through each edit according to [`Stickiness`]
 * - Callers look a range up fresh when they need it; a removed decoration
 *   simply stops resolving
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` with the rope buffer and decoration table
 * - **`decorations`**: decoration types and the boundary movement rules
 * - **`edit`**: the `TextEdit` operation
 * - **`patch`**: edit result metadata including the inverse edits
 */

pub mod decorations;
pub mod document;
pub mod edit;
pub mod patch;

pub use decorations::{Decoration, DecorationId, Stickiness};
pub use document::{Document, DocumentError};
pub use edit::TextEdit;
pub use patch::Patch;
