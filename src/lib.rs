//! redraft - Review-and-edit engine for generated documents
//!
//! A headless core for reviewing a generated document as rendered rich text,
//! editing it in a live WYSIWYG surface, and persisting the edits back as
//! Markdown — the portable, canonical form used for refinement requests,
//! clipboard export, and file export.
//!
//! # Architecture
//!
//! - [`markup`] - the bidirectional conversion engine: a markup node tree
//!   (the editable surface's representation) and the serializer/compiler
//!   pair that maps it to and from the supported Markdown dialect
//! - [`history`] - bounded undo/redo stacks keyed on surface snapshots
//! - [`sync`] - preview/edit mode orchestration with debounced autosave
//!   and explicit-close commit
//! - [`storage`] - the persistence contract plus in-memory and file-backed
//!   document stores
//! - [`export`] - one-way Markdown → presentational-markup transforms for
//!   print, PDF, and word-processor targets
//!
//! All conversions are total: every input, including empty or malformed
//! text, yields a best-effort string result. Unsupported constructs degrade
//! to the nearest supported approximation instead of failing.
//!
//! # Example
//! ```
//! use redraft::markup::{markdown_to_markup, markup_to_markdown};
//!
//! let markup = markdown_to_markup("# Title\n\nSome **bold** text.");
//! assert!(markup.starts_with("<h1>Title</h1>"));
//!
//! let markdown = markup_to_markdown(&markup);
//! assert_eq!(markdown, "# Title\n\nSome **bold** text.");
//! ```

pub mod error;
pub mod export;
pub mod history;
pub mod markup;
pub mod storage;
pub mod sync;

// Only export what callers actually need at the crate root
pub use error::{Error, Result};
pub use export::{render, ExportProfile};
pub use history::EditHistory;
pub use markup::{markdown_to_markup, markup_to_markdown, MarkupNode};
pub use storage::{DocumentStore, FileStore, MemoryStore};
pub use sync::{DocumentSession, EditableSurface, SyncConfig, ViewMode};
