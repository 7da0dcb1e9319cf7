//! Bidirectional conversion between markup trees and Markdown
//!
//! This module is the conversion engine of the crate: a markup node tree
//! (what the live editable surface holds) on one side, the constrained
//! Markdown dialect (the canonical, persisted form) on the other.
//!
//! - [`markdown_to_markup`] compiles Markdown into a markup string for
//!   injection into an editable surface
//! - [`markup_to_markdown`] / [`serialize_to_markdown`] walk a markup tree
//!   back into canonical Markdown
//! - [`parse_markup`] / [`write_markup`] are the snapshot codec between
//!   markup strings and node trees
//!
//! Every function here is total and pure. The pair is idempotent after one
//! normalization pass: converting Markdown to markup and back may adjust
//! formatting once, but a second round trip of the result is a no-op.

mod compiler;
mod node;
mod walker;

pub use compiler::markdown_to_markup;
pub use node::{html_escape, parse_markup, unescape_entities, write_markup, MarkupElement, MarkupNode};
pub use walker::{markup_to_markdown, serialize_to_markdown};

pub(crate) use compiler::{
    bold_italic_re, bold_re, bullet_re, fence_re, group_list_lines, h1_re, h2_re, h3_re, hr_re,
    inline_code_re, italic_re, link_re, ordered_re, quote_re, strike_re, wrap_paragraphs,
};

// ─────────────────────────────────────────────────────────────────────────────
// Round-Trip Conformance Tests
// ─────────────────────────────────────────────────────────────────────────────
