//! Markup → Markdown serialization
//!
//! Converts a markup node tree (the editable surface's representation) back
//! into the canonical Markdown dialect. Recursive depth-first traversal
//! with one emission rule per recognized tag; anything unrecognized passes
//! its children through transparently, so the walker is total — it never
//! fails, whatever tree it is handed.
//!
//! Known limitations, kept deliberately:
//! - underline (`u`) has no Markdown equivalent and is dropped (children
//!   pass through unstyled)
//! - nested lists are not indented; their items serialize as siblings at
//!   one level

use crate::markup::node::{parse_markup, MarkupElement, MarkupNode};

/// Serialize a markup snapshot string to Markdown.
///
/// Convenience wrapper: parses the snapshot and serializes the tree.
pub fn markup_to_markdown(markup: &str) -> String {
    serialize_to_markdown(&parse_markup(markup))
}

/// Serialize a markup node sequence to Markdown.
pub fn serialize_to_markdown(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        walk(node, &mut out, false);
    }
    normalize(&out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Traversal
// ─────────────────────────────────────────────────────────────────────────────

fn walk(node: &MarkupNode, out: &mut String, in_code_block: bool) {
    match node {
        MarkupNode::Text(text) => out.push_str(text),
        MarkupNode::Element(el) => walk_element(el, out, in_code_block),
    }
}

fn walk_element(el: &MarkupElement, out: &mut String, in_code_block: bool) {
    match el.tag.as_str() {
        "strong" | "b" => wrap_inline(el, out, "**"),
        "em" | "i" => wrap_inline(el, out, "*"),
        "s" | "del" | "strike" => wrap_inline(el, out, "~~"),
        // Underline has no Markdown equivalent; the style is dropped
        "u" => walk_children(el, out, in_code_block),

        "h1" | "h2" | "h3" | "h4" => {
            let level = el.tag[1..].parse::<usize>().unwrap_or(1);
            out.push_str(&"#".repeat(level));
            out.push(' ');
            walk_children(el, out, in_code_block);
            out.push_str("\n\n");
        }

        "p" => {
            walk_children(el, out, in_code_block);
            out.push_str("\n\n");
        }

        "br" => out.push('\n'),

        "ul" => walk_list(el, out, false),
        "ol" => walk_list(el, out, true),

        // A list item outside a list container contributes its children only;
        // the parent list supplies prefixes
        "li" => walk_children(el, out, in_code_block),

        "blockquote" => {
            let mut inner = String::new();
            walk_children(el, &mut inner, in_code_block);
            for line in inner.lines().filter(|line| !line.trim().is_empty()) {
                out.push_str("> ");
                out.push_str(line.trim());
                out.push('\n');
            }
            out.push('\n');
        }

        "code" => {
            if in_code_block {
                // The enclosing pre emits the fences; content stays raw
                out.push_str(&el_text(el));
            } else {
                out.push('`');
                walk_children(el, out, in_code_block);
                out.push('`');
            }
        }

        "pre" => {
            let mut inner = String::new();
            walk_children(el, &mut inner, true);
            out.push_str("```\n");
            out.push_str(inner.trim());
            out.push_str("\n```\n\n");
        }

        "a" => {
            out.push('[');
            walk_children(el, out, in_code_block);
            out.push_str("](");
            out.push_str(el.attr("href").unwrap_or(""));
            out.push(')');
        }

        "hr" => out.push_str("---\n\n"),

        // Generic wrappers and anything unrecognized: children only
        _ => walk_children(el, out, in_code_block),
    }
}

fn walk_children(el: &MarkupElement, out: &mut String, in_code_block: bool) {
    for child in &el.children {
        walk(child, out, in_code_block);
    }
}

fn wrap_inline(el: &MarkupElement, out: &mut String, delimiter: &str) {
    out.push_str(delimiter);
    walk_children(el, out, false);
    out.push_str(delimiter);
}

fn walk_list(el: &MarkupElement, out: &mut String, ordered: bool) {
    // A list nested directly after inline content starts on its own line,
    // which is what flattens it into sibling items
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    let mut index = 0;
    for child in &el.children {
        // Formatting whitespace between items is not an item
        if matches!(child, MarkupNode::Text(t) if t.trim().is_empty()) {
            continue;
        }
        index += 1;
        let mut item = String::new();
        walk(child, &mut item, false);
        if ordered {
            out.push_str(&format!("{}. ", index));
        } else {
            out.push_str("- ");
        }
        out.push_str(item.trim());
        out.push('\n');
    }
    out.push('\n');
}

fn el_text(el: &MarkupElement) -> String {
    let mut text = String::new();
    for child in &el.children {
        match child {
            MarkupNode::Text(t) => text.push_str(t),
            MarkupNode::Element(inner) => text.push_str(&el_text(inner)),
        }
    }
    text
}

// ─────────────────────────────────────────────────────────────────────────────
// Post-processing
// ─────────────────────────────────────────────────────────────────────────────

/// Collapse runs of 3+ newlines to exactly 2, then trim the result.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newline_run = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newline_run += 1;
            if newline_run <= 2 {
                out.push(ch);
            }
        } else {
            newline_run = 0;
            out.push(ch);
        }
    }
    out.trim().to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
