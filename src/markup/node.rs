//! Markup node tree and snapshot codec
//!
//! The live editable surface exchanges its content as a markup string (an
//! HTML-like tag dialect). This module defines the node tree behind that
//! string and the codec between the two: `parse_markup` reads a snapshot
//! string into a tree, `write_markup` renders a tree back out.
//!
//! Both directions are total. Malformed input degrades instead of failing:
//! a `<` that opens no well-formed tag is literal text, unclosed elements
//! close at end of input, and stray close tags are ignored.

use std::fmt::Write as _;

// ─────────────────────────────────────────────────────────────────────────────
// Node Types
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the markup tree: either a plain-text leaf or an element.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    /// Plain text content (unescaped)
    Text(String),
    /// A tagged element with attributes and children
    Element(MarkupElement),
}

/// An element node: tag name, attributes, and child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupElement {
    /// Lowercase tag name (e.g. "p", "strong", "h1")
    pub tag: String,
    /// Attribute name/value pairs in document order
    pub attrs: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<MarkupNode>,
}

impl MarkupNode {
    /// Create a text leaf.
    pub fn text(content: impl Into<String>) -> Self {
        MarkupNode::Text(content.into())
    }

    /// Create an element with children and no attributes.
    pub fn element(tag: impl Into<String>, children: Vec<MarkupNode>) -> Self {
        MarkupNode::Element(MarkupElement {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        })
    }

    /// Check whether this node is an element with the given tag.
    pub fn is_element(&self, tag: &str) -> bool {
        matches!(self, MarkupNode::Element(el) if el.tag == tag)
    }

    /// Borrow the element data, if this node is an element.
    pub fn as_element(&self) -> Option<&MarkupElement> {
        match self {
            MarkupNode::Element(el) => Some(el),
            MarkupNode::Text(_) => None,
        }
    }

    /// Get all text content from this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match self {
            MarkupNode::Text(t) => output.push_str(t),
            MarkupNode::Element(el) => {
                if el.tag == "br" {
                    output.push('\n');
                }
                for child in &el.children {
                    child.collect_text(output);
                }
            }
        }
    }
}

impl MarkupElement {
    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Tags that never carry children and have no closing tag.
fn is_void_tag(tag: &str) -> bool {
    matches!(tag, "hr" | "br")
}

// ─────────────────────────────────────────────────────────────────────────────
// Escaping
// ─────────────────────────────────────────────────────────────────────────────

/// HTML-escape a string for use as text content or an attribute value.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Reverse `html_escape`, plus `&nbsp;` which editable surfaces emit for
/// forced spaces.
pub fn unescape_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// A tag recognized by the snapshot scanner.
enum ScannedTag {
    Open {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

/// Parse a markup snapshot string into its top-level node sequence.
///
/// Total: every input yields a tree. Degradations for malformed input:
/// - a `<` that does not begin a well-formed tag becomes literal text
/// - elements left open at end of input are closed there
/// - close tags with no matching open tag are ignored
/// - whitespace-only text spanning a line break (formatting whitespace
///   between blocks) is dropped
pub fn parse_markup(input: &str) -> Vec<MarkupNode> {
    let mut roots: Vec<MarkupNode> = Vec::new();
    let mut stack: Vec<MarkupElement> = Vec::new();
    let mut text = String::new();

    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        if rest.starts_with('<') {
            if let Some((tag, consumed)) = scan_tag(rest) {
                flush_text(&mut text, &mut stack, &mut roots);
                match tag {
                    ScannedTag::Open {
                        name,
                        attrs,
                        self_closing,
                    } => {
                        let element = MarkupElement {
                            tag: name,
                            attrs,
                            children: Vec::new(),
                        };
                        if self_closing || is_void_tag(&element.tag) {
                            attach(MarkupNode::Element(element), &mut stack, &mut roots);
                        } else {
                            stack.push(element);
                        }
                    }
                    ScannedTag::Close { name } => {
                        if let Some(pos) = stack.iter().rposition(|el| el.tag == name) {
                            // Close everything opened after the match as well
                            while stack.len() > pos {
                                let el = stack.pop().expect("stack is non-empty");
                                attach(MarkupNode::Element(el), &mut stack, &mut roots);
                            }
                        }
                        // Unmatched close tags are ignored
                    }
                }
                i += consumed;
                continue;
            }
            text.push('<');
            i += 1;
        } else {
            let ch = rest.chars().next().expect("non-empty remainder");
            text.push(ch);
            i += ch.len_utf8();
        }
    }

    flush_text(&mut text, &mut stack, &mut roots);
    while let Some(el) = stack.pop() {
        attach(MarkupNode::Element(el), &mut stack, &mut roots);
    }
    roots
}

/// Attach a finished node to the innermost open element, or to the root
/// sequence when nothing is open.
fn attach(node: MarkupNode, stack: &mut [MarkupElement], roots: &mut Vec<MarkupNode>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Flush accumulated text as a text node.
fn flush_text(text: &mut String, stack: &mut [MarkupElement], roots: &mut Vec<MarkupNode>) {
    if text.is_empty() {
        return;
    }
    let value = unescape_entities(text);
    text.clear();
    // Whitespace that spans a line break is block formatting, not content
    if value.trim().is_empty() && value.contains('\n') {
        return;
    }
    attach(MarkupNode::Text(value), stack, roots);
}

/// Scan one tag at the start of `rest` (which begins with `<`).
/// Returns the tag and the number of bytes consumed, or `None` when the
/// text is not a well-formed tag.
fn scan_tag(rest: &str) -> Option<(ScannedTag, usize)> {
    let end = rest.find('>')?;
    let inner = &rest[1..end];
    let consumed = end + 1;

    if let Some(name) = inner.strip_prefix('/') {
        let name = name.trim();
        if !is_valid_tag_name(name) {
            return None;
        }
        return Some((
            ScannedTag::Close {
                name: name.to_ascii_lowercase(),
            },
            consumed,
        ));
    }

    let inner = inner.trim();
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end(), true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = &inner[..name_end];
    if !is_valid_tag_name(name) {
        return None;
    }

    let attrs = parse_attrs(&inner[name_end..]);
    Some((
        ScannedTag::Open {
            name: name.to_ascii_lowercase(),
            attrs,
            self_closing,
        },
        consumed,
    ))
}

fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// Parse the attribute section of an open tag. Values may be double-quoted,
/// single-quoted, or bare; a name with no `=` gets an empty value.
fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut chars = s.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        // Attribute name
        let mut name_end = s.len();
        for (idx, c) in s[start..].char_indices() {
            if c == '=' || c.is_whitespace() {
                name_end = start + idx;
                break;
            }
        }
        let name = s[start..name_end].to_ascii_lowercase();
        while matches!(chars.peek(), Some(&(idx, _)) if idx < name_end) {
            chars.next();
        }

        // Optional value
        let mut value = String::new();
        if matches!(chars.peek(), Some(&(_, '='))) {
            chars.next();
            match chars.peek() {
                Some(&(_, quote)) if quote == '"' || quote == '\'' => {
                    chars.next();
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                }
                _ => {
                    while let Some(&(_, c)) = chars.peek() {
                        if c.is_whitespace() {
                            break;
                        }
                        value.push(c);
                        chars.next();
                    }
                }
            }
        }

        if !name.is_empty() {
            attrs.push((name, unescape_entities(&value)));
        }
    }

    attrs
}

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Writing
// ─────────────────────────────────────────────────────────────────────────────

/// Render a node sequence back to a markup snapshot string.
///
/// Inverse of [`parse_markup`] for trees this crate produces: text and
/// attribute values are escaped, void tags are written without a closing
/// tag.
pub fn write_markup(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &MarkupNode, out: &mut String) {
    match node {
        MarkupNode::Text(t) => out.push_str(&html_escape(t)),
        MarkupNode::Element(el) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in &el.attrs {
                let _ = write!(out, " {}=\"{}\"", name, html_escape(value));
            }
            out.push('>');
            if !is_void_tag(&el.tag) {
                for child in &el.children {
                    write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
