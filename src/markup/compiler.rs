//! Markdown → markup compilation
//!
//! Converts Markdown text (best-effort, staged pattern matching) into a
//! markup string ready for injection into a live editable surface. The
//! stages run in a fixed order and the order is load-bearing: each stage
//! must not re-match text already converted by an earlier one. Fenced code
//! is pulled out first and re-injected near the end so its content survives
//! the inline substitutions untouched.
//!
//! The compiler is total. Malformed or unsupported constructs degrade to
//! plain paragraphs containing the literal text; the output is always a
//! sequence of block-level nodes, so a caller can deterministically place
//! a cursor after the injected content.

use crate::markup::node::html_escape;
use regex::Regex;
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────
// Compiled once and shared with the export formatters, which apply the same
// substitution rules with different replacement markup.

pub(crate) fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+#-]*[ \t]*\n?(.*?)```").expect("valid pattern")
    })
}

pub(crate) fn h3_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^### (.*)$").expect("valid pattern"))
}

pub(crate) fn h2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^## (.*)$").expect("valid pattern"))
}

pub(crate) fn h1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^# (.*)$").expect("valid pattern"))
}

pub(crate) fn hr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^---[ \t]*$").expect("valid pattern"))
}

pub(crate) fn bold_italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*\*(.+?)\*\*\*").expect("valid pattern"))
}

pub(crate) fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid pattern"))
}

pub(crate) fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("valid pattern"))
}

pub(crate) fn strike_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"~~(.+?)~~").expect("valid pattern"))
}

pub(crate) fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`\n]+?)`").expect("valid pattern"))
}

pub(crate) fn quote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Matches the escaped form: escaping runs before block conversion
    RE.get_or_init(|| Regex::new(r"(?m)^&gt; (.*)$").expect("valid pattern"))
}

pub(crate) fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^- (.*)$").expect("valid pattern"))
}

pub(crate) fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\. (.*)$").expect("valid pattern"))
}

pub(crate) fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]\n]*)\]\(([^)\n]*)\)").expect("valid pattern"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Compilation
// ─────────────────────────────────────────────────────────────────────────────

/// Compile Markdown into a markup string for the editable surface.
///
/// Empty (or whitespace-only) input yields a single empty paragraph, never
/// an empty string, so the caller always has a node to place a cursor in.
pub fn markdown_to_markup(markdown: &str) -> String {
    let text = markdown.replace("\r\n", "\n");

    // Stage 1: pull fenced code out of the way before anything can mangle it
    let mut code_blocks: Vec<String> = Vec::new();
    let text = fence_re()
        .replace_all(&text, |caps: &regex::Captures| {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let raw = raw.strip_suffix('\n').unwrap_or(raw);
            code_blocks.push(html_escape(raw));
            format!("\n{}\n", placeholder(code_blocks.len() - 1))
        })
        .into_owned();

    // Stage 2: escape everything that is left
    let text = html_escape(&text);

    // Stage 3: block line markers
    let text = h3_re().replace_all(&text, "<h3>$1</h3>").into_owned();
    let text = h2_re().replace_all(&text, "<h2>$1</h2>").into_owned();
    let text = h1_re().replace_all(&text, "<h1>$1</h1>").into_owned();
    let text = hr_re().replace_all(&text, "<hr>").into_owned();

    // Stage 4: inline spans, longest delimiter first so a run of asterisks
    // is never partially consumed by a shorter pattern
    let text = bold_italic_re()
        .replace_all(&text, "<strong><em>$1</em></strong>")
        .into_owned();
    let text = bold_re().replace_all(&text, "<strong>$1</strong>").into_owned();
    let text = italic_re().replace_all(&text, "<em>$1</em>").into_owned();
    let text = strike_re().replace_all(&text, "<del>$1</del>").into_owned();
    let text = inline_code_re()
        .replace_all(&text, "<code>$1</code>")
        .into_owned();

    // Stage 5: quoted lines, then merge adjacent quote blocks
    let text = quote_re()
        .replace_all(&text, "<blockquote>$1</blockquote>")
        .into_owned();
    let text = text.replace("</blockquote>\n<blockquote>", "<br>");

    // Stage 6: group contiguous list lines into single list blocks
    let text = group_list_lines(&text, bullet_re(), "ul", "");
    let text = group_list_lines(&text, ordered_re(), "ol", "");

    // Stage 7: links
    let text = link_re()
        .replace_all(&text, "<a href=\"$2\">$1</a>")
        .into_owned();

    // Stage 8: put the protected code back as code block nodes
    let mut text = text;
    for (index, block) in code_blocks.iter().enumerate() {
        text = text.replace(
            &placeholder(index),
            &format!("<pre><code>{}</code></pre>", block),
        );
    }

    // Stage 9: wrap leftover lines as paragraphs, drop empty ones
    let text = wrap_paragraphs(&text, "<p>");

    // Blocks separated only by dropped blank lines are now adjacent;
    // collapse quote blocks once more so no two survive back to back
    text.replace("</blockquote>\n<blockquote>", "<br>")
}

fn placeholder(index: usize) -> String {
    format!("@@CODE-BLOCK-{}@@", index)
}

/// Group contiguous lines matching `item_re` into one list block per run.
/// `list_attrs` is appended inside the open tag (the export formatters pass
/// their inline styles through here; the compiler passes nothing).
pub(crate) fn group_list_lines(
    text: &str,
    item_re: &Regex,
    list_tag: &str,
    list_attrs: &str,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if let Some(caps) = item_re.captures(line) {
            let content = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            items.push(content.trim().to_string());
        } else {
            flush_list(&mut items, &mut out, list_tag, list_attrs);
            out.push(line.to_string());
        }
    }
    flush_list(&mut items, &mut out, list_tag, list_attrs);
    out.join("\n")
}

fn flush_list(items: &mut Vec<String>, out: &mut Vec<String>, list_tag: &str, list_attrs: &str) {
    if items.is_empty() {
        return;
    }
    let body: String = items
        .drain(..)
        .map(|item| format!("<li>{}</li>", item))
        .collect();
    out.push(format!("<{0}{2}>{1}</{0}>", list_tag, body, list_attrs));
}

/// Stage 9: every remaining non-empty line that is not already a block from
/// the earlier stages becomes a paragraph opened with `p_open`. The scan is
/// `pre`-aware so re-injected code lines pass through untouched.
pub(crate) fn wrap_paragraphs(text: &str, p_open: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut in_pre = false;

    for line in text.split('\n') {
        if in_pre {
            if line.contains("</pre>") {
                in_pre = false;
            }
            blocks.push(line.to_string());
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if is_block_line(trimmed) {
            if trimmed.starts_with("<pre") && !trimmed.contains("</pre>") {
                in_pre = true;
            }
            blocks.push(trimmed.to_string());
        } else {
            blocks.push(format!("{}{}</p>", p_open, trimmed));
        }
    }

    if blocks.is_empty() {
        return format!("{}</p>", p_open);
    }
    blocks.join("\n")
}

/// Block-level tags, with or without attributes, that stage 9 leaves alone.
fn is_block_line(line: &str) -> bool {
    const BLOCK_TAGS: [&str; 8] = ["h1", "h2", "h3", "hr", "ul", "ol", "blockquote", "pre"];
    BLOCK_TAGS.iter().any(|tag| {
        line.strip_prefix('<')
            .and_then(|rest| rest.strip_prefix(tag))
            .map_or(false, |rest| rest.starts_with('>') || rest.starts_with(' '))
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
