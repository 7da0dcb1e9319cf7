//! Markdown → presentational markup rendering
//!
//! One-way transform from canonical Markdown to static, styled markup for
//! an export target. Applies the same block and inline substitution rules
//! as the compiler but emits presentation nodes with profile-specific
//! inline styles instead of editable nodes. Pure, stateless, and total —
//! there is no history or mode state here, and every input produces a
//! string.

use crate::export::profile::ExportProfile;
use crate::markup::{
    bold_italic_re, bold_re, bullet_re, fence_re, group_list_lines, h1_re, h2_re, h3_re,
    hr_re, html_escape, inline_code_re, italic_re, link_re, ordered_re, quote_re, strike_re,
    wrap_paragraphs,
};

/// Render canonical Markdown as presentational markup for `profile`.
///
/// The result is a fragment: the file-generation collaborator that turns it
/// into a PDF or word-processor artifact supplies the document shell.
pub fn render(markdown: &str, profile: ExportProfile) -> String {
    let styles = profile.styles();
    let text = markdown.replace("\r\n", "\n");

    // Fenced code is lifted out first, exactly as the compiler does, so the
    // inline substitutions cannot touch it
    let mut code_blocks: Vec<String> = Vec::new();
    let text = fence_re()
        .replace_all(&text, |caps: &regex::Captures| {
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let raw = raw.strip_suffix('\n').unwrap_or(raw);
            code_blocks.push(html_escape(raw));
            format!("\n@@EXPORT-BLOCK-{}@@\n", code_blocks.len() - 1)
        })
        .into_owned();

    let text = html_escape(&text);

    // Block line markers
    let text = h3_re()
        .replace_all(&text, format!("<h3 style=\"{}\">$1</h3>", styles.heading3).as_str())
        .into_owned();
    let text = h2_re()
        .replace_all(&text, format!("<h2 style=\"{}\">$1</h2>", styles.heading2).as_str())
        .into_owned();
    let text = h1_re()
        .replace_all(&text, format!("<h1 style=\"{}\">$1</h1>", styles.heading1).as_str())
        .into_owned();
    let text = hr_re()
        .replace_all(&text, format!("<hr style=\"{}\">", styles.rule).as_str())
        .into_owned();

    // Inline spans, longest delimiter first
    let text = bold_italic_re()
        .replace_all(
            &text,
            format!(
                "{}{}$1{}{}",
                styles.strong_open, styles.em_open, styles.em_close, styles.strong_close
            )
            .as_str(),
        )
        .into_owned();
    let text = bold_re()
        .replace_all(
            &text,
            format!("{}$1{}", styles.strong_open, styles.strong_close).as_str(),
        )
        .into_owned();
    let text = italic_re()
        .replace_all(&text, format!("{}$1{}", styles.em_open, styles.em_close).as_str())
        .into_owned();
    let text = strike_re()
        .replace_all(&text, format!("{}$1{}", styles.del_open, styles.del_close).as_str())
        .into_owned();
    let text = inline_code_re()
        .replace_all(
            &text,
            format!("<code style=\"{}\">$1</code>", styles.code_inline).as_str(),
        )
        .into_owned();

    // Quoted lines, merging adjacent quote blocks
    let quote_open = format!("<blockquote style=\"{}\">", styles.blockquote);
    let text = quote_re()
        .replace_all(&text, format!("{}$1</blockquote>", quote_open).as_str())
        .into_owned();
    let text = text.replace(&format!("</blockquote>\n{}", quote_open), "<br>");

    // List grouping
    let list_attrs = format!(" style=\"{}\"", styles.list);
    let text = group_list_lines(&text, bullet_re(), "ul", &list_attrs);
    let text = group_list_lines(&text, ordered_re(), "ol", &list_attrs);

    // Links
    let text = link_re()
        .replace_all(
            &text,
            format!("<a href=\"$2\" style=\"{}\">$1</a>", styles.link).as_str(),
        )
        .into_owned();

    // Code blocks back in, with the profile's block styling
    let mut text = text;
    for (index, block) in code_blocks.iter().enumerate() {
        text = text.replace(
            &format!("@@EXPORT-BLOCK-{}@@", index),
            &format!("<pre style=\"{}\"><code>{}</code></pre>", styles.code_block, block),
        );
    }

    // Paragraph wrap, then collapse quote blocks left adjacent by dropped
    // blank lines
    let text = wrap_paragraphs(&text, &format!("<p style=\"{}\">", styles.paragraph));
    text.replace(&format!("</blockquote>\n{}", quote_open), "<br>")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
