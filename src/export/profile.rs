//! Export profiles and their presentation styles
//!
//! Each profile targets a different downstream artifact: a print dialog, a
//! PDF generator, or a word-processor import. The profile determines the
//! inline styles attached to the presentational markup; the substitution
//! rules themselves are shared with the compiler and identical across
//! profiles.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Export Profile
// ─────────────────────────────────────────────────────────────────────────────

/// Supported export targets for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportProfile {
    /// Markup styled for the print dialog
    #[default]
    Print,
    /// Markup handed to the PDF file generator
    Pdf,
    /// Markup handed to the word-processor file generator
    Word,
}

impl ExportProfile {
    /// Get the display label for this profile.
    pub fn label(&self) -> &'static str {
        match self {
            ExportProfile::Print => "Print",
            ExportProfile::Pdf => "PDF",
            ExportProfile::Word => "Word",
        }
    }

    /// Get the file extension of the generated artifact (if the profile
    /// produces a file at all).
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportProfile::Print => None,
            ExportProfile::Pdf => Some("pdf"),
            ExportProfile::Word => Some("doc"),
        }
    }

    /// Get all available export profiles.
    pub fn all() -> &'static [ExportProfile] {
        &[ExportProfile::Print, ExportProfile::Pdf, ExportProfile::Word]
    }

    /// The style table for this profile.
    pub(crate) fn styles(&self) -> &'static ProfileStyles {
        match self {
            ExportProfile::Print => &PRINT_STYLES,
            ExportProfile::Pdf => &PDF_STYLES,
            ExportProfile::Word => &WORD_STYLES,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Style Tables
// ─────────────────────────────────────────────────────────────────────────────

/// Inline styles and emphasis tags for one profile.
pub(crate) struct ProfileStyles {
    pub heading1: &'static str,
    pub heading2: &'static str,
    pub heading3: &'static str,
    pub paragraph: &'static str,
    pub list: &'static str,
    pub blockquote: &'static str,
    pub code_inline: &'static str,
    pub code_block: &'static str,
    pub rule: &'static str,
    pub link: &'static str,
    pub strong_open: &'static str,
    pub strong_close: &'static str,
    pub em_open: &'static str,
    pub em_close: &'static str,
    pub del_open: &'static str,
    pub del_close: &'static str,
}

/// Serif typography sized for paper.
static PRINT_STYLES: ProfileStyles = ProfileStyles {
    heading1: "font-family:Georgia,serif;font-size:22pt;margin:0 0 12pt 0;",
    heading2: "font-family:Georgia,serif;font-size:17pt;margin:14pt 0 8pt 0;",
    heading3: "font-family:Georgia,serif;font-size:14pt;margin:12pt 0 6pt 0;",
    paragraph: "font-family:Georgia,serif;font-size:11pt;line-height:1.5;margin:0 0 8pt 0;",
    list: "font-family:Georgia,serif;font-size:11pt;line-height:1.5;margin:0 0 8pt 0;padding-left:18pt;",
    blockquote:
        "font-family:Georgia,serif;font-size:11pt;margin:0 0 8pt 0;padding-left:10pt;border-left:2pt solid #999;color:#444;",
    code_inline: "font-family:Courier,monospace;font-size:10pt;background:#f2f2f2;",
    code_block:
        "font-family:Courier,monospace;font-size:10pt;background:#f6f6f6;padding:8pt;margin:0 0 8pt 0;white-space:pre-wrap;",
    rule: "border:none;border-top:1pt solid #999;margin:12pt 0;",
    link: "color:#1a56a0;",
    strong_open: "<strong>",
    strong_close: "</strong>",
    em_open: "<em>",
    em_close: "</em>",
    del_open: "<del>",
    del_close: "</del>",
};

/// Like print, but with metric page margins baked into block spacing for
/// the PDF generator.
static PDF_STYLES: ProfileStyles = ProfileStyles {
    heading1: "font-family:Helvetica,Arial,sans-serif;font-size:20pt;margin:0 0 10pt 0;",
    heading2: "font-family:Helvetica,Arial,sans-serif;font-size:15pt;margin:12pt 0 6pt 0;",
    heading3: "font-family:Helvetica,Arial,sans-serif;font-size:12pt;margin:10pt 0 5pt 0;",
    paragraph:
        "font-family:Helvetica,Arial,sans-serif;font-size:10pt;line-height:1.45;margin:0 0 7pt 0;",
    list: "font-family:Helvetica,Arial,sans-serif;font-size:10pt;line-height:1.45;margin:0 0 7pt 0;padding-left:16pt;",
    blockquote:
        "font-family:Helvetica,Arial,sans-serif;font-size:10pt;margin:0 0 7pt 0;padding-left:9pt;border-left:2pt solid #888;color:#555;",
    code_inline: "font-family:Courier,monospace;font-size:9pt;background:#eee;",
    code_block:
        "font-family:Courier,monospace;font-size:9pt;background:#f4f4f4;padding:7pt;margin:0 0 7pt 0;white-space:pre-wrap;",
    rule: "border:none;border-top:1pt solid #888;margin:10pt 0;",
    link: "color:#1a56a0;",
    strong_open: "<strong>",
    strong_close: "</strong>",
    em_open: "<em>",
    em_close: "</em>",
    del_open: "<del>",
    del_close: "</del>",
};

/// Word-processor friendly markup: Calibri, and the legacy emphasis tags
/// that survive .doc import best.
static WORD_STYLES: ProfileStyles = ProfileStyles {
    heading1: "font-family:Calibri,sans-serif;font-size:20pt;margin:0 0 10pt 0;",
    heading2: "font-family:Calibri,sans-serif;font-size:16pt;margin:12pt 0 6pt 0;",
    heading3: "font-family:Calibri,sans-serif;font-size:13pt;margin:10pt 0 5pt 0;",
    paragraph: "font-family:Calibri,sans-serif;font-size:11pt;line-height:1.4;margin:0 0 8pt 0;",
    list: "font-family:Calibri,sans-serif;font-size:11pt;line-height:1.4;margin:0 0 8pt 0;padding-left:18pt;",
    blockquote:
        "font-family:Calibri,sans-serif;font-size:11pt;margin:0 0 8pt 0;padding-left:10pt;border-left:2pt solid #a6a6a6;color:#595959;",
    code_inline: "font-family:Consolas,monospace;font-size:10pt;background:#f2f2f2;",
    code_block:
        "font-family:Consolas,monospace;font-size:10pt;background:#f2f2f2;padding:8pt;margin:0 0 8pt 0;white-space:pre-wrap;",
    rule: "border:none;border-top:1pt solid #a6a6a6;margin:10pt 0;",
    link: "color:#0563c1;",
    strong_open: "<b>",
    strong_close: "</b>",
    em_open: "<i>",
    em_close: "</i>",
    del_open: "<s>",
    del_close: "</s>",
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
