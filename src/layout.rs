//! Document layout parsing.
//!
//! Gold documents and summarizer output share one layout: body sentences,
//! one per line, then a blank line, then the summary sentences, one per line.
//!
//! ```text
//! sentence_1
//! sentence_2
//!
//! summary_sentence_1
//! summary_sentence_2
//! ```
//!
//! The *last* blank line is the boundary, so the body may itself contain
//! blank lines. The summary block is flattened into a single line with a
//! fixed run of spaces between sentences before it is scored. Windows line
//! endings are read as plain newlines.

use std::borrow::Cow;

/// Default number of spaces placed between flattened summary sentences.
pub const DEFAULT_SEPARATOR_WIDTH: usize = 4;

const BLANK_LINE: &str = "\n\n";

/// The two sections of a document, split at the last blank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Everything before the boundary, without the boundary newlines.
    pub body: &'a str,
    /// Everything after the boundary, unmodified.
    pub summary: &'a str,
}

/// Split a document at its last blank line.
///
/// Returns `None` when the document has no blank line at all.
pub fn split_sections(document: &str) -> Option<Sections<'_>> {
    let boundary = document.rfind(BLANK_LINE)?;
    Some(Sections {
        body: &document[..boundary],
        summary: &document[boundary + BLANK_LINE.len()..],
    })
}

/// A flattened summary, tagged with how it was located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedSummary {
    /// The summary block after the last blank line.
    Parsed(String),
    /// No blank line was found; the whole text was treated as the summary.
    WholeTextFallback(String),
}

impl ExtractedSummary {
    /// The flattened summary text.
    pub fn text(&self) -> &str {
        match self {
            Self::Parsed(text) | Self::WholeTextFallback(text) => text,
        }
    }

    /// Consume and return the flattened summary text.
    pub fn into_text(self) -> String {
        match self {
            Self::Parsed(text) | Self::WholeTextFallback(text) => text,
        }
    }

    /// Whether the document had no section boundary.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::WholeTextFallback(_))
    }
}

/// Extract and flatten the summary section of a document.
///
/// `\r\n` is treated as `\n`. Every newline in the summary block becomes
/// `separator_width` spaces. No other trimming is done, so a trailing newline
/// turns into a trailing separator run.
pub fn extract_summary(document: &str, separator_width: usize) -> ExtractedSummary {
    let document = normalize_newlines(document);
    let document = document.as_ref();
    match split_sections(document) {
        Some(sections) => ExtractedSummary::Parsed(flatten(sections.summary, separator_width)),
        None => ExtractedSummary::WholeTextFallback(flatten(document, separator_width)),
    }
}

fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Replace each newline in `block` with `separator_width` spaces.
pub fn flatten(block: &str, separator_width: usize) -> String {
    block.replace('\n', &" ".repeat(separator_width))
}
