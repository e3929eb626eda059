//! Paragraph and text run definitions.

use super::{ParagraphStyle, TextStyle};
use serde::Serialize;

/// A text run with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Emphasis applied to this run
    pub style: TextStyle,
}

impl TextRun {
    /// Creates a new text run with default style.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Creates a new text run with the specified style.
    pub fn with_style(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Returns true if this run is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the bare text, whatever the emphasis.
    pub fn plain_text(&self) -> &str {
        &self.text
    }
}

/// A paragraph of formatted runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Paragraph style
    pub style: ParagraphStyle,
    /// Runs within this paragraph
    pub runs: Vec<TextRun>,
}

impl Paragraph {
    /// Creates a new empty body paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a paragraph with the specified style and runs.
    pub fn with_runs(style: ParagraphStyle, runs: Vec<TextRun>) -> Self {
        Self { style, runs }
    }

    /// Creates a simple body paragraph with plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            style: ParagraphStyle::Body,
            runs: vec![TextRun::new(text)],
        }
    }

    /// Adds a text run to this paragraph.
    pub fn push_text(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    /// Returns the plain text content of this paragraph.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(TextRun::plain_text).collect()
    }

    /// Returns true if this paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }
}
