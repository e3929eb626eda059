//! Rendering options for WordprocessingML output.

use crate::cleanup::CleanupOptions;
use crate::error::{Error, Result};

/// Default color of highlighted runs.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "FF0000";

/// Default title of the block that collects unplaced sections.
pub const DEFAULT_FALLBACK_TITLE: &str = "═══ NỘI DUNG NLS BỔ SUNG ═══";

/// Options for rendering generated text into document markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// How highlighted (newly added) text is shown.
    pub highlight: Highlight,

    /// Line cleanup applied before block classification.
    pub cleanup: CleanupOptions,

    /// Text put before bullet items injected into an existing document.
    /// Fresh documents use a real numbering definition instead.
    /// Default: "- "
    pub bullet_prefix: String,

    /// Title paragraph of the end-of-document fallback block.
    pub fallback_title: String,

    /// Whether body paragraphs are justified.
    pub justify_body: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            highlight: Highlight::default(),
            cleanup: CleanupOptions::default(),
            bullet_prefix: "- ".to_string(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            justify_body: true,
        }
    }
}

impl RenderOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the highlight style.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = highlight;
        self
    }

    /// Sets the cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Sets the prefix of injected bullet items.
    pub fn with_bullet_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bullet_prefix = prefix.into();
        self
    }

    /// Sets the title of the fallback block.
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = title.into();
        self
    }

    /// Leaves body paragraphs left-aligned.
    pub fn without_justification(mut self) -> Self {
        self.justify_body = false;
        self
    }
}

/// How highlighted runs are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// Colored text, `RRGGBB` hex.
    Color(String),
    /// Unstyled text followed by an italic note run.
    Note(String),
}

impl Default for Highlight {
    fn default() -> Self {
        Self::Color(DEFAULT_HIGHLIGHT_COLOR.to_string())
    }
}

impl Highlight {
    /// Creates a color highlight from `RRGGBB` hex, with or without a leading `#`.
    ///
    /// # Example
    ///
    /// ```
    /// use lessonmerge::Highlight;
    ///
    /// assert_eq!(Highlight::color("#c00000")?, Highlight::Color("C00000".into()));
    /// assert!(Highlight::color("red").is_err());
    /// # Ok::<(), lessonmerge::Error>(())
    /// ```
    pub fn color(rgb: &str) -> Result<Self> {
        let hex = rgb.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidOption(format!(
                "highlight color must be 6 hex digits (RRGGBB), got {rgb:?}"
            )));
        }
        Ok(Self::Color(hex.to_ascii_uppercase()))
    }

    /// Returns the color to use for structural elements such as separators.
    pub fn accent_color(&self) -> &str {
        match self {
            Highlight::Color(rgb) => rgb,
            Highlight::Note(_) => DEFAULT_HIGHLIGHT_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.highlight, Highlight::Color("FF0000".into()));
        assert_eq!(options.bullet_prefix, "- ");
        assert!(options.fallback_title.contains("NLS"));
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_highlight(Highlight::Note("(mới)".into()))
            .with_bullet_prefix("• ")
            .without_justification();
        assert_eq!(options.highlight.accent_color(), DEFAULT_HIGHLIGHT_COLOR);
        assert_eq!(options.bullet_prefix, "• ");
        assert!(!options.justify_body);
    }

    #[test]
    fn test_color_validation() {
        assert_eq!(Highlight::color("00b050").unwrap(), Highlight::Color("00B050".into()));
        assert_eq!(Highlight::color(" #FF0000 ").unwrap(), Highlight::default());

        for bad in ["", "F00", "FF00000", "GG0000", "F00\"/><x", "#"] {
            assert!(
                matches!(Highlight::color(bad), Err(Error::InvalidOption(_))),
                "accepted {bad:?}"
            );
        }
    }
}
