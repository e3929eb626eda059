//! Style definitions for text runs and paragraphs.

use serde::Serialize;

/// Inline emphasis carried by a run.
///
/// Markers never nest, so at most one of these is set by the inline
/// formatter, but the type allows combinations for callers building runs
/// directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TextStyle {
    /// Bold text (`**...**`)
    pub bold: bool,
    /// Italic text (`*...*` or `_..._`)
    pub italic: bool,
    /// Underline (`<u>...</u>`)
    pub underline: bool,
    /// Newly added content (`<red>...</red>`)
    pub highlight: bool,
}

impl TextStyle {
    /// Creates a new empty text style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Creates an italic style.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Creates an underline style.
    pub fn underline() -> Self {
        Self {
            underline: true,
            ..Default::default()
        }
    }

    /// Creates a highlight style.
    pub fn highlight() -> Self {
        Self {
            highlight: true,
            ..Default::default()
        }
    }

    /// Returns true if this style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.underline || self.highlight
    }
}

/// Paragraph-level style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ParagraphStyle {
    /// Justified body text
    #[default]
    Body,
    /// Heading levels 1-3
    Heading(u8),
    /// Bulleted list item
    BulletItem,
}

impl ParagraphStyle {
    /// Creates a heading style, clamped to levels 1-3.
    pub fn heading(level: u8) -> Self {
        Self::Heading(level.clamp(1, 3))
    }

    /// Returns true if this is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::Heading(_))
    }

    /// Returns true if this is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Self::BulletItem)
    }

    /// Returns the WordprocessingML style ID for this paragraph, if any.
    pub fn style_id(&self) -> Option<&'static str> {
        match self {
            Self::Body => None,
            Self::Heading(1) => Some("Heading1"),
            Self::Heading(2) => Some("Heading2"),
            Self::Heading(_) => Some("Heading3"),
            Self::BulletItem => Some("ListParagraph"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(ParagraphStyle::heading(0), ParagraphStyle::Heading(1));
        assert_eq!(ParagraphStyle::heading(2), ParagraphStyle::Heading(2));
        assert_eq!(ParagraphStyle::heading(9), ParagraphStyle::Heading(3));
        assert!(ParagraphStyle::heading(1).is_heading());
        assert!(!ParagraphStyle::Body.is_heading());
    }

    #[test]
    fn test_style_ids() {
        assert_eq!(ParagraphStyle::Body.style_id(), None);
        assert_eq!(ParagraphStyle::heading(3).style_id(), Some("Heading3"));
        assert_eq!(ParagraphStyle::BulletItem.style_id(), Some("ListParagraph"));
    }

    #[test]
    fn test_text_style_has_formatting() {
        assert!(!TextStyle::default().has_formatting());
        assert!(TextStyle::bold().has_formatting());
        assert!(TextStyle::highlight().has_formatting());
    }
}
