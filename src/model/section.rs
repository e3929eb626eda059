//! Labeled content sections extracted from generated text.

use serde::Serialize;
use std::fmt;

/// A literal phrase expected near the insertion point in the original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    /// Text to look for inside a paragraph
    pub phrase: String,
    /// Restricts the search to a region of the document
    pub scope: Option<AnchorScope>,
}

/// Region of the document an anchor is searched in.
///
/// The region starts after the first paragraph containing `after` and ends at
/// the first later paragraph containing any of `until`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorScope {
    /// Phrase of the paragraph that opens the region
    pub after: String,
    /// Phrases of paragraphs that close the region
    pub until: Vec<String>,
}

impl Anchor {
    /// Creates an anchor searched across the whole document.
    pub fn new(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            scope: None,
        }
    }

    /// Creates an anchor searched only after `after` and before any of `until`.
    pub fn scoped(phrase: impl Into<String>, after: impl Into<String>, until: Vec<String>) -> Self {
        Self {
            phrase: phrase.into(),
            scope: Some(AnchorScope {
                after: after.into(),
                until,
            }),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{} › {}", scope.after, self.phrase),
            None => f.write_str(&self.phrase),
        }
    }
}

/// One labeled block of generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSection {
    /// Identifier from the open marker, e.g. `HOẠT_ĐỘNG_2_BƯỚC_3`
    pub marker: String,
    /// Trimmed body between the markers
    pub body: String,
    /// Candidate anchors, most specific first; empty when the marker is unknown
    pub anchors: Vec<Anchor>,
}

impl ContentSection {
    /// Returns true if the section has at least one anchor to try.
    pub fn is_placeable(&self) -> bool {
        !self.anchors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_display() {
        assert_eq!(Anchor::new("Thái độ").to_string(), "Thái độ");
        let scoped = Anchor::scoped("Bước 2:", "Hoạt động 1:", vec!["Hoạt động 2:".into()]);
        assert_eq!(scoped.to_string(), "Hoạt động 1: › Bước 2:");
    }

    #[test]
    fn test_unplaceable_section() {
        let section = ContentSection {
            marker: "PHỤ_LỤC".into(),
            body: "x".into(),
            anchors: Vec::new(),
        };
        assert!(!section.is_placeable());
    }
}
