//! Merge outcome reporting.

use serde::Serialize;
use std::fmt;

/// How content that could not be placed at an anchor was kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// Every section was placed, or there was nothing to place.
    #[default]
    None,
    /// Unplaced sections were appended at the end of the document.
    Sections,
    /// Nothing could be placed; the whole generated text was appended.
    WholeText,
}

/// Where one section was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Section identifier
    pub marker: String,
    /// Anchor that matched, as displayed by [`crate::model::Anchor`]
    pub anchor: String,
}

/// Summary of a merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Number of sections found in the generated text
    pub total: usize,
    /// Number of sections placed at an anchor
    pub placed: usize,
    /// Identifiers of sections with no matching anchor, in order
    pub unplaced: Vec<String>,
    /// Sections placed at an anchor, in order
    pub placements: Vec<Placement>,
    /// How unplaced content was kept
    pub fallback: FallbackKind,
}

impl MergeReport {
    /// Returns true if every section landed at its anchor.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.placed == self.total
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} sections placed", self.placed, self.total)?;
        match self.fallback {
            FallbackKind::None => Ok(()),
            FallbackKind::Sections => {
                write!(f, ", appended at end: {}", self.unplaced.join(", "))
            }
            FallbackKind::WholeText => write!(f, ", whole text appended at end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let report = MergeReport {
            total: 3,
            placed: 2,
            unplaced: vec!["PHỤ_LỤC".into()],
            placements: Vec::new(),
            fallback: FallbackKind::Sections,
        };
        assert_eq!(report.to_string(), "2/3 sections placed, appended at end: PHỤ_LỤC");
        assert!(!report.is_complete());
    }

    #[test]
    fn test_serialize() {
        let report = MergeReport {
            fallback: FallbackKind::WholeText,
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fallback"], "whole_text");
        assert_eq!(json["total"], 0);
    }
}
