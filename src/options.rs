//! Merge and export options.

use crate::render::RenderOptions;
use std::path::Path;

/// Options controlling how sections are merged into an existing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Rendering of section bodies.
    pub render: RenderOptions,

    /// Whether the fallback block opens with a separator and title.
    pub fallback_header: bool,

    /// Whether each unplaced section is preceded by an `[IDENTIFIER]` label.
    pub label_unplaced: bool,

    /// Whether compound identifiers may use scoped anchors.
    /// When disabled only whole-document phrases are tried.
    pub scoped_anchors: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            fallback_header: true,
            label_unplaced: true,
            scoped_anchors: true,
        }
    }
}

impl MergeOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the render options.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Omits the separator and title before unplaced content.
    pub fn without_fallback_header(mut self) -> Self {
        self.fallback_header = false;
        self
    }

    /// Omits the `[IDENTIFIER]` labels of unplaced sections.
    pub fn without_labels(mut self) -> Self {
        self.label_unplaced = false;
        self
    }

    /// Ignores anchor scopes.
    pub fn unscoped(mut self) -> Self {
        self.scoped_anchors = false;
        self
    }
}

/// Options for [`crate::export`] and output file naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Merge settings used when an original document is supplied.
    pub merge: MergeOptions,

    /// Suffix added to the original file stem of a merged document.
    /// Default: "_NLS"
    pub merged_suffix: String,

    /// File name of a document created from scratch.
    pub fresh_name: String,

    /// File name of the plain-text export.
    pub text_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            merge: MergeOptions::default(),
            merged_suffix: "_NLS".to_string(),
            fresh_name: "Giao_an_NLS.docx".to_string(),
            text_name: "Giao_an_NLS.txt".to_string(),
        }
    }
}

impl ExportOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the merge options.
    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    /// Sets the suffix of merged file names.
    pub fn with_merged_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.merged_suffix = suffix.into();
        self
    }

    /// Returns the output name for a merge of `original`, e.g.
    /// `Bai_3.docx` → `Bai_3_NLS.docx`.
    pub fn merged_file_name(&self, original: impl AsRef<Path>) -> String {
        let stem = original
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        format!("{}{}.docx", stem, self.merged_suffix)
    }

    /// Returns the output name of a fresh document.
    pub fn fresh_file_name(&self) -> &str {
        &self.fresh_name
    }

    /// Returns the output name of a plain-text export.
    pub fn text_file_name(&self) -> &str {
        &self.text_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_file_name() {
        let options = ExportOptions::default();
        assert_eq!(options.merged_file_name("Bai_3.docx"), "Bai_3_NLS.docx");
        assert_eq!(
            options.merged_file_name("/tmp/giao an/Tiết 5.docx"),
            "Tiết 5_NLS.docx"
        );
        assert_eq!(options.merged_file_name(""), "document_NLS.docx");
    }

    #[test]
    fn test_default_names() {
        let options = ExportOptions::default();
        assert_eq!(options.fresh_file_name(), "Giao_an_NLS.docx");
        assert_eq!(options.text_file_name(), "Giao_an_NLS.txt");
    }

    #[test]
    fn test_merge_builder() {
        let options = MergeOptions::new().without_labels().unscoped();
        assert!(!options.label_unplaced);
        assert!(!options.scoped_anchors);
        assert!(options.fallback_header);
    }
}
