//! # lessonmerge
//!
//! Merges model-generated "digital competence" content into Word lesson
//! plans.
//!
//! Generated text arrives as prose interleaved with labeled sections:
//!
//! ```text
//! ===NLS_MỤC_TIÊU===
//! <red>4. Năng lực số: HS khai thác học liệu số</red>
//! ===END===
//! ```
//!
//! With an original `.docx`, every section is spliced in right after the
//! paragraph its anchor phrase points at, leaving every other package part
//! untouched. Without one, the text is rendered into a fresh document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lessonmerge::{merge_file, MergeOptions};
//!
//! fn main() -> lessonmerge::Result<()> {
//!     let raw = std::fs::read_to_string("ket_qua.txt")?;
//!     let merged = merge_file("Bai_3.docx", &raw, &MergeOptions::default())?;
//!
//!     println!("{}", merged.report);
//!     std::fs::write("Bai_3_NLS.docx", &merged.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: Async I/O and retry support with Tokio

pub mod cleanup;
pub mod docx;
pub mod error;
pub mod generate;
pub mod inline;
pub mod marked;
pub mod model;
pub mod options;
pub mod render;
pub mod report;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use cleanup::CleanupOptions;
pub use docx::OriginalPackage;
pub use error::{Error, GenerationError, Remediation, Result};
pub use generate::RetryPolicy;
pub use marked::{cites_distribution, parse_sections, preview_markdown};
pub use model::{ContentSection, Document};
pub use options::{ExportOptions, MergeOptions};
pub use render::{Highlight, RenderOptions};
pub use report::{FallbackKind, MergeReport, Placement};

use log::{info, warn};
use std::path::Path;

/// A merged package and what happened during the merge.
#[derive(Debug, Clone)]
pub struct Merged {
    /// The output `.docx`
    pub bytes: Vec<u8>,
    /// Placement summary
    pub report: MergeReport,
}

/// Merges generated text into an opened package.
pub fn merge_package(original: &OriginalPackage, raw: &str, options: &MergeOptions) -> Result<Merged> {
    let sections = parse_sections(raw);
    let injection = docx::inject(original.main_markup()?, &sections, raw, options)?;
    let bytes = docx::write_merged(original, &injection.markup)?;

    Ok(Merged {
        bytes,
        report: injection.report,
    })
}

/// Merges generated text into a `.docx` given as bytes.
///
/// # Example
///
/// ```no_run
/// use lessonmerge::{merge_bytes, MergeOptions};
///
/// let original = std::fs::read("Bai_3.docx")?;
/// let merged = merge_bytes(original, "===NLS_MỤC_TIÊU===\n...\n===END===", &MergeOptions::default())?;
/// assert!(merged.report.total > 0);
/// # Ok::<(), lessonmerge::Error>(())
/// ```
pub fn merge_bytes(original: impl Into<bytes::Bytes>, raw: &str, options: &MergeOptions) -> Result<Merged> {
    let package = OriginalPackage::from_bytes(original)?;
    merge_package(&package, raw, options)
}

/// Merges generated text into a `.docx` file.
pub fn merge_file(path: impl AsRef<Path>, raw: &str, options: &MergeOptions) -> Result<Merged> {
    let package = OriginalPackage::open(path)?;
    merge_package(&package, raw, options)
}

/// Renders generated text into a fresh `.docx`.
///
/// Section markers and editorial placeholders are dropped; everything else
/// is rendered as headings, lists, tables and paragraphs.
///
/// # Example
///
/// ```no_run
/// use lessonmerge::{create_docx, RenderOptions};
///
/// let bytes = create_docx("## Giáo án\n- Hoạt động 1", &RenderOptions::default())?;
/// std::fs::write("Giao_an_NLS.docx", bytes)?;
/// # Ok::<(), lessonmerge::Error>(())
/// ```
pub fn create_docx(raw: &str, options: &RenderOptions) -> Result<Vec<u8>> {
    let document = render::render_document(raw, options);
    let xml = render::render_document_xml(&document, options);
    docx::write_fresh(&xml)
}

/// Returns the plain-text export of generated text: the text itself.
pub fn export_text(raw: &str) -> Vec<u8> {
    raw.as_bytes().to_vec()
}

/// Output of [`export`].
#[derive(Debug)]
pub enum Export {
    /// A document was produced.
    Docx {
        /// The `.docx` bytes
        bytes: Vec<u8>,
        /// Merge summary; `None` for a fresh document
        report: Option<MergeReport>,
    },
    /// Producing a document failed; the raw text is exported instead.
    PlainText {
        /// The unmodified generated text
        bytes: Vec<u8>,
        /// Why no document was produced
        cause: Error,
    },
}

impl Export {
    /// Returns the exported bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Export::Docx { bytes, .. } | Export::PlainText { bytes, .. } => bytes,
        }
    }

    /// Returns true if this is the plain-text fallback.
    pub fn is_plain_text(&self) -> bool {
        matches!(self, Export::PlainText { .. })
    }

    /// Returns the file name to save this export under.
    pub fn file_name(&self, options: &ExportOptions, original: Option<&Path>) -> String {
        match (self, original) {
            (Export::PlainText { .. }, _) => options.text_file_name().to_string(),
            (Export::Docx { report: Some(_), .. }, Some(path)) => options.merged_file_name(path),
            (Export::Docx { .. }, _) => options.fresh_file_name().to_string(),
        }
    }
}

/// Produces the final download: a merged document when `original` is
/// given, a fresh one otherwise, or the raw text if either fails.
pub fn export(raw: &str, original: Option<&[u8]>, options: &ExportOptions) -> Export {
    let result = match original {
        Some(data) => merge_bytes(data.to_vec(), raw, &options.merge).map(|merged| Export::Docx {
            bytes: merged.bytes,
            report: Some(merged.report),
        }),
        None => create_docx(raw, &options.merge.render).map(|bytes| Export::Docx {
            bytes,
            report: None,
        }),
    };

    match result {
        Ok(export) => {
            info!("Exported document ({} bytes)", export.bytes().len());
            export
        }
        Err(cause) => {
            warn!("Document export failed, falling back to plain text: {}", cause);
            Export::PlainText {
                bytes: export_text(raw),
                cause,
            }
        }
    }
}

/// Builder for merging generated text.
///
/// # Example
///
/// ```no_run
/// use lessonmerge::{Highlight, LessonMerge};
///
/// let raw = std::fs::read_to_string("ket_qua.txt")?;
/// let merged = LessonMerge::new()
///     .with_highlight(Highlight::Color("C00000".into()))
///     .parse(raw)
///     .merge_file("Bai_3.docx")?;
/// println!("{}", merged.report);
/// # Ok::<(), lessonmerge::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct LessonMerge {
    options: MergeOptions,
}

impl LessonMerge {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how highlighted text is rendered.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.options.render.highlight = highlight;
        self
    }

    /// Sets the line cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.options.render.cleanup = cleanup;
        self
    }

    /// Sets the prefix of bullet items injected into an existing document.
    pub fn with_bullet_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.render.bullet_prefix = prefix.into();
        self
    }

    /// Sets the title of the end-of-document fallback block.
    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.options.render.fallback_title = title.into();
        self
    }

    /// Omits `[IDENTIFIER]` labels before unplaced sections.
    pub fn without_labels(mut self) -> Self {
        self.options = self.options.without_labels();
        self
    }

    /// Ignores anchor scopes.
    pub fn unscoped(mut self) -> Self {
        self.options = self.options.unscoped();
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Parses generated text.
    pub fn parse(self, raw: impl Into<String>) -> ParsedText {
        let raw = raw.into();
        let sections = parse_sections(&raw);
        ParsedText {
            raw,
            sections,
            options: self.options,
        }
    }
}

/// Generated text split into sections, ready to merge or render.
#[derive(Debug, Clone)]
pub struct ParsedText {
    raw: String,
    sections: Vec<ContentSection>,
    options: MergeOptions,
}

impl ParsedText {
    /// Returns the parsed sections in order of appearance.
    pub fn sections(&self) -> &[ContentSection] {
        &self.sections
    }

    /// Returns the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Returns the text with markers rewritten for on-screen preview.
    pub fn preview(&self) -> String {
        preview_markdown(&self.raw)
    }

    /// Returns true if the text says it quotes the PPCT verbatim.
    pub fn cites_distribution(&self) -> bool {
        cites_distribution(&self.raw)
    }

    /// Merges into an opened package.
    pub fn merge(&self, original: &OriginalPackage) -> Result<Merged> {
        let injection = docx::inject(original.main_markup()?, &self.sections, &self.raw, &self.options)?;
        let bytes = docx::write_merged(original, &injection.markup)?;
        Ok(Merged {
            bytes,
            report: injection.report,
        })
    }

    /// Merges into a `.docx` file.
    pub fn merge_file(&self, path: impl AsRef<Path>) -> Result<Merged> {
        self.merge(&OriginalPackage::open(path)?)
    }

    /// Merges into a `.docx` given as bytes.
    pub fn merge_bytes(&self, original: impl Into<bytes::Bytes>) -> Result<Merged> {
        self.merge(&OriginalPackage::from_bytes(original)?)
    }

    /// Renders into a fresh `.docx`.
    pub fn to_docx(&self) -> Result<Vec<u8>> {
        create_docx(&self.raw, &self.options.render)
    }

    /// Returns the raw text.
    pub fn to_text(&self) -> &str {
        &self.raw
    }

    /// Consumes self and returns the raw text.
    pub fn into_text(self) -> String {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::MarkupIndex;
    use crate::model::{Block, ParagraphStyle};
    use rand::Rng;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    const HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
    const TAIL: &str = r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#;

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn document_xml(paragraphs: &[&str]) -> String {
        let body: String = paragraphs.iter().map(|t| para(t)).collect();
        format!("{HEAD}{body}{TAIL}")
    }

    fn sample_docx(document: &str, image: &[u8]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let stored = options.compression_method(CompressionMethod::Stored);

        writer.start_file(docx::paths::CONTENT_TYPES, options).unwrap();
        writer
            .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.start_file("word/media/image1.png", stored).unwrap();
        writer.write_all(image).unwrap();
        writer.start_file("word/embeddings/oleObject1.bin", options).unwrap();
        writer.write_all(&image.iter().rev().copied().collect::<Vec<u8>>()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn merged_paragraph_texts(bytes: Vec<u8>) -> Vec<String> {
        let package = OriginalPackage::from_bytes(bytes).unwrap();
        let markup = package.main_markup().unwrap();
        MarkupIndex::scan(markup)
            .unwrap()
            .paragraphs
            .into_iter()
            .map(|p| p.key)
            .collect()
    }

    #[test]
    fn test_objectives_placed_after_attitude() {
        let original = sample_docx(&document_xml(&["I. Mục tiêu", "Attitude:", "II. Thiết bị"]), b"png");
        let raw = "===NLS_OBJECTIVES=== <red>- Goal X</red> ===END===";
        let merged = merge_bytes(original, raw, &MergeOptions::default()).unwrap();

        assert_eq!(merged.report.placed, 1);
        assert_eq!(
            merged_paragraph_texts(merged.bytes.clone()),
            vec!["i. mục tiêu", "attitude:", "- goal x", "ii. thiết bị"]
        );

        let package = OriginalPackage::from_bytes(merged.bytes).unwrap();
        let markup = package.main_markup().unwrap();
        let attitude = markup.find("Attitude:").unwrap();
        let goal = markup.find("- Goal X").unwrap();
        assert!(markup[attitude..goal].contains(r#"<w:color w:val="FF0000"/>"#));
    }

    #[test]
    fn test_unknown_section_appended_before_body_end() {
        let document = document_xml(&["Tiết 1", "Tiết 2"]);
        let original = sample_docx(&document, b"png");
        let raw = "===NLS_PHỤ_LỤC===\nPhiếu học tập số 1\n===END===";
        let merged = merge_bytes(original, raw, &MergeOptions::default()).unwrap();

        assert_eq!(merged.report.placed, 0);
        assert_eq!(merged.report.unplaced, vec!["PHỤ_LỤC"]);

        let texts = merged_paragraph_texts(merged.bytes);
        assert_eq!(&texts[..2], &["tiết 1", "tiết 2"]);
        let appended = texts[2..].join("\n");
        assert!(appended.contains("[phụ_lục]"));
        assert!(appended.contains("phiếu học tập số 1"));
    }

    #[test]
    fn test_fresh_heading_and_bullets() {
        let document = render::render_document("## Title\n- item one\n- item two", &RenderOptions::default());
        let paragraphs: Vec<_> = document.paragraphs().collect();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].style, ParagraphStyle::Heading(1));
        assert_eq!(paragraphs[0].plain_text(), "Title");
        assert_eq!(paragraphs[1].style, ParagraphStyle::BulletItem);
        assert_eq!(paragraphs[1].plain_text(), "item one");
        assert_eq!(paragraphs[2].plain_text(), "item two");

        let bytes = create_docx("## Title\n- item one\n- item two", &RenderOptions::default()).unwrap();
        let package = OriginalPackage::from_bytes(bytes).unwrap();
        assert!(package.main_markup().unwrap().contains(r#"<w:pStyle w:val="Heading1"/>"#));
    }

    #[test]
    fn test_fresh_single_line_section_keeps_content() {
        let raw = "===NLS_OBJECTIVES=== <red>- Goal X</red> ===END===";
        let document = render::render_document(raw, &RenderOptions::default());
        let paragraphs: Vec<_> = document.paragraphs().collect();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].plain_text(), "- Goal X");

        let bytes = create_docx(raw, &RenderOptions::default()).unwrap();
        let package = OriginalPackage::from_bytes(bytes).unwrap();
        let markup = package.main_markup().unwrap();
        assert!(markup.contains("Goal X"));
        assert!(!markup.contains("==="));
    }

    #[test]
    fn test_unvalidated_color_still_yields_well_formed_markup() {
        let options = RenderOptions::new().with_highlight(Highlight::Color(r#"F00"/><x"#.into()));
        let bytes = create_docx("<red>mới</red>", &options).unwrap();
        let package = OriginalPackage::from_bytes(bytes).unwrap();
        let markup = package.main_markup().unwrap();

        let index = MarkupIndex::scan(&markup).unwrap();
        assert_eq!(index.find("mới"), Some(0));
        assert!(!markup.contains("<x"));
    }

    #[test]
    fn test_fresh_table_drops_separator() {
        let document = render::render_document("|---|---|\n| a | b |", &RenderOptions::default());
        let Block::Table(table) = &document.blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0].cells.len(), 2);
    }

    #[test]
    fn test_aux_parts_byte_identical() {
        let mut rng = rand::thread_rng();
        for _ in 0..10 {
            let len = rng.gen_range(0..4096);
            let image: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            let original = sample_docx(&document_xml(&["Thái độ", "Củng cố"]), &image);
            let raw = "===NLS_MỤC_TIÊU===\nA\n===END===\n===NLS_CỦNG_CỐ===\nB\n===END===";

            let before = OriginalPackage::from_bytes(original.clone()).unwrap();
            let merged = merge_bytes(original, raw, &MergeOptions::default()).unwrap();
            let after = OriginalPackage::from_bytes(merged.bytes).unwrap();

            assert_eq!(after.len(), before.len());
            for part in before.aux_parts() {
                assert_eq!(after.get(&part.path).unwrap().data, part.data);
            }
            assert_ne!(after.main_markup().unwrap(), before.main_markup().unwrap());
        }
    }

    #[test]
    fn test_missing_document_part_is_reported() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/styles.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let original = writer.finish().unwrap().into_inner();

        let err = merge_bytes(original, "x", &MergeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingComponent(_)));
        assert_eq!(err.remediation(), Remediation::PlainTextExport);
    }

    #[test]
    fn test_export_falls_back_to_plain_text() {
        let raw = "===NLS_MỤC_TIÊU===\nA\n===END===";
        let export = export(raw, Some(b"not a zip"), &ExportOptions::default());

        assert!(export.is_plain_text());
        assert_eq!(export.bytes(), raw.as_bytes());
        assert_eq!(export.file_name(&ExportOptions::default(), None), "Giao_an_NLS.txt");
        let Export::PlainText { cause, .. } = export else {
            unreachable!()
        };
        assert!(matches!(cause, Error::NotAPackage(_)));
    }

    #[test]
    fn test_export_names() {
        let options = ExportOptions::default();

        let fresh = export("## A", None, &options);
        assert!(!fresh.is_plain_text());
        assert_eq!(fresh.file_name(&options, None), "Giao_an_NLS.docx");

        let original = sample_docx(&document_xml(&["Thái độ"]), b"png");
        let merged = export("===NLS_MỤC_TIÊU===\nA\n===END===", Some(&original), &options);
        assert_eq!(
            merged.file_name(&options, Some(Path::new("Bai 3.docx"))),
            "Bai 3_NLS.docx"
        );
        let Export::Docx { report: Some(report), .. } = merged else {
            panic!("expected a merged document");
        };
        assert!(report.is_complete());
    }

    #[test]
    fn test_builder_pipeline() {
        let parsed = LessonMerge::new()
            .with_highlight(Highlight::Note("(NLS)".into()))
            .without_labels()
            .parse("===NLS_MỤC_TIÊU===\n<red>mới</red>\n===END===\n(Nội dung trích xuất nguyên văn từ PPCT)");

        assert_eq!(parsed.section_count(), 1);
        assert!(parsed.cites_distribution());
        assert!(parsed.preview().contains("📌"));

        let original = sample_docx(&document_xml(&["Phẩm chất"]), b"png");
        let merged = parsed.merge_bytes(original).unwrap();
        let package = OriginalPackage::from_bytes(merged.bytes).unwrap();
        let markup = package.main_markup().unwrap();
        assert!(markup.contains("(NLS)"));
        assert!(!markup.contains("w:color"));
    }

    #[test]
    fn test_merge_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bai_3.docx");
        std::fs::write(&path, sample_docx(&document_xml(&["Củng cố"]), b"png")).unwrap();

        let merged = merge_file(&path, "===NLS_CỦNG_CỐ===\nX\n===END===", &MergeOptions::default()).unwrap();
        let out = dir.path().join(ExportOptions::default().merged_file_name(&path));
        std::fs::write(&out, &merged.bytes).unwrap();

        let reopened = OriginalPackage::open(&out).unwrap();
        assert!(reopened.main_markup().unwrap().contains(">X<"));
        assert!(out.ends_with("Bai_3_NLS.docx"));
    }
}
