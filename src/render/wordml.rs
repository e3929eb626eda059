//! WordprocessingML renderer.
//!
//! Emits `w:p`/`w:tbl` fragments for rendered blocks. Fresh documents use the
//! package's own heading styles and bullet numbering; fragments injected into
//! an existing document cannot rely on either being defined there, so they
//! use direct formatting instead.

use super::{Highlight, RenderOptions};
use crate::model::{Block, Document, Paragraph, ParagraphStyle, Table, TextRun, TextStyle};
use quick_xml::escape::escape;
use std::fmt::Write;

/// Namespace declarations of a fresh `word/document.xml`.
const DOCUMENT_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#
);

/// A4 page with 2 cm / 3 cm margins.
const SECTION_PROPERTIES: &str = concat!(
    r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/>"#,
    r#"<w:pgMar w:top="1134" w:right="1134" w:bottom="1134" w:left="1701" w:header="720" w:footer="720" w:gutter="0"/>"#,
    r#"</w:sectPr>"#
);

/// Numbering instance defined in the fresh package's `word/numbering.xml`.
pub const BULLET_NUM_ID: u32 = 1;

/// Text width of an A4 page with the margins above, in twips.
const TEXT_WIDTH: u32 = 9071;

/// Half-point sizes of directly formatted headings 1-3.
const HEADING_SIZES: [u32; 3] = [32, 28, 26];

/// Where the renderer's output ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A package written from scratch, with styles and numbering.
    Fresh,
    /// An existing document of unknown styles.
    Injected,
}

/// Renders blocks into WordprocessingML.
#[derive(Debug)]
pub struct WordRenderer<'a> {
    options: &'a RenderOptions,
    target: Target,
}

impl<'a> WordRenderer<'a> {
    /// Creates a renderer for a fresh package.
    pub fn fresh(options: &'a RenderOptions) -> Self {
        Self {
            options,
            target: Target::Fresh,
        }
    }

    /// Creates a renderer for fragments spliced into an existing document.
    pub fn injected(options: &'a RenderOptions) -> Self {
        Self {
            options,
            target: Target::Injected,
        }
    }

    /// Returns the output target.
    pub fn target(&self) -> Target {
        self.target
    }

    /// Renders a block sequence.
    pub fn render_blocks(&self, blocks: &[Block]) -> String {
        let mut out = String::new();
        for block in blocks {
            match block {
                Block::Paragraph(para) => self.render_paragraph(para, &mut out),
                Block::Table(table) => self.render_table(table, &mut out),
            }
        }
        out
    }

    /// Renders a complete `word/document.xml`.
    pub fn render_document(&self, document: &Document) -> String {
        let mut out = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        let _ = write!(out, "<w:document {}><w:body>", DOCUMENT_NAMESPACES);
        out.push_str(&self.render_blocks(&document.blocks));
        out.push_str(SECTION_PROPERTIES);
        out.push_str("</w:body></w:document>");
        out
    }

    /// Renders a paragraph.
    pub fn render_paragraph(&self, para: &Paragraph, out: &mut String) {
        if para.runs.iter().all(TextRun::is_empty) {
            match para.style {
                ParagraphStyle::Body => {
                    out.push_str("<w:p/>");
                    return;
                }
                // An empty heading or bullet has nothing to show.
                _ => return,
            }
        }

        out.push_str("<w:p>");
        self.render_paragraph_properties(para.style, out);

        let extra = match (self.target, para.style) {
            (Target::Injected, ParagraphStyle::Heading(level)) => RunExtra {
                bold: true,
                size: HEADING_SIZES.get(usize::from(level.max(1)) - 1).copied(),
            },
            _ => RunExtra::default(),
        };

        if self.target == Target::Injected && para.style.is_list_item() {
            let style = para.runs.first().map(|r| r.style).unwrap_or_default();
            self.render_text(&self.options.bullet_prefix, style, extra, out);
        }

        for run in &para.runs {
            self.render_run_with(run, extra, out);
        }
        out.push_str("</w:p>");
    }

    fn render_paragraph_properties(&self, style: ParagraphStyle, out: &mut String) {
        let mut props = String::new();

        match (self.target, style) {
            (Target::Fresh, ParagraphStyle::BulletItem) => {
                let _ = write!(
                    props,
                    r#"<w:pStyle w:val="ListParagraph"/><w:numPr><w:ilvl w:val="0"/><w:numId w:val="{}"/></w:numPr>"#,
                    BULLET_NUM_ID
                );
            }
            (Target::Fresh, ParagraphStyle::Heading(_)) => {
                if let Some(id) = style.style_id() {
                    let _ = write!(props, r#"<w:pStyle w:val="{}"/>"#, id);
                }
            }
            (Target::Injected, ParagraphStyle::BulletItem) => {
                props.push_str(r#"<w:ind w:left="360"/>"#);
            }
            (Target::Injected, ParagraphStyle::Heading(_)) => {
                props.push_str(r#"<w:keepNext/><w:spacing w:before="120" w:after="60"/>"#);
            }
            (_, ParagraphStyle::Body) => {}
        }

        if style == ParagraphStyle::Body && self.options.justify_body {
            props.push_str(r#"<w:jc w:val="both"/>"#);
        }

        if !props.is_empty() {
            out.push_str("<w:pPr>");
            out.push_str(&props);
            out.push_str("</w:pPr>");
        }
    }

    /// Renders a table followed by an empty paragraph.
    pub fn render_table(&self, table: &Table, out: &mut String) {
        let columns = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        if columns == 0 {
            return;
        }
        let column_width = TEXT_WIDTH / columns as u32;

        out.push_str("<w:tbl><w:tblPr>");
        out.push_str(r#"<w:tblW w:w="5000" w:type="pct"/>"#);
        out.push_str("<w:tblBorders>");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            let _ = write!(
                out,
                r#"<w:{} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
                edge
            );
        }
        out.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
        for _ in 0..columns {
            let _ = write!(out, r#"<w:gridCol w:w="{}"/>"#, column_width);
        }
        out.push_str("</w:tblGrid>");

        for row in &table.rows {
            out.push_str("<w:tr>");
            for index in 0..columns {
                let _ = write!(
                    out,
                    r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/></w:tcPr><w:p>"#,
                    column_width
                );
                if let Some(cell) = row.cells.get(index) {
                    for run in &cell.runs {
                        self.render_run(run, out);
                    }
                }
                out.push_str("</w:p></w:tc>");
            }
            out.push_str("</w:tr>");
        }
        out.push_str("</w:tbl><w:p/>");
    }

    /// Renders a single run.
    pub fn render_run(&self, run: &TextRun, out: &mut String) {
        self.render_run_with(run, RunExtra::default(), out);
    }

    fn render_run_with(&self, run: &TextRun, extra: RunExtra, out: &mut String) {
        if run.is_empty() {
            return;
        }
        self.render_text(&run.text, run.style, extra, out);

        if let (true, Highlight::Note(label)) = (run.style.highlight, &self.options.highlight) {
            let note = TextStyle::italic();
            self.render_text(&format!(" {}", label), note, RunExtra::default(), out);
        }
    }

    fn render_text(&self, text: &str, style: TextStyle, extra: RunExtra, out: &mut String) {
        if text.is_empty() {
            return;
        }

        let mut props = String::new();
        if style.bold || extra.bold {
            props.push_str("<w:b/>");
        }
        if style.italic {
            props.push_str("<w:i/>");
        }
        if let (true, Highlight::Color(rgb)) = (style.highlight, &self.options.highlight) {
            let _ = write!(props, r#"<w:color w:val="{}"/>"#, escape_xml(rgb));
        }
        if let Some(size) = extra.size {
            let _ = write!(props, r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#);
        }
        if style.underline {
            props.push_str(r#"<w:u w:val="single"/>"#);
        }

        out.push_str("<w:r>");
        if !props.is_empty() {
            out.push_str("<w:rPr>");
            out.push_str(&props);
            out.push_str("</w:rPr>");
        }
        out.push_str(r#"<w:t xml:space="preserve">"#);
        out.push_str(&escape_xml(text));
        out.push_str("</w:t></w:r>");
    }

    /// Renders the separator and title opening the end-of-document fallback block.
    pub fn fallback_header(&self) -> String {
        let color = escape_xml(self.options.highlight.accent_color());
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<w:p><w:pPr><w:pBdr><w:top w:val="single" w:sz="12" w:space="1" w:color="{}"/></w:pBdr></w:pPr></w:p>"#,
            color
        );
        self.render_label(&self.options.fallback_title, &mut out);
        out
    }

    /// Renders a highlighted label paragraph, e.g. `[HOẠT_ĐỘNG_2]`.
    pub fn render_label(&self, text: &str, out: &mut String) {
        let color = escape_xml(self.options.highlight.accent_color());
        let _ = write!(
            out,
            r#"<w:p><w:r><w:rPr><w:b/><w:color w:val="{}"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            color,
            escape_xml(text)
        );
    }
}

/// Formatting applied on top of a run's own emphasis.
#[derive(Debug, Clone, Copy, Default)]
struct RunExtra {
    bold: bool,
    size: Option<u32>,
}

/// Escapes text for a `w:t` element or attribute value, dropping characters
/// XML 1.0 forbids.
pub fn escape_xml(text: &str) -> String {
    let valid: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= ' ')
        .collect();
    escape(valid.as_str()).into_owned()
}
