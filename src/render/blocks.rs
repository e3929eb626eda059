//! Block-level classification of generated text.
//!
//! Each line is classified in this order:
//!
//! 1. Lines starting with `|` are buffered into a table
//! 2. Blank lines become empty paragraphs
//! 3. Delimiter and placeholder lines are dropped (see [`crate::cleanup`])
//! 4. `#`/`##` → heading 1, `###` → heading 2, `####` → heading 3
//! 5. `- `, `* `, `+ ` → bullet items
//! 6. Anything else is a body paragraph
//!
//! Cleanup runs before heading and bullet detection so that a rewritten
//! `Tích hợp NLS:` label is picked up as a bullet.

use super::RenderOptions;
use crate::cleanup::clean_line;
use crate::inline::tokenize;
use crate::model::{Block, Paragraph, ParagraphStyle, Table, TableCell, TableRow};
use regex::Regex;
use std::sync::LazyLock;

static RE_TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|?\s*[-:]+[-|\s:]*\|?\s*$").unwrap());

/// Heading sigils, longest first.
const HEADING_SIGILS: &[(&str, u8)] = &[("####", 3), ("###", 2), ("##", 1), ("#", 1)];

const BULLET_SIGILS: &[char] = &['-', '*', '+'];

/// Converts text into document blocks.
pub fn render_blocks(text: &str, options: &RenderOptions) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut table_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with('|') {
            table_lines.push(trimmed);
            continue;
        }
        flush_table(&mut table_lines, &mut blocks);

        if trimmed.is_empty() {
            blocks.push(Block::Paragraph(Paragraph::new()));
            continue;
        }

        let Some(cleaned) = clean_line(trimmed, &options.cleanup) else {
            continue;
        };

        blocks.push(Block::Paragraph(classify_line(&cleaned)));
    }
    flush_table(&mut table_lines, &mut blocks);

    blocks
}

/// Classifies a single non-table line into a styled paragraph.
fn classify_line(line: &str) -> Paragraph {
    if let Some((level, rest)) = strip_heading(line) {
        return Paragraph::with_runs(ParagraphStyle::heading(level), tokenize(rest));
    }
    if let Some(rest) = strip_bullet(line) {
        return Paragraph::with_runs(ParagraphStyle::BulletItem, tokenize(rest));
    }
    Paragraph::with_runs(ParagraphStyle::Body, tokenize(line))
}

fn strip_heading(line: &str) -> Option<(u8, &str)> {
    HEADING_SIGILS.iter().find_map(|(sigil, level)| {
        let rest = line.strip_prefix(sigil)?;
        rest.starts_with(char::is_whitespace)
            .then(|| (*level, rest.trim_start()))
    })
}

fn strip_bullet(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(BULLET_SIGILS)?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

fn flush_table(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    if let Some(table) = parse_table(lines) {
        blocks.push(Block::Table(table));
    }
    lines.clear();
}

/// Builds a table from buffered `|` lines, dropping separator rows.
fn parse_table(lines: &[&str]) -> Option<Table> {
    let rows: Vec<TableRow> = lines
        .iter()
        .filter(|line| !RE_TABLE_SEPARATOR.is_match(line))
        .map(|line| split_cells(line))
        .filter(|cells| !cells.is_empty())
        .map(|cells| TableRow {
            cells: cells
                .into_iter()
                .map(|cell| TableCell::new(tokenize(cell)))
                .collect(),
        })
        .collect();

    (!rows.is_empty()).then_some(Table { rows })
}

/// Splits a row on `|`, discarding the empty cells produced by outer pipes.
fn split_cells(line: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if line.starts_with('|') && cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if line.ends_with('|') && cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextStyle;

    fn render(text: &str) -> Vec<Block> {
        render_blocks(text, &RenderOptions::default())
    }

    #[test]
    fn test_heading_and_bullets() {
        let blocks = render("## Title\n- item one\n- item two");
        assert_eq!(blocks.len(), 3);

        let heading = blocks[0].as_paragraph().unwrap();
        assert_eq!(heading.style, ParagraphStyle::Heading(1));
        assert_eq!(heading.plain_text(), "Title");

        for (block, expected) in blocks[1..].iter().zip(["item one", "item two"]) {
            let para = block.as_paragraph().unwrap();
            assert_eq!(para.style, ParagraphStyle::BulletItem);
            assert_eq!(para.plain_text(), expected);
        }
    }

    #[test]
    fn test_heading_levels() {
        let blocks = render("# A\n## B\n### C\n#### D\n#hashtag");
        let styles: Vec<ParagraphStyle> = blocks
            .iter()
            .map(|b| b.as_paragraph().unwrap().style)
            .collect();
        assert_eq!(
            styles,
            vec![
                ParagraphStyle::Heading(1),
                ParagraphStyle::Heading(1),
                ParagraphStyle::Heading(2),
                ParagraphStyle::Heading(3),
                ParagraphStyle::Body,
            ]
        );
    }

    #[test]
    fn test_table_separator_dropped() {
        let blocks = render("| a | b |\n|---|---|\n| c | d |");
        assert_eq!(blocks.len(), 1);
        let table = blocks[0].as_table().unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get_cell(1, 0).unwrap().plain_text(), "c");
        assert_eq!(table.get_cell(1, 1).unwrap().plain_text(), "d");
    }

    #[test]
    fn test_separator_then_single_row() {
        let blocks = render("|---|---|\n| x | y |");
        let table = blocks[0].as_table().unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.get_cell(0, 0).unwrap().plain_text(), "x");
        assert_eq!(table.get_cell(0, 1).unwrap().plain_text(), "y");
    }

    #[test]
    fn test_balanced_columns() {
        let text = "| Hoạt động | Công cụ số | Năng lực |\n\
                    |:---|:---:|---:|\n\
                    | HĐ 1 | **Padlet** | Giao tiếp |\n\
                    | HĐ 2 | GeoGebra | <red>Giải quyết vấn đề</red> |";
        let blocks = render(text);
        let table = blocks[0].as_table().unwrap();
        let header = table.column_count();
        assert_eq!(header, 3);
        assert!(table.rows.iter().all(|r| r.cells.len() == header));
        assert!(table.get_cell(1, 1).unwrap().runs[0].style.bold);
    }

    #[test]
    fn test_table_flushed_by_text_line() {
        let blocks = render("| a |\nsau bảng");
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].as_table().is_some());
        assert_eq!(blocks[1].as_paragraph().unwrap().plain_text(), "sau bảng");
    }

    #[test]
    fn test_blank_and_dropped_lines() {
        let blocks = render("a\n\n[Chèn hình ảnh]\n===END===\nb");
        assert_eq!(blocks.len(), 3);
        assert!(blocks[1].as_paragraph().unwrap().is_empty());
        assert_eq!(blocks[2].as_paragraph().unwrap().plain_text(), "b");
    }

    #[test]
    fn test_integration_label_becomes_bullet() {
        let blocks = render("* Tích hợp NLS: HS dùng Padlet (2.1NC1a)");
        let para = blocks[0].as_paragraph().unwrap();
        assert_eq!(para.style, ParagraphStyle::BulletItem);
        assert_eq!(para.plain_text(), "HS dùng Padlet");
    }

    #[test]
    fn test_bold_line_is_not_bullet() {
        let blocks = render("**Bước 1:** Giao nhiệm vụ");
        let para = blocks[0].as_paragraph().unwrap();
        assert_eq!(para.style, ParagraphStyle::Body);
        assert_eq!(para.runs[0].style, TextStyle::bold());
    }

    #[test]
    fn test_empty_input() {
        assert!(render("").is_empty());
    }
}
