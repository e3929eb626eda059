//! Block-level content and the fresh document built from it.

use super::{Paragraph, Table};
use serde::Serialize;

/// A block-level content element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

impl Block {
    /// Returns the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        }
    }

    /// Returns the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        }
    }
}

/// A document synthesized from generated text when no original exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Content blocks in order
    pub blocks: Vec<Block>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document from rendered blocks.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Returns the total number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph(_)))
            .count()
    }

    /// Returns an iterator over all paragraphs in the document.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(Block::as_paragraph)
    }

    /// Returns the plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        let mut result = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => result.push(p.plain_text()),
                Block::Table(t) => {
                    for row in &t.rows {
                        let cells: Vec<String> = row.cells.iter().map(|c| c.plain_text()).collect();
                        result.push(cells.join("\t"));
                    }
                }
            }
        }
        result.join("\n")
    }

    /// Returns the block structure as pretty-printed JSON.
    pub fn raw_content(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TableRow};

    #[test]
    fn test_plain_text_joins_blocks() {
        let table = Table {
            rows: vec![TableRow {
                cells: vec![TableCell::text("a"), TableCell::text("b")],
            }],
        };
        let doc = Document::from_blocks(vec![
            Block::Paragraph(Paragraph::text("Tiêu đề")),
            Block::Table(table),
        ]);

        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.plain_text(), "Tiêu đề\na\tb");
    }

    #[test]
    fn test_raw_content_is_json() {
        let doc = Document::from_blocks(vec![Block::Paragraph(Paragraph::text("x"))]);
        let value: serde_json::Value = serde_json::from_str(&doc.raw_content()).unwrap();
        assert!(value["blocks"].is_array());
    }
}
