//! Table structures for document model.

use super::TextRun;
use serde::Serialize;

/// A table block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Table rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Gets a cell at the specified position.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableRow {
    /// Cells in this row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Creates a new empty row.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A cell in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCell {
    /// Formatted content of this cell
    pub runs: Vec<TextRun>,
}

impl TableCell {
    /// Creates a cell from formatted runs.
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Creates a cell with unstyled text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::new(text)],
        }
    }

    /// Returns the plain text content of this cell.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(TextRun::plain_text).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_dimensions() {
        let mut table = Table::new();
        assert_eq!(table.column_count(), 0);

        table.rows.push(TableRow {
            cells: vec![TableCell::text("Hoạt động"), TableCell::text("Công cụ số")],
        });
        table.rows.push(TableRow {
            cells: vec![TableCell::text("1"), TableCell::text("GeoGebra")],
        });

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.get_cell(1, 1).map(|c| c.plain_text()), Some("GeoGebra".into()));
        assert!(table.get_cell(2, 0).is_none());
    }
}
