//! Table types.

use serde::{Deserialize, Serialize};

/// A logical table, possibly assembled from several pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,

    /// Number of header rows (0 = no header)
    pub header_rows: u8,

    /// Table caption (usually the section heading)
    pub caption: Option<String>,

    /// Pages the rows were collected from
    pub pages: Vec<u32>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_rows: 0,
            caption: None,
            pages: Vec::new(),
        }
    }

    /// Create a table with header.
    pub fn with_header(header_rows: u8) -> Self {
        Self {
            header_rows,
            ..Self::new()
        }
    }

    /// Build a table from rows of strings; the first row is the header when `has_header`.
    pub fn from_rows<S: Into<String>>(
        rows: impl IntoIterator<Item = Vec<S>>,
        has_header: bool,
    ) -> Self {
        let mut table = Self::with_header(u8::from(has_header));
        for (i, values) in rows.into_iter().enumerate() {
            let row = TableRow::from_strings(values);
            table.add_row(if has_header && i == 0 {
                row.into_header()
            } else {
                row
            });
        }
        table
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (widest row).
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get header rows.
    pub fn header(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[..n]
    }

    /// Get body rows (non-header).
    pub fn body(&self) -> &[TableRow] {
        let n = (self.header_rows as usize).min(self.rows.len());
        &self.rows[n..]
    }

    /// Right-pad every row with empty cells up to `width` columns.
    pub fn pad_to(&mut self, width: usize) {
        for row in &mut self.rows {
            while row.cells.len() < width {
                row.cells.push(TableCell::empty());
            }
        }
    }

    /// Right-pad every row to the widest row.
    pub fn normalize(&mut self) {
        let width = self.column_count();
        self.pad_to(width);
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: true,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Mark this row as a header row.
    pub fn into_header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Cell texts in column order.
    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }

    /// Check if every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(TableCell::is_empty)
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell text; embedded `\n` separates visual lines
    pub text: String,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
