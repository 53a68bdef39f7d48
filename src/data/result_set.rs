//! Immutable snapshot of one executed statement's output.

use std::fmt;

/// A single cell value, covering the storage classes the engine can return
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered column names plus ordered rows of positionally aligned values.
/// Produced fresh by each execution and never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Rendered text of one cell, empty string for out-of-range and NULL
    pub fn cell_text(&self, row: usize, col: usize) -> String {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// All rows as rendered text, aligned with `columns`
    pub fn to_text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    /// Link label for a row: the first column's value.
    /// Positional contract with the upstream data producer.
    pub fn link_label(&self, row: usize) -> String {
        self.cell_text(row, 0)
    }

    /// Link target for a row: the last column's value, when present and
    /// non-empty. The URI always rides in the last column.
    pub fn link_target(&self, row: usize) -> Option<String> {
        let last = self.column_count().checked_sub(1)?;
        let text = self.cell_text(row, last);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
