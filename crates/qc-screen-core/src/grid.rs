//! Dense row-major snapshot of a worksheet window

use crate::cell::CellValue;
use crate::worksheet::Worksheet;

static EMPTY: CellValue = CellValue::Empty;

/// Row/column caps applied when snapshotting a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLimits {
    pub max_rows: u32,
    pub max_columns: u32,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_rows: crate::layout::DEFAULT_MAX_ROWS,
            max_columns: crate::layout::DEFAULT_MAX_COLUMNS,
        }
    }
}

/// Cell values of a worksheet window, one `Vec` per row.
///
/// Row `r` of the grid is sheet row `r + 1`; every sheet row inside the
/// window is present, even blank ones. Each row is only as long as its own
/// right-most populated cell (within the column cap), so callers index with
/// [`CellGrid::cell`] or `row.get(..)` instead of assuming a width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellGrid {
    rows: Vec<Vec<CellValue>>,
}

impl CellGrid {
    /// Snapshot the top-left `limits` window of `sheet`
    pub fn from_worksheet(sheet: &Worksheet, limits: GridLimits) -> Self {
        let row_count = sheet.max_row().min(limits.max_rows);
        let rows = (0..row_count)
            .map(|row| {
                let width = sheet.row_width(row).min(limits.max_columns);
                (0..width)
                    .map(|col| sheet.get_value_at(row, col).clone())
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Build a grid directly from rows
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Number of rows in the grid
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the grid has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by 0-based index
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Get a cell, `Empty` when outside the row
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
