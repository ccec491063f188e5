//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::MAX_COLS;

static EMPTY: CellValue = CellValue::Empty;

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely, row by row. Only non-empty values are kept so
/// the row/column extents reflect populated cells.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Populated cells keyed by row then column (both 0-based)
    rows: BTreeMap<u32, BTreeMap<u32, CellValue>>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a cell value by A1-style address
    pub fn get_value(&self, address: &str) -> Result<&CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by 0-based row and column
    pub fn get_value_at(&self, row: u32, col: u32) -> &CellValue {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(&col))
            .unwrap_or(&EMPTY)
    }

    /// Set a cell value by A1-style address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by 0-based row and column. Setting `Empty` clears the cell.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u32,
        value: V,
    ) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }

        let value = value.into();
        if value.is_empty() {
            if let Some(cells) = self.rows.get_mut(&row) {
                cells.remove(&col);
                if cells.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }
        Ok(())
    }

    /// Number of rows up to and including the last populated one
    pub fn max_row(&self) -> u32 {
        self.rows.keys().next_back().map_or(0, |r| r + 1)
    }

    /// Number of columns up to and including the right-most populated one
    pub fn max_column(&self) -> u32 {
        self.rows
            .values()
            .filter_map(|cells| cells.keys().next_back())
            .max()
            .map_or(0, |c| c + 1)
    }

    /// Number of columns up to and including the last populated cell of `row`
    pub fn row_width(&self, row: u32) -> u32 {
        self.rows
            .get(&row)
            .and_then(|cells| cells.keys().next_back())
            .map_or(0, |c| c + 1)
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Check if the worksheet is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over all non-empty cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.rows
            .iter()
            .flat_map(|(row, cells)| cells.iter().map(move |(col, v)| (*row, *col, v)))
    }
}
