//! Positional conventions of the daily defect sheets
//!
//! The daily NG workbooks carry no declared schema. Where the legend, the
//! item/part-number column, the defect code and the quantity window live is a
//! convention of the people filling them in, so it is kept here as data
//! rather than spread through the parser.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::CellAddress;
use crate::error::{Error, Result};

/// Rows read from each worksheet
pub const DEFAULT_MAX_ROWS: u32 = 900;

/// Columns read from each worksheet
pub const DEFAULT_MAX_COLUMNS: u32 = 20;

/// Rows scanned for legend entries
pub const DEFAULT_LEGEND_ROWS: usize = 100;

/// A worksheet column, stored 0-based and written as letters in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Column(u32);

impl Column {
    /// Column at a 0-based index (A=0)
    pub const fn at(index: u32) -> Self {
        Column(index)
    }

    /// Parse column letters ("A", "AA")
    pub fn from_letters(letters: &str) -> Result<Self> {
        CellAddress::letters_to_column(letters.trim()).map(Column)
    }

    /// 0-based index, for indexing grid rows
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CellAddress::column_to_letters(self.0))
    }
}

impl TryFrom<String> for Column {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Column::from_letters(&value)
    }
}

impl From<Column> for String {
    fn from(col: Column) -> Self {
        col.to_string()
    }
}

/// A (code, label) column pair holding legend entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendSlot {
    /// Column holding the single-character code
    pub key: Column,
    /// Column holding the defect label
    pub label: Column,
}

/// Inclusive run of columns summed into a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpan {
    pub first: Column,
    pub last: Column,
}

impl ColumnSpan {
    /// 0-based indices covered by the span
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.first.index()..=self.last.index()
    }
}

/// Where things live on a daily defect worksheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetLayout {
    /// Cap on rows read per worksheet
    pub max_rows: u32,
    /// Cap on columns read per worksheet
    pub max_columns: u32,
    /// Leading rows searched for legend entries
    pub legend_rows: usize,
    /// Code/label column pairs searched for legend entries
    pub legend_slots: Vec<LegendSlot>,
    /// "No." column; a number here starts a new item block
    pub number_column: Column,
    /// Item column; holds the part number of the block
    pub item_column: Column,
    /// Single-character defect code column
    pub code_column: Column,
    /// Per-shift/per-slot quantity cells summed for one observation
    pub quantity_columns: ColumnSpan,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_columns: DEFAULT_MAX_COLUMNS,
            legend_rows: DEFAULT_LEGEND_ROWS,
            // C/D and F/G
            legend_slots: vec![
                LegendSlot {
                    key: Column::at(2),
                    label: Column::at(3),
                },
                LegendSlot {
                    key: Column::at(5),
                    label: Column::at(6),
                },
            ],
            number_column: Column::at(1),
            item_column: Column::at(2),
            code_column: Column::at(7),
            // I..=Q
            quantity_columns: ColumnSpan {
                first: Column::at(8),
                last: Column::at(16),
            },
        }
    }
}

impl SheetLayout {
    /// Check that the layout can be applied to a grid of `max_columns` columns
    pub fn validate(&self) -> Result<()> {
        if self.quantity_columns.first > self.quantity_columns.last {
            return Err(Error::InvalidLayout(format!(
                "quantity window {}..{} is empty",
                self.quantity_columns.first, self.quantity_columns.last
            )));
        }

        let mut columns = vec![
            ("number_column", self.number_column),
            ("item_column", self.item_column),
            ("code_column", self.code_column),
            ("quantity_columns.last", self.quantity_columns.last),
        ];
        for slot in &self.legend_slots {
            columns.push(("legend_slots.key", slot.key));
            columns.push(("legend_slots.label", slot.label));
        }

        for (field, col) in columns {
            if col.index() >= self.max_columns as usize {
                return Err(Error::InvalidLayout(format!(
                    "{} {} lies outside the {} columns read per sheet",
                    field, col, self.max_columns
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_layout_columns() {
        let layout = SheetLayout::default();
        assert_eq!(layout.number_column.to_string(), "B");
        assert_eq!(layout.item_column.to_string(), "C");
        assert_eq!(layout.code_column.to_string(), "H");
        assert_eq!(layout.quantity_columns.indices(), 8..=16);
        assert_eq!(layout.legend_slots[1].label.to_string(), "G");
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_partial_override_from_json() {
        let layout: SheetLayout =
            serde_json::from_str(r#"{"code_column": "J", "max_rows": 50}"#).unwrap();
        assert_eq!(layout.code_column, Column::at(9));
        assert_eq!(layout.max_rows, 50);
        assert_eq!(layout.item_column, Column::at(2));
    }

    #[test]
    fn test_quantity_span_from_json() {
        let layout: SheetLayout =
            serde_json::from_str(r#"{"quantity_columns": {"first": "K", "last": "M"}}"#).unwrap();
        assert_eq!(layout.quantity_columns.indices(), 10..=12);
    }

    #[test]
    fn test_bad_column_letters_rejected() {
        let result = serde_json::from_str::<SheetLayout>(r#"{"code_column": "H1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = serde_json::from_str::<SheetLayout>(r#"{"code_col": "H"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_column() {
        let layout = SheetLayout {
            max_columns: 10,
            ..SheetLayout::default()
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reversed_window() {
        let layout = SheetLayout {
            quantity_columns: ColumnSpan {
                first: Column::at(12),
                last: Column::at(9),
            },
            ..SheetLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
