//! # qc-screen-core
//!
//! Core data structures and screening logic for qc-screen.
//!
//! This crate turns loosely structured daily defect sheets into statistics:
//! - [`CellValue`], [`Worksheet`], [`Workbook`] - values as read from a spreadsheet
//! - [`CellGrid`] - a bounded, row-major snapshot of one worksheet
//! - [`Legend`] - the per-sheet defect code key
//! - [`parse_workbook`] - the row walk producing [`DefectObservation`]s
//! - [`aggregate`] - part/defect statistics and material risk over a [`PartCatalog`]
//!
//! ## Example
//!
//! ```rust
//! use qc_screen_core::{parse_worksheet, SheetLayout, Worksheet};
//!
//! let mut sheet = Worksheet::new("2024-03-01");
//! sheet.set_cell_value("C1", "A").unwrap();
//! sheet.set_cell_value("D1", "Scratch").unwrap();
//! sheet.set_cell_value("C3", "5001-AB").unwrap();
//! sheet.set_cell_value("H4", "A").unwrap();
//! sheet.set_cell_value("I4", 5.0).unwrap();
//!
//! let observations = parse_worksheet(&sheet, "press", &SheetLayout::default());
//! assert_eq!(observations.len(), 1);
//! assert_eq!(observations[0].quantity, 5);
//! ```

pub mod aggregate;
pub mod cell;
pub mod error;
pub mod grid;
pub mod layout;
pub mod legend;
pub mod mapping;
pub mod normalize;
pub mod observation;
pub mod scan;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use aggregate::{aggregate, risk_score, DefectStatistics, MaterialDefectRisk, PartDefectStat};
pub use cell::{leading_column_number, CellAddress, CellValue, SharedString};
pub use error::{Error, Result};
pub use grid::{CellGrid, GridLimits};
pub use layout::{Column, ColumnSpan, LegendSlot, SheetLayout};
pub use legend::Legend;
pub use mapping::{MappingDocument, MaterialEntry, PartCatalog, PartEntry, UniqNo};
pub use normalize::{is_part_number_shaped, normalize_part_number, normalize_text};
pub use observation::{
    defect_on_row, parse_grid, parse_workbook, parse_worksheet, DefectObservation, RowState,
};
pub use scan::{part_numbers_in_rows, part_numbers_in_sheet};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
