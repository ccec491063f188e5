//! # qc-screen-xlsx
//!
//! XLSX input for qc-screen.
//!
//! - [`XlsxReader`] loads every worksheet's cached cell values into a
//!   [`Workbook`](qc_screen_core::Workbook)
//! - [`scan_part_numbers`] searches a part-list workbook for part numbers
//!   directly in its package XML
//!
//! ## Example
//!
//! ```rust,no_run
//! use qc_screen_xlsx::{scan_part_numbers, ArchiveScanLimits, XlsxReader};
//!
//! let workbook = XlsxReader::read_file("daily_ng_press.xlsx")?;
//! println!("{} sheets", workbook.sheet_count());
//!
//! let parts = scan_part_numbers("part_list.xlsx", &ArchiveScanLimits::default())?;
//! println!("{} part numbers", parts.len());
//! # Ok::<(), qc_screen_xlsx::XlsxError>(())
//! ```

pub mod archive;
pub mod error;
mod package;
pub mod reader;

pub use archive::{scan_part_numbers, scan_part_numbers_from, ArchiveScanLimits};
pub use error::{XlsxError, XlsxResult};
pub use reader::{ReadOptions, XlsxReader};
