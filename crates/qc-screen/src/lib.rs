//! # qc-screen
//!
//! Defect screening for a production quality team.
//!
//! A run reads the daily NG workbooks of the press and sewing lines, the
//! part-to-material mapping, the part list and the part requirement list, and
//! produces a [`ScreeningReport`]: defect totals per part, an average defect
//! quantity per material ("risk score") and the part numbers nobody could map.
//!
//! ## Example
//!
//! ```rust,no_run
//! use qc_screen::{run_screening, ScreeningInputs, ScreeningOptions};
//!
//! let inputs = ScreeningInputs {
//!     press: "daily_ng_press.xlsx".into(),
//!     sewing: "daily_ng_sewing.xlsx".into(),
//!     part_list: "part_list.xlsx".into(),
//!     requirement: "part_requirement_list.xlsx".into(),
//!     mapping: "part_material_mapping.json".into(),
//! };
//!
//! let report = run_screening(&inputs, &ScreeningOptions::default())?;
//! println!("{} observations", report.summary.total_observations);
//! for warning in &report.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok::<(), qc_screen::ScreenError>(())
//! ```

pub mod best_effort;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod report;

pub use best_effort::BestEffort;
pub use error::{Result, ScreenError};
pub use options::{ScreeningInputs, ScreeningOptions, DEFAULT_REQUIREMENT_COLUMNS};
pub use pipeline::{
    daily_observations, load_mapping, part_list_numbers, requirement_part_numbers, run_screening,
    PART_LIST_FAILED, PART_LIST_SKIPPED, PRESS_LINE, SEWING_LINE,
};
pub use report::{format_timestamp, ScreeningReport, SourceFiles, Summary};

// Re-export core types
pub use qc_screen_core::{
    CellValue, DefectObservation, Error, MaterialDefectRisk, PartCatalog, PartDefectStat,
    SheetLayout, Workbook, Worksheet,
};

// Re-export I/O types
pub use qc_screen_xlsx::{ArchiveScanLimits, XlsxError, XlsxReader};
