//! Run inputs and options

use std::path::PathBuf;

use qc_screen_core::SheetLayout;
use qc_screen_xlsx::ArchiveScanLimits;

/// Columns of the requirement list searched for part numbers
pub const DEFAULT_REQUIREMENT_COLUMNS: u32 = 12;

/// The five input files of a screening run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreeningInputs {
    /// Daily NG workbook of the press line
    pub press: PathBuf,
    /// Daily NG workbook of the sewing line
    pub sewing: PathBuf,
    /// Part list workbook, scanned best effort
    pub part_list: PathBuf,
    /// Part requirement list workbook
    pub requirement: PathBuf,
    /// Part to material mapping (JSON)
    pub mapping: PathBuf,
}

/// How a screening run reads its inputs
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningOptions {
    /// Do not open the part list at all
    pub skip_part_list: bool,
    /// Where things are on a daily NG sheet
    pub layout: SheetLayout,
    /// Window of the part list that is scanned
    pub archive_limits: ArchiveScanLimits,
    /// Leading columns of the requirement list that are scanned
    pub requirement_columns: u32,
}

impl Default for ScreeningOptions {
    fn default() -> Self {
        Self {
            skip_part_list: false,
            layout: SheetLayout::default(),
            archive_limits: ArchiveScanLimits::default(),
            requirement_columns: DEFAULT_REQUIREMENT_COLUMNS,
        }
    }
}
