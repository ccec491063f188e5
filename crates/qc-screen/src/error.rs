//! Pipeline error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for screening runs
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Failures that abort a screening run.
///
/// Only mandatory inputs produce these; the part list degrades to a warning.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// A workbook could not be read
    #[error("failed to read workbook '{}': {source}", path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: qc_screen_xlsx::XlsxError,
    },

    /// A file could not be opened
    #[error("failed to open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping document is not valid JSON of the expected shape
    #[error("invalid mapping document '{}': {source}", path.display())]
    Mapping {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A workbook that must have a worksheet has none
    #[error("workbook '{}' has no worksheets", path.display())]
    NoWorksheet { path: PathBuf },

    /// Invalid configuration
    #[error(transparent)]
    Core(#[from] qc_screen_core::Error),
}
