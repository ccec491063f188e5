//! Prelude module - common imports for qc-screen users
//!
//! ```rust
//! use qc_screen::prelude::*;
//! ```

pub use crate::{
    run_screening, ArchiveScanLimits, ScreenError, ScreeningInputs, ScreeningOptions,
    ScreeningReport, SheetLayout, Summary,
};
