//! Cell types

mod address;
mod value;

pub use address::{leading_column_number, CellAddress};
pub use value::{CellValue, SharedString};
