//! Per-sheet defect legend
//!
//! Each daily sheet carries its own key of single-character defect codes next
//! to their names, e.g. `A | Scratch` in columns C/D and `F | Pin Hole` in
//! columns F/G near the top of the sheet.

use std::collections::BTreeMap;

use crate::cell::CellValue;
use crate::grid::CellGrid;
use crate::layout::SheetLayout;

/// Mapping from defect code to defect label for one worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Legend {
    entries: BTreeMap<String, String>,
}

impl Legend {
    /// Scan the leading rows of `grid` for legend entries.
    ///
    /// A slot contributes when its key cell is text of exactly one character
    /// (after trimming) and its label is non-empty and not a `TOTAL` header.
    /// A key seen again further down replaces the earlier label.
    pub fn extract(grid: &CellGrid, layout: &SheetLayout) -> Self {
        let mut legend = Legend::default();
        for row in grid.rows().take(layout.legend_rows) {
            for slot in &layout.legend_slots {
                let key = row.get(slot.key.index()).unwrap_or(&CellValue::Empty);
                let label = row.get(slot.label.index()).unwrap_or(&CellValue::Empty);
                if let Some((code, text)) = legend_entry(key, label) {
                    legend.entries.insert(code, text);
                }
            }
        }
        legend
    }

    /// Look up the label for a code cell.
    ///
    /// The cell must be text that trims to a single character; matching is
    /// case-insensitive.
    pub fn resolve(&self, code: &CellValue) -> Option<&str> {
        let code = single_char_code(code)?;
        self.entries.get(&code).map(String::as_str)
    }

    /// Label for an exact (uppercase) code
    pub fn get(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    /// Insert an entry, replacing any earlier label for the same code
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, code: K, label: V) {
        self.entries.insert(code.into(), label.into());
    }

    /// Number of codes in the legend
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the legend has no codes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate (code, label) pairs in code order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn legend_entry(key: &CellValue, label: &CellValue) -> Option<(String, String)> {
    let key = key.as_text()?.trim();
    if key.chars().count() != 1 || label.is_empty() {
        return None;
    }
    let label = label.to_string().trim().to_string();
    if label.is_empty() || label.to_uppercase().contains("TOTAL") {
        return None;
    }
    Some((key.to_uppercase(), label))
}

/// Uppercased code when `cell` is text trimming to exactly one character
fn single_char_code(cell: &CellValue) -> Option<String> {
    let code = cell.as_text()?.trim().to_uppercase();
    (code.chars().count() == 1).then_some(code)
}
