//! Defect observations from daily NG worksheets
//!
//! A daily sheet is a run of item blocks. A block starts on a row with a
//! number in the "No." column; the part number sits in the item column of
//! that row or one below it; defect rows under it carry a legend code and a
//! run of per-slot quantities. [`RowState`] tracks which part the rows
//! currently belong to.

use serde::Serialize;
use tracing::debug;

use crate::cell::CellValue;
use crate::grid::{CellGrid, GridLimits};
use crate::layout::SheetLayout;
use crate::legend::Legend;
use crate::normalize::is_part_number_shaped;
use crate::workbook::Workbook;
use crate::worksheet::Worksheet;

/// One defect count read from a daily sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefectObservation {
    /// Production line tag supplied by the caller ("press", "sewing")
    pub line: String,
    /// Part number as written on the sheet (trimmed, not normalized)
    pub part_number: String,
    /// Label from the sheet legend
    pub defect_name: String,
    /// Sum of the quantity window, always positive
    pub quantity: i64,
    /// Worksheet name; one sheet per day
    pub sheet_name: String,
}

/// Part attribution carried from row to row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowState {
    active_part: Option<String>,
}

impl RowState {
    /// State with `part` active
    pub fn with_part<S: Into<String>>(part: S) -> Self {
        Self {
            active_part: Some(part.into()),
        }
    }

    /// The part number defect rows are currently attributed to
    pub fn active_part(&self) -> Option<&str> {
        self.active_part.as_deref()
    }

    /// State after seeing `row`.
    ///
    /// A numeric "No." cell next to a non-empty item cell clears the active
    /// part. A part-number-shaped item cell then sets it, so a block header
    /// that carries its own part number ends up active.
    pub fn advance(self, row: &[CellValue], layout: &SheetLayout) -> Self {
        let number = cell(row, layout.number_column.index());
        let item = cell(row, layout.item_column.index());

        let mut active_part = self.active_part;
        if number.is_number() && !item.is_empty() {
            active_part = None;
        }
        if let Some(text) = item.as_text() {
            let text = text.trim();
            if is_part_number_shaped(text) {
                active_part = Some(text.to_string());
            }
        }
        Self { active_part }
    }
}

/// Defect label and quantity of a row, if it is a defect row.
///
/// The code cell must resolve in `legend` and the quantity window must sum
/// to more than zero. The sum saturates at `i64::MAX`.
pub fn defect_on_row<'l>(
    row: &[CellValue],
    legend: &'l Legend,
    layout: &SheetLayout,
) -> Option<(&'l str, i64)> {
    let defect = legend.resolve(cell(row, layout.code_column.index()))?;
    let quantity: i64 = layout
        .quantity_columns
        .indices()
        .map(|col| cell(row, col).to_quantity())
        .fold(0i64, |total, q| total.saturating_add(q));
    (quantity > 0).then_some((defect, quantity))
}

/// Parse every row of one worksheet grid.
///
/// The legend is built from the same grid before walking it.
pub fn parse_grid(
    grid: &CellGrid,
    sheet_name: &str,
    line: &str,
    layout: &SheetLayout,
) -> Vec<DefectObservation> {
    let legend = Legend::extract(grid, layout);
    let mut state = RowState::default();
    let mut observations = Vec::new();

    for row in grid.rows() {
        state = state.advance(row, layout);
        let Some(part_number) = state.active_part() else {
            continue;
        };
        if let Some((defect, quantity)) = defect_on_row(row, &legend, layout) {
            observations.push(DefectObservation {
                line: line.to_string(),
                part_number: part_number.to_string(),
                defect_name: defect.to_string(),
                quantity,
                sheet_name: sheet_name.to_string(),
            });
        }
    }

    debug!(
        sheet = sheet_name,
        line,
        legend_codes = legend.len(),
        rows = grid.row_count(),
        observations = observations.len(),
        "parsed daily sheet"
    );
    observations
}

/// Snapshot and parse one worksheet
pub fn parse_worksheet(sheet: &Worksheet, line: &str, layout: &SheetLayout) -> Vec<DefectObservation> {
    let grid = CellGrid::from_worksheet(
        sheet,
        GridLimits {
            max_rows: layout.max_rows,
            max_columns: layout.max_columns,
        },
    );
    parse_grid(&grid, sheet.name(), line, layout)
}

/// Parse every worksheet of a daily NG workbook, in workbook order
pub fn parse_workbook(workbook: &Workbook, line: &str, layout: &SheetLayout) -> Vec<DefectObservation> {
    workbook
        .worksheets()
        .flat_map(|sheet| parse_worksheet(sheet, line, layout))
        .collect()
}

fn cell(row: &[CellValue], col: usize) -> &CellValue {
    static EMPTY: CellValue = CellValue::Empty;
    row.get(col).unwrap_or(&EMPTY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Sheet with the legend at the top and one item block
    fn daily_sheet(name: &str) -> Worksheet {
        let mut ws = Worksheet::new(name);
        ws.set_cell_value("C2", "A").unwrap();
        ws.set_cell_value("D2", "Scratch").unwrap();
        ws.set_cell_value("F2", "B").unwrap();
        ws.set_cell_value("G2", "Dent").unwrap();
        ws.set_cell_value("C3", "T").unwrap();
        ws.set_cell_value("D3", "TOTAL NG").unwrap();

        ws.set_cell_value("B5", 1.0).unwrap();
        ws.set_cell_value("C5", "5001-AB").unwrap();
        ws.set_cell_value("H6", "A").unwrap();
        ws.set_cell_value("I6", 2.0).unwrap();
        ws.set_cell_value("J6", "3").unwrap();
        ws
    }

    #[test]
    fn test_single_observation() {
        let obs = parse_worksheet(&daily_sheet("01"), "press", &SheetLayout::default());

        assert_eq!(
            obs,
            vec![DefectObservation {
                line: "press".into(),
                part_number: "5001-AB".into(),
                defect_name: "Scratch".into(),
                quantity: 5,
                sheet_name: "01".into(),
            }]
        );
    }

    #[test]
    fn test_numbered_item_without_part_number_resets() {
        let mut ws = daily_sheet("01");
        ws.set_cell_value("B7", 2.0).unwrap();
        ws.set_cell_value("C7", "Bracket").unwrap();
        ws.set_cell_value("H8", "B").unwrap();
        ws.set_cell_value("I8", 4.0).unwrap();

        let obs = parse_worksheet(&ws, "press", &SheetLayout::default());
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].defect_name, "Scratch");
    }

    #[test]
    fn test_rows_before_any_part_are_skipped() {
        let mut ws = Worksheet::new("01");
        ws.set_cell_value("C1", "A").unwrap();
        ws.set_cell_value("D1", "Scratch").unwrap();
        ws.set_cell_value("H2", "A").unwrap();
        ws.set_cell_value("I2", 9.0).unwrap();

        assert!(parse_worksheet(&ws, "press", &SheetLayout::default()).is_empty());
    }

    #[test]
    fn test_unknown_code_and_zero_quantity_are_skipped() {
        let mut ws = daily_sheet("01");
        ws.set_cell_value("H7", "Z").unwrap();
        ws.set_cell_value("I7", 3.0).unwrap();
        ws.set_cell_value("H8", "B").unwrap();
        ws.set_cell_value("I8", 2.0).unwrap();
        ws.set_cell_value("J8", -2.0).unwrap();
        ws.set_cell_value("H9", "T").unwrap();
        ws.set_cell_value("I9", 10.0).unwrap();

        let obs = parse_worksheet(&ws, "press", &SheetLayout::default());
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn test_quantity_window_bounds() {
        let mut ws = daily_sheet("01");
        // H is the code column, R is just past the window
        ws.set_cell_value("Q6", 10.0).unwrap();
        ws.set_cell_value("R6", 100.0).unwrap();

        let obs = parse_worksheet(&ws, "press", &SheetLayout::default());
        assert_eq!(obs[0].quantity, 15);
    }

    #[test]
    fn test_huge_quantities_saturate() {
        let mut ws = daily_sheet("01");
        ws.set_cell_value("I6", 1e19).unwrap();
        ws.set_cell_value("J6", 1e19).unwrap();

        let obs = parse_worksheet(&ws, "press", &SheetLayout::default());
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].quantity, i64::MAX);
    }

    #[test]
    fn test_lowercase_code_and_decimal_comma() {
        let mut ws = daily_sheet("01");
        ws.set_cell_value("H6", " a ").unwrap();
        ws.set_cell_value("I6", "2,9").unwrap();
        ws.set_cell_value("J6", "x").unwrap();

        let obs = parse_worksheet(&ws, "press", &SheetLayout::default());
        assert_eq!(obs[0].quantity, 2);
    }

    #[test]
    fn test_part_number_on_row_below_header() {
        let mut ws = daily_sheet("01");
        ws.set_cell_value("B10", 2.0).unwrap();
        ws.set_cell_value("C10", "Cover").unwrap();
        ws.set_cell_value("C11", " 6002/XY ").unwrap();
        ws.set_cell_value("H12", "B").unwrap();
        ws.set_cell_value("K12", 1.0).unwrap();

        let obs = parse_worksheet(&ws, "sewing", &SheetLayout::default());
        let parts: Vec<&str> = obs.iter().map(|o| o.part_number.as_str()).collect();
        assert_eq!(parts, vec!["5001-AB", "6002/XY"]);
    }

    #[test]
    fn test_row_state_transitions() {
        let layout = SheetLayout::default();
        let header = vec![CellValue::Empty, 3.0.into(), "Bracket".into()];
        let part_row = vec![CellValue::Empty, CellValue::Empty, "7001-C".into()];
        let numbered_part = vec![CellValue::Empty, 4.0.into(), "8001-D".into()];
        let blank: Vec<CellValue> = Vec::new();

        let state = RowState::with_part("5001-AB");
        assert_eq!(state.clone().advance(&blank, &layout), state);
        assert_eq!(state.clone().advance(&header, &layout).active_part(), None);
        assert_eq!(
            state.clone().advance(&part_row, &layout).active_part(),
            Some("7001-C")
        );
        assert_eq!(
            state.advance(&numbered_part, &layout).active_part(),
            Some("8001-D")
        );
    }

    #[test]
    fn test_number_without_item_keeps_part() {
        let layout = SheetLayout::default();
        let row = vec![CellValue::Empty, 3.0.into()];
        let state = RowState::with_part("5001-AB").advance(&row, &layout);
        assert_eq!(state.active_part(), Some("5001-AB"));
    }

    #[test]
    fn test_workbook_keeps_sheet_order() {
        let wb: Workbook = vec![daily_sheet("02"), daily_sheet("01")].into_iter().collect();
        let obs = parse_workbook(&wb, "press", &SheetLayout::default());
        let sheets: Vec<&str> = obs.iter().map(|o| o.sheet_name.as_str()).collect();
        assert_eq!(sheets, vec!["02", "01"]);
    }

    #[test]
    fn test_legend_is_per_sheet() {
        let mut other = Worksheet::new("02");
        other.set_cell_value("B5", 1.0).unwrap();
        other.set_cell_value("C5", "5001-AB").unwrap();
        other.set_cell_value("H6", "A").unwrap();
        other.set_cell_value("I6", 2.0).unwrap();

        let wb: Workbook = vec![daily_sheet("01"), other].into_iter().collect();
        let obs = parse_workbook(&wb, "press", &SheetLayout::default());
        assert_eq!(obs.len(), 1);
    }
}
