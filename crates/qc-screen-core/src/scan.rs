//! Part-number harvesting from plain sheets
//!
//! The part list and the requirement list have no legend or item blocks;
//! they are only searched for part-number-shaped cells.

use std::collections::BTreeSet;

use crate::normalize::is_part_number_shaped;
use crate::worksheet::Worksheet;

/// Part-number-shaped text cells of `sheet`, trimmed and deduplicated.
///
/// Every row is read; columns stop at `max_columns` or the sheet's right-most
/// populated column, whichever is smaller. Numeric cells never match.
pub fn part_numbers_in_sheet(sheet: &Worksheet, max_columns: u32) -> BTreeSet<String> {
    let columns = sheet.max_column().min(max_columns);
    sheet
        .iter_cells()
        .filter(|(_, col, _)| *col < columns)
        .filter_map(|(_, _, value)| value.as_text())
        .map(str::trim)
        .filter(|text| is_part_number_shaped(text))
        .map(str::to_string)
        .collect()
}

/// Part-number-shaped values in the top-left window of string rows.
///
/// `rows` are already-flattened text rows such as those rebuilt from raw
/// sheet XML; only the first `max_rows` rows and `max_columns` values of
/// each are looked at.
pub fn part_numbers_in_rows<I, R>(rows: I, max_rows: usize, max_columns: usize) -> Vec<String>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut found = Vec::new();
    for row in rows.into_iter().take(max_rows) {
        for value in row.as_ref().iter().take(max_columns) {
            let text = value.trim();
            if is_part_number_shaped(text) {
                found.push(text.to_string());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_requirement_sheet_scan() {
        let mut ws = Worksheet::new("REQ");
        ws.set_cell_value("A1", "Part No").unwrap();
        ws.set_cell_value("B2", " 5001-AB ").unwrap();
        ws.set_cell_value("B3", "5001-AB").unwrap();
        ws.set_cell_value("C4", "6002/xy").unwrap();
        ws.set_cell_value("D5", 12345678.0).unwrap();
        ws.set_cell_value("M6", "7003-QQ").unwrap();

        let found = part_numbers_in_sheet(&ws, 12);
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["5001-AB", "6002/xy"]
        );
    }

    #[test]
    fn test_row_window() {
        let rows = vec![
            vec!["1234-AB".to_string(), "x".to_string(), "9999-ZZ".to_string()],
            vec!["".to_string(), " 4321/C ".to_string()],
            vec!["5555-X".to_string()],
        ];
        assert_eq!(part_numbers_in_rows(&rows, 2, 2), vec!["1234-AB", "4321/C"]);
    }
}
