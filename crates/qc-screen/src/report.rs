//! The screening report document

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::options::ScreeningInputs;
use qc_screen_core::{MaterialDefectRisk, PartDefectStat};

/// Everything a screening run produces, in output order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningReport {
    /// UTC, `YYYY-MM-DDTHH:MM:SS.ffffffZ`; always six fractional digits
    pub generated_at: String,
    pub source_files: SourceFiles,
    pub summary: Summary,
    /// Advisory only; the rest of the report is valid either way
    pub warnings: Vec<String>,
    pub unmatched_part_numbers_from_daily_ng: Vec<String>,
    pub part_item_defect_stats: Vec<PartDefectStat>,
    pub material_item_defect_risk: Vec<MaterialDefectRisk>,
}

/// Input paths as given
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFiles {
    pub daily_ng_press: String,
    pub daily_ng_sewing: String,
    pub part_list: String,
    pub part_requirement_list: String,
    pub mapping_json: String,
}

impl From<&ScreeningInputs> for SourceFiles {
    fn from(inputs: &ScreeningInputs) -> Self {
        Self {
            daily_ng_press: display(&inputs.press),
            daily_ng_sewing: display(&inputs.sewing),
            part_list: display(&inputs.part_list),
            part_requirement_list: display(&inputs.requirement),
            mapping_json: display(&inputs.mapping),
        }
    }
}

/// Counts over the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_observations: usize,
    pub distinct_part_defect_pairs: usize,
    pub distinct_material_defect_risk: usize,
    pub unmatched_parts_count: usize,
    pub part_list_numbers_count: usize,
    pub requirement_numbers_count: usize,
    pub mapping_part_numbers_count: usize,
}

/// Format a report timestamp.
///
/// The width is fixed: whole seconds still print `.000000`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 5, 9).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-01T08:05:09.000000Z");

        let at = at + chrono::Duration::microseconds(1234);
        assert_eq!(format_timestamp(at), "2024-03-01T08:05:09.001234Z");
    }

    #[test]
    fn test_summary_keys() {
        let json = serde_json::to_value(Summary::default()).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "distinct_material_defect_risk",
                "distinct_part_defect_pairs",
                "mapping_part_numbers_count",
                "part_list_numbers_count",
                "requirement_numbers_count",
                "total_observations",
                "unmatched_parts_count",
            ]
        );
    }
}
