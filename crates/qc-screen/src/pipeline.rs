//! The screening pipeline
//!
//! Stages run in a fixed order: press and sewing observations, the mapping
//! document, the part list (best effort), the requirement list, then
//! aggregation. Every file is opened, read completely and closed before the
//! next one is touched.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Utc;
use tracing::{info, warn};

use crate::best_effort::BestEffort;
use crate::error::{Result, ScreenError};
use crate::options::{ScreeningInputs, ScreeningOptions};
use crate::report::{format_timestamp, ScreeningReport, SourceFiles, Summary};
use qc_screen_core::{
    aggregate, parse_workbook, part_numbers_in_sheet, DefectObservation, MappingDocument,
    PartCatalog, SheetLayout,
};
use qc_screen_xlsx::{scan_part_numbers, ReadOptions, XlsxReader};

/// Line tag of the press daily NG workbook
pub const PRESS_LINE: &str = "press";
/// Line tag of the sewing daily NG workbook
pub const SEWING_LINE: &str = "sewing";

/// Warning recorded when the part list is skipped on request
pub const PART_LIST_SKIPPED: &str = "part list parsing skipped by flag";
/// Prefix of the warning recorded when the part list cannot be scanned
pub const PART_LIST_FAILED: &str = "failed to parse part list";

/// Run a full screening and build the report
pub fn run_screening(inputs: &ScreeningInputs, options: &ScreeningOptions) -> Result<ScreeningReport> {
    options.layout.validate()?;

    let mut observations = daily_observations(&inputs.press, PRESS_LINE, &options.layout)?;
    observations.extend(daily_observations(
        &inputs.sewing,
        SEWING_LINE,
        &options.layout,
    )?);

    let catalog = load_mapping(&inputs.mapping)?;
    info!(
        path = %inputs.mapping.display(),
        parts = catalog.len(),
        "loaded mapping"
    );

    let (part_list, part_list_warning) = part_list_numbers(&inputs.part_list, options).into_parts();

    let requirement = requirement_part_numbers(&inputs.requirement, options.requirement_columns)?;
    info!(
        path = %inputs.requirement.display(),
        part_numbers = requirement.len(),
        "scanned requirement list"
    );

    let stats = aggregate(&observations, &catalog);
    info!(
        part_defect_pairs = stats.part_item_defect_stats.len(),
        material_risks = stats.material_item_defect_risk.len(),
        unmatched = stats.unmatched_part_numbers.len(),
        "aggregated"
    );

    let summary = Summary {
        total_observations: observations.len(),
        distinct_part_defect_pairs: stats.part_item_defect_stats.len(),
        distinct_material_defect_risk: stats.material_item_defect_risk.len(),
        unmatched_parts_count: stats.unmatched_part_numbers.len(),
        part_list_numbers_count: part_list.len(),
        requirement_numbers_count: requirement.len(),
        mapping_part_numbers_count: catalog.part_numbers().len(),
    };

    Ok(ScreeningReport {
        generated_at: format_timestamp(Utc::now()),
        source_files: SourceFiles::from(inputs),
        summary,
        warnings: part_list_warning.into_iter().collect(),
        unmatched_part_numbers_from_daily_ng: stats.unmatched_part_numbers,
        part_item_defect_stats: stats.part_item_defect_stats,
        material_item_defect_risk: stats.material_item_defect_risk,
    })
}

/// Observations of every sheet of one daily NG workbook
pub fn daily_observations(
    path: &Path,
    line: &str,
    layout: &SheetLayout,
) -> Result<Vec<DefectObservation>> {
    let workbook = XlsxReader::read_file(path).map_err(|source| ScreenError::Xlsx {
        path: path.to_path_buf(),
        source,
    })?;
    let observations = parse_workbook(&workbook, line, layout);
    info!(
        path = %path.display(),
        line,
        sheets = workbook.sheet_count(),
        observations = observations.len(),
        "parsed daily NG workbook"
    );
    Ok(observations)
}

/// Read the mapping document into a catalog
pub fn load_mapping(path: &Path) -> Result<PartCatalog> {
    let file = File::open(path).map_err(|source| ScreenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: MappingDocument =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ScreenError::Mapping {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(PartCatalog::from_document(document))
}

/// Part numbers of the part list, never failing the run
pub fn part_list_numbers(path: &Path, options: &ScreeningOptions) -> BestEffort<Vec<String>> {
    if options.skip_part_list {
        info!("part list skipped");
        return BestEffort::degraded(PART_LIST_SKIPPED);
    }

    let scanned = BestEffort::from_result(
        scan_part_numbers(path, &options.archive_limits),
        PART_LIST_FAILED,
    );
    match &scanned.warning {
        Some(warning) => warn!(path = %path.display(), "{}", warning),
        None => info!(
            path = %path.display(),
            part_numbers = scanned.value.len(),
            "scanned part list"
        ),
    }
    scanned
}

/// Part-number-shaped text cells of the first worksheet of the requirement list
pub fn requirement_part_numbers(path: &Path, max_columns: u32) -> Result<BTreeSet<String>> {
    let workbook = XlsxReader::read_file_with(path, &ReadOptions::first_sheet()).map_err(
        |source| ScreenError::Xlsx {
            path: path.to_path_buf(),
            source,
        },
    )?;
    let sheet = workbook
        .worksheet(0)
        .ok_or_else(|| ScreenError::NoWorksheet {
            path: path.to_path_buf(),
        })?;
    Ok(part_numbers_in_sheet(sheet, max_columns))
}
