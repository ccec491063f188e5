//! qc-screen CLI - defect screening report generator

use anyhow::{Context, Result};
use clap::Parser;
use qc_screen::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "qc-screen")]
#[command(
    author,
    version,
    about = "Screen daily NG workbooks for part and material defect risk"
)]
struct Cli {
    /// Daily NG workbook of the press line
    #[arg(long)]
    press: PathBuf,

    /// Daily NG workbook of the sewing line
    #[arg(long)]
    sewing: PathBuf,

    /// Part list workbook (scanned best effort)
    #[arg(long)]
    part_list: PathBuf,

    /// Part requirement list workbook
    #[arg(long)]
    requirement: PathBuf,

    /// Part to material mapping JSON
    #[arg(long)]
    mapping: PathBuf,

    /// Report output path (JSON)
    #[arg(long)]
    output: PathBuf,

    /// Do not read the part list; recorded as a warning in the report
    #[arg(long)]
    skip_part_list: bool,

    /// JSON file overriding the daily NG sheet layout
    #[arg(long, value_name = "JSON")]
    layout: Option<PathBuf>,

    /// More logging (-v info, -vv debug); RUST_LOG is used otherwise
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = ScreeningOptions {
        skip_part_list: cli.skip_part_list,
        layout: match &cli.layout {
            Some(path) => load_layout(path)?,
            None => SheetLayout::default(),
        },
        ..ScreeningOptions::default()
    };

    let inputs = ScreeningInputs {
        press: cli.press,
        sewing: cli.sewing,
        part_list: cli.part_list,
        requirement: cli.requirement,
        mapping: cli.mapping,
    };

    let report = run_screening(&inputs, &options).context("Screening failed")?;

    write_report(&report, &cli.output)?;

    println!("written: {}", cli.output.display());
    println!(
        "summary: {}",
        serde_json::to_string(&report.summary).context("Failed to format summary")?
    );
    Ok(())
}

/// Log to stderr; default level `warn`
fn init_tracing(verbose: u8) {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };

    let _tracing = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init();
}

fn load_layout(path: &Path) -> Result<SheetLayout> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout '{}'", path.display()))?;
    let layout: SheetLayout = serde_json::from_str(&text)
        .with_context(|| format!("Invalid layout '{}'", path.display()))?;
    layout
        .validate()
        .with_context(|| format!("Invalid layout '{}'", path.display()))?;
    Ok(layout)
}

/// Write the report as pretty JSON, creating parent directories
fn write_report(report: &ScreeningReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "qc-screen",
            "--press",
            "p.xlsx",
            "--sewing",
            "s.xlsx",
            "--part-list",
            "pl.xlsx",
            "--requirement",
            "r.xlsx",
            "--mapping",
            "m.json",
            "--output",
            "out/report.json",
            "--skip-part-list",
            "-vv",
        ])
        .unwrap();
        assert!(cli.skip_part_list);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.part_list, PathBuf::from("pl.xlsx"));
        assert!(cli.layout.is_none());
    }

    #[test]
    fn test_required_flags() {
        assert!(Cli::try_parse_from(["qc-screen", "--press", "p.xlsx"]).is_err());
    }

    #[test]
    fn test_load_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");

        fs::write(&path, r#"{"code_column": "J"}"#).unwrap();
        let layout = load_layout(&path).unwrap();
        assert_eq!(layout.code_column.to_string(), "J");

        fs::write(&path, r#"{"max_columns": 4}"#).unwrap();
        assert!(load_layout(&path).is_err());

        fs::write(&path, r#"{"unknown": 1}"#).unwrap();
        assert!(load_layout(&path).is_err());
    }

    #[test]
    fn test_write_report_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("report.json");
        let report = ScreeningReport {
            generated_at: "2024-03-01T00:00:00.000000Z".into(),
            source_files: qc_screen::SourceFiles {
                daily_ng_press: "p.xlsx".into(),
                daily_ng_sewing: "s.xlsx".into(),
                part_list: "pl.xlsx".into(),
                part_requirement_list: "r.xlsx".into(),
                mapping_json: "m.json".into(),
            },
            summary: Summary::default(),
            warnings: vec!["part list parsing skipped by flag".into()],
            unmatched_part_numbers_from_daily_ng: vec!["9999-ZZ".into()],
            part_item_defect_stats: vec![],
            material_item_defect_risk: vec![],
        };

        write_report(&report, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"generated_at\""));
        assert!(text.contains("\"9999-ZZ\""));
    }
}
