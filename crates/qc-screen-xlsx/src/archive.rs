//! Raw part-list scanning
//!
//! The part list is read straight from the package XML instead of through
//! [`XlsxReader`](crate::XlsxReader): each sheet is flattened into rows of
//! display strings and searched for part-number-shaped values. Cells without a
//! usable reference are dropped and shared-string indices out of range read as
//! empty, so workbooks the full reader rejects can still be scanned. Shared
//! strings keep their phonetic hint text, appended after the displayed text.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::package::{
    read_relationships, read_sheet_entries, read_shared_strings, PhoneticRuns,
};
use qc_screen_core::{leading_column_number, part_numbers_in_rows};

/// How much of the part list is looked at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveScanLimits {
    /// Sheets in workbook order
    pub max_sheets: usize,
    /// Rows per sheet, counting only rows that hold at least one cell
    pub max_rows: usize,
    /// Values per row
    pub max_columns: usize,
}

impl Default for ArchiveScanLimits {
    fn default() -> Self {
        Self {
            max_sheets: 12,
            max_rows: 600,
            max_columns: 20,
        }
    }
}

/// Scan a part-list file for part numbers, sorted and deduplicated
pub fn scan_part_numbers<P: AsRef<Path>>(
    path: P,
    limits: &ArchiveScanLimits,
) -> XlsxResult<Vec<String>> {
    let file = File::open(path)?;
    scan_part_numbers_from(BufReader::new(file), limits)
}

/// Scan a part list from any seekable reader
pub fn scan_part_numbers_from<R: Read + Seek>(
    reader: R,
    limits: &ArchiveScanLimits,
) -> XlsxResult<Vec<String>> {
    let mut archive = ZipArchive::new(reader)?;

    let shared_strings = read_shared_strings(&mut archive, PhoneticRuns::Include)?;
    let sheet_entries = read_sheet_entries(&mut archive)?;
    let relationships = read_relationships(&mut archive)?;

    let mut numbers = BTreeSet::new();
    for entry in sheet_entries.iter().take(limits.max_sheets) {
        let Some(rel) = relationships.get(&entry.r_id) else {
            log::debug!("sheet '{}' has no relationship {}, skipped", entry.name, entry.r_id);
            continue;
        };

        let rows = sheet_rows(&mut archive, &rel.path, &shared_strings)?;
        let found = part_numbers_in_rows(&rows, limits.max_rows, limits.max_columns);
        log::debug!(
            "sheet '{}': {} rows, {} part numbers",
            entry.name,
            rows.len(),
            found.len()
        );
        numbers.extend(found);
    }

    Ok(numbers.into_iter().collect())
}

/// One sheet part flattened to rows of strings.
///
/// Each row is as wide as its right-most referenced cell; gaps are empty
/// strings. Rows with no referenced cell are left out entirely.
fn sheet_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    shared_strings: &[String],
) -> XlsxResult<Vec<Vec<String>>> {
    let file = archive
        .by_name(path)
        .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut rows = Vec::new();

    let mut row: BTreeMap<u32, String> = BTreeMap::new();
    let mut max_col: u32 = 0;
    let mut cell: Option<RawCell> = None;

    let mut in_value = false;
    let mut in_inline = false;
    let mut in_run = false;
    let mut in_inline_text = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    row.clear();
                    max_col = 0;
                }
                b"c" => {
                    let raw = RawCell::start(&e)?;
                    max_col = max_col.max(raw.col);
                    cell = Some(raw);
                }
                b"v" if cell.is_some() => in_value = true,
                b"is" if cell.is_some() => in_inline = true,
                b"r" if in_inline => in_run = true,
                b"t" if in_inline && !in_run => in_inline_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                let raw = RawCell::start(&e)?;
                max_col = max_col.max(raw.col);
                if raw.col > 0 {
                    row.insert(raw.col, String::new());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"row" => {
                    if max_col > 0 {
                        rows.push(
                            (1..=max_col)
                                .map(|col| row.remove(&col).unwrap_or_default())
                                .collect(),
                        );
                    }
                }
                b"c" => {
                    if let Some(raw) = cell.take() {
                        let col = raw.col;
                        let text = raw.finish(shared_strings)?;
                        if col > 0 {
                            row.insert(col, text);
                        }
                    }
                }
                b"v" => in_value = false,
                b"is" => in_inline = false,
                b"r" => in_run = false,
                b"t" if in_inline_text => {
                    // Only the first direct <t> of an inline string counts
                    in_inline_text = false;
                    if let Some(raw) = cell.as_mut() {
                        raw.inline_done = true;
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) if in_value || in_inline_text => {
                if let Some(raw) = cell.as_mut() {
                    let text = e.unescape()?;
                    if in_value {
                        raw.value.get_or_insert_with(String::new).push_str(&text);
                    } else if !raw.inline_done {
                        raw.inline.push_str(&text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

/// A `<c>` element as plain text
#[derive(Debug)]
struct RawCell {
    /// 1-based column from the reference letters, 0 when there are none
    col: u32,
    cell_type: Option<String>,
    value: Option<String>,
    inline: String,
    inline_done: bool,
}

impl RawCell {
    fn start(e: &BytesStart) -> XlsxResult<Self> {
        let mut col = 0;
        let mut cell_type = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => col = leading_column_number(&attr.unescape_value()?),
                b"t" => cell_type = Some(attr.unescape_value()?.to_string()),
                _ => {}
            }
        }
        Ok(Self {
            col,
            cell_type,
            value: None,
            inline: String::new(),
            inline_done: false,
        })
    }

    fn finish(self, shared_strings: &[String]) -> XlsxResult<String> {
        if !self.inline.is_empty() {
            return Ok(self.inline);
        }
        let Some(value) = self.value else {
            return Ok(String::new());
        };
        if self.cell_type.as_deref() != Some("s") {
            return Ok(value);
        }

        let idx: i64 = value.trim().parse().map_err(|_| {
            XlsxError::Parse(format!("Invalid shared string index: {}", value))
        })?;
        Ok(usize::try_from(idx)
            .ok()
            .and_then(|idx| shared_strings.get(idx))
            .cloned()
            .unwrap_or_default())
    }
}
