//! Values-only XLSX reader
//!
//! Reads cell values the way a spreadsheet shows them after the last save:
//! formula cells yield their cached result and styles are ignored.

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
use qc_screen_core::{CellAddress, CellValue, SharedString, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        // Everything consumed after the leading underscore
        let mut consumed = String::new();
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            consumed.push('x');

            let mut hex_chars = String::new();
            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }
            consumed.push_str(&hex_chars);

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                consumed.push('_');
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                // Not a valid escape sequence, output what we consumed
                result.push('_');
                result.push_str(&consumed);
            }
        }
    }

    result
}

/// Options for reading a workbook
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Only read the first N worksheets (None = all)
    pub max_sheets: Option<usize>,
}

impl ReadOptions {
    /// Read only the first worksheet
    pub fn first_sheet() -> Self {
        Self {
            max_sheets: Some(1),
        }
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        Self::read_file_with(path, &ReadOptions::default())
    }

    /// Read a workbook from a file path with options
    pub fn read_file_with<P: AsRef<Path>>(path: P, options: &ReadOptions) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read_with(BufReader::new(file), options)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        Self::read_with(reader, &ReadOptions::default())
    }

    /// Read a workbook from a reader with options
    pub fn read_with<R: Read + Seek>(reader: R, options: &ReadOptions) -> XlsxResult<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings: Vec<SharedString> =
            read_shared_strings(&mut archive, PhoneticRuns::Skip)?
                .into_iter()
                .map(SharedString::from)
                .collect();
        let sheet_entries = read_sheet_entries(&mut archive)?;
        let relationships = read_relationships(&mut archive)?;

        let worksheet_parts = sheet_entries.into_iter().filter_map(|entry| {
            relationships
                .get(&entry.r_id)
                .filter(|rel| rel.is_worksheet())
                .map(|rel| (entry.name, rel.path.clone()))
        });

        let mut workbook = Workbook::empty();
        for (name, path) in worksheet_parts.take(options.max_sheets.unwrap_or(usize::MAX)) {
            let sheet = Self::read_worksheet(&mut archive, &path, name, &shared_strings)?;
            log::debug!(
                "read sheet '{}' from {} ({} cells)",
                sheet.name(),
                path,
                sheet.cell_count()
            );
            workbook.add_worksheet(sheet);
        }

        Ok(workbook)
    }

    /// Read a worksheet part into a [`Worksheet`]
    fn read_worksheet<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        path: &str,
        name: String,
        shared_strings: &[SharedString],
    ) -> XlsxResult<Worksheet> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut worksheet = Worksheet::new(name);
        let mut buf = Vec::new();

        // Position of the next cell when a row or cell omits its reference
        let mut row_idx: u32 = 0;
        let mut next_row: u32 = 0;
        let mut next_col: u32 = 0;

        // Current cell state
        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_idx = row_number(&e).map_or(next_row, |r| r.saturating_sub(1));
                        next_row = row_idx + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let pending = PendingCell::start(&e, row_idx, next_col)?;
                        next_col = pending.col + 1;
                        cell = Some(pending);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"is" if cell.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"row" => {
                        row_idx = row_number(&e).map_or(next_row, |r| r.saturating_sub(1));
                        next_row = row_idx + 1;
                    }
                    b"c" => {
                        // Styled but empty cell: only advances the column
                        let pending = PendingCell::start(&e, row_idx, next_col)?;
                        next_col = pending.col + 1;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            let (row, col) = (pending.row, pending.col);
                            let value = pending.finish(shared_strings)?;
                            worksheet.set_cell_value_at(row, col, value)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Some(pending) = cell.as_mut() {
                        let text = e.unescape()?;
                        if in_value {
                            pending.value.get_or_insert_with(String::new).push_str(&text);
                        } else {
                            pending.inline.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(worksheet)
    }
}

/// A `<c>` element being read
#[derive(Debug)]
struct PendingCell {
    row: u32,
    col: u32,
    cell_type: Option<String>,
    /// Text of `<v>`
    value: Option<String>,
    /// Text of `<is><t>` runs
    inline: Option<String>,
}

impl PendingCell {
    fn start(e: &BytesStart, row: u32, col: u32) -> XlsxResult<Self> {
        let mut cell = Self {
            row,
            col,
            cell_type: None,
            value: None,
            inline: None,
        };

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let reference = attr.unescape_value()?;
                    let addr = CellAddress::parse(&reference).map_err(|err| {
                        XlsxError::Parse(format!(
                            "Invalid cell reference '{}': {}",
                            reference, err
                        ))
                    })?;
                    cell.row = addr.row;
                    cell.col = addr.col;
                }
                b"t" => cell.cell_type = Some(attr.unescape_value()?.to_string()),
                _ => {}
            }
        }

        Ok(cell)
    }

    /// Resolve the cached value by cell type
    fn finish(self, shared_strings: &[SharedString]) -> XlsxResult<CellValue> {
        if let Some(inline) = self.inline {
            return Ok(CellValue::text(decode_excel_escapes(&inline)));
        }
        let Some(value) = self.value else {
            return Ok(CellValue::Empty);
        };

        let cell_value = match self.cell_type.as_deref() {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::Text(s.clone())
            }

            // Boolean; counts as a number like 1/0
            Some("b") => CellValue::from(value == "1" || value.eq_ignore_ascii_case("true")),

            // Error values (#N/A, #REF!) and ISO dates stay as text
            Some("e") | Some("d") => CellValue::text(value),

            // Formula string result
            Some("str") | Some("inlineStr") => CellValue::text(decode_excel_escapes(&value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::text(value),
            },

            // Unknown type - treat as text
            Some(other) => {
                log::warn!("unknown cell type '{}' at row {}", other, self.row + 1);
                CellValue::text(value)
            }
        };

        Ok(cell_value)
    }
}

fn row_number(e: &BytesStart) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| attr.unescape_value().ok()?.trim().parse::<u32>().ok())
}
