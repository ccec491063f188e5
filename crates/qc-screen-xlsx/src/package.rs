//! Package-level parts shared by the workbook reader and the part-list scanner
//!
//! An XLSX file is a ZIP of XML parts. The parts needed to find sheet data are
//! the shared string table, the sheet list in `xl/workbook.xml` and the
//! relationship table that maps each sheet's `r:id` to its part path.

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};

pub(crate) const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// A `<sheet>` entry of the workbook part, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub r_id: String,
}

/// A workbook relationship, target resolved to a package path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub path: String,
    pub rel_type: String,
}

impl Relationship {
    /// Whether the relationship points at a worksheet (not a chartsheet etc.)
    pub fn is_worksheet(&self) -> bool {
        self.rel_type.ends_with("/worksheet")
    }
}

/// What to do with the phonetic hints (`rPh`) of a shared string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhoneticRuns {
    /// Only the displayed text
    Skip,
    /// Every `<t>` of the item in document order, hints included
    Include,
}

/// Read the shared string table. A package without one is valid.
///
/// Rich-text runs are concatenated.
pub(crate) fn read_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    phonetic: PhoneticRuns,
) -> XlsxResult<Vec<String>> {
    let mut strings = Vec::new();

    let file = match archive.by_name(SHARED_STRINGS_PART) {
        Ok(f) => f,
        Err(_) => return Ok(strings),
    };

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && (!in_phonetic || phonetic == PhoneticRuns::Include) => {
                    in_t = true
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                strings.push(String::new());
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_t => {
                current.push_str(&e.unescape()?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Read the sheet list of `xl/workbook.xml`
pub(crate) fn read_sheet_entries<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> XlsxResult<Vec<SheetEntry>> {
    let file = archive
        .by_name(WORKBOOK_PART)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK_PART.into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut r_id = None;

                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"name" {
                        name = attr.unescape_value().ok().map(|s| s.to_string());
                    } else if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some()
                    {
                        r_id = attr.unescape_value().ok().map(|s| s.to_string());
                    }
                }

                if let (Some(name), Some(r_id)) = (name, r_id) {
                    sheets.push(SheetEntry { name, r_id });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Read `xl/_rels/workbook.xml.rels`, keyed by relationship id
pub(crate) fn read_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> XlsxResult<HashMap<String, Relationship>> {
    let file = archive
        .by_name(WORKBOOK_RELS_PART)
        .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS_PART.into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let Some((id, rel)) = relationship_from(&e) {
                    rels.insert(id, rel);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn relationship_from(e: &BytesStart) -> Option<(String, Relationship)> {
    let mut id = None;
    let mut target = None;
    let mut rel_type = String::new();

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
            b"Target" => target = attr.unescape_value().ok().map(|s| s.to_string()),
            b"Type" => {
                rel_type = attr
                    .unescape_value()
                    .map(|s| s.to_string())
                    .unwrap_or_default()
            }
            _ => {}
        }
    }

    Some((
        id?,
        Relationship {
            path: resolve_target(&target?),
            rel_type,
        },
    ))
}

/// Resolve a workbook relationship target to a package path.
///
/// Targets are relative to `xl/` unless absolute (`/xl/...`).
pub(crate) fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if target.starts_with("xl/") {
        target.to_string()
    } else {
        format!("xl/{}", target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn archive_with_shared(shared: &str) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file(SHARED_STRINGS_PART, zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(shared.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        ZipArchive::new(Cursor::new(buf)).unwrap()
    }

    #[test]
    fn test_phonetic_runs() {
        let shared = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>5001-AB</t><rPh sb="0" eb="1"><t>ABC</t></rPh></si><si/></sst>"#;

        let mut archive = archive_with_shared(shared);
        assert_eq!(
            read_shared_strings(&mut archive, PhoneticRuns::Skip).unwrap(),
            vec!["5001-AB".to_string(), String::new()]
        );
        assert_eq!(
            read_shared_strings(&mut archive, PhoneticRuns::Include).unwrap(),
            vec!["5001-ABABC".to_string(), String::new()]
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("xl/worksheets/sheet3.xml"), "xl/worksheets/sheet3.xml");
    }
}
