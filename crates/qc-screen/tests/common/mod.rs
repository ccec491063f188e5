//! XLSX fixtures for the pipeline tests

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A cell written into a fixture sheet
pub enum Cell {
    Text(&'static str),
    Number(f64),
}

/// (reference, value)
pub type SheetCells = Vec<(&'static str, Cell)>;

/// Write an XLSX package with one worksheet per `(name, cells)`.
///
/// Text is written as inline strings so no shared string table is needed.
pub fn write_xlsx(path: &Path, sheets: &[(&str, SheetCells)]) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

    let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
    let mut rels = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
        rels.push_str(&format!(r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(workbook.as_bytes()).unwrap();
    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();

    for (i, (_, cells)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .unwrap();
        zip.write_all(sheet_xml(cells).as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn sheet_xml(cells: &SheetCells) -> String {
    let mut rows: Vec<(u32, String)> = Vec::new();
    for (reference, cell) in cells {
        let row: u32 = reference
            .trim_start_matches(|c: char| c.is_ascii_alphabetic())
            .parse()
            .unwrap();
        let xml = match cell {
            Cell::Text(text) => {
                format!(r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#)
            }
            Cell::Number(n) => format!(r#"<c r="{reference}"><v>{n}</v></c>"#),
        };
        match rows.iter_mut().find(|(r, _)| *r == row) {
            Some((_, row_xml)) => row_xml.push_str(&xml),
            None => rows.push((row, xml)),
        }
    }
    rows.sort_by_key(|(r, _)| *r);

    let mut data = String::new();
    for (row, cells) in rows {
        data.push_str(&format!(r#"<row r="{row}">{cells}</row>"#));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

/// Paths of a complete set of fixture inputs
pub struct Fixture {
    pub dir: tempfile::TempDir,
}

impl Fixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn inputs(&self) -> qc_screen::ScreeningInputs {
        qc_screen::ScreeningInputs {
            press: self.path("daily_ng_press.xlsx"),
            sewing: self.path("daily_ng_sewing.xlsx"),
            part_list: self.path("part_list.xlsx"),
            requirement: self.path("part_requirement_list.xlsx"),
            mapping: self.path("part_material_mapping.json"),
        }
    }
}

/// Press: 5 x Scratch on 5001-AB. Sewing: 3 x Dent on the unmapped 9999-ZZ.
pub fn standard_fixture() -> Fixture {
    let fixture = Fixture {
        dir: tempfile::tempdir().unwrap(),
    };

    write_xlsx(
        &fixture.path("daily_ng_press.xlsx"),
        &[(
            "2024-03-01",
            vec![
                ("C1", Cell::Text("A")),
                ("D1", Cell::Text("Scratch")),
                ("F1", Cell::Text("T")),
                ("G1", Cell::Text("TOTAL NG")),
                ("B3", Cell::Number(1.0)),
                ("C3", Cell::Text("5001-AB")),
                ("H4", Cell::Text("A")),
                ("I4", Cell::Number(2.0)),
                ("K4", Cell::Number(3.0)),
                ("B6", Cell::Number(2.0)),
                ("C6", Cell::Text("Subtotal")),
                ("H7", Cell::Text("A")),
                ("I7", Cell::Number(9.0)),
            ],
        )],
    );

    write_xlsx(
        &fixture.path("daily_ng_sewing.xlsx"),
        &[(
            "2024-03-01",
            vec![
                ("F2", Cell::Text("b")),
                ("G2", Cell::Text("Dent")),
                ("C3", Cell::Text("9999-ZZ")),
                ("H4", Cell::Text(" b ")),
                ("I4", Cell::Number(2.0)),
                ("J4", Cell::Text("1,5")),
                ("Q4", Cell::Text("n/a")),
            ],
        )],
    );

    write_xlsx(
        &fixture.path("part_list.xlsx"),
        &[
            (
                "List",
                vec![
                    ("A1", Cell::Text("Part No")),
                    ("A2", Cell::Text("5001-AB")),
                    ("B3", Cell::Text("9999-ZZ")),
                ],
            ),
            ("Notes", vec![("A1", Cell::Text(" 5001-AB "))]),
        ],
    );

    write_xlsx(
        &fixture.path("part_requirement_list.xlsx"),
        &[
            (
                "REQ",
                vec![
                    ("A2", Cell::Text("5001-AB")),
                    ("L3", Cell::Text("6002/XY")),
                    ("M3", Cell::Text("7003-QQ")),
                    ("B4", Cell::Number(12345678.0)),
                ],
            ),
            ("Other", vec![("A1", Cell::Text("8004-ZZ"))]),
        ],
    );

    std::fs::write(
        fixture.path("part_material_mapping.json"),
        r#"{
            "parts": [
                {"part_number": "5001-AB", "uniq_no": 1, "materials": [{"material_name": "Leather-X", "thickness": "1.2t"}]},
                {"part_number": " ", "uniq_no": 2, "materials": []}
            ]
        }"#,
    )
    .unwrap();

    fixture
}
