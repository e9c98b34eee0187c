//! Spreadsheet upload validation, parsing and export.
//!
//! CSV goes through the `csv` crate, XLS/XLSX are read with `calamine`
//! and processed results are written with `rust_xlsxwriter`. Only the
//! first worksheet of a workbook is read.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Workbook, XlsxError};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{CellValue, ColumnInfo, ColumnType, FileMetadata, Row, UploadedFile};
use crate::utils::{format_size, FileKind};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Sheet name used for deduplicated exports.
pub const PROCESSED_SHEET_NAME: &str = "Deduplicated Data";

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Please upload a CSV, XLS, or XLSX file")]
    UnsupportedType,
    #[error("File size exceeds 50MB limit ({0})")]
    TooLarge(String),
    #[error("File is empty")]
    Empty,
    #[error("Error reading file: {0}")]
    Io(#[from] io::Error),
    #[error("Error parsing file. Please check the file format. ({0})")]
    Parse(String),
    #[error("{0}")]
    NoData(&'static str),
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

impl From<csv::Error> for SpreadsheetError {
    fn from(e: csv::Error) -> Self {
        SpreadsheetError::Parse(e.to_string())
    }
}

/// Parsed contents of the first sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Row>,
}

impl ParsedSheet {
    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            rows: self.rows.len(),
            columns: self.columns.len(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Check type and size of an upload without reading its contents.
pub fn validate_upload(path: &Path) -> Result<UploadedFile, SpreadsheetError> {
    if !FileKind::from_path(path).is_spreadsheet() {
        return Err(SpreadsheetError::UnsupportedType);
    }
    let size = std::fs::metadata(path)?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(SpreadsheetError::TooLarge(format_size(size)));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(UploadedFile {
        name,
        path: path.to_path_buf(),
        size,
    })
}

/// Read the first sheet of a CSV, XLS or XLSX file.
pub fn read_sheet(path: &Path) -> Result<ParsedSheet, SpreadsheetError> {
    let sheet = match FileKind::from_path(path) {
        FileKind::Csv => parse_csv(File::open(path)?)?,
        FileKind::Xls | FileKind::Xlsx => parse_workbook(path)?,
        _ => return Err(SpreadsheetError::UnsupportedType),
    };
    info!(
        "Parsed {}: {} rows, {} columns",
        path.display(),
        sheet.rows.len(),
        sheet.columns.len()
    );
    Ok(sheet)
}

/// Parse CSV with a header row. Numeric-looking cells become numbers.
pub fn parse_csv<R: io::Read>(reader: R) -> Result<ParsedSheet, SpreadsheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        records.push(record.iter().map(CellValue::parse).collect());
    }
    build_sheet(headers, records)
}

fn parse_workbook(path: &Path) -> Result<ParsedSheet, SpreadsheetError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| SpreadsheetError::Parse(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::Empty)?
        .map_err(|e| SpreadsheetError::Parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|d| cell_from_data(d).to_string()).collect(),
        None => return Err(SpreadsheetError::Empty),
    };
    let records = rows
        .map(|r| r.iter().map(cell_from_data).collect())
        .collect();
    build_sheet(headers, records)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

/// Give blank and repeated headers distinct names: `__EMPTY`,
/// `__EMPTY_1`, `name_1` and so on. A generated name never collides with
/// a header that appears later in the row.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    // next suffix to try per base name; every emitted name is registered
    let mut taken: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .map(|h| {
            let base = if h.trim().is_empty() {
                "__EMPTY".to_string()
            } else {
                h.trim().to_string()
            };
            let Some(&next) = taken.get(&base) else {
                taken.insert(base.clone(), 1);
                return base;
            };
            let mut counter = next.max(1);
            let mut name = format!("{}_{}", base, counter);
            while taken.contains_key(&name) {
                counter += 1;
                name = format!("{}_{}", base, counter);
            }
            taken.insert(base, counter + 1);
            taken.insert(name.clone(), 1);
            name
        })
        .collect()
}

fn build_sheet(
    headers: Vec<String>,
    records: Vec<Vec<CellValue>>,
) -> Result<ParsedSheet, SpreadsheetError> {
    let headers = dedupe_headers(headers);

    let rows: Vec<Row> = records
        .into_iter()
        .map(|cells| {
            headers
                .iter()
                .zip(cells)
                .filter(|(_, v)| !v.is_empty())
                .map(|(h, v)| (h.clone(), v))
                .collect::<Row>()
        })
        .filter(|row| !row.is_empty())
        .collect();

    if rows.is_empty() {
        return Err(SpreadsheetError::Empty);
    }

    let first = &rows[0];
    let columns = headers
        .into_iter()
        .map(|name| {
            let column_type = match first.get(&name) {
                Some(v) if v.is_number() => ColumnType::Number,
                _ => ColumnType::String,
            };
            ColumnInfo { name, column_type }
        })
        .collect();

    debug!("Built sheet with {} rows", rows.len());
    Ok(ParsedSheet { columns, rows })
}

/// Write rows as CSV with a header row in `columns` order.
pub fn write_csv<W: io::Write>(
    writer: W,
    columns: &[String],
    rows: &[Row],
) -> Result<(), SpreadsheetError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, columns: &[String], rows: &[Row]) -> Result<(), SpreadsheetError> {
    write_csv(File::create(path)?, columns, rows)
}

/// Write rows to a single-sheet XLSX workbook.
pub fn write_xlsx(
    path: &Path,
    sheet_name: &str,
    columns: &[String],
    rows: &[Row],
) -> Result<(), SpreadsheetError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            let c = col as u16;
            match row.get(name) {
                Some(CellValue::Number(n)) => {
                    worksheet.write_number(r, c, *n)?;
                }
                Some(CellValue::Bool(b)) => {
                    worksheet.write_boolean(r, c, *b)?;
                }
                Some(CellValue::Text(s)) => {
                    worksheet.write_string(r, c, s)?;
                }
                Some(CellValue::Empty) | None => {}
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_types_and_columns() {
        let data = "name,age,city\nAsha,31,Pune\nRavi,,Delhi\n";
        let sheet = parse_csv(data.as_bytes()).unwrap();

        assert_eq!(sheet.metadata(), FileMetadata { rows: 2, columns: 3 });
        assert_eq!(sheet.columns[1].column_type, ColumnType::Number);
        assert_eq!(sheet.columns[0].column_type, ColumnType::String);
        assert_eq!(sheet.rows[0].get("age"), Some(&CellValue::Number(31.0)));
        assert!(sheet.rows[1].get("age").is_none());
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        let err = parse_csv("a,b\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SpreadsheetError::Empty));
        assert_eq!(err.to_string(), "File is empty");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let sheet = parse_csv("a,b\n,\n1,2\n".as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 1);
    }

    #[test]
    fn test_dedupe_headers() {
        let headers = dedupe_headers(vec![
            "name".into(),
            "".into(),
            "name".into(),
            " ".into(),
        ]);
        assert_eq!(headers, vec!["name", "__EMPTY", "name_1", "__EMPTY_1"]);
    }

    #[test]
    fn test_generated_header_skips_taken_names() {
        let headers = dedupe_headers(vec!["a".into(), "a_1".into(), "a".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "a_1", "a_2", "a_3"]);

        let sheet = parse_csv("a,a,a_1\n1,2,3\n".as_bytes()).unwrap();
        assert_eq!(sheet.column_names(), vec!["a", "a_1", "a_1_1"]);
        let row = &sheet.rows[0];
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("a_1"), Some(&CellValue::Number(2.0)));
        assert_eq!(row.get("a_1_1"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn test_validate_upload() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "x").unwrap();
        assert!(matches!(
            validate_upload(&txt),
            Err(SpreadsheetError::UnsupportedType)
        ));

        let csv = dir.path().join("Data.CSV");
        std::fs::write(&csv, "a\n1\n").unwrap();
        let file = validate_upload(&csv).unwrap();
        assert_eq!(file.name, "Data.CSV");
        assert_eq!(file.size, 4);
    }

    #[test]
    fn test_write_csv_orders_columns() {
        let sheet = parse_csv("b,a\nx,1\n".as_bytes()).unwrap();
        let mut out = Vec::new();
        write_csv(&mut out, &["a".into(), "b".into(), "c".into()], &sheet.rows).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b,c\n1,x,\n");
    }

    #[test]
    fn test_xlsx_roundtrip_through_calamine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let sheet = parse_csv("name,score\nAsha,9.5\nRavi,7\n".as_bytes()).unwrap();

        write_xlsx(&path, PROCESSED_SHEET_NAME, &sheet.column_names(), &sheet.rows).unwrap();

        let reread = read_sheet(&path).unwrap();
        assert_eq!(reread.column_names(), vec!["name", "score"]);
        assert_eq!(reread.rows, sheet.rows);
    }
}
