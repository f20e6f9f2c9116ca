//! CSV encoding of the layer table and the import adapter for CSV, TSV and
//! spreadsheet workbooks.

use crate::domain::{DomainError, DomainResult, ImportRecord, Layer};
use calamine::Reader;
use std::path::Path;

/// Export header, in column order.
pub const CSV_HEADER: [&str; 7] = [
    "Lithology",
    "Color",
    "Grain Size",
    "Thickness",
    "Fossils",
    "Environment",
    "Notes",
];

/// Columns an import must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Lithology", "Color", "Grain Size", "Thickness"];

pub struct CsvExporter;

impl CsvExporter {
    /// Serializes layers in storage order as UTF-8 CSV.
    pub fn to_csv(layers: &[Layer]) -> DomainResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for layer in layers {
            writer.write_record([
                layer.lithology().name().to_string(),
                layer.color().to_string(),
                layer.grain_size().name().to_string(),
                layer.thickness().to_string(),
                layer.fossils().to_string(),
                layer.environment().name().to_string(),
                layer.notes().to_string(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| DomainError::Io(e.into_error()))
    }

    /// Parses comma separated text into import records.
    pub fn parse_csv(data: &[u8]) -> DomainResult<Vec<ImportRecord>> {
        Self::parse_delimited(data, b',')
    }

    /// Parses delimited text into import records.
    ///
    /// Fails with [`DomainError::MissingColumns`] before looking at any row if
    /// the header lacks a required column. Empty required cells are left as
    /// `None` so the store reports them as missing.
    pub fn parse_delimited(data: &[u8], delimiter: u8) -> DomainResult<Vec<ImportRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .from_reader(data);
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader.records().map(|row| -> DomainResult<(u64, Vec<String>)> {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());
            Ok((line, row.iter().map(str::to_string).collect()))
        });
        records_from_rows(&headers, rows)
    }

    /// Reads the first sheet of an Excel or OpenDocument workbook. The first
    /// row of the sheet's used range is the header.
    pub fn parse_workbook(path: &Path) -> DomainResult<Vec<ImportRecord>> {
        let unreadable = |e: calamine::Error| DomainError::Parse {
            line: 0,
            reason: format!("unreadable workbook: {}", e),
        };
        let mut workbook = calamine::open_workbook_auto(path).map_err(unreadable)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DomainError::Parse {
                line: 0,
                reason: "workbook has no sheets".to_string(),
            })?
            .map_err(unreadable)?;

        let header_line = range.start().map_or(1, |(row, _)| row as u64 + 1);
        let mut rows = range
            .rows()
            .map(|cells| cells.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
        let headers = rows.next().unwrap_or_default();
        let rows = rows
            .enumerate()
            .map(|(i, cells)| Ok((header_line + 1 + i as u64, cells)));
        records_from_rows(&headers, rows)
    }

    /// Reads an import file, choosing the reader from its extension.
    pub fn import_from_file(path: &Path) -> DomainResult<Vec<ImportRecord>> {
        match import_format(path) {
            ImportFormat::Workbook => Self::parse_workbook(path),
            ImportFormat::Delimited(delimiter) => {
                let data = std::fs::read(path)?;
                Self::parse_delimited(&data, delimiter)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Delimited(u8),
    Workbook,
}

/// `.xlsx`/`.xlsm`/`.xlsb`/`.xls`/`.ods` are workbooks, `.tsv`/`.tab` are tab
/// separated, anything else is comma separated.
pub fn import_format(path: &Path) -> ImportFormat {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => ImportFormat::Workbook,
        "tsv" | "tab" => ImportFormat::Delimited(b'\t'),
        _ => ImportFormat::Delimited(b','),
    }
}

/// Maps a header row and numbered data rows onto import records. Text cells
/// are trimmed, the same way the layer form trims its input.
fn records_from_rows<I>(headers: &[String], rows: I) -> DomainResult<Vec<ImportRecord>>
where
    I: IntoIterator<Item = DomainResult<(u64, Vec<String>)>>,
{
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| column(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::MissingColumns { columns: missing });
    }

    let lithology_col = column("Lithology");
    let color_col = column("Color");
    let grain_col = column("Grain Size");
    let thickness_col = column("Thickness");
    let fossils_col = column("Fossils");
    let notes_col = column("Notes");

    let mut records = Vec::new();
    for row in rows {
        let (line, row) = row?;
        let text = |col: Option<usize>| col.and_then(|c| row.get(c)).map(|v| v.trim());
        let cell = |col: Option<usize>| text(col).filter(|v| !v.is_empty());
        let parse_error = |reason: String| DomainError::Parse { line, reason };

        records.push(ImportRecord {
            lithology: cell(lithology_col)
                .map(str::parse)
                .transpose()
                .map_err(parse_error)?,
            color: cell(color_col).map(str::parse).transpose().map_err(parse_error)?,
            grain_size: cell(grain_col).map(str::parse).transpose().map_err(parse_error)?,
            thickness: cell(thickness_col)
                .map(parse_thickness)
                .transpose()
                .map_err(parse_error)?,
            fossils: text(fossils_col).map(str::to_string),
            notes: text(notes_col).map(str::to_string),
        });
    }
    Ok(records)
}

fn parse_thickness(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(t) if t.is_finite() => Ok(t),
        _ => Err(format!("'{}' is not a thickness", value)),
    }
}
