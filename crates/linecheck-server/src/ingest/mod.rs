//! File ingestion
//!
//! Turns uploaded file bytes into an ordered list of raw phone candidates.
//! The declared filename extension selects the parser; nothing is
//! deduplicated or validated here, and blank cells pass through untouched
//! (filtering happens in normalization).

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

pub mod numeric;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
    Xls,
    Txt,
}

impl FileFormat {
    /// Resolve the parser from a filename's extension.
    pub fn from_filename(filename: &str) -> Result<Self, IngestError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Xlsx),
            "xls" => Ok(FileFormat::Xls),
            "txt" => Ok(FileFormat::Txt),
            _ => Err(IngestError::UnsupportedFormat(filename.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook contains no sheets")]
    EmptyWorkbook,
}

/// Extract raw candidates from file bytes, in source row order.
pub fn ingest(bytes: &[u8], format: FileFormat) -> Result<Vec<String>, IngestError> {
    match format {
        FileFormat::Csv => ingest_csv(bytes),
        FileFormat::Xlsx | FileFormat::Xls => ingest_spreadsheet(bytes),
        FileFormat::Txt => Ok(ingest_txt(bytes)),
    }
}

/// CSV is read headerless; the first column of every row is the candidate.
fn ingest_csv(bytes: &[u8]) -> Result<Vec<String>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut candidates = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let cell = record.get(0).unwrap_or_default();
        candidates.push(repair_candidate(&String::from_utf8_lossy(cell)));
    }

    Ok(candidates)
}

/// First sheet only, rows as arrays, first column as candidate. A
/// non-numeric first cell marks a header row and is discarded.
fn ingest_spreadsheet(bytes: &[u8]) -> Result<Vec<String>, IngestError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::EmptyWorkbook)??;

    let mut candidates = Vec::new();
    for (index, row) in range.rows().enumerate() {
        let candidate = row.first().map(cell_to_candidate).unwrap_or_default();

        if index == 0 && !numeric::is_numeric_parseable(&candidate) {
            continue;
        }

        candidates.push(candidate);
    }

    Ok(candidates)
}

/// One candidate per line; a non-numeric first line is treated as a header.
fn ingest_txt(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);

    let mut candidates = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if index == 0 && !numeric::is_numeric_parseable(line) {
            continue;
        }
        candidates.push(repair_candidate(line));
    }

    candidates
}

/// Undo spreadsheet auto-formatting on a single cell.
fn repair_candidate(raw: &str) -> String {
    numeric::expand_scientific(raw).unwrap_or_else(|| raw.to_string())
}

fn cell_to_candidate(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => repair_candidate(s.trim()),
        Data::Float(f) => numeric::float_to_digits(*f).unwrap_or_else(|| f.to_string()),
        Data::Int(i) => i.to_string(),
        other => repair_candidate(other.to_string().trim()),
    }
}
