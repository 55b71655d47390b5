//! CSV ingest and coercion.
//!
//! This module turns the raw `Year,Species,Age,SampleSize` CSV into typed
//! `Record`s for the chart model.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (reject malformed rows instead of letting NaN leak
//!   into the sums, but keep going and report what happened)
//! - **No filtering here**: year/age/species rules belong to the model

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::Record;
use crate::error::AppError;

const COL_YEAR: &str = "year";
const COL_SPECIES: &str = "species";
const COL_AGE: &str = "age";
const COL_SIZE: &str = "samplesize";

/// How many row errors are echoed to the log before we only count them.
const LOGGED_ROW_ERRORS: usize = 5;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: coerced records + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Load and coerce a CSV file into `Record`s.
pub fn load_records(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_records(file)?;

    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used(),
        rejected = data.row_errors.len(),
        "loaded records"
    );
    Ok(data)
}

/// Coerce records from any CSV reader (header row required).
pub fn read_records<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut out = IngestedData::default();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));

        match outcome {
            Ok(record) => out.records.push(record),
            Err(message) => {
                if out.row_errors.len() < LOGGED_ROW_ERRORS {
                    warn!(line, %message, "rejected row");
                }
                out.row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = [
        (COL_YEAR, "Year"),
        (COL_SPECIES, "Species"),
        (COL_AGE, "Age"),
        (COL_SIZE, "SampleSize"),
    ]
    .into_iter()
    .filter(|(key, _)| !header_map.contains_key(*key))
    .map(|(_, display)| display)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::input(format!(
            "Missing required column(s): {}",
            missing.iter().map(|c| format!("`{c}`")).collect::<Vec<_>>().join(", ")
        )))
    }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Record, String> {
    let year = parse_int(get_required(record, header_map, COL_YEAR)?, "Year")?;
    let species = get_required(record, header_map, COL_SPECIES)?.to_string();
    let age = parse_int(get_required(record, header_map, COL_AGE)?, "Age")?;
    let size = parse_size(get_required(record, header_map, COL_SIZE)?)?;

    Ok(Record {
        year,
        species,
        age,
        size,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Integers, or decimals with no fractional part (`"5.0"`).
fn parse_int(s: &str, column: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("Invalid `{column}` value '{s}' (expected an integer).")),
    }
}

fn parse_size(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `SampleSize` value '{s}' (expected a number)."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite `SampleSize` value '{s}'."));
    }
    if v < 0.0 {
        return Err(format!("Negative `SampleSize` value '{s}'."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_rows_and_ignores_header_case() {
        let csv = "\u{feff}Year,SPECIES,age,SampleSize,Extra\n2009,BearAnimal,5,10,x\n2009, Wolf ,6.0,2.5,y\n";
        let data = read_records(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 2);
        assert!(data.row_errors.is_empty());
        assert_eq!(
            data.records,
            vec![
                Record::new(2009, "BearAnimal", 5, 10.0),
                Record::new(2009, "Wolf", 6, 2.5),
            ]
        );
    }

    #[test]
    fn rejects_malformed_rows_with_line_numbers() {
        let csv = "Year,Species,Age,SampleSize\n2009,Bear,five,1\n2009,Bear,5,-1\n2009,,5,1\n2009,Bear,5.5,1\n2009,Bear,5,3\n";
        let data = read_records(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 5);
        assert_eq!(data.rows_used(), 1);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert!(data.row_errors[1].message.contains("Negative"));
    }

    #[test]
    fn missing_columns_are_fatal() {
        let err = read_records("Year,Species,Age\n2009,Bear,5\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("`SampleSize`"));
    }

    #[test]
    fn short_rows_are_reported_not_fatal() {
        let data = read_records("Year,Species,Age,SampleSize\n2009,Bear\n".as_bytes()).unwrap();
        assert_eq!(data.rows_used(), 0);
        assert_eq!(data.row_errors.len(), 1);
    }

    #[test]
    fn load_records_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "Year,Species,Age,SampleSize\n2009,Elk,3,7\n").unwrap();
        let data = load_records(&path).unwrap();
        assert_eq!(data.records, vec![Record::new(2009, "Elk", 3, 7.0)]);

        let err = load_records(&dir.path().join("missing.csv")).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }
}
