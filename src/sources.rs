//! Loading the list of sources to export.

use crate::constants::{SOURCE_COLUMN, URL_COLUMN};
use crate::errors::{AppError, AppResult};
use crate::models::SourceRecord;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Reads source records from a CSV file with `Source` and `URL` header columns.
///
/// Rows are returned in file order. Extra columns are ignored and cells are trimmed.
/// Duplicate source names are kept (they share one output folder, so the later row
/// will be skipped as already exported) but logged as a warning.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be opened, `CsvError` if a required column is
/// missing or a row is malformed, and `InvalidInput` for rows with an empty cell.
pub fn load_sources(path: &Path) -> AppResult<Vec<SourceRecord>> {
    let file = File::open(path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to open source list {}: {e}",
            path.display()
        ))
    })?;
    read_sources(file)
}

/// Same as [`load_sources`], reading from any reader.
pub fn read_sources<R: std::io::Read>(reader: R) -> AppResult<Vec<SourceRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in [SOURCE_COLUMN, URL_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(AppError::CsvError(format!(
                "Missing required column '{column}'"
            )));
        }
    }

    let mut records = Vec::new();
    let mut seen = HashSet::new();
    for (index, result) in rdr.deserialize::<SourceRecord>().enumerate() {
        // header is line 1
        let line = index + 2;
        let record = result.map_err(|e| AppError::CsvError(format!("Row {line}: {e}")))?;
        if record.name.is_empty() || record.url.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Row {line}: '{SOURCE_COLUMN}' and '{URL_COLUMN}' must not be empty"
            )));
        }
        if !seen.insert(record.name.clone()) {
            warn!(source = %record.name, line, "Duplicate source name in source list");
        }
        records.push(record);
    }

    debug!(count = records.len(), "Loaded source list");
    Ok(records)
}
