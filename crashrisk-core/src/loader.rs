//! CSV ingestion of historical incident data
//!
//! The loader only turns a tabular source into raw rows; field parsing is
//! done by [`RecordStore::load`].

use crate::record::RawRow;
use crate::store::RecordStore;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Read every decodable row of a CSV file with a header line
///
/// Rows the CSV reader cannot decode (wrong field count, invalid UTF-8) are
/// skipped. Failing to open the file or to read the header is an error.
pub fn read_csv_rows(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open dataset: {}", path.display()))?;
    read_csv_from(file).with_context(|| format!("failed to read dataset: {}", path.display()))
}

/// Read CSV rows from any reader
pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV header")?.clone();

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => {
                let row: RawRow = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(column, value)| (column.to_string(), value.to_string()))
                    .collect();
                rows.push(row);
            }
            Err(e) => {
                debug!(row = index, error = %e, "skipping undecodable CSV row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "CSV rows skipped");
    }

    Ok(rows)
}

/// Load a dataset into a store, falling back to an empty store on failure
pub fn load_csv_or_empty(path: &Path) -> RecordStore {
    match read_csv_rows(path) {
        Ok(rows) => RecordStore::load(rows),
        Err(e) => {
            warn!("failed to load incident data, continuing with no records: {e:#}");
            RecordStore::empty()
        }
    }
}
