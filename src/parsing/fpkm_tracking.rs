//! Parser for the quantifier's tab-separated `genes.fpkm_tracking` table.
//!
//! Only three columns are used; any others are ignored:
//!
//! - `tracking_id`: gene or transcript identifier
//! - `locus`: composite `chrom:start-end` coordinates
//! - `FPKM`: expression level

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;

use crate::parsing::ParseError;

/// Columns that must be present in the header
pub const REQUIRED_COLUMNS: [&str; 3] = ["tracking_id", "locus", "FPKM"];

/// One data row of the tracking table, before the locus is split
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackingRow {
    pub tracking_id: String,
    pub locus: String,
    #[serde(rename = "FPKM")]
    pub fpkm: f64,

    /// 1-based line number in the source file
    #[serde(skip)]
    pub line: u64,
}

/// Parse a tracking file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, or any error from
/// [`parse_tracking`].
pub fn parse_tracking_file(path: &Path) -> Result<Vec<TrackingRow>, ParseError> {
    parse_tracking(File::open(path)?)
}

/// Parse tracking rows from any reader, preserving input order.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a required column is missing,
/// `ParseError::Csv` if a row has the wrong number of fields, or
/// `ParseError::InvalidRecord` if a row's FPKM is not a finite,
/// non-negative number.
pub fn parse_tracking<R: Read>(reader: R) -> Result<Vec<TrackingRow>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    check_required_columns(&headers)?;

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);

        let mut row: TrackingRow =
            record
                .deserialize(Some(&headers))
                .map_err(|e| ParseError::InvalidRecord {
                    line,
                    source: Box::new(ParseError::Csv(e)),
                })?;

        if !row.fpkm.is_finite() || row.fpkm < 0.0 {
            return Err(ParseError::InvalidRecord {
                line,
                source: Box::new(ParseError::InvalidFormat(format!(
                    "FPKM must be a non-negative number, got {}",
                    row.fpkm
                ))),
            });
        }

        row.line = line;
        rows.push(row);
    }

    Ok(rows)
}

fn check_required_columns(headers: &StringRecord) -> Result<(), ParseError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ParseError::InvalidFormat(format!(
                "Missing {column} column"
            )));
        }
    }
    Ok(())
}
