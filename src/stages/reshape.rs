use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;

use crate::core::expression::{ExpressionRecord, Locus};
use crate::parsing::fpkm_tracking::{parse_tracking_file, TrackingRow};
use crate::parsing::ParseError;
use crate::utils::output::write_atomically;

/// Header of the reshaped expression table
pub const OUTPUT_HEADER: [&str; 4] = ["seqname", "start", "end", "FPKM"];

/// Split each row's locus and keep `(tracking_id, start, end, FPKM)`.
///
/// Output order equals input order. The first malformed locus fails the
/// whole transform, so no partial table is ever produced.
///
/// # Errors
///
/// Returns `ParseError::InvalidRecord` wrapping the `InvalidLocus` error of
/// the first bad row.
pub fn reshape_rows(rows: &[TrackingRow]) -> Result<Vec<ExpressionRecord>, ParseError> {
    rows.iter()
        .map(|row| {
            let locus = Locus::parse(&row.locus).map_err(|e| ParseError::InvalidRecord {
                line: row.line,
                source: Box::new(e),
            })?;
            Ok(ExpressionRecord::new(&row.tracking_id, &locus, row.fpkm))
        })
        .collect()
}

/// Write the comma-separated expression table, header first.
///
/// # Errors
///
/// Returns `ParseError::Csv` if a record cannot be written.
pub fn write_expression_table<W: Write>(
    writer: W,
    records: &[ExpressionRecord],
) -> Result<(), ParseError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(OUTPUT_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reshape a tracking file into an expression table at `output`.
///
/// Returns the number of rows written. `output` is only created when every
/// input row is valid.
///
/// # Errors
///
/// Returns any parse error from the input, or an IO/CSV error from writing.
pub fn reshape_file(input: &Path, output: &Path) -> Result<usize, ParseError> {
    let rows = parse_tracking_file(input)?;
    let records = reshape_rows(&rows)?;

    write_atomically(output, |writer| write_expression_table(writer, &records))?;

    Ok(records.len())
}
