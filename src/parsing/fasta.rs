//! FASTA reading and writing using noodles.
//!
//! Reads plain or gzip/bgzip compressed files and writes plain FASTA.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;

use crate::core::sequence::SequenceRecord;
use crate::parsing::ParseError;
use crate::utils::output::write_atomically;

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();

    // Check for gzipped FASTA
    if path_str.ends_with(".fa.gz")
        || path_str.ends_with(".fasta.gz")
        || path_str.ends_with(".fna.gz")
        || path_str.ends_with(".fa.bgz")
        || path_str.ends_with(".fasta.bgz")
        || path_str.ends_with(".fna.bgz")
    {
        return true;
    }

    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase)
            .as_deref(),
        Some("fa" | "fasta" | "fna")
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a FASTA file, transparently decompressing `.gz`/`.bgz` input
fn open_fasta(path: &Path) -> Result<fasta::io::Reader<Box<dyn BufRead>>, ParseError> {
    let file = File::open(path)?;

    // bgzip is a series of gzip members, so a multi-member decoder handles both
    let inner: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(fasta::io::Reader::new(inner))
}

/// Stream every record of a FASTA file through `visit`, in file order.
///
/// Records are handed over one at a time so callers decide what to keep.
/// Returns the number of records read.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened, or
/// `ParseError::Noodles` if any record is malformed.
pub fn for_each_record<F>(path: &Path, visit: F) -> Result<usize, ParseError>
where
    F: FnMut(SequenceRecord),
{
    let mut reader = open_fasta(path)?;
    read_records(&mut reader, visit)
}

/// Parse a FASTA file into memory.
///
/// # Errors
///
/// Same as [`for_each_record`].
pub fn parse_fasta_file(path: &Path) -> Result<Vec<SequenceRecord>, ParseError> {
    let mut records = Vec::new();
    for_each_record(path, |record| records.push(record))?;
    Ok(records)
}

/// Read records from a noodles FASTA reader
fn read_records<R, F>(reader: &mut fasta::io::Reader<R>, mut visit: F) -> Result<usize, ParseError>
where
    R: BufRead,
    F: FnMut(SequenceRecord),
{
    let mut count = 0;

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        let id = String::from_utf8_lossy(record.name()).to_string();
        let sequence = record.sequence().as_ref().to_vec();

        let mut parsed = SequenceRecord::new(id, sequence);
        if let Some(description) = record.description() {
            parsed = parsed.with_description(String::from_utf8_lossy(description).to_string());
        }

        visit(parsed);
        count += 1;
    }

    Ok(count)
}

/// Write records as FASTA, one entry per record, in the given order.
///
/// # Errors
///
/// Returns `ParseError::Io` if writing fails.
pub fn write_fasta<W: Write>(writer: W, records: &[SequenceRecord]) -> Result<(), ParseError> {
    let mut writer = fasta::io::Writer::new(writer);

    for record in records {
        let definition = fasta::record::Definition::new(
            record.id.as_str(),
            record.description.as_deref().map(Into::into),
        );
        let sequence = fasta::record::Sequence::from(record.sequence.clone());
        writer.write_record(&fasta::Record::new(definition, sequence))?;
    }

    Ok(())
}

/// Write records to a FASTA file. The file only appears once fully written.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_fasta_file(path: &Path, records: &[SequenceRecord]) -> Result<(), ParseError> {
    write_atomically(path, |writer| write_fasta(writer, records))
}
