//! Parser for the annotator's plain-text summary report.
//!
//! The report is one metric per line, key and value separated by `": "`:
//!
//! ```text
//! organism: Escherichia coli strain
//! contigs: 57
//! bases: 4571437
//! CDS: 4140
//! rRNA: 7
//! tRNA: 89
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::annotation::AnnotationSummary;
use crate::parsing::ParseError;

/// Separator between key and value on every line
const FIELD_SEPARATOR: &str = ": ";

/// Parse an annotation summary report file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if any line is malformed.
pub fn parse_report_file(path: &Path) -> Result<AnnotationSummary, ParseError> {
    let content = fs::read_to_string(path)?;
    parse_report_text(&content)
}

/// Parse annotation summary report text.
///
/// Every non-empty line must split into exactly two fields on `": "`. Both
/// fields are trimmed; values are stored as text.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` naming the first line that does not
/// have exactly two fields or has an empty key.
pub fn parse_report_text(text: &str) -> Result<AnnotationSummary, ParseError> {
    let mut summary = AnnotationSummary::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

        if fields.len() != 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} is not a 'key: value' pair: '{line}'"
            )));
        }

        let key = fields[0].trim();
        if key.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has an empty key"
            )));
        }

        summary.insert(key, fields[1].trim());
    }

    Ok(summary)
}

/// Locate the summary report in an annotator output directory.
///
/// The directory must contain exactly one `.txt` file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the directory cannot be listed, or
/// `ParseError::InvalidFormat` if there is not exactly one `.txt` file.
pub fn find_report(dir: &Path) -> Result<PathBuf, ParseError> {
    let mut reports = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            reports.push(path);
        }
    }

    match reports.len() {
        1 => Ok(reports.remove(0)),
        0 => Err(ParseError::InvalidFormat(format!(
            "No .txt summary report in {}",
            dir.display()
        ))),
        n => Err(ParseError::InvalidFormat(format!(
            "Expected one .txt summary report in {}, found {n}",
            dir.display()
        ))),
    }
}
