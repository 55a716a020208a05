//! Parsers for the files the external tools leave behind.
//!
//! This module provides parsers for:
//!
//! - **FASTA files**: Assembled contigs (plain or gzip/bgzip compressed), plus
//!   a writer for filtered subsets
//! - **Annotation summary reports**: `key: value` text written by the annotator
//! - **Expression tracking tables**: Tab-separated `genes.fpkm_tracking` output
//!   of the quantifier
//!
//! ## Example
//!
//! ```rust,no_run
//! use reseq_pipeline::parsing::annotation_report::parse_report_text;
//!
//! let summary = parse_report_text("CDS: 4140\ntRNA: 89\n").unwrap();
//! assert_eq!(summary.count("CDS").unwrap(), 4140);
//! ```

use thiserror::Error;

pub mod annotation_report;
pub mod fasta;
pub mod fpkm_tracking;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Missing required key '{0}'")]
    MissingKey(String),

    #[error("Value for '{key}' is not a count: '{value}'")]
    InvalidCount { key: String, value: String },

    #[error("Invalid locus '{locus}': {reason}")]
    InvalidLocus { locus: String, reason: String },

    #[error("Line {line}: {source}")]
    InvalidRecord {
        line: u64,
        #[source]
        source: Box<ParseError>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
