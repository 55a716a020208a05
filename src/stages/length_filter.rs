use std::path::Path;

use tracing::debug;

use crate::core::sequence::SequenceRecord;
use crate::parsing::fasta::{for_each_record, write_fasta_file};
use crate::parsing::ParseError;

/// Contigs must be strictly longer than this to be kept
pub const DEFAULT_MIN_LENGTH: u64 = 1000;

/// Keeps records whose sequence is strictly longer than a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthFilter {
    min_length: u64,
}

impl Default for LengthFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

/// Records that passed the filter, in input order, and their summed length
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub retained: Vec<SequenceRecord>,
    pub total_length: u64,
}

impl FilterOutcome {
    /// Number of retained records
    pub fn count(&self) -> usize {
        self.retained.len()
    }
}

impl LengthFilter {
    pub fn new(min_length: u64) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> u64 {
        self.min_length
    }

    /// A record passes when its length is strictly greater than the threshold
    pub fn passes(&self, record: &SequenceRecord) -> bool {
        record.len() > self.min_length
    }

    /// Filter records in a single pass, discarding failures as they are seen.
    pub fn apply<I>(&self, records: I) -> FilterOutcome
    where
        I: IntoIterator<Item = SequenceRecord>,
    {
        let mut outcome = FilterOutcome::default();
        for record in records {
            self.accept(&mut outcome, record);
        }
        outcome
    }

    /// Stream a FASTA file through the filter without holding rejected records.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file is missing or unreadable, or
    /// `ParseError::Noodles` if it is not valid FASTA.
    pub fn apply_file(&self, path: &Path) -> Result<FilterOutcome, ParseError> {
        let mut outcome = FilterOutcome::default();
        let seen = for_each_record(path, |record| self.accept(&mut outcome, record))?;

        debug!(
            "Kept {} of {} records longer than {} from {}",
            outcome.count(),
            seen,
            self.min_length,
            path.display()
        );

        Ok(outcome)
    }

    /// Filter `input` and write the retained records to `output` as FASTA.
    ///
    /// Nothing is written if `input` cannot be parsed in full.
    ///
    /// # Errors
    ///
    /// Returns any error from [`LengthFilter::apply_file`], or
    /// `ParseError::Io` if the output cannot be written.
    pub fn filter_file(&self, input: &Path, output: &Path) -> Result<FilterOutcome, ParseError> {
        let outcome = self.apply_file(input)?;
        write_fasta_file(output, &outcome.retained)?;
        Ok(outcome)
    }

    fn accept(&self, outcome: &mut FilterOutcome, record: SequenceRecord) {
        if self.passes(&record) {
            outcome.total_length += record.len();
            outcome.retained.push(record);
        }
    }
}
