use std::fmt;

use serde::Serialize;

use crate::core::annotation::AnnotationSummary;
use crate::parsing::ParseError;

/// Annotated CDS count of RefSeq NC_000913 (E. coli K-12 MG1655)
pub const REFSEQ_CDS: u64 = 4140;
/// Annotated tRNA count of RefSeq NC_000913
pub const REFSEQ_TRNA: u64 = 89;

/// Reference annotation counts the assembly is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCounts {
    pub cds: u64,
    pub trna: u64,
}

impl Default for ReferenceCounts {
    fn default() -> Self {
        Self {
            cds: REFSEQ_CDS,
            trna: REFSEQ_TRNA,
        }
    }
}

/// Observed vs. reference count for one annotation metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDiscrepancy {
    pub metric: String,
    pub reference: u64,
    pub observed: u64,
    /// `reference - observed`; positive means the assembly has fewer
    pub difference: i64,

    /// Word used when the assembly has at least as many as the reference
    #[serde(skip)]
    surplus_word: &'static str,
}

impl MetricDiscrepancy {
    /// Compare one metric, computing `reference - observed`.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidCount` if either count does not fit in an
    /// `i64`, so the difference cannot be represented.
    pub fn new(
        metric: impl Into<String>,
        reference: u64,
        observed: u64,
        surplus_word: &'static str,
    ) -> Result<Self, ParseError> {
        let metric = metric.into();
        let out_of_range = |value: u64| ParseError::InvalidCount {
            key: metric.clone(),
            value: value.to_string(),
        };

        let signed_reference = i64::try_from(reference).map_err(|_| out_of_range(reference))?;
        let signed_observed = i64::try_from(observed).map_err(|_| out_of_range(observed))?;
        let difference = signed_reference
            .checked_sub(signed_observed)
            .ok_or_else(|| out_of_range(observed))?;

        Ok(Self {
            metric,
            reference,
            observed,
            difference,
            surplus_word,
        })
    }

    /// Human-readable comparison, e.g. `140 less CDS` or `1 more tRNA`.
    ///
    /// A zero difference reads as a surplus (`0 additional CDS`).
    pub fn phrase(&self) -> String {
        if self.difference > 0 {
            format!("{} less {}", self.difference, self.metric)
        } else {
            format!(
                "{} {} {}",
                self.difference.unsigned_abs(),
                self.surplus_word,
                self.metric
            )
        }
    }
}

/// CDS and tRNA discrepancies between an annotated assembly and the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationDiscrepancy {
    pub cds: MetricDiscrepancy,
    pub trna: MetricDiscrepancy,
}

impl fmt::Display for AnnotationDiscrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prokka found {} and {} than the RefSeq.",
            self.cds.phrase(),
            self.trna.phrase()
        )
    }
}

/// Compare the CDS and tRNA counts of an annotation summary to the reference.
///
/// Both counts are converted and validated before any difference is computed.
///
/// # Errors
///
/// Returns `ParseError::MissingKey` if `CDS` or `tRNA` is absent, or
/// `ParseError::InvalidCount` if either value is not an unsigned integer
/// small enough to subtract from the reference.
pub fn reconcile(
    summary: &AnnotationSummary,
    reference: &ReferenceCounts,
) -> Result<AnnotationDiscrepancy, ParseError> {
    let cds = summary.count("CDS")?;
    let trna = summary.count("tRNA")?;

    Ok(AnnotationDiscrepancy {
        cds: MetricDiscrepancy::new("CDS", reference.cds, cds, "additional")?,
        trna: MetricDiscrepancy::new("tRNA", reference.trna, trna, "more")?,
    })
}
