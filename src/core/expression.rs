use serde::Serialize;

use crate::parsing::ParseError;

/// Genomic coordinates split out of a composite `chrom:start-end` locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locus {
    pub chrom: String,
    /// 1-based start coordinate
    pub start: u64,
    pub end: u64,
}

impl Locus {
    /// Parse a locus of the form `<chrom>:<start>-<end>`.
    ///
    /// The string is split on `-` into exactly two halves; the first half is
    /// split on `:` into exactly two tokens (chromosome and start).
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidLocus` when the separators are missing,
    /// repeated, or the coordinates are not unsigned integers.
    pub fn parse(locus: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidLocus {
            locus: locus.to_string(),
            reason: reason.to_string(),
        };

        let halves: Vec<&str> = locus.split('-').collect();
        if halves.len() != 2 {
            return Err(invalid("expected exactly one '-'"));
        }

        let tokens: Vec<&str> = halves[0].split(':').collect();
        if tokens.len() != 2 {
            return Err(invalid("expected exactly one ':' before the '-'"));
        }

        let start: u64 = tokens[1]
            .trim()
            .parse()
            .map_err(|_| invalid("start is not an unsigned integer"))?;
        let end: u64 = halves[1]
            .trim()
            .parse()
            .map_err(|_| invalid("end is not an unsigned integer"))?;

        Ok(Self {
            chrom: tokens[0].to_string(),
            start,
            end,
        })
    }
}

/// One output row of the expression table: `seqname,start,end,FPKM`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionRecord {
    pub seqname: String,
    pub start: u64,
    pub end: u64,
    #[serde(rename = "FPKM")]
    pub fpkm: f64,
}

impl ExpressionRecord {
    pub fn new(seqname: impl Into<String>, locus: &Locus, fpkm: f64) -> Self {
        Self {
            seqname: seqname.into(),
            start: locus.start,
            end: locus.end,
            fpkm,
        }
    }
}
