use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parsing::fasta::is_fasta_file;
use crate::pipeline::PipelineError;
use crate::stages::length_filter::DEFAULT_MIN_LENGTH;
use crate::stages::reconcile::ReferenceCounts;
use crate::tools::ToolSet;
use crate::utils::validation::{validate_accession, validate_thread_count};

/// Directory all inputs and artifacts live in, relative to the working directory
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Per-tool wall-clock limit in whole seconds; unset means no limit
pub const TOOL_TIMEOUT_ENV: &str = "RESEQ_TOOL_TIMEOUT_SECS";

/// k-mer sizes handed to the assembler
pub const DEFAULT_KMER_SIZES: [u32; 4] = [55, 77, 99, 127];

/// Reads fetched from the sequence archive.
///
/// `accession` is what gets prefetched (an experiment or a run); `run` names
/// the resulting `.sra` and FASTQ files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSet {
    pub accession: String,
    pub run: String,
}

impl ReadSet {
    pub fn new(accession: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            run: run.into(),
        }
    }
}

/// Immutable settings for one pipeline run, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Forwarded verbatim to every tool that takes a thread count
    pub threads: usize,
    pub results_dir: PathBuf,
    pub min_contig_length: u64,
    pub kmer_sizes: Vec<u32>,

    /// Illumina resequencing of E. coli K-12, used for assembly
    pub assembly_reads: ReadSet,
    /// RNA-seq of the K-12 derivative BW38028, used for quantification
    pub transcriptome_reads: ReadSet,

    pub reference_fasta: PathBuf,
    pub reference_index: PathBuf,
    pub reference_counts: ReferenceCounts,

    /// Organism hint for the annotator
    pub genus: String,
    pub annotation_prefix: String,

    pub tools: ToolSet,
    pub tool_timeout: Option<Duration>,
}

impl PipelineConfig {
    pub fn new(threads: usize, results_dir: impl Into<PathBuf>) -> Self {
        let results_dir = results_dir.into();

        Self {
            threads,
            min_contig_length: DEFAULT_MIN_LENGTH,
            kmer_sizes: DEFAULT_KMER_SIZES.to_vec(),
            assembly_reads: ReadSet::new("SRX5005282", "SRR8185310"),
            transcriptome_reads: ReadSet::new("SRR1411276", "SRR1411276"),
            reference_fasta: results_dir.join("NC_000913.fna"),
            reference_index: results_dir.join("index").join("NC_000913"),
            reference_counts: ReferenceCounts::default(),
            genus: "Escherichia".to_string(),
            annotation_prefix: "annotation".to_string(),
            tools: ToolSet::default(),
            tool_timeout: None,
            results_dir,
        }
    }

    /// Defaults in `results/`, with tool executables and timeout taken from
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfig` if `RESEQ_TOOL_TIMEOUT_SECS`
    /// is set but is not a positive integer.
    pub fn from_env(threads: usize) -> Result<Self, PipelineError> {
        let timeout = match std::env::var(TOOL_TIMEOUT_ENV) {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => None,
        };

        Ok(Self::new(threads, DEFAULT_RESULTS_DIR)
            .with_tools(ToolSet::from_env())
            .with_tool_timeout(timeout))
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Check everything that ends up on a tool command line.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Validation` for a zero thread count or a
    /// malformed accession, or `PipelineError::InvalidConfig` for unusable
    /// k-mer sizes or a reference without a FASTA extension.
    pub fn validate(&self) -> Result<(), PipelineError> {
        validate_thread_count(self.threads)?;

        for reads in [&self.assembly_reads, &self.transcriptome_reads] {
            validate_accession(&reads.accession)?;
            validate_accession(&reads.run)?;
        }

        if self.kmer_sizes.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "at least one k-mer size is required".to_string(),
            ));
        }
        // The assembler only accepts odd k below 128
        if let Some(k) = self.kmer_sizes.iter().find(|&&k| k % 2 == 0 || k >= 128) {
            return Err(PipelineError::InvalidConfig(format!(
                "k-mer size {k} must be odd and below 128"
            )));
        }

        if !is_fasta_file(&self.reference_fasta) {
            return Err(PipelineError::InvalidConfig(format!(
                "reference {} is not a FASTA file",
                self.reference_fasta.display()
            )));
        }

        Ok(())
    }

    pub fn log_path(&self) -> PathBuf {
        self.results_dir.join("pipeline.log")
    }

    pub fn sra_path(&self, reads: &ReadSet) -> PathBuf {
        self.results_dir
            .join(&reads.run)
            .join(format!("{}.sra", reads.run))
    }

    pub fn fastq_path(&self, reads: &ReadSet) -> PathBuf {
        self.results_dir.join(format!("{}.fastq", reads.run))
    }

    pub fn assembly_dir(&self) -> PathBuf {
        self.results_dir.join("SPAdes")
    }

    pub fn contigs_path(&self) -> PathBuf {
        self.assembly_dir().join("contigs.fasta")
    }

    pub fn long_contigs_path(&self) -> PathBuf {
        self.results_dir.join("long_contigs.fasta")
    }

    pub fn annotation_dir(&self) -> PathBuf {
        self.results_dir.join("prokka")
    }

    pub fn mapping_dir(&self) -> PathBuf {
        self.results_dir.join("tophat")
    }

    pub fn alignments_path(&self) -> PathBuf {
        self.mapping_dir().join("accepted_hits.bam")
    }

    pub fn quantification_dir(&self) -> PathBuf {
        self.results_dir.join("cufflinks")
    }

    pub fn tracking_path(&self) -> PathBuf {
        self.quantification_dir().join("genes.fpkm_tracking")
    }

    pub fn expression_table_path(&self) -> PathBuf {
        self.results_dir.join("transcriptome_data.fpkm")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.results_dir.join("run_summary.json")
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}

/// Parse a timeout in whole seconds. Blank means no timeout.
fn parse_timeout(value: &str) -> Result<Option<Duration>, PipelineError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(PipelineError::InvalidConfig(format!(
            "{TOOL_TIMEOUT_ENV} must be a positive number of seconds, got '{value}'"
        ))),
    }
}
