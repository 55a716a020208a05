//! Sequential orchestration of the whole run.
//!
//! Stages run strictly one after another. External tools block the stage
//! that invokes them; every failure aborts the run, and the run log shows
//! the furthest completed stage.
//!
//! 1. Retrieve assembly reads (skipped when the FASTQ is already present)
//! 2. Assemble with SPAdes
//! 3. Keep contigs longer than the threshold, log their count and total length
//! 4. Annotate with Prokka, copy its summary report into the log
//! 5. Compare CDS/tRNA counts with the RefSeq annotation
//! 6. Retrieve transcriptome reads, build the reference index, map, quantify
//! 7. Reshape the quantifier's tracking table into `seqname,start,end,FPKM`
//! 8. Write a JSON summary of the run

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::parsing::annotation_report::{find_report, parse_report_file};
use crate::parsing::ParseError;
use crate::stages::length_filter::{FilterOutcome, LengthFilter};
use crate::stages::reconcile::{reconcile, AnnotationDiscrepancy};
use crate::stages::reshape::reshape_file;
use crate::tools::runner::{ToolError, ToolRunner};
use crate::tools::{self, ToolInvocation};
use crate::utils::output::write_atomically;
use crate::utils::validation::ValidationError;

pub mod config;
pub mod run_log;

pub use config::{PipelineConfig, ReadSet};
pub use run_log::RunLog;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to process {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Attach the offending file to a parse error
fn input_error(path: &Path) -> impl FnOnce(ParseError) -> PipelineError + '_ {
    move |source| PipelineError::Input {
        path: path.to_path_buf(),
        source,
    }
}

/// Files produced by a successful run
#[derive(Debug, Clone, Serialize)]
pub struct Artifacts {
    pub run_log: PathBuf,
    pub long_contigs: PathBuf,
    pub annotation_report: PathBuf,
    pub expression_table: PathBuf,
}

/// Machine-readable outcome of a run, also written to `run_summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub threads: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub min_contig_length: u64,
    pub contigs: usize,
    pub assembly_length: u64,
    pub annotation: AnnotationDiscrepancy,
    pub expression_records: usize,
    pub artifacts: Artifacts,
}

/// One run of the pipeline over a results directory
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
    runner: ToolRunner,
    log: RunLog,
}

/// Validate `config`, then run every stage in order.
///
/// # Errors
///
/// Returns the first error from any stage; nothing after it runs.
pub fn run(config: &PipelineConfig) -> Result<RunSummary, PipelineError> {
    Pipeline::start(config)?.run()
}

impl<'a> Pipeline<'a> {
    /// Validate the configuration, create the results directory and start
    /// a fresh run log.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or an IO error if the directory or log
    /// cannot be created.
    pub fn start(config: &'a PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        fs::create_dir_all(config.results_dir())?;
        let log = RunLog::create(
            config.log_path(),
            &format!(
                "running {} with {} threads",
                env!("CARGO_PKG_NAME"),
                config.threads
            ),
        )?;

        info!(
            "Writing results to {} using {} threads",
            config.results_dir().display(),
            config.threads
        );

        Ok(Self {
            config,
            runner: ToolRunner::new(config.tool_timeout),
            log,
        })
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Run every stage in order and write the JSON summary.
    ///
    /// # Errors
    ///
    /// Returns the first error from any stage.
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let started_at = Utc::now();
        let config = self.config;

        let assembly_reads = self.retrieve_reads(&config.assembly_reads)?;
        let contigs = self.assemble(&assembly_reads)?;
        let filtered = self.filter_contigs(&contigs)?;

        let report = self.annotate(&config.long_contigs_path())?;
        let annotation = self.reconcile_annotation(&report)?;

        let transcriptome_reads = self.retrieve_reads(&config.transcriptome_reads)?;
        let index = self.build_index()?;
        let alignments = self.map_reads(&transcriptome_reads, &index)?;
        let tracking = self.quantify(&alignments)?;
        let expression_records = self.reshape_expression(&tracking)?;

        let summary = RunSummary {
            threads: config.threads,
            started_at,
            finished_at: Utc::now(),
            min_contig_length: config.min_contig_length,
            contigs: filtered.count(),
            assembly_length: filtered.total_length,
            annotation,
            expression_records,
            artifacts: Artifacts {
                run_log: self.log.path().to_path_buf(),
                long_contigs: config.long_contigs_path(),
                annotation_report: report,
                expression_table: config.expression_table_path(),
            },
        };

        write_summary(&config.summary_path(), &summary)?;
        info!("Run complete; summary in {}", config.summary_path().display());

        Ok(summary)
    }

    /// Fetch and unpack reads unless the FASTQ already exists.
    ///
    /// # Errors
    ///
    /// Returns a tool error if retrieval fails.
    pub fn retrieve_reads(&self, reads: &ReadSet) -> Result<PathBuf, PipelineError> {
        let fastq = self.config.fastq_path(reads);
        if fastq.exists() {
            info!("Reads for {} already present at {}", reads.run, fastq.display());
            return Ok(fastq);
        }

        let results = self.config.results_dir();
        let sra = self.config.sra_path(reads);
        self.run_tool(&tools::prefetch(&self.config.tools, &reads.accession, results, &sra))?;
        self.run_tool(&tools::fastq_dump(&self.config.tools, &sra, results, &fastq))?;

        Ok(fastq)
    }

    /// Assemble reads into contigs
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` without reads, or a tool error.
    pub fn assemble(&self, reads: &Path) -> Result<PathBuf, PipelineError> {
        require_input(reads)?;

        let out_dir = self.config.assembly_dir();
        fs::create_dir_all(&out_dir)?;

        self.run_tool(&tools::spades(
            &self.config.tools,
            &self.config.kmer_sizes,
            self.config.threads,
            reads,
            &out_dir,
        ))?;

        Ok(self.config.contigs_path())
    }

    /// Keep contigs longer than the threshold and log count and total length.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Input` if the contigs cannot be read or the
    /// filtered FASTA cannot be written.
    pub fn filter_contigs(&self, contigs: &Path) -> Result<FilterOutcome, PipelineError> {
        let filter = LengthFilter::new(self.config.min_contig_length);
        let output = self.config.long_contigs_path();

        let outcome = filter
            .filter_file(contigs, &output)
            .map_err(input_error(contigs))?;

        info!(
            "{} contigs longer than {} bp ({} bp total)",
            outcome.count(),
            filter.min_length(),
            outcome.total_length
        );
        self.log.append_line(&format!(
            "There are {} contigs > {} in the assembly.",
            outcome.count(),
            filter.min_length()
        ))?;
        self.log.append_line(&format!(
            "There are {} bp in the assembly.",
            outcome.total_length
        ))?;

        Ok(outcome)
    }

    /// Annotate the filtered contigs and copy the summary report into the log.
    ///
    /// Returns the path of the summary report.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` without contigs, a tool error,
    /// or `PipelineError::Input` if the report cannot be located or read.
    pub fn annotate(&self, contigs: &Path) -> Result<PathBuf, PipelineError> {
        require_input(contigs)?;

        let out_dir = self.config.annotation_dir();
        self.run_tool(&tools::prokka(
            &self.config.tools,
            &out_dir,
            &self.config.annotation_prefix,
            &self.config.genus,
            self.config.threads,
            contigs,
        ))?;

        let report = find_report(&out_dir).map_err(input_error(&out_dir))?;
        let text = fs::read_to_string(&report)
            .map_err(|e| input_error(&report)(ParseError::Io(e)))?;
        self.log.append_text(&text)?;

        Ok(report)
    }

    /// Compare the report's CDS and tRNA counts with the reference and log it.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Input` for a malformed report, a missing key
    /// or a non-numeric count.
    pub fn reconcile_annotation(
        &self,
        report: &Path,
    ) -> Result<AnnotationDiscrepancy, PipelineError> {
        let summary = parse_report_file(report).map_err(input_error(report))?;
        let discrepancy =
            reconcile(&summary, &self.config.reference_counts).map_err(input_error(report))?;

        info!(
            "CDS difference {}, tRNA difference {}",
            discrepancy.cds.difference, discrepancy.trna.difference
        );
        self.log.append_line(&discrepancy.to_string())?;

        Ok(discrepancy)
    }

    /// Build the read mapper's index of the reference genome.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` without the reference FASTA, or
    /// a tool error.
    pub fn build_index(&self) -> Result<PathBuf, PipelineError> {
        let reference = &self.config.reference_fasta;
        require_input(reference)?;

        let index = &self.config.reference_index;
        if let Some(parent) = index.parent() {
            fs::create_dir_all(parent)?;
        }

        self.run_tool(&tools::bowtie2_build(&self.config.tools, reference, index))?;

        Ok(index.clone())
    }

    /// Map transcriptome reads against the reference index.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` without reads, or a tool error.
    pub fn map_reads(&self, reads: &Path, index: &Path) -> Result<PathBuf, PipelineError> {
        require_input(reads)?;

        self.run_tool(&tools::tophat(
            &self.config.tools,
            self.config.threads,
            &self.config.mapping_dir(),
            index,
            reads,
        ))?;

        Ok(self.config.alignments_path())
    }

    /// Quantify expression from the alignments.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::MissingInput` without alignments, or a tool error.
    pub fn quantify(&self, alignments: &Path) -> Result<PathBuf, PipelineError> {
        require_input(alignments)?;

        self.run_tool(&tools::cufflinks(
            &self.config.tools,
            self.config.threads,
            &self.config.quantification_dir(),
            alignments,
        ))?;

        Ok(self.config.tracking_path())
    }

    /// Write the `seqname,start,end,FPKM` table from the tracking file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Input` if any row is malformed; no table is
    /// written in that case.
    pub fn reshape_expression(&self, tracking: &Path) -> Result<usize, PipelineError> {
        let output = self.config.expression_table_path();
        let rows = reshape_file(tracking, &output).map_err(input_error(tracking))?;

        info!("Wrote {rows} expression records to {}", output.display());
        Ok(rows)
    }

    /// Log the command line, then run the tool
    fn run_tool(&self, invocation: &ToolInvocation) -> Result<(), PipelineError> {
        self.log.append_line(&invocation.command_line())?;
        self.runner.run(invocation)?;
        Ok(())
    }
}

fn require_input(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingInput(path.to_path_buf()))
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), PipelineError> {
    write_atomically(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, summary)?;
        writer.write_all(b"\n")?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn started(dir: &TempDir) -> (PipelineConfig, PathBuf) {
        let results = dir.path().join("results");
        (PipelineConfig::new(3, &results), results)
    }

    #[test]
    fn test_start_creates_results_and_log() {
        let dir = TempDir::new().unwrap();
        let (config, results) = started(&dir);

        let pipeline = Pipeline::start(&config).unwrap();

        assert!(results.is_dir());
        assert_eq!(
            fs::read_to_string(pipeline.log().path()).unwrap(),
            "running reseq-pipeline with 3 threads\n"
        );
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::new(0, dir.path().join("results"));

        assert!(Pipeline::start(&config).is_err());
        assert!(!dir.path().join("results").exists());
    }

    #[test]
    fn test_filter_contigs_logs_counts() {
        let dir = TempDir::new().unwrap();
        let (config, _) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let contigs = dir.path().join("contigs.fasta");
        fs::write(
            &contigs,
            format!(
                ">NODE_1\n{}\n>NODE_2\n{}\n>NODE_3\n{}\n",
                "A".repeat(999),
                "C".repeat(1000),
                "G".repeat(1001)
            ),
        )
        .unwrap();

        let outcome = pipeline.filter_contigs(&contigs).unwrap();
        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.total_length, 1001);

        let log = fs::read_to_string(pipeline.log().path()).unwrap();
        assert!(log.contains("There are 1 contigs > 1000 in the assembly.\n"));
        assert!(log.ends_with("There are 1001 bp in the assembly.\n"));
        assert!(config.long_contigs_path().exists());
    }

    #[test]
    fn test_filter_missing_contigs_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (config, _) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let err = pipeline
            .filter_contigs(&config.contigs_path())
            .unwrap_err();

        assert!(matches!(err, PipelineError::Input { .. }));
        assert!(!config.long_contigs_path().exists());
    }

    #[test]
    fn test_reconcile_annotation_logs_phrase() {
        let dir = TempDir::new().unwrap();
        let (config, results) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let report = results.join("annotation.txt");
        fs::write(&report, "organism: Escherichia coli strain\nCDS: 4000\ntRNA: 90\n").unwrap();

        let discrepancy = pipeline.reconcile_annotation(&report).unwrap();
        assert_eq!(discrepancy.cds.difference, 140);

        let log = fs::read_to_string(pipeline.log().path()).unwrap();
        assert!(log.ends_with("Prokka found 140 less CDS and 1 more tRNA than the RefSeq.\n"));
    }

    #[test]
    fn test_reconcile_missing_trna_is_fatal() {
        let dir = TempDir::new().unwrap();
        let (config, results) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let report = results.join("annotation.txt");
        fs::write(&report, "CDS: 4000\n").unwrap();

        let err = pipeline.reconcile_annotation(&report).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Input {
                source: ParseError::MissingKey(_),
                ..
            }
        ));
    }

    #[test]
    fn test_build_index_requires_reference() {
        let dir = TempDir::new().unwrap();
        let (config, _) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let err = pipeline.build_index().unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput(path) if path == config.reference_fasta));
    }

    #[test]
    fn test_existing_reads_are_not_refetched() {
        let dir = TempDir::new().unwrap();
        let (mut config, _) = started(&dir);
        // Would fail if invoked
        config.tools.prefetch = "reseq-definitely-not-installed".to_string();
        let pipeline = Pipeline::start(&config).unwrap();

        let fastq = config.fastq_path(&config.assembly_reads);
        fs::write(&fastq, "@r1\nACGT\n+\nIIII\n").unwrap();

        assert_eq!(pipeline.retrieve_reads(&config.assembly_reads).unwrap(), fastq);
    }

    #[test]
    fn test_missing_tool_is_fatal_and_logged() {
        let dir = TempDir::new().unwrap();
        let (mut config, _) = started(&dir);
        config.tools.spades = "reseq-definitely-not-installed".to_string();
        let pipeline = Pipeline::start(&config).unwrap();

        let reads = config.fastq_path(&config.assembly_reads);
        fs::write(&reads, "@r1\nACGT\n+\nIIII\n").unwrap();

        let err = pipeline.assemble(&reads).unwrap_err();
        assert!(matches!(err, PipelineError::Tool(ToolError::NotFound { .. })));

        // The command line is logged before the tool runs
        let log = fs::read_to_string(pipeline.log().path()).unwrap();
        assert!(log.contains("reseq-definitely-not-installed -k 55,77,99,127 -t 3 -s"));
    }

    #[test]
    fn test_reshape_expression() {
        let dir = TempDir::new().unwrap();
        let (config, _) = started(&dir);
        let pipeline = Pipeline::start(&config).unwrap();

        let tracking = dir.path().join("genes.fpkm_tracking");
        fs::write(&tracking, "tracking_id\tlocus\tFPKM\ngeneA\tchr1:100-200\t5.2\n").unwrap();

        assert_eq!(pipeline.reshape_expression(&tracking).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(config.expression_table_path()).unwrap(),
            "seqname,start,end,FPKM\ngeneA,100,200,5.2\n"
        );
    }
}
