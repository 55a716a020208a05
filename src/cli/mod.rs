//! Command-line interface for reseq-pipeline.
//!
//! The pipeline takes a single option, the thread count forwarded to every
//! external tool. Everything else is fixed by [`PipelineConfig`] and can be
//! adjusted only through environment variables:
//!
//! - `RESEQ_<TOOL>_BIN`: executable for a tool (see [`crate::tools`])
//! - `RESEQ_TOOL_TIMEOUT_SECS`: kill any tool running longer than this
//! - `RUST_LOG`: diagnostic log filter
//!
//! ## Usage
//!
//! ```text
//! # Run with half the available CPUs
//! reseq-pipeline
//!
//! # Run with 8 threads
//! reseq-pipeline -t 8
//! ```

use clap::Parser;

use crate::pipeline::{self, PipelineConfig, RunSummary};
use crate::utils::validation::{default_thread_count, validate_thread_count};

#[derive(Parser, Debug)]
#[command(name = "reseq-pipeline")]
#[command(about = "Assemble, annotate and quantify an E. coli K-12 resequencing run")]
#[command(
    long_about = "reseq-pipeline drives SPAdes, Prokka, TopHat and Cufflinks over the K-12 resequencing and BW38028 RNA-seq reads.\n\nAll inputs and outputs live in ./results; a human-readable record of the run is kept in results/pipeline.log.\nKeeps contigs longer than 1000 bp, compares annotated CDS/tRNA counts with RefSeq NC_000913 and writes transcriptome_data.fpkm."
)]
pub struct Cli {
    /// Number of CPUs to use in computation. Defaults to half the number of available CPUs
    #[arg(short, long, default_value_t = default_thread_count(), value_parser = parse_threads, value_name = "N")]
    pub threads: usize,
}

fn parse_threads(value: &str) -> Result<usize, String> {
    let threads: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    validate_thread_count(threads).map_err(|e| e.to_string())
}

/// Run the whole pipeline in `./results` and print a short report.
///
/// # Errors
///
/// Returns the first configuration or stage error.
pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::from_env(cli.threads)?;
    let summary = pipeline::run(&config)?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Pipeline Results");
    println!("{}", "─".repeat(60));
    println!(
        "  Contigs > {} bp: {}",
        summary.min_contig_length, summary.contigs
    );
    println!("  Assembly length: {} bp", summary.assembly_length);
    println!("  {}", summary.annotation);
    println!("  Expression records: {}", summary.expression_records);
    println!(
        "  Expression table: {}",
        summary.artifacts.expression_table.display()
    );
    println!("  Run log: {}", summary.artifacts.run_log.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_threads_flag() {
        assert_eq!(Cli::parse_from(["reseq-pipeline", "-t", "6"]).threads, 6);
        assert_eq!(Cli::parse_from(["reseq-pipeline", "--threads", "1"]).threads, 1);
    }

    #[test]
    fn test_default_threads() {
        let cli = Cli::parse_from(["reseq-pipeline"]);
        assert_eq!(cli.threads, default_thread_count());
    }

    #[test]
    fn test_rejects_bad_threads() {
        assert!(Cli::try_parse_from(["reseq-pipeline", "-t", "0"]).is_err());
        assert!(Cli::try_parse_from(["reseq-pipeline", "-t", "two"]).is_err());
        assert!(Cli::try_parse_from(["reseq-pipeline", "-t", "-2"]).is_err());
    }

    #[test]
    fn test_rejects_other_options() {
        assert!(Cli::try_parse_from(["reseq-pipeline", "--verbose"]).is_err());
        assert!(Cli::try_parse_from(["reseq-pipeline", "extra"]).is_err());
        assert!(Cli::try_parse_from(["reseq-pipeline", "--version"]).is_err());
        assert!(Cli::try_parse_from(["reseq-pipeline", "-V"]).is_err());
    }
}
