//! # reseq-pipeline
//!
//! A library and command-line pipeline for a bacterial resequencing run: the
//! heavy lifting (assembly, annotation, read mapping, quantification) is done
//! by external tools, and this crate sequences them and post-processes their
//! outputs.
//!
//! ## Features
//!
//! - **Length filtering**: Keep assembled contigs strictly longer than 1000 bp
//!   and total their length
//! - **Annotation reconciliation**: Compare annotated CDS and tRNA counts with
//!   the RefSeq annotation of NC_000913
//! - **Expression reshaping**: Turn a `genes.fpkm_tracking` table into a
//!   `seqname,start,end,FPKM` CSV
//! - **Tool orchestration**: Argument-list invocations (no shell), checked
//!   outputs, optional timeouts, and an append-only run log
//!
//! ## Example
//!
//! ```rust,no_run
//! use reseq_pipeline::parsing::annotation_report::parse_report_text;
//! use reseq_pipeline::stages::reconcile::{reconcile, ReferenceCounts};
//!
//! let summary = parse_report_text("CDS: 4000\ntRNA: 90\n").unwrap();
//! let discrepancy = reconcile(&summary, &ReferenceCounts::default()).unwrap();
//!
//! // Prokka found 140 less CDS and 1 more tRNA than the RefSeq.
//! println!("{discrepancy}");
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Sequence, annotation and expression data types
//! - [`parsing`]: FASTA, annotation report and tracking table parsers
//! - [`stages`]: The in-process transforms
//! - [`tools`]: External tool invocations and their runner
//! - [`pipeline`]: Configuration, run log and stage sequencing
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod stages;
pub mod tools;
pub mod utils;

// Re-export commonly used types for convenience
pub use core::annotation::AnnotationSummary;
pub use core::expression::{ExpressionRecord, Locus};
pub use core::sequence::SequenceRecord;
pub use parsing::ParseError;
pub use pipeline::{PipelineConfig, PipelineError, RunSummary};
pub use stages::length_filter::{FilterOutcome, LengthFilter};
pub use stages::reconcile::{AnnotationDiscrepancy, ReferenceCounts};
pub use tools::runner::{ToolError, ToolRunner};
