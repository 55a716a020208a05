//! Core data types shared by the parsers and the pipeline stages.
//!
//! - [`SequenceRecord`]: A FASTA entry (identifier, description, residues)
//! - [`AnnotationSummary`]: Key/value metrics from the annotator's summary report
//! - [`Locus`], [`ExpressionRecord`]: Coordinates and rows of the expression table
//!
//! [`SequenceRecord`]: sequence::SequenceRecord
//! [`AnnotationSummary`]: annotation::AnnotationSummary
//! [`Locus`]: expression::Locus
//! [`ExpressionRecord`]: expression::ExpressionRecord

pub mod annotation;
pub mod expression;
pub mod sequence;
