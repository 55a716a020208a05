//! In-process transforms applied to the outputs of external tools.
//!
//! - [`length_filter`]: Keep contigs strictly longer than a threshold and sum their lengths
//! - [`reconcile`]: Compare annotated CDS/tRNA counts against the reference annotation
//! - [`reshape`]: Split expression loci and write the `seqname,start,end,FPKM` table
//!
//! Every transform is all-or-nothing: on error no output artifact is written.

pub mod length_filter;
pub mod reconcile;
pub mod reshape;
