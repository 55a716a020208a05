//! Shared helpers: input validation and atomic artifact output.

pub mod output;
pub mod validation;
