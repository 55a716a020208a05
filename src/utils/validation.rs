//! Centralized validation and helper functions.

/// Maximum length accepted for an archive accession
pub const MAX_ACCESSION_LENGTH: usize = 32;

/// Validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty accession provided")]
    EmptyAccession,
    #[error("Accession too long: exceeds {MAX_ACCESSION_LENGTH} characters")]
    AccessionTooLong,
    #[error("Invalid accession '{0}': expected three uppercase letters followed by digits")]
    InvalidAccession(String),
    #[error("Thread count must be at least 1")]
    ZeroThreads,
}

/// Validate a sequence archive accession such as `SRR8185310` or `SRX5005282`.
///
/// Accessions end up as process arguments and path components, so only the
/// archive's own shape is accepted: three uppercase ASCII letters then digits.
///
/// # Examples
///
/// ```
/// use reseq_pipeline::utils::validation::validate_accession;
///
/// assert!(validate_accession("SRR8185310").is_ok());
/// assert!(validate_accession("../etc").is_err());
/// assert!(validate_accession("SRR").is_err());
/// ```
///
/// # Errors
///
/// Returns `ValidationError::EmptyAccession`, `ValidationError::AccessionTooLong`
/// or `ValidationError::InvalidAccession` describing the first problem found.
pub fn validate_accession(accession: &str) -> Result<(), ValidationError> {
    if accession.is_empty() {
        return Err(ValidationError::EmptyAccession);
    }

    if accession.len() > MAX_ACCESSION_LENGTH {
        return Err(ValidationError::AccessionTooLong);
    }

    // split_at below needs byte offsets on char boundaries
    if !accession.is_ascii() {
        return Err(ValidationError::InvalidAccession(accession.to_string()));
    }

    let (prefix, digits) = accession.split_at(accession.len().min(3));
    let valid = prefix.len() == 3
        && prefix.chars().all(|c| c.is_ascii_uppercase())
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidAccession(accession.to_string()))
    }
}

/// Default thread count: half the logical CPUs, never below one.
#[must_use]
pub fn default_thread_count() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// Check a thread count before it is forwarded to external tools.
///
/// # Errors
///
/// Returns `ValidationError::ZeroThreads` for a count of zero.
pub fn validate_thread_count(threads: usize) -> Result<usize, ValidationError> {
    if threads == 0 {
        Err(ValidationError::ZeroThreads)
    } else {
        Ok(threads)
    }
}
