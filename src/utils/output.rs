//! Output helpers for derived artifacts.

#[cfg(unix)]
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Permission bits for finished artifacts (temporary files start as 0600)
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// Write a file so that it only appears at `path` once completely written.
///
/// Content goes to a temporary file in the destination directory which is
/// renamed over `path` after `write` succeeds. On unix the file is made
/// world-readable (0644) before the rename. If `write` fails the temporary
/// file is removed and `path` is left untouched.
///
/// # Errors
///
/// Returns the error from `write`, or an IO error (converted into `E`) if the
/// temporary file cannot be created, flushed or persisted.
pub fn write_atomically<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<std::io::Error>,
    F: FnOnce(&mut dyn Write) -> Result<(), E>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp.as_file()
            .set_permissions(fs::Permissions::from_mode(ARTIFACT_MODE))?;
    }
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
