use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The append-only, human-readable record of a run.
///
/// Every write opens, appends and closes the file, so after a failure the
/// last line shows how far the run got.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Start a fresh log at `path` (truncating any previous run) with `first_line`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>, first_line: &str) -> io::Result<Self> {
        let path = path.into();
        let mut file = File::create(&path)?;
        writeln!(file, "{first_line}")?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single line
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened or written.
    pub fn append_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.open()?;
        writeln!(file, "{line}")
    }

    /// Append a block of text verbatim, terminated by a newline
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be opened or written.
    pub fn append_text(&self, text: &str) -> io::Result<()> {
        let mut file = self.open()?;
        file.write_all(text.as_bytes())?;
        if !text.is_empty() && !text.ends_with('\n') {
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().append(true).open(&self.path)
    }
}
