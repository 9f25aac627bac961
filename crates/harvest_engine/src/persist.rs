use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::filename::artifact_filename;
use crate::WriteError;

/// Ensure output directory exists; create it (and parents) if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), WriteError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| WriteError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(WriteError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| WriteError::OutputDir(e.to_string()))
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, WriteError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Rename replaces an existing artifact for the same day.
        tmp.persist(&target).map_err(|e| WriteError::Io(e.error))?;
        Ok(target)
    }
}

/// Local persistence of artifacts under `{output_dir}/{stem}_{YYYY-MM-DD}.txt`.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    files: AtomicFileWriter,
    output_dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            files: AtomicFileWriter::new(output_dir.clone()),
            output_dir,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path an artifact for `logical_name` on `date` is (or would be) written to.
    pub fn path_for(&self, logical_name: &str, date: NaiveDate) -> PathBuf {
        self.output_dir.join(artifact_filename(logical_name, date))
    }

    pub fn write(
        &self,
        logical_name: &str,
        date: NaiveDate,
        content: &str,
    ) -> Result<PathBuf, WriteError> {
        self.files
            .write(&artifact_filename(logical_name, date), content)
    }
}
