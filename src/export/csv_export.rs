//! Tab-separated observation files.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Writer for one observation file.
///
/// The header row is written only when the file is created (or truncated);
/// appending to an existing file adds data rows only.
pub struct ObservationWriter {
    writer: csv::Writer<File>,
    /// Path to output file
    path: PathBuf,
    rows: usize,
}

impl ObservationWriter {
    pub fn open<P: AsRef<Path>>(path: P, header: &[String], append: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let existed = path.exists();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)
            .with_context(|| format!("cannot open observation file {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(file);
        if !(append && existed) {
            writer.write_record(header)?;
        }

        Ok(Self {
            writer,
            path,
            rows: 0,
        })
    }

    pub fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer
            .write_record(row)
            .with_context(|| format!("cannot write to {}", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("Observations written: {} ({} rows)", self.path.display(), self.rows);
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
