use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use csv::Writer;
use log::{debug, warn};
use tempfile::{Builder, NamedTempFile, TempPath};

use crate::{error::WriteError, extension::EXTENSION_ID, models::ProjectedTable};

/// A materialized CSV file.
///
/// The file is removed when this value is dropped unless [`OutputFile::keep`]
/// is called, which gives the host sole responsibility for it.
#[derive(Debug)]
pub struct OutputFile {
    path: TempPath,
}

impl OutputFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disowns the cleanup registration and returns the file's path.
    pub fn keep(self) -> Result<PathBuf, WriteError> {
        self.path.keep().map_err(|e| WriteError::Io(e.error))
    }
}

/// Writes `table` as CSV to a new file in `destination_dir`.
///
/// The header row comes first, then one record per row. Fields are quoted only
/// when they contain a delimiter, a quote or a line break.
pub fn write(table: &ProjectedTable, destination_dir: &Path) -> Result<OutputFile, WriteError> {
    let file: NamedTempFile = Builder::new()
        .prefix(EXTENSION_ID)
        .suffix(".csv")
        .tempfile_in(destination_dir)?;

    let mut writer = Writer::from_writer(file);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    let file: NamedTempFile = writer
        .into_inner()
        .map_err(|e| WriteError::Io(e.into_error()))?;
    file.as_file().sync_all()?;

    // Closes the handle; only the path is kept.
    let path: TempPath = file.into_temp_path();
    debug!("Wrote {} rows to {}", table.len(), path.display());

    Ok(OutputFile { path })
}

/// Output files handed out by this process, removed when the registry is purged
/// or dropped.
///
/// Entries are only released by `purge`, so the registry holds one entry per
/// successful data request over the life of the process.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    files: Mutex<Vec<OutputFile>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `file` for removal and returns its path.
    pub fn register(&self, file: OutputFile) -> PathBuf {
        let path = file.path().to_path_buf();
        match self.files.lock() {
            Ok(mut files) => files.push(file),
            Err(_) => {
                warn!("Output registry poisoned, keeping {} without cleanup", path.display());
                if let Err(err) = file.keep() {
                    warn!("Could not keep {}: {}", path.display(), err);
                }
            }
        }
        path
    }

    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every registered file that still exists.
    pub fn purge(&self) {
        if let Ok(mut files) = self.files.lock() {
            let count = files.len();
            files.clear();
            debug!("Purged {} output files", count);
        }
    }
}
