//! Snapshot persistence for year-over-year comparisons.
//!
//! The history file is a JSON array of `{date, fields}` records sorted by
//! date, one per recorded edition.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use h41_core::HistoricalSnapshot;

use crate::error::CliError;

#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recorded snapshots; a missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoricalSnapshot>, CliError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|error| CliError::History {
            path: self.path.display().to_string(),
            message: error.to_string(),
        })
    }

    /// Adds `snapshot`, replacing any record with the same date, and returns
    /// the number of records now stored.
    pub fn record(&self, snapshot: HistoricalSnapshot) -> Result<usize, CliError> {
        let mut snapshots = self.load()?;
        snapshots.retain(|existing| existing.date != snapshot.date);
        snapshots.push(snapshot);
        snapshots.sort_by_key(|existing| existing.date);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&snapshots)?)?;
        Ok(snapshots.len())
    }
}
