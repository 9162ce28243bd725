//! Artifact persistence
//!
//! Each harvested article is written three ways: the raw markup and the text
//! rendition go to per-article files that a later run overwrites, and the
//! record is appended as one JSON line to the shared record log.

use crate::config::OutputConfig;
use crate::record::ArticleRecord;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The three artifacts written per article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    Raw,
    Text,
    RecordLog,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Artifact::Raw => "raw markup",
            Artifact::Text => "text artifact",
            Artifact::RecordLog => "record log",
        };
        f.write_str(name)
    }
}

/// One or more artifact writes failed
#[derive(Debug, Error)]
#[error("failed to persist {}: {}", .id, describe(.failures))]
pub struct PersistError {
    pub id: String,
    pub failures: Vec<(Artifact, io::Error)>,
}

impl PersistError {
    /// Returns true if writing `artifact` failed
    pub fn failed(&self, artifact: Artifact) -> bool {
        self.failures.iter().any(|(a, _)| *a == artifact)
    }
}

fn describe(failures: &[(Artifact, io::Error)]) -> String {
    failures
        .iter()
        .map(|(artifact, error)| format!("{} ({})", artifact, error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Append-only handle on the JSON record log
///
/// Exactly one handle should be open on a log at a time; appends from
/// separate processes are not coordinated.
#[derive(Debug)]
pub struct RecordLog {
    file: File,
}

impl RecordLog {
    /// Opens (creating if needed) the log for appending
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Appends one record as a single JSON line
    pub fn append(&mut self, record: &ArticleRecord) -> io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }
}

/// Writes the per-article artifacts and owns the record log
#[derive(Debug)]
pub struct ArtifactWriter {
    raw_dir: PathBuf,
    parsed_dir: PathBuf,
    records: RecordLog,
}

impl ArtifactWriter {
    /// Creates the output directories and opens the record log
    pub fn open(config: &OutputConfig) -> io::Result<Self> {
        let raw_dir = config.raw_dir();
        let parsed_dir = config.parsed_dir();
        fs::create_dir_all(&raw_dir)?;
        fs::create_dir_all(&parsed_dir)?;
        let records = RecordLog::open(&config.record_log_path())?;

        Ok(Self {
            raw_dir,
            parsed_dir,
            records,
        })
    }

    /// Path of the raw markup artifact for `id`
    pub fn raw_path(&self, id: &str) -> PathBuf {
        self.raw_dir.join(format!("{}.html", id))
    }

    /// Path of the text artifact for `id`
    pub fn text_path(&self, id: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.txt", id))
    }

    /// Writes all three artifacts for one article
    ///
    /// Every write is attempted even when an earlier one fails; all
    /// failures are reported together.
    pub fn persist(
        &mut self,
        id: &str,
        raw: &[u8],
        text: &str,
        record: &ArticleRecord,
    ) -> Result<(), PersistError> {
        let mut failures = Vec::new();

        if let Err(e) = fs::write(self.raw_path(id), raw) {
            failures.push((Artifact::Raw, e));
        }

        if let Err(e) = fs::write(self.text_path(id), text) {
            failures.push((Artifact::Text, e));
        }

        if let Err(e) = self.records.append(record) {
            failures.push((Artifact::RecordLog, e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PersistError {
                id: id.to_string(),
                failures,
            })
        }
    }
}
