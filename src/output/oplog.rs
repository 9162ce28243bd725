//! Operational log
//!
//! A plain append-only text file with one timestamped line per event, kept
//! next to the artifacts so a batch can be audited after the fact. This is
//! separate from `tracing` output, which goes to the terminal.

use chrono::{SecondsFormat, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Append-only writer for `<timestamp> <message>` lines
#[derive(Debug)]
pub struct OperationLog {
    file: File,
}

impl OperationLog {
    /// Opens (creating if needed) the log for appending
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Appends one line stamped with the current UTC time
    ///
    /// A failed write is reported through `tracing` only; losing an audit
    /// line never fails the article it describes.
    pub fn line(&mut self, message: &str) {
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        if let Err(e) = writeln!(self.file, "{} {}", stamp, message) {
            tracing::error!("Failed to write operation log: {}", e);
        }
    }

    /// `OK <id> ms=<elapsed> words=<count>`
    pub fn success(&mut self, id: &str, elapsed_ms: u128, words: usize) {
        self.line(&format!("OK {} ms={} words={}", id, elapsed_ms, words));
    }

    /// `FAIL <id> ms=<elapsed> exc=<detail>`
    pub fn failure(&mut self, id: &str, elapsed_ms: u128, detail: &str) {
        self.line(&format!("FAIL {} ms={} exc={}", id, elapsed_ms, detail));
    }

    /// `WARN <detail> url=<url>` for an attempt that will be retried or reported
    pub fn warn(&mut self, url: &str, detail: &str) {
        self.line(&format!("WARN {} url={}", detail, url));
    }

    /// `SKIP <id> reason=<reason>`
    pub fn skip(&mut self, id: &str, reason: &str) {
        self.line(&format!("SKIP {} reason={}", id, reason));
    }
}
