//! CSV summary of the text artifacts
//!
//! The index is rebuilt from the `parsed/` directory alone. Fields are read
//! back from their labeled lines; a label that is missing or spelled
//! differently yields an empty cell rather than an error.

use crate::output::text::{DATE_LABEL, DOI_LABEL, JOURNAL_LABEL, TITLE_LABEL, URL_LABEL};
use crate::HarvestError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const INDEX_HEADER: [&str; 6] = ["ID", "TITLE", "JOURNAL", "DATE", "DOI", "URL"];

/// One row of the index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRow {
    pub id: String,
    pub title: String,
    pub journal: String,
    pub date: String,
    pub doi: String,
    pub url: String,
}

impl IndexRow {
    /// Reads the labeled fields out of a text artifact
    pub fn from_text(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            title: labeled_value(text, TITLE_LABEL),
            journal: labeled_value(text, JOURNAL_LABEL),
            date: labeled_value(text, DATE_LABEL),
            doi: labeled_value(text, DOI_LABEL),
            url: labeled_value(text, URL_LABEL),
        }
    }

    fn as_record(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.title.as_str(),
            self.journal.as_str(),
            self.date.as_str(),
            self.doi.as_str(),
            self.url.as_str(),
        ]
    }
}

/// Rest of the first line reading `<label>: ...`, or an empty string
pub fn labeled_value(text: &str, label: &str) -> String {
    let pattern = match label {
        TITLE_LABEL => title_re(),
        JOURNAL_LABEL => journal_re(),
        DATE_LABEL => date_re(),
        DOI_LABEL => doi_re(),
        URL_LABEL => url_re(),
        _ => return String::new(),
    };

    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string())
        .unwrap_or_default()
}

fn label_re(cell: &'static OnceLock<Regex>, label: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(&format!(r"(?m)^{}: (.*)$", regex::escape(label)))
            .expect("label pattern is a valid regex")
    })
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, TITLE_LABEL)
}

fn journal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, JOURNAL_LABEL)
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, DATE_LABEL)
}

fn doi_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, DOI_LABEL)
}

fn url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    label_re(&RE, URL_LABEL)
}

/// Text artifacts in `dir` whose name is `<prefix>...<.txt>`, sorted by name
///
/// Derived files such as `PMC1.wrapped.txt` are left out.
pub fn text_artifacts(dir: &Path, prefix: &str) -> Result<Vec<(String, PathBuf)>, HarvestError> {
    let mut found = Vec::new();
    if !dir.is_dir() {
        return Ok(found);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.starts_with(prefix) && !stem.contains('.') {
            found.push((stem.to_string(), path.clone()));
        }
    }

    found.sort();
    Ok(found)
}

/// Builds one index row per text artifact in `parsed_dir`
pub fn build_index(parsed_dir: &Path, prefix: &str) -> Result<Vec<IndexRow>, HarvestError> {
    let mut rows = Vec::new();

    for (id, path) in text_artifacts(parsed_dir, prefix)? {
        let bytes = fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes);
        rows.push(IndexRow::from_text(&id, &text));
    }

    tracing::debug!("Indexed {} text artifacts from {}", rows.len(), parsed_dir.display());
    Ok(rows)
}

/// Writes the header and rows to `dest`, replacing any previous index
pub fn write_index(rows: &[IndexRow], dest: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(dest)?;
    writer.write_record(INDEX_HEADER)?;
    for row in rows {
        writer.write_record(row.as_record())?;
    }
    writer.flush()?;

    Ok(())
}
