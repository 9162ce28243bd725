//! The normalized article record
//!
//! One `ArticleRecord` is produced per successfully fetched article. It is
//! rendered to the text artifact and serialized as one line of the record log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag of the extraction logic, stamped on every record
pub const FORMAT_VERSION: &str = "0.2.5";

/// Structured result of extracting one article page
///
/// Scalar fields that could not be resolved are empty strings, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(rename = "pmcid")]
    pub id: String,

    pub title: String,
    pub journal: String,
    pub date: String,
    pub doi: String,
    pub authors: Vec<String>,

    /// The exact URL that was fetched
    #[serde(rename = "url")]
    pub source_url: String,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    pub body_text: String,

    /// Whitespace-separated token count of `body_text`
    #[serde(rename = "word_count_body")]
    pub body_word_count: usize,

    #[serde(rename = "fetched_at_utc")]
    pub fetched_at: DateTime<Utc>,

    #[serde(rename = "parser_version")]
    pub format_version: String,
}

/// Counts whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
