//! Plain-text rendition of an article record
//!
//! The labels written here are also what the indexer and the re-wrapper look
//! for, so they are shared constants.

use crate::record::ArticleRecord;

pub const TITLE_LABEL: &str = "TITLE";
pub const JOURNAL_LABEL: &str = "JOURNAL";
pub const DATE_LABEL: &str = "DATE";
pub const DOI_LABEL: &str = "DOI";
pub const AUTHORS_LABEL: &str = "AUTHORS";
pub const URL_LABEL: &str = "URL";
pub const ABSTRACT_LABEL: &str = "ABSTRACT";
pub const BODY_LABEL: &str = "BODY";

/// Renders a record as the human-readable text artifact
///
/// The abstract and body are reflowed to `width` columns; nothing is
/// truncated. Lines are separated by `\n` with no trailing newline.
///
/// # Example
///
/// ```
/// # use pmc_harvest::output::format_record;
/// # fn demo(record: &pmc_harvest::ArticleRecord) {
/// let text = format_record(record, 120);
/// assert!(text.starts_with("TITLE: "));
/// # }
/// ```
pub fn format_record(record: &ArticleRecord, width: usize) -> String {
    let lines = [
        format!("{}: {}", TITLE_LABEL, record.title),
        format!("{}: {}", JOURNAL_LABEL, record.journal),
        format!("{}: {}", DATE_LABEL, record.date),
        format!("{}: {}", DOI_LABEL, record.doi),
        format!("{}: {}", AUTHORS_LABEL, record.authors.join(", ")),
        format!("{}: {}", URL_LABEL, record.source_url),
        String::new(),
        format!("{}:", ABSTRACT_LABEL),
        wrap_text(&record.abstract_text, width),
        String::new(),
        format!("{}:", BODY_LABEL),
        wrap_text(&record.body_text, width),
    ];

    lines.join("\n")
}

/// Greedy word wrap
///
/// Words are packed onto a line while the line stays within `width`
/// characters. A word is never split; one longer than `width` gets a line of
/// its own. Empty or whitespace-only input yields an empty string.
pub fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines.join("\n")
}
