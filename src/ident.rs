//! Article identifier handling
//!
//! Identifiers arrive from the command line or an id file in whatever case
//! and padding the operator typed. They are normalized once, checked against
//! the configured prefix, and only then turned into a fetch URL and file names.

use crate::config::SourceConfig;
use crate::IdentifierError;
use std::fs;
use std::io;
use std::path::Path;

/// Normalizes a raw identifier and checks it against the recognized prefix
///
/// Surrounding whitespace is trimmed and the result is uppercased. The
/// normalized id must start with `prefix` and consist of ASCII letters and
/// digits only, since it becomes part of artifact file names.
///
/// # Examples
///
/// ```
/// use pmc_harvest::normalize_identifier;
///
/// assert_eq!(normalize_identifier("  pmc12345 ", "PMC").unwrap(), "PMC12345");
/// assert!(normalize_identifier("12345", "PMC").is_err());
/// ```
pub fn normalize_identifier(raw: &str, prefix: &str) -> Result<String, IdentifierError> {
    let id = raw.trim().to_uppercase();

    if id.is_empty() {
        return Err(IdentifierError::Empty);
    }

    if !id.starts_with(prefix) {
        return Err(IdentifierError::MissingPrefix {
            id,
            prefix: prefix.to_string(),
        });
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(IdentifierError::Malformed(id));
    }

    Ok(id)
}

/// Builds the article URL for a normalized identifier
pub fn article_url(source: &SourceConfig, id: &str) -> String {
    source.url_template.replace("{id}", id)
}

/// Splits the contents of an id file into identifiers, ignoring blank lines
pub fn parse_id_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolves `pull` arguments into the identifiers to harvest
///
/// A single argument naming an existing file is read as an id list (lossily
/// decoded, blank lines ignored). Any other arguments are the identifiers
/// themselves. Returns `None` when no arguments were given at all.
pub fn collect_ids(args: Vec<String>) -> io::Result<Option<Vec<String>>> {
    if args.is_empty() {
        return Ok(None);
    }

    if let [single] = args.as_slice() {
        let path = Path::new(single);
        if path.is_file() {
            let bytes = fs::read(path)?;
            return Ok(Some(parse_id_list(&String::from_utf8_lossy(&bytes))));
        }
    }

    Ok(Some(args))
}
