//! Article metadata and text extraction
//!
//! Article pages come from different generations of publisher templates, so
//! every field is resolved from an ordered list of sources. Sources are tried
//! left to right and the first one yielding non-empty text wins. The order in
//! each list is the precedence between competing markup conventions.

use crate::record::{word_count, ArticleRecord, FORMAT_VERSION};
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Markup that could not be turned into a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// One place a scalar field may be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// `<meta name=".." content="..">` or `<meta property=".." content="..">`
    Meta(&'static str),

    /// Cleaned text of the first element matching a CSS selector
    FirstText(&'static str),
}

pub const TITLE_SOURCES: &[FieldSource] = &[
    FieldSource::Meta("citation_title"),
    FieldSource::Meta("dc.title"),
    FieldSource::FirstText("h1"),
    FieldSource::FirstText("title"),
];

pub const JOURNAL_SOURCES: &[FieldSource] = &[
    FieldSource::Meta("citation_journal_title"),
    FieldSource::Meta("prism.publicationName"),
];

pub const DATE_SOURCES: &[FieldSource] = &[
    FieldSource::Meta("citation_publication_date"),
    FieldSource::Meta("dc.date"),
    FieldSource::Meta("prism.publicationDate"),
];

pub const DOI_SOURCES: &[FieldSource] = &[
    FieldSource::Meta("citation_doi"),
    FieldSource::Meta("dc.identifier"),
    FieldSource::Meta("prism.doi"),
];

pub const ABSTRACT_CONTAINERS: &[&str] = &["#abstract", "section.abstract", "div.abstract"];

pub const BODY_CONTAINERS: &[&str] = &[
    "article",
    "#maincontent",
    "#body",
    "div#article-content",
    "div[itemprop=articleBody]",
];

const AUTHOR_META: &str = "citation_author";
const AUTHOR_NAMES: &str = ".contrib-group .contrib .name";

impl FieldSource {
    /// Evaluates this source against a parsed document
    pub fn resolve(&self, document: &Html) -> Result<Option<String>, ExtractError> {
        let value = match self {
            FieldSource::Meta(name) => meta_content(document, name)?,
            FieldSource::FirstText(selector) => document
                .select(&selector_for(selector)?)
                .next()
                .map(clean_text),
        };

        Ok(value.filter(|text| !text.is_empty()))
    }
}

/// Returns the first non-empty value among `sources`, or an empty string
pub fn first_match(document: &Html, sources: &[FieldSource]) -> Result<String, ExtractError> {
    for source in sources {
        if let Some(value) = source.resolve(document)? {
            return Ok(value);
        }
    }
    Ok(String::new())
}

/// Returns the cleaned text of the first container with non-empty text
pub fn first_container_text(document: &Html, selectors: &[&str]) -> Result<String, ExtractError> {
    for selector in selectors {
        let text = document
            .select(&selector_for(selector)?)
            .next()
            .map(clean_text)
            .unwrap_or_default();
        if !text.is_empty() {
            return Ok(text);
        }
    }
    Ok(String::new())
}

/// Builds an `ArticleRecord` from fetched markup
///
/// # Arguments
///
/// * `markup` - Decoded response body
/// * `source_url` - The URL the markup was fetched from
/// * `id` - The normalized article identifier
///
/// # Returns
///
/// * `Ok(ArticleRecord)` - Every field resolved, missing ones as empty strings
/// * `Err(ExtractError)` - A built-in selector failed to compile
///
/// # Example
///
/// ```
/// use pmc_harvest::harvest::extract_record;
///
/// let html = r#"<html><head><meta name="citation_title" content="On Things"></head></html>"#;
/// let record = extract_record(html, "https://example.org/PMC1/", "PMC1").unwrap();
/// assert_eq!(record.title, "On Things");
/// assert_eq!(record.journal, "");
/// ```
pub fn extract_record(
    markup: &str,
    source_url: &str,
    id: &str,
) -> Result<ArticleRecord, ExtractError> {
    let document = Html::parse_document(markup);

    let body_text = first_container_text(&document, BODY_CONTAINERS)?;

    Ok(ArticleRecord {
        id: id.to_string(),
        title: first_match(&document, TITLE_SOURCES)?,
        journal: first_match(&document, JOURNAL_SOURCES)?,
        date: first_match(&document, DATE_SOURCES)?,
        doi: first_match(&document, DOI_SOURCES)?,
        authors: extract_authors(&document)?,
        source_url: source_url.to_string(),
        abstract_text: first_container_text(&document, ABSTRACT_CONTAINERS)?,
        body_word_count: word_count(&body_text),
        body_text,
        fetched_at: Utc::now(),
        format_version: FORMAT_VERSION.to_string(),
    })
}

/// Author names from repeated `citation_author` tags, else from the contributor list
fn extract_authors(document: &Html) -> Result<Vec<String>, ExtractError> {
    let from_meta: Vec<String> = document
        .select(&selector_for("meta[name]")?)
        .filter(|meta| meta.value().attr("name") == Some(AUTHOR_META))
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .collect();

    if !from_meta.is_empty() {
        return Ok(from_meta);
    }

    Ok(document
        .select(&selector_for(AUTHOR_NAMES)?)
        .map(clean_text)
        .filter(|name| !name.is_empty())
        .collect())
}

/// Content of the first `meta` tag named `name` with non-empty content
fn meta_content(document: &Html, name: &str) -> Result<Option<String>, ExtractError> {
    // Attribute values are compared directly so names with dots need no escaping.
    let value = document
        .select(&selector_for("meta")?)
        .filter(|meta| {
            let element = meta.value();
            element.attr("name") == Some(name) || element.attr("property") == Some(name)
        })
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string);

    Ok(value)
}

/// Joins all descendant text nodes with single spaces, collapsing whitespace
pub fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector_for(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}
