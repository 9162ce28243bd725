//! Harvest module for article fetching and processing
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with bounded, jittered retry
//! - HTML parsing and ordered-fallback field extraction
//! - The sequential batch runner

mod extractor;
mod fetcher;
mod runner;

pub use extractor::{
    clean_text, extract_record, first_container_text, first_match, ExtractError, FieldSource,
    ABSTRACT_CONTAINERS, BODY_CONTAINERS, DATE_SOURCES, DOI_SOURCES, JOURNAL_SOURCES,
    TITLE_SOURCES,
};
pub use fetcher::{
    build_http_client, fetch_page, AttemptFailure, FetchError, FetchedPage, RetryPolicy,
};
pub use runner::{run_batch, RunSummary, Runner};
