//! pmc-harvest: article page harvester
//!
//! This crate fetches article pages by identifier, extracts bibliographic
//! metadata and text, and persists each article as raw markup, a wrapped
//! plain-text rendition and one line of an append-only JSON record log.
//! A separate indexer summarizes the text artifacts into a CSV table.

pub mod config;
pub mod harvest;
pub mod ident;
pub mod output;
pub mod record;

use thiserror::Error;

/// Main error type for pmc-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("{0}")]
    Fetch(#[from] harvest::FetchError),

    #[error("{0}")]
    Extraction(#[from] harvest::ExtractError),

    #[error("{0}")]
    Persistence(#[from] output::PersistError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),
}

/// Identifier-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("empty identifier")]
    Empty,

    #[error("'{id}' does not start with '{prefix}'")]
    MissingPrefix { id: String, prefix: String },

    #[error("'{0}' contains characters outside [A-Z0-9]")]
    Malformed(String),
}

/// Result type alias for pmc-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvest::{run_batch, RetryPolicy, RunSummary, Runner};
pub use ident::{article_url, normalize_identifier};
pub use record::{ArticleRecord, FORMAT_VERSION};
