//! Configuration module for pmc-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; an absent file yields the built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use pmc_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Fetching from: {}", config.source.url_template);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, OutputConfig, SourceConfig};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
