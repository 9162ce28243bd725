//! Output module for harvested articles
//!
//! This module handles:
//! - Rendering records as wrapped plain text
//! - Persisting raw markup, text artifacts and the JSON record log
//! - The operational log of attempts and outcomes
//! - Rebuilding the CSV index and re-wrapping text artifacts

pub mod index;
mod oplog;
mod rewrap;
mod text;
mod writer;

pub use index::{build_index, write_index, IndexRow, INDEX_HEADER};
pub use oplog::OperationLog;
pub use rewrap::{rewrap_directory, rewrap_document, RewrapSummary};
pub use text::{format_record, wrap_text};
pub use writer::{Artifact, ArtifactWriter, PersistError, RecordLog};

use crate::config::Config;
use crate::HarvestError;

/// Rebuilds the CSV index from the text artifacts
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written, not counting the header
/// * `Err(HarvestError)` - The parsed directory or the index file could not be accessed
pub fn rebuild_index(config: &Config) -> Result<usize, HarvestError> {
    let rows = build_index(&config.output.parsed_dir(), &config.source.id_prefix)?;
    write_index(&rows, &config.output.index_path())?;
    tracing::info!(
        "Wrote {} rows to {}",
        rows.len(),
        config.output.index_path().display()
    );
    Ok(rows.len())
}
