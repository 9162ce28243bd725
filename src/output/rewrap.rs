//! Re-flowing existing text artifacts at a new width

use crate::output::index::text_artifacts;
use crate::output::text::wrap_text;
use crate::HarvestError;
use std::fs;
use std::path::{Path, PathBuf};

const ABSTRACT_MARKER: &str = "\nABSTRACT:\n";
const BODY_MARKER: &str = "\n\nBODY:\n";

/// Re-wraps the abstract and body blocks of a text artifact
///
/// The header lines are kept byte for byte. Returns `None` when the text
/// does not have both the `ABSTRACT:` and `BODY:` markers.
pub fn rewrap_document(text: &str, width: usize) -> Option<String> {
    let abstract_at = text.find(ABSTRACT_MARKER)?;
    let abstract_start = abstract_at + ABSTRACT_MARKER.len();
    let body_at = abstract_start + text[abstract_start..].find(BODY_MARKER)?;
    let body_start = body_at + BODY_MARKER.len();

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..abstract_start]);
    out.push_str(&wrap_text(&text[abstract_start..body_at], width));
    out.push_str(BODY_MARKER);
    out.push_str(&wrap_text(&text[body_start..], width));
    Some(out)
}

/// Outcome of a re-wrap pass over a directory
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewrapSummary {
    pub rewritten: usize,
    pub skipped: Vec<PathBuf>,
}

/// Re-wraps every text artifact in `parsed_dir`
///
/// With `in_place` the artifact is overwritten, otherwise the result goes to
/// `<id>.wrapped.txt` beside it.
pub fn rewrap_directory(
    parsed_dir: &Path,
    prefix: &str,
    width: usize,
    in_place: bool,
) -> Result<RewrapSummary, HarvestError> {
    let mut summary = RewrapSummary::default();

    for (id, path) in text_artifacts(parsed_dir, prefix)? {
        let bytes = fs::read(&path)?;
        let text = String::from_utf8_lossy(&bytes);

        let Some(rewrapped) = rewrap_document(&text, width) else {
            tracing::debug!("Skipping {}: not a standard layout", path.display());
            summary.skipped.push(path);
            continue;
        };

        let dest = if in_place {
            path
        } else {
            parsed_dir.join(format!("{}.wrapped.txt", id))
        };
        fs::write(&dest, rewrapped)?;
        summary.rewritten += 1;
    }

    Ok(summary)
}
