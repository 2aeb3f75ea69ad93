use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::detect::{detect_format, Format};
use crate::error::{CovtreeError, Result};
use crate::model::ClassCoverageFact;
use crate::parsers;

/// Read a coverage file, auto-detect its format (or use the override), and
/// parse it into class facts.
/// Returns (detected_format, facts).
pub fn ingest(
    file_path: &Path,
    format_override: Option<&str>,
) -> Result<(Format, Vec<ClassCoverageFact>)> {
    let content = std::fs::read(file_path)?;

    let format = if let Some(fmt_str) = format_override {
        fmt_str.parse::<Format>()?
    } else {
        detect_format(file_path, &content).ok_or(CovtreeError::UnknownFormat)?
    };

    let facts = parsers::for_format(format).parse(&content)?;
    debug!(
        file = %file_path.display(),
        format = %format,
        classes = facts.len(),
        "ingested coverage file"
    );
    if facts.is_empty() {
        warn!(file = %file_path.display(), "no class coverage found");
    }

    Ok((format, facts))
}

/// Ingest several files and concatenate their facts in argument order.
/// Overlapping classes are left in place; aggregation rejects them.
pub fn ingest_all(
    files: &[PathBuf],
    format_override: Option<&str>,
) -> Result<Vec<ClassCoverageFact>> {
    let mut facts = Vec::new();
    for file in files {
        let (_format, mut parsed) = ingest(file, format_override)?;
        facts.append(&mut parsed);
    }
    Ok(facts)
}
