/// Auto-detection of coverage input formats.
///
/// Strategy:
///   1. Check file extension for strong hints
///   2. Ask each parser whether it recognises the first bytes of the content
///   3. Fall back to CLI --format override (handled by caller)
use std::path::Path;

use crate::error::CovtreeError;
use crate::parsers;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Clover,
    Jacoco,
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Clover => "clover",
            Format::Jacoco => "jacoco",
            Format::Json => "json",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = CovtreeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clover" => Ok(Format::Clover),
            "jacoco" => Ok(Format::Jacoco),
            "json" => Ok(Format::Json),
            _ => Err(CovtreeError::Parse(format!(
                "Unknown format: '{}'. Supported: clover, jacoco, json",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the input format from filename and file content.
pub fn detect_format(path: &Path, content: &[u8]) -> Option<Format> {
    if let Some(fmt) = detect_by_extension(path) {
        return Some(fmt);
    }

    parsers::all()
        .into_iter()
        .find(|p| p.can_parse(path, content))
        .map(|p| p.format())
}

fn detect_by_extension(path: &Path) -> Option<Format> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "json" => Some(Format::Json),
        "xml" => None, // Clover or JaCoCo, decided by content
        _ => None,
    }
}
