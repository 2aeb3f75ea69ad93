pub mod clover;
pub mod jacoco;
pub mod json;

use std::path::Path;

use quick_xml::events::BytesStart;
use quick_xml::Reader;

use crate::detect::Format;
use crate::error::{CovtreeError, Result};
use crate::model::ClassCoverageFact;

/// Every input format implements this trait.
pub trait FactParser {
    fn format(&self) -> Format;

    /// Cheap check on the file name and the first few KB of content.
    fn can_parse(&self, path: &Path, content: &[u8]) -> bool;

    /// Parse the input bytes into per-class coverage facts.
    fn parse(&self, input: &[u8]) -> Result<Vec<ClassCoverageFact>>;
}

/// All known parsers, in detection priority order.
#[must_use]
pub fn all() -> [&'static dyn FactParser; 3] {
    [&clover::CloverParser, &jacoco::JacocoParser, &json::JsonParser]
}

#[must_use]
pub fn for_format(format: Format) -> &'static dyn FactParser {
    match format {
        Format::Clover => &clover::CloverParser,
        Format::Jacoco => &jacoco::JacocoParser,
        Format::Json => &json::JsonParser,
    }
}

/// First 4 KB of the content as lossy UTF-8.
pub(crate) fn sniff_head(content: &[u8]) -> String {
    let len = content.len().min(4096);
    String::from_utf8_lossy(&content[..len]).into_owned()
}

pub(crate) fn looks_like_xml(head: &str) -> bool {
    head.contains("<?xml") || head.trim_start().starts_with('<')
}

pub(crate) fn xml_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    reader
}

pub(crate) fn xml_err(source: quick_xml::Error, reader: &Reader<&[u8]>) -> CovtreeError {
    CovtreeError::Xml {
        source,
        position: reader.buffer_position(),
    }
}

/// Unescaped value of the named attribute, if present.
pub(crate) fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Integer attribute. Missing attributes are `None`; present but
/// non-numeric ones are a parse error.
pub(crate) fn count_attr(e: &BytesStart, name: &[u8]) -> Result<Option<i64>> {
    match get_attr(e, name) {
        None => Ok(None),
        Some(v) => v.trim().parse::<i64>().map(Some).map_err(|_| {
            CovtreeError::Parse(format!(
                "attribute '{}' is not an integer: '{v}'",
                String::from_utf8_lossy(name)
            ))
        }),
    }
}

/// Reject a negative count pair before it can cancel out in a sum.
pub(crate) fn check_counts(name: &str, total: i64, covered: i64) -> Result<()> {
    if total < 0 || covered < 0 {
        return Err(CovtreeError::InconsistentCoverageFact {
            name: name.to_string(),
            covered,
            total,
        });
    }
    Ok(())
}

/// `acc + value`, or a parse error naming the class on overflow.
pub(crate) fn add_count(acc: i64, value: i64, name: &str) -> Result<i64> {
    acc.checked_add(value)
        .ok_or_else(|| CovtreeError::Parse(format!("element count overflow in '{name}'")))
}

/// File name without its extension (`ColumnMeta.java` → `ColumnMeta`).
pub(crate) fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
