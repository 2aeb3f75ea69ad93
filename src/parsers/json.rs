/// Parser for plain JSON fact lists, for pipelines that already have
/// per-class numbers:
///
///   [
///     {"name": "com.example.Foo", "elements": 32, "covered": 17,
///      "anchor": "com/example/Foo.html#Foo"},
///     {"name": "com.example.FooTest", "elements": 6, "covered": 6,
///      "test": true}
///   ]
use std::path::Path;

use tracing::debug;

use super::FactParser;
use crate::detect::Format;
use crate::error::Result;
use crate::model::{ClassCoverageFact, FactRecord};

/// JSON fact list parser.
pub struct JsonParser;

impl FactParser for JsonParser {
    fn format(&self) -> Format {
        Format::Json
    }

    fn can_parse(&self, path: &Path, content: &[u8]) -> bool {
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            return true;
        }
        let head = super::sniff_head(content);
        let trimmed = head.trim_start();
        trimmed.starts_with('[') && (trimmed.len() == 1 || trimmed.contains("\"name\""))
    }

    fn parse(&self, input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
        parse(input)
    }
}

/// Parse a JSON array of fact records. Count errors keep their own error
/// variant instead of surfacing as JSON errors.
pub fn parse(input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let records: Vec<FactRecord> = serde_json::from_slice(input)?;
    let facts = records
        .into_iter()
        .map(ClassCoverageFact::try_from)
        .collect::<Result<Vec<_>>>()?;
    debug!(classes = facts.len(), "parsed json facts");
    Ok(facts)
}
