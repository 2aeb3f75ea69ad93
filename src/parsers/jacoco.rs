/// Parser for JaCoCo XML coverage reports.
///
/// JaCoCo XML structure:
///   <report name="...">
///     <sessioninfo id="..." start="..." dump="..."/>
///     <package name="com/example">
///       <class name="com/example/Foo" sourcefilename="Foo.java">
///         <method name="doStuff" desc="()V" line="10">
///           <counter type="INSTRUCTION" missed="0" covered="5"/>
///         </method>
///         <counter type="INSTRUCTION" missed="2" covered="10"/>
///         <counter type="BRANCH" missed="1" covered="3"/>
///         <counter type="LINE" missed="1" covered="5"/>
///         <counter type="METHOD" missed="0" covered="2"/>
///         <counter type="CLASS" missed="0" covered="1"/>
///       </class>
///       <sourcefile name="Foo.java">...</sourcefile>
///       <counter .../>
///     </package>
///   </report>
///
/// Mapping onto class facts:
///   - Only counters that are direct children of `<class>` are read; method,
///     source file, package and report counters are ignored.
///   - Elements are LINE + BRANCH + METHOD counters (total = missed + covered),
///     the closest match to Clover's statements + conditionals + methods.
///   - Class names are binary names with `/` separators
///     (`com/example/Foo$Bar`), which become `com.example.Foo$Bar`.
///   - The detail anchor follows JaCoCo's HTML layout, one page per type:
///     `com.example/Foo.html`, `com.example/Foo$Bar.html`.
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::{add_count, count_attr, get_attr, FactParser};
use crate::detect::Format;
use crate::error::{CovtreeError, Result};
use crate::model::ClassCoverageFact;

/// Counter types summed into a class's element count.
const ELEMENT_COUNTERS: [&str; 3] = ["LINE", "BRANCH", "METHOD"];

/// Directory JaCoCo's HTML report uses for the unnamed package.
const DEFAULT_PACKAGE_DIR: &str = "default";

/// JaCoCo XML format parser.
pub struct JacocoParser;

impl FactParser for JacocoParser {
    fn format(&self) -> Format {
        Format::Jacoco
    }

    fn can_parse(&self, _path: &Path, content: &[u8]) -> bool {
        let head = super::sniff_head(content);
        // XML with a <report element and either DTD reference or JaCoCo-
        // specific child elements (sessioninfo, package, etc.)
        super::looks_like_xml(&head)
            && head.contains("<report")
            && (head.contains("jacoco") || head.contains("JACOCO") || head.contains("<package"))
    }

    fn parse(&self, input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
        parse(input)
    }
}

/// Running totals for the `<class>` being read.
struct ClassState {
    name: String,
    total: i64,
    covered: i64,
}

/// Parse JaCoCo XML into class facts.
pub fn parse(input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
    let mut xml = super::xml_reader(input);
    let mut buf = Vec::new();
    let mut facts = Vec::new();

    let mut current_class: Option<ClassState> = None;
    let mut in_method = false;

    loop {
        let event = xml.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => return Err(super::xml_err(e, &xml)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"class" => {
                    let state = ClassState {
                        name: get_attr(e, b"name").unwrap_or_default(),
                        total: 0,
                        covered: 0,
                    };
                    if is_start_event {
                        current_class = Some(state);
                    } else {
                        // <class .../> without counters
                        facts.push(class_fact(state)?);
                    }
                }
                b"method" if is_start_event => in_method = true,
                b"counter" if !in_method => {
                    if let Some(state) = current_class.as_mut() {
                        add_counter(state, e)?;
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"method" => in_method = false,
                b"class" => {
                    if let Some(state) = current_class.take() {
                        facts.push(class_fact(state)?);
                    }
                }
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    debug!(classes = facts.len(), "parsed jacoco report");
    Ok(facts)
}

fn add_counter(state: &mut ClassState, counter: &BytesStart) -> Result<()> {
    let Some(kind) = get_attr(counter, b"type") else {
        return Ok(());
    };
    if !ELEMENT_COUNTERS.contains(&kind.as_str()) {
        return Ok(());
    }
    let missed = count_attr(counter, b"missed")?.unwrap_or(0);
    let covered = count_attr(counter, b"covered")?.unwrap_or(0);
    let name = state.name.replace('/', ".");
    if missed < 0 || covered < 0 {
        return Err(CovtreeError::InconsistentCoverageFact {
            name,
            covered,
            total: missed.saturating_add(covered),
        });
    }
    state.total = add_count(add_count(state.total, missed, &name)?, covered, &name)?;
    state.covered = add_count(state.covered, covered, &name)?;
    Ok(())
}

fn class_fact(state: ClassState) -> Result<ClassCoverageFact> {
    let name = state.name.replace('/', ".");
    let (package, simple) = match state.name.rsplit_once('/') {
        Some((pkg, simple)) => (pkg.replace('/', "."), simple),
        None => (DEFAULT_PACKAGE_DIR.to_string(), state.name.as_str()),
    };

    let anchor = format!("{package}/{simple}.html");

    ClassCoverageFact::new(name, state.total, state.covered, anchor)
}
