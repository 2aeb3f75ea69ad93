/// Parser for OpenClover XML coverage reports.
///
/// Clover XML structure (as produced by OpenClover's `clover-report` XML
/// output):
///
///   <coverage generated="..." clover="4.x.x">
///     <project timestamp="..." name="...">
///       <metrics .../>
///       <package name="com.example">
///         <file name="Foo.java" path="/abs/src/main/java/com/example/Foo.java">
///           <class name="Foo">
///             <metrics elements="32" coveredelements="17" .../>
///           </class>
///           <class name="Foo.Inner"><metrics .../></class>
///           <line num="1" count="5" type="stmt"/>
///         </file>
///       </package>
///     </project>
///     <testproject timestamp="..." name="..."> ... </testproject>
///   </coverage>
///
/// Only class-level `<metrics>` matter here; package, file and project
/// metrics are derived again during aggregation. Notes:
///   - `elements` = statements + conditionals + methods. Older reports omit
///     `elements`/`coveredelements`; we sum the three pairs instead.
///   - Nested classes are dotted inside `<class name>` (`Foo.Inner`) and become
///     `com.example.Foo$Inner`.
///   - Classes under `<testproject>` are test sources.
///   - The detail anchor is `<package/dir>/<FileStem>.html#<ClassName>`, so a
///     non-public class declared in another file links to that file's page.
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::{add_count, check_counts, count_attr, get_attr, FactParser};
use crate::detect::Format;
use crate::error::Result;
use crate::model::{ClassCoverageFact, SourceKind};

/// Package name Clover uses for classes without a package.
const DEFAULT_PACKAGE: &str = "default-pkg";

/// (total, covered) attribute pairs that make up `elements`.
const ELEMENT_METRICS: [(&[u8], &[u8]); 3] = [
    (b"statements", b"coveredstatements"),
    (b"conditionals", b"coveredconditionals"),
    (b"methods", b"coveredmethods"),
];

/// Clover XML format parser.
pub struct CloverParser;

impl FactParser for CloverParser {
    fn format(&self) -> Format {
        Format::Clover
    }

    fn can_parse(&self, _path: &Path, content: &[u8]) -> bool {
        let head = super::sniff_head(content);
        // Cobertura also uses <coverage> as its root; the `clover` attribute
        // tells them apart.
        super::looks_like_xml(&head) && head.contains("<coverage") && head.contains("clover=")
    }

    fn parse(&self, input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
        parse(input)
    }
}

/// Parse Clover XML into class facts.
pub fn parse(input: &[u8]) -> Result<Vec<ClassCoverageFact>> {
    let mut xml = super::xml_reader(input);
    let mut buf = Vec::new();
    let mut facts = Vec::new();

    // State tracking
    let mut source = SourceKind::Application;
    let mut current_package: Option<String> = None;
    let mut current_file: Option<String> = None;
    let mut current_class: Option<String> = None;

    loop {
        let event = xml.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => return Err(super::xml_err(e, &xml)),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"project" => source = SourceKind::Application,
                b"testproject" => source = SourceKind::Test,
                b"package" if is_start_event => {
                    current_package = get_attr(e, b"name");
                }
                b"file" if is_start_event => {
                    current_file = get_attr(e, b"name");
                }
                b"class" if is_start_event => {
                    current_class = get_attr(e, b"name");
                }
                b"metrics" => {
                    if let Some(class) = current_class.as_deref() {
                        let fact = class_fact(
                            current_package.as_deref(),
                            current_file.as_deref(),
                            class,
                            e,
                        )?;
                        facts.push(fact.with_source(source));
                        // one <metrics> per class
                        current_class = None;
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"package" => current_package = None,
                b"file" => current_file = None,
                b"class" => current_class = None,
                b"testproject" => source = SourceKind::Application,
                _ => {}
            },
            _ => {}
        }
        buf.clear();
    }

    debug!(classes = facts.len(), "parsed clover report");
    Ok(facts)
}

fn class_fact(
    package: Option<&str>,
    file: Option<&str>,
    class: &str,
    metrics: &BytesStart,
) -> Result<ClassCoverageFact> {
    let package = package.filter(|p| !p.is_empty() && *p != DEFAULT_PACKAGE);
    let binary_name = class.replace('.', "$");
    let name = match package {
        Some(pkg) => format!("{pkg}.{binary_name}"),
        None => binary_name,
    };

    let (total, covered) = element_counts(&name, metrics)?;

    let dir = package
        .map(|p| p.replace('.', "/"))
        .unwrap_or_else(|| DEFAULT_PACKAGE.to_string());
    let page = match file {
        Some(f) => super::file_stem(f).to_string(),
        None => class.split('.').next().unwrap_or(class).to_string(),
    };
    let anchor = format!("{dir}/{page}.html#{class}");

    ClassCoverageFact::new(name, total, covered, anchor)
}

fn element_counts(name: &str, metrics: &BytesStart) -> Result<(i64, i64)> {
    if let Some(total) = count_attr(metrics, b"elements")? {
        let covered = count_attr(metrics, b"coveredelements")?.unwrap_or(0);
        check_counts(name, total, covered)?;
        return Ok((total, covered));
    }

    let mut total = 0;
    let mut covered = 0;
    for (all, hit) in ELEMENT_METRICS {
        let part_total = count_attr(metrics, all)?.unwrap_or(0);
        let part_covered = count_attr(metrics, hit)?.unwrap_or(0);
        check_counts(name, part_total, part_covered)?;
        total = add_count(total, part_total, name)?;
        covered = add_count(covered, part_covered, name)?;
    }
    Ok((total, covered))
}
