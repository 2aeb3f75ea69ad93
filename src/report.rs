//! Assembled coverage report and its output formats.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::aggregate::{CoverageIndex, ReportOptions};
use crate::error::Result;
use crate::model::{ClassCoverageFact, Totals};
use crate::package_tree::{package_tree_from_index, PackageNode};
use crate::payload::{self, OutlineEntry, TreeEntry, TreemapEntry};
use crate::treemap::{treemap_from_index, TreemapNode};

/// File name of the outline payload.
pub const PACKAGES_FILE: &str = "package-nodes-tree.js";
/// File name of the treemap payload.
pub const TREEMAP_FILE: &str = "treemap-json.js";

/// Both trees built from one set of facts.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub package_tree: PackageNode,
    pub treemap: TreemapNode,
    /// Number of class facts in the report.
    pub classes: usize,
}

impl CoverageReport {
    /// Validate and aggregate `facts` once, then derive both trees from the
    /// same index.
    pub fn build(
        facts: &[ClassCoverageFact],
        options: &ReportOptions,
        compact_packages: bool,
    ) -> Result<Self> {
        let index = CoverageIndex::build(facts)?;
        options.check_default_package(&index)?;
        let mut package_tree = package_tree_from_index(&index, options);
        if compact_packages {
            package_tree = package_tree.compact();
        }
        Ok(Self {
            package_tree,
            treemap: treemap_from_index(&index, options),
            classes: index.class_count(),
        })
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        self.package_tree.totals
    }

    /// Format using a specific formatter.
    pub fn format(&self, formatter: &dyn ReportFormatter) -> Result<String> {
        formatter.format(self)
    }

    /// Write the outline and treemap payloads into `dir`, creating it if
    /// needed. Returns the written paths.
    pub fn write_payloads(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let outputs: [(&str, &dyn ReportFormatter); 2] = [
            (PACKAGES_FILE, &PackagesScriptFormatter),
            (TREEMAP_FILE, &TreemapScriptFormatter),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (name, formatter) in outputs {
            let path = dir.join(name);
            std::fs::write(&path, self.format(formatter)?)?;
            info!(path = %path.display(), "wrote payload");
            written.push(path);
        }
        Ok(written)
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &CoverageReport) -> Result<String>;
}

/// `var Packages = {...};` for the package outline widget.
pub struct PackagesScriptFormatter;

impl ReportFormatter for PackagesScriptFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let nodes = serde_json::to_string_pretty(&payload::outline_entries(&report.package_tree))?;
        let settings = serde_json::to_string_pretty(&payload::outline_settings())?;

        let mut out = String::new();
        writeln!(out, "var Packages = {{").unwrap();
        writeln!(out, "    nodes: {nodes},").unwrap();
        writeln!(out, "    settings: {settings}").unwrap();
        writeln!(out, "}};").unwrap();
        Ok(out)
    }
}

/// `var treeMapJson = {...};` followed by the widget hook call.
pub struct TreemapScriptFormatter;

impl ReportFormatter for TreemapScriptFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let json = serde_json::to_string(&TreemapEntry::from(&report.treemap))?;
        Ok(format!(
            "var treeMapJson = {json};\nprocessTreeMapJson (treeMapJson);\n"
        ))
    }
}

/// Both trees as a single JSON document, classes included.
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let doc = serde_json::json!({
            "packages": TreeEntry::from_root(&report.package_tree),
            "treemap": TreemapEntry::from(&report.treemap),
        });
        let mut out = serde_json::to_string_pretty(&doc)?;
        out.push('\n');
        Ok(out)
    }
}

/// Project totals only.
pub struct SummaryFormatter;

impl ReportFormatter for SummaryFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let totals = report.totals();
        let packages = report
            .package_tree
            .descendants()
            .iter()
            .filter(|p| p.url.is_some())
            .count();

        let mut out = String::new();
        writeln!(out, "Project:    {}", report.package_tree.display_name).unwrap();
        writeln!(out, "Packages:   {packages}").unwrap();
        writeln!(out, "Classes:    {}", report.classes).unwrap();
        writeln!(
            out,
            "Elements:   {}/{} ({})",
            totals.covered,
            totals.total,
            payload::format_percent(totals.percent()).unwrap_or_else(|| "no data".to_string())
        )
        .unwrap();
        Ok(out)
    }
}

/// Per-package table of packages that declare classes.
pub struct PackageTableFormatter {
    /// Lowest coverage first; "no data" packages go last.
    pub sort_by_coverage: bool,
}

impl ReportFormatter for PackageTableFormatter {
    fn format(&self, report: &CoverageReport) -> Result<String> {
        let mut packages: Vec<&PackageNode> = report
            .package_tree
            .descendants()
            .into_iter()
            .filter(|p| p.url.is_some())
            .collect();

        if self.sort_by_coverage {
            packages.sort_by(|a, b| {
                let a = a.coverage_percent().unwrap_or(f64::INFINITY);
                let b = b.coverage_percent().unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            });
        }

        let mut out = String::new();
        writeln!(
            out,
            "{:<50} {:>9} {:>9} {:>9}",
            "PACKAGE", "ELEMENTS", "COVERED", "COVERAGE"
        )
        .unwrap();
        writeln!(out, "{}", "-".repeat(80)).unwrap();

        for p in &packages {
            writeln!(
                out,
                "{:<50} {:>9} {:>9} {:>9}",
                p.id,
                p.totals.total,
                p.totals.covered,
                payload::format_percent(p.coverage_percent()).unwrap_or_else(|| "-".to_string())
            )
            .unwrap();
        }

        let totals = report.totals();
        writeln!(out, "{}", "-".repeat(80)).unwrap();
        writeln!(
            out,
            "{:<50} {:>9} {:>9} {:>9}",
            "TOTAL",
            totals.total,
            totals.covered,
            payload::format_percent(totals.percent()).unwrap_or_else(|| "-".to_string())
        )
        .unwrap();
        Ok(out)
    }
}
