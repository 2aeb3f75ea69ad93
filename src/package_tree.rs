//! The navigable package outline: project root → packages → sub-packages →
//! classes, each node carrying the coverage of its whole subtree.

use crate::aggregate::{ClassEntry, CoverageIndex, PackageGroup, ReportOptions};
use crate::error::Result;
use crate::model::{ClassCoverageFact, SourceKind, Totals};

/// Summary page of a package with application classes.
pub const PACKAGE_SUMMARY_PAGE: &str = "pkg-summary.html";
/// Summary page of a package that only holds test classes.
pub const TEST_PACKAGE_SUMMARY_PAGE: &str = "testsrc-pkg-summary.html";

/// A package (or the project root) in the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageNode {
    /// Fully-qualified package name; empty for the project root.
    pub id: String,
    pub display_name: String,
    pub totals: Totals,
    /// Summary page, only for packages that declare classes themselves.
    pub url: Option<String>,
    /// Sub-packages first (by id), then classes (by class path).
    pub children: Vec<OutlineNode>,
}

/// A class (or nested class) in the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLeaf {
    /// Fully-qualified name as supplied.
    pub id: String,
    pub display_name: String,
    pub totals: Totals,
    pub url: String,
    pub source: SourceKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutlineNode {
    Package(PackageNode),
    Class(ClassLeaf),
}

impl OutlineNode {
    #[must_use]
    pub fn totals(&self) -> Totals {
        match self {
            OutlineNode::Package(p) => p.totals,
            OutlineNode::Class(c) => c.totals,
        }
    }

    #[must_use]
    pub fn coverage_percent(&self) -> Option<f64> {
        self.totals().percent()
    }
}

impl ClassLeaf {
    #[must_use]
    pub fn coverage_percent(&self) -> Option<f64> {
        self.totals.percent()
    }
}

impl From<&ClassEntry> for ClassLeaf {
    fn from(entry: &ClassEntry) -> Self {
        ClassLeaf {
            id: entry.fact.fully_qualified_name.clone(),
            display_name: entry.name.class_name(),
            totals: entry.totals(),
            url: entry.fact.html_anchor.clone(),
            source: entry.fact.source,
        }
    }
}

impl PackageNode {
    /// Weighted coverage of every class below this node; `None` when the
    /// subtree has no elements at all.
    #[must_use]
    pub fn coverage_percent(&self) -> Option<f64> {
        self.totals.percent()
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageNode> {
        self.children.iter().filter_map(|c| match c {
            OutlineNode::Package(p) => Some(p),
            OutlineNode::Class(_) => None,
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassLeaf> {
        self.children.iter().filter_map(|c| match c {
            OutlineNode::Class(c) => Some(c),
            OutlineNode::Package(_) => None,
        })
    }

    /// Depth-first search by package id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&PackageNode> {
        if self.id == id {
            return Some(self);
        }
        self.packages().find_map(|p| p.find(id))
    }

    /// This node and all descendant packages, depth-first.
    #[must_use]
    pub fn descendants(&self) -> Vec<&PackageNode> {
        let mut out = vec![self];
        for p in self.packages() {
            out.extend(p.descendants());
        }
        out
    }

    /// Collapse chains of class-less packages with a single sub-package into
    /// one node labelled with the joined segments (`misc.testlib`). The root
    /// is never merged into its child.
    #[must_use]
    pub fn compact(self) -> PackageNode {
        let children = self
            .children
            .into_iter()
            .map(|c| match c {
                OutlineNode::Package(p) => OutlineNode::Package(p.compact_chain()),
                class => class,
            })
            .collect();
        PackageNode { children, ..self }
    }

    fn compact_chain(mut self) -> PackageNode {
        while let [OutlineNode::Package(_)] = self.children.as_slice() {
            let Some(OutlineNode::Package(mut child)) = self.children.pop() else {
                break;
            };
            child.display_name = format!("{}.{}", self.display_name, child.display_name);
            self = child;
        }
        self.compact()
    }
}

/// Build the outline from a flat set of facts.
pub fn build_package_tree(
    facts: &[ClassCoverageFact],
    options: &ReportOptions,
) -> Result<PackageNode> {
    let index = CoverageIndex::build(facts)?;
    options.check_default_package(&index)?;
    Ok(package_tree_from_index(&index, options))
}

/// Build the outline from an already validated index whose default-package
/// label has been checked with `ReportOptions::check_default_package`.
#[must_use]
pub fn package_tree_from_index(index: &CoverageIndex, options: &ReportOptions) -> PackageNode {
    let mut children: Vec<OutlineNode> = top_level_packages(index)
        .into_iter()
        .map(|name| OutlineNode::Package(package_node(&name, index)))
        .collect();

    if let Some(group) = index.package("") {
        children.push(OutlineNode::Package(default_package_node(group, options)));
    }

    PackageNode {
        id: String::new(),
        display_name: options.project_name.clone(),
        totals: children.iter().map(OutlineNode::totals).sum(),
        url: None,
        children,
    }
}

fn package_node(name: &str, index: &CoverageIndex) -> PackageNode {
    let own = index.package(name);

    let mut children: Vec<OutlineNode> = child_packages(index, name)
        .into_iter()
        .map(|child| OutlineNode::Package(package_node(&child, index)))
        .collect();
    if let Some(group) = own {
        children.extend(group.classes.iter().map(|c| OutlineNode::Class(c.into())));
    }

    PackageNode {
        id: name.to_string(),
        display_name: name.rsplit('.').next().unwrap_or(name).to_string(),
        totals: children.iter().map(OutlineNode::totals).sum(),
        url: own.map(|g| summary_url(&g.path(), g.source())),
        children,
    }
}

fn default_package_node(group: &PackageGroup, options: &ReportOptions) -> PackageNode {
    PackageNode {
        id: options.default_package.clone(),
        display_name: options.default_package.clone(),
        totals: group.totals,
        url: Some(summary_url(&options.default_package, group.source())),
        children: group
            .classes
            .iter()
            .map(|c| OutlineNode::Class(c.into()))
            .collect(),
    }
}

fn summary_url(dir: &str, source: SourceKind) -> String {
    let page = match source {
        SourceKind::Application => PACKAGE_SUMMARY_PAGE,
        SourceKind::Test => TEST_PACKAGE_SUMMARY_PAGE,
    };
    format!("{dir}/{page}")
}

/// Distinct first segments of all named packages, sorted.
fn top_level_packages(index: &CoverageIndex) -> Vec<String> {
    let mut names: Vec<String> = index
        .packages()
        .filter(|p| !p.name.is_empty())
        .filter_map(|p| p.name.split('.').next().map(String::from))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Distinct direct sub-packages of `parent` (including pure prefixes that
/// declare no classes), sorted.
fn child_packages(index: &CoverageIndex, parent: &str) -> Vec<String> {
    let prefix = format!("{parent}.");
    let mut names: Vec<String> = index
        .packages()
        .filter_map(|p| p.name.strip_prefix(&prefix))
        .filter_map(|rest| rest.split('.').next())
        .map(|segment| format!("{prefix}{segment}"))
        .collect();
    names.sort();
    names.dedup();
    names
}
