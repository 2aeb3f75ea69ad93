//! Serialized shapes consumed by the report's outline and treemap widgets.
//! Field names and value formats follow what those widgets already read,
//! including the `-100` "no data" color.

use serde::Serialize;
use serde_json::{json, Value};

use crate::model::Totals;
use crate::package_tree::{OutlineNode, PackageNode};
use crate::treemap::TreemapNode;

const FOLDER_CLOSED_ICON: &str = "aui-icon aui-icon-small aui-iconfont-devtools-folder-closed";
const FOLDER_OPEN_ICON: &str = "aui-icon aui-icon-small aui-iconfont-devtools-folder-open";

/// `93%`, `76.2%`; one decimal with a trailing `.0` dropped.
#[must_use]
pub fn format_percent(percent: Option<f64>) -> Option<String> {
    percent.map(|p| {
        let s = format!("{p:.1}");
        let s = s.strip_suffix(".0").unwrap_or(&s);
        format!("{s}%")
    })
}

/// `"ColumnMeta 32 Elements, 53.1% Coverage"`, or `" - "` in place of the
/// percentage when there is nothing to cover.
#[must_use]
pub fn treemap_title(name: &str, totals: Totals) -> String {
    let pct = format_percent(totals.percent()).unwrap_or_else(|| " - ".to_string());
    format!("{name} {} Elements, {pct} Coverage", totals.total)
}

/// One package entry of the outline widget.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineEntry {
    pub id: String,
    pub text: String,
    pub package: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<String>,
    pub icon: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub li_attr: Option<Value>,
    pub a_attr: Value,
    pub children: Vec<OutlineEntry>,
}

impl OutlineEntry {
    /// Packages only; classes are reached through the package pages.
    #[must_use]
    pub fn from_package(node: &PackageNode) -> Self {
        let url = node.url.clone().unwrap_or_default();
        OutlineEntry {
            id: node.id.clone(),
            text: node.display_name.clone(),
            package: if node.url.is_some() {
                node.id.clone()
            } else {
                String::new()
            },
            coverage: format_percent(node.coverage_percent()),
            icon: FOLDER_CLOSED_ICON,
            li_attr: node.url.as_ref().map(|_| json!({"data-is-link": "true"})),
            a_attr: json!({ "href": url }),
            url,
            children: node.packages().map(OutlineEntry::from_package).collect(),
        }
    }
}

/// Top-level `nodes` of the outline: the root's children.
#[must_use]
pub fn outline_entries(root: &PackageNode) -> Vec<OutlineEntry> {
    root.packages().map(OutlineEntry::from_package).collect()
}

/// Icon classes for the outline widget's open/closed states.
#[must_use]
pub fn outline_settings() -> Value {
    json!({
        "icons": {
            "package": {
                "open": FOLDER_OPEN_ICON,
                "closed": FOLDER_CLOSED_ICON
            },
            "state": {
                "collapsed": "aui-icon aui-icon-small aui-iconfont-collapsed",
                "expanded": "aui-icon aui-icon-small aui-iconfont-expanded",
                "forRemoval": "hidden aui-iconfont-collapsed aui-iconfont-expanded"
            }
        }
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TreemapData {
    #[serde(rename = "$area")]
    pub area: f64,
    #[serde(rename = "$color")]
    pub color: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub title: String,
}

/// One rectangle of the treemap widget.
#[derive(Debug, Clone, Serialize)]
pub struct TreemapEntry {
    pub id: String,
    pub name: String,
    pub data: TreemapData,
    pub children: Vec<TreemapEntry>,
}

impl From<&TreemapNode> for TreemapEntry {
    fn from(node: &TreemapNode) -> Self {
        TreemapEntry {
            id: node.id().to_string(),
            name: node.name().to_string(),
            data: TreemapData {
                area: node.area() as f64,
                color: node.color(),
                path: node.detail_path().map(String::from),
                title: treemap_title(node.name(), node.totals()),
            },
            children: node.children().iter().map(TreemapEntry::from).collect(),
        }
    }
}

/// Complete outline for machine consumers, classes included.
#[derive(Debug, Clone, Serialize)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub elements: u64,
    pub covered: u64,
    /// `null` when nothing was measured.
    pub coverage: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    #[must_use]
    pub fn from_root(root: &PackageNode) -> Self {
        Self::package(root, "project")
    }

    fn package(node: &PackageNode, kind: &'static str) -> Self {
        TreeEntry {
            id: node.id.clone(),
            name: node.display_name.clone(),
            kind,
            url: node.url.clone(),
            elements: node.totals.total,
            covered: node.totals.covered,
            coverage: node.coverage_percent(),
            children: node
                .children
                .iter()
                .map(|child| match child {
                    OutlineNode::Package(p) => Self::package(p, "package"),
                    OutlineNode::Class(c) => TreeEntry {
                        id: c.id.clone(),
                        name: c.display_name.clone(),
                        kind: "class",
                        url: Some(c.url.clone()),
                        elements: c.totals.total,
                        covered: c.totals.covered,
                        coverage: c.coverage_percent(),
                        children: Vec::new(),
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ReportOptions;
    use crate::model::ClassCoverageFact;
    use crate::package_tree::build_package_tree;
    use crate::treemap::build_treemap;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(Some(93.0)).as_deref(), Some("93%"));
        assert_eq!(format_percent(Some(76.21)).as_deref(), Some("76.2%"));
        assert_eq!(format_percent(Some(99.97)).as_deref(), Some("100%"));
        assert_eq!(format_percent(Some(0.0)).as_deref(), Some("0%"));
        assert_eq!(format_percent(None), None);
    }

    #[test]
    fn test_treemap_title() {
        assert_eq!(
            treemap_title("ColumnMeta", Totals::new(17, 32)),
            "ColumnMeta 32 Elements, 53.1% Coverage"
        );
        assert_eq!(
            treemap_title("TableFacet", Totals::new(0, 0)),
            "TableFacet 0 Elements,  -  Coverage"
        );
        assert_eq!(
            treemap_title("", Totals::new(15, 15)),
            " 15 Elements, 100% Coverage"
        );
    }

    #[test]
    fn test_treemap_entry_json() {
        let facts = vec![
            ClassCoverageFact::new("p.TableFacet", 0, 0, "p/TableFacet.html#TableFacet").unwrap(),
        ];
        let root = build_treemap(&facts, &ReportOptions::default()).unwrap();
        let entry = TreemapEntry::from(&root.children()[0].children()[0]);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r##"{"id":"TableFacet0","name":"TableFacet","data":{"$area":0.0,"$color":-100.0,"path":"p/TableFacet.html#TableFacet","title":"TableFacet 0 Elements,  -  Coverage"},"children":[]}"##
        );

        // aggregation nodes carry no path
        let package = serde_json::to_value(TreemapEntry::from(&root.children()[0])).unwrap();
        assert!(package["data"].get("path").is_none());
    }

    #[test]
    fn test_outline_entry_for_prefix_package() {
        let facts = vec![
            ClassCoverageFact::new("a.b.Foo", 4, 3, "").unwrap(),
            ClassCoverageFact::new("a.c.Bar", 4, 1, "").unwrap(),
        ];
        let root = build_package_tree(&facts, &ReportOptions::default()).unwrap();
        let entries = outline_entries(&root);
        assert_eq!(entries.len(), 1);

        let a = &entries[0];
        assert_eq!(a.id, "a");
        assert_eq!(a.url, "");
        assert_eq!(a.package, "");
        assert!(a.li_attr.is_none());
        assert_eq!(a.coverage.as_deref(), Some("50%"));

        let b = &a.children[0];
        assert_eq!(b.package, "a.b");
        assert_eq!(b.url, "a/b/pkg-summary.html");
        assert_eq!(b.a_attr["href"], "a/b/pkg-summary.html");
        assert_eq!(b.coverage.as_deref(), Some("75%"));
        assert!(b.children.is_empty());
    }

    #[test]
    fn test_tree_entry_includes_classes() {
        let facts = vec![ClassCoverageFact::new("a.Foo", 0, 0, "a/Foo.html").unwrap()];
        let root = build_package_tree(&facts, &ReportOptions::default()).unwrap();
        let value = serde_json::to_value(TreeEntry::from_root(&root)).unwrap();
        assert_eq!(value["kind"], "project");
        let class = &value["children"][0]["children"][0];
        assert_eq!(class["kind"], "class");
        assert_eq!(class["url"], "a/Foo.html");
        assert!(class["coverage"].is_null());
        assert!(class.get("children").is_none());
    }
}
