//! The proportional treemap dataset: project → package → class, where each
//! node's area is its element count and its color is its coverage.

use std::collections::HashSet;

use crate::aggregate::{CoverageIndex, PackageGroup, ReportOptions};
use crate::error::Result;
use crate::model::{ClassCoverageFact, Totals};

/// `$color` written for nodes without any coverable elements.
pub const NO_DATA_COLOR: f32 = -100.0;

/// Timestamp layout stamped into the root id.
const ROOT_TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S UTC0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Project,
    Package,
}

/// An aggregation node (project or package). Has no detail page of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapGroup {
    pub id: String,
    pub name: String,
    pub kind: GroupKind,
    /// Sum of the children's totals.
    pub totals: Totals,
    pub children: Vec<TreemapNode>,
}

/// A class or nested class.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapLeaf {
    pub id: String,
    pub name: String,
    pub totals: Totals,
    pub detail_path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreemapNode {
    Group(TreemapGroup),
    Class(TreemapLeaf),
}

impl TreemapNode {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            TreemapNode::Group(g) => &g.id,
            TreemapNode::Class(c) => &c.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TreemapNode::Group(g) => &g.name,
            TreemapNode::Class(c) => &c.name,
        }
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        match self {
            TreemapNode::Group(g) => g.totals,
            TreemapNode::Class(c) => c.totals,
        }
    }

    /// Element count.
    #[must_use]
    pub fn area(&self) -> u64 {
        self.totals().total
    }

    #[must_use]
    pub fn coverage(&self) -> Option<f64> {
        self.totals().percent()
    }

    /// Coverage as the renderer expects it: a single-precision percentage,
    /// or `NO_DATA_COLOR` when nothing was measured.
    #[must_use]
    pub fn color(&self) -> f32 {
        let Totals { covered, total } = self.totals();
        if total == 0 {
            NO_DATA_COLOR
        } else {
            covered as f32 / total as f32 * 100.0
        }
    }

    #[must_use]
    pub fn detail_path(&self) -> Option<&str> {
        match self {
            TreemapNode::Group(_) => None,
            TreemapNode::Class(c) => Some(&c.detail_path),
        }
    }

    #[must_use]
    pub fn children(&self) -> &[TreemapNode] {
        match self {
            TreemapNode::Group(g) => &g.children,
            TreemapNode::Class(_) => &[],
        }
    }

    /// Pre-order walk over this node and every descendant.
    #[must_use]
    pub fn walk(&self) -> Vec<&TreemapNode> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}

/// Hands out ids of the form `<name><element offset>`, appending `-N` when
/// that key is already in use.
#[derive(Debug, Default)]
struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Build the treemap from a flat set of facts.
pub fn build_treemap(facts: &[ClassCoverageFact], options: &ReportOptions) -> Result<TreemapNode> {
    let index = CoverageIndex::build(facts)?;
    options.check_default_package(&index)?;
    Ok(treemap_from_index(&index, options))
}

/// Build the treemap from an already validated index whose default-package
/// label has been checked with `ReportOptions::check_default_package`.
#[must_use]
pub fn treemap_from_index(index: &CoverageIndex, options: &ReportOptions) -> TreemapNode {
    let mut ids = IdAllocator::default();

    let root_id = match options.generated_at {
        Some(ts) => format!(
            "{} {}",
            options.project_name,
            ts.format(ROOT_TIMESTAMP_FORMAT)
        ),
        None => options.project_name.clone(),
    };
    let root_id = ids.claim(root_id);

    let mut offset: u64 = 0;
    let children: Vec<TreemapNode> = index
        .packages()
        .map(|group| package_group(group, options, &mut offset, &mut ids))
        .collect();

    TreemapNode::Group(TreemapGroup {
        id: root_id,
        name: String::new(),
        kind: GroupKind::Project,
        totals: children.iter().map(TreemapNode::totals).sum(),
        children,
    })
}

fn package_group(
    group: &PackageGroup,
    options: &ReportOptions,
    offset: &mut u64,
    ids: &mut IdAllocator,
) -> TreemapNode {
    let name = if group.name.is_empty() {
        options.default_package.clone()
    } else {
        group.name.clone()
    };
    let id = ids.claim(format!("{name}{offset}"));

    let children: Vec<TreemapNode> = group
        .classes
        .iter()
        .map(|entry| {
            let name = entry.name.class_name();
            let leaf = TreemapLeaf {
                id: ids.claim(format!("{name}{offset}")),
                name,
                totals: entry.totals(),
                detail_path: entry.fact.html_anchor.clone(),
            };
            *offset += leaf.totals.total;
            TreemapNode::Class(leaf)
        })
        .collect();

    TreemapNode::Group(TreemapGroup {
        id,
        name,
        kind: GroupKind::Package,
        totals: children.iter().map(TreemapNode::totals).sum(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fact(name: &str, total: i64, covered: i64) -> ClassCoverageFact {
        ClassCoverageFact::new(name, total, covered, format!("{name}.html")).unwrap()
    }

    fn treemap(facts: &[ClassCoverageFact]) -> TreemapNode {
        build_treemap(facts, &ReportOptions::default()).unwrap()
    }

    #[test]
    fn test_package_area_and_color() {
        let root = treemap(&[fact("A.Foo", 10, 10), fact("A.Bar", 5, 0)]);
        let a = &root.children()[0];
        assert_eq!(a.name(), "A");
        assert_eq!(a.area(), 15);
        assert!((a.coverage().unwrap() - 66.666_666_7).abs() < 1e-6);
        assert!((a.color() - 66.666_67).abs() < 1e-3);
        assert_eq!(a.detail_path(), None);
        assert_eq!(root.area(), 15);
    }

    #[test]
    fn test_zero_area_uses_sentinel() {
        let root = treemap(&[fact("B.Baz", 0, 0)]);
        let b = &root.children()[0];
        assert_eq!(b.area(), 0);
        assert_eq!(b.coverage(), None);
        assert_eq!(b.color(), NO_DATA_COLOR);
        // zero-area leaves are kept, never omitted
        assert_eq!(b.children().len(), 1);
        assert_eq!(b.children()[0].detail_path(), Some("B.Baz.html"));
    }

    #[test]
    fn test_measured_zero_is_not_sentinel() {
        let root = treemap(&[fact("C.Dead", 4, 0)]);
        assert_eq!(root.color(), 0.0);
        assert_eq!(root.coverage(), Some(0.0));
    }

    #[test]
    fn test_nested_class_is_separate_leaf() {
        let root = treemap(&[
            fact("p.ColumnMeta", 32, 17),
            fact("p.ColumnMeta$Property", 0, 0),
            fact("p.DataGenerator", 2, 2),
        ]);
        let p = &root.children()[0];
        let leaves: Vec<(&str, &str, u64)> = p
            .children()
            .iter()
            .map(|c| (c.id(), c.name(), c.area()))
            .collect();
        assert_eq!(
            leaves,
            vec![
                ("ColumnMeta0", "ColumnMeta", 32),
                ("ColumnMeta.Property32", "ColumnMeta.Property", 0),
                ("DataGenerator32", "DataGenerator", 2),
            ]
        );
        assert_eq!(p.id(), "p0");
        assert_eq!(p.area(), 34);
    }

    #[test]
    fn test_ids_offset_across_packages() {
        let root = treemap(&[fact("a.X", 3, 1), fact("b.Y", 4, 4)]);
        let ids: Vec<&str> = root.walk().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["Coverage", "a0", "X0", "b3", "Y3"]);
    }

    #[test]
    fn test_colliding_ids_are_disambiguated() {
        // a.Foo is empty, so b.Foo starts at the same offset
        let root = treemap(&[fact("a.Foo", 0, 0), fact("b.Foo", 1, 1)]);
        let ids: Vec<&str> = root.walk().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["Coverage", "a0", "Foo0", "b0", "Foo0-1"]);
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_default_package_group() {
        let root = treemap(&[fact("Main", 2, 1)]);
        assert_eq!(root.children()[0].name(), "default-pkg");
    }

    #[test]
    fn test_root_id_with_timestamp() {
        let options = ReportOptions {
            project_name: "Clover database".to_string(),
            generated_at: Some(chrono::Utc.with_ymd_and_hms(2025, 11, 12, 5, 7, 35).unwrap()),
            ..ReportOptions::default()
        };
        let root = build_treemap(&[fact("a.X", 1, 1)], &options).unwrap();
        assert_eq!(root.id(), "Clover database Wed Nov 12 2025 05:07:35 UTC0");
        assert_eq!(root.name(), "");
    }

    #[test]
    fn test_single_precision_color() {
        let root = treemap(&[fact("f.Int4SequenceSupplier", 15, 9)]);
        assert_eq!(root.color(), 60.000004_f32);
    }
}
