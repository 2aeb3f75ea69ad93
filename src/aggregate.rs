//! Validation and package grouping shared by the outline and treemap
//! builders.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CovtreeError, Result};
use crate::ident::QualifiedName;
use crate::model::{ClassCoverageFact, SourceKind, Totals};

/// Presentation settings that affect the built trees.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Label of the project root node.
    pub project_name: String,
    /// Label used for classes without a package.
    pub default_package: String,
    /// Stamped into the treemap root id when present.
    pub generated_at: Option<DateTime<Utc>>,
}

impl ReportOptions {
    /// The default-package node shares the id space of named packages, so
    /// its label must not name an indexed package or one of its prefixes.
    pub fn check_default_package(&self, index: &CoverageIndex) -> Result<()> {
        if index.package("").is_none() {
            return Ok(());
        }
        let label = self.default_package.as_str();
        let clashes = index.packages().any(|group| {
            group.name == label
                || group
                    .name
                    .strip_prefix(label)
                    .is_some_and(|rest| rest.starts_with('.'))
        });
        if clashes {
            return Err(CovtreeError::DefaultPackageCollision(label.to_string()));
        }
        Ok(())
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            project_name: "Coverage".to_string(),
            default_package: "default-pkg".to_string(),
            generated_at: None,
        }
    }
}

/// A validated fact with its decomposed name.
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub name: QualifiedName,
    pub fact: ClassCoverageFact,
}

impl ClassEntry {
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.fact.totals()
    }
}

/// All classes declared directly in one package.
#[derive(Debug, Clone)]
pub struct PackageGroup {
    /// Dotted package name, empty for the default package.
    pub name: String,
    /// Sorted by class path, so nested classes follow their outer class.
    pub classes: Vec<ClassEntry>,
    pub totals: Totals,
}

impl PackageGroup {
    /// A package is a test package when every class in it is.
    #[must_use]
    pub fn source(&self) -> SourceKind {
        if !self.classes.is_empty()
            && self.classes.iter().all(|c| c.fact.source == SourceKind::Test)
        {
            SourceKind::Test
        } else {
            SourceKind::Application
        }
    }

    /// Relative directory of the package's report pages (`guru/mikelue`).
    #[must_use]
    pub fn path(&self) -> String {
        self.name.replace('.', "/")
    }
}

/// Facts grouped by package, in package-name order.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    packages: BTreeMap<String, PackageGroup>,
}

impl CoverageIndex {
    /// Validate every fact and group them by package. Fails on the first
    /// malformed name, inconsistent count or duplicate class; nothing is
    /// returned for a partially valid input.
    pub fn build(facts: &[ClassCoverageFact]) -> Result<Self> {
        let mut seen: HashSet<QualifiedName> = HashSet::with_capacity(facts.len());
        let mut packages: BTreeMap<String, PackageGroup> = BTreeMap::new();
        let mut grand = Totals::default();

        for fact in facts {
            fact.validate()?;
            let name = fact.qualified_name()?;
            if !seen.insert(name.clone()) {
                return Err(CovtreeError::DuplicateClass(
                    fact.fully_qualified_name.clone(),
                ));
            }

            let overflow = || CovtreeError::CountOverflow(fact.fully_qualified_name.clone());
            grand = grand.checked_add(fact.totals()).ok_or_else(overflow)?;

            let package = name.package();
            let group = packages
                .entry(package.clone())
                .or_insert_with(|| PackageGroup {
                    name: package,
                    classes: Vec::new(),
                    totals: Totals::default(),
                });
            group.totals = group.totals.checked_add(fact.totals()).ok_or_else(overflow)?;
            group.classes.push(ClassEntry {
                name,
                fact: fact.clone(),
            });
        }

        for group in packages.values_mut() {
            group.classes.sort_by(|a, b| a.name.cmp(&b.name));
        }

        debug!(
            classes = facts.len(),
            packages = packages.len(),
            "indexed coverage facts"
        );

        Ok(Self { packages })
    }

    pub fn packages(&self) -> impl Iterator<Item = &PackageGroup> {
        self.packages.values()
    }

    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageGroup> {
        self.packages.get(name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Totals over every fact.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.packages.values().map(|p| p.totals).sum()
    }

    /// Number of class facts.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.packages.values().map(|p| p.classes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(name: &str, total: i64, covered: i64) -> ClassCoverageFact {
        ClassCoverageFact::new(name, total, covered, "").unwrap()
    }

    #[test]
    fn test_groups_by_package() {
        let facts = vec![
            fact("a.b.Foo", 10, 5),
            fact("a.Bar", 4, 4),
            fact("a.b.Baz", 2, 0),
            fact("Main", 1, 1),
        ];
        let index = CoverageIndex::build(&facts).unwrap();

        let names: Vec<&str> = index.packages().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["", "a", "a.b"]);
        assert_eq!(index.package("a.b").unwrap().totals, Totals::new(5, 12));
        assert_eq!(index.totals(), Totals::new(10, 17));
        assert_eq!(index.class_count(), 4);
    }

    #[test]
    fn test_nested_classes_follow_outer() {
        let facts = vec![
            fact("p.OuterX", 1, 1),
            fact("p.Outer$Inner", 0, 0),
            fact("p.Outer", 3, 1),
        ];
        let index = CoverageIndex::build(&facts).unwrap();
        let classes: Vec<String> = index
            .package("p")
            .unwrap()
            .classes
            .iter()
            .map(|c| c.name.class_name())
            .collect();
        assert_eq!(classes, vec!["Outer", "Outer.Inner", "OuterX"]);
    }

    #[test]
    fn test_duplicate_class_fails() {
        let facts = vec![fact("a.Foo", 1, 1), fact("a.Foo", 2, 1)];
        let err = CoverageIndex::build(&facts).unwrap_err();
        assert!(matches!(err, CovtreeError::DuplicateClass(ref n) if n == "a.Foo"));
    }

    #[test]
    fn test_malformed_name_fails() {
        let facts = vec![fact("a.Foo", 1, 1), fact("", 0, 0)];
        let err = CoverageIndex::build(&facts).unwrap_err();
        assert!(matches!(err, CovtreeError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_tampered_fact_fails() {
        let mut bad = fact("a.Foo", 1, 1);
        bad.elements_covered = 7;
        let err = CoverageIndex::build(&[bad]).unwrap_err();
        assert!(matches!(err, CovtreeError::InconsistentCoverageFact { .. }));
    }

    #[test]
    fn test_test_package_source() {
        let facts = vec![
            fact("t.ATest", 1, 1).with_source(SourceKind::Test),
            fact("m.Main", 1, 1),
            fact("m.MainTest", 1, 1).with_source(SourceKind::Test),
        ];
        let index = CoverageIndex::build(&facts).unwrap();
        assert_eq!(index.package("t").unwrap().source(), SourceKind::Test);
        assert_eq!(index.package("m").unwrap().source(), SourceKind::Application);
        assert_eq!(index.package("m").unwrap().path(), "m");
    }

    #[test]
    fn test_count_overflow_fails() {
        let facts: Vec<ClassCoverageFact> = (0..3)
            .map(|i| fact(&format!("a.C{i}"), i64::MAX, 0))
            .collect();
        let err = CoverageIndex::build(&facts).unwrap_err();
        assert!(matches!(err, CovtreeError::CountOverflow(ref n) if n == "a.C2"), "{err}");
    }

    #[test]
    fn test_overflow_across_packages_fails() {
        let facts: Vec<ClassCoverageFact> = (0..3)
            .map(|i| fact(&format!("p{i}.C"), i64::MAX, i64::MAX))
            .collect();
        assert!(matches!(
            CoverageIndex::build(&facts),
            Err(CovtreeError::CountOverflow(_))
        ));
    }

    #[test]
    fn test_default_package_label_collision() {
        let index = CoverageIndex::build(&[fact("Main", 1, 1), fact("app.core.Foo", 1, 0)]).unwrap();
        let options = |label: &str| ReportOptions {
            default_package: label.to_string(),
            ..ReportOptions::default()
        };

        for label in ["app", "app.core"] {
            let err = options(label).check_default_package(&index).unwrap_err();
            assert!(matches!(err, CovtreeError::DefaultPackageCollision(ref l) if l == label));
        }
        assert!(options("ap").check_default_package(&index).is_ok());
        assert!(options("default-pkg").check_default_package(&index).is_ok());

        // no unnamed classes, nothing to collide with
        let named = CoverageIndex::build(&[fact("app.Foo", 1, 1)]).unwrap();
        assert!(options("app").check_default_package(&named).is_ok());
    }
}
