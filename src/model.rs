//! Uniform in-memory representation of per-class coverage, independent of
//! the format it was read from. Parsers produce `ClassCoverageFact`s which the
//! aggregator rolls up into the package outline and the treemap.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::error::{CovtreeError, Result};
use crate::ident::QualifiedName;

/// Coverage percentage in [0, 100], or `None` when there is nothing to cover.
#[must_use]
pub fn percent(covered: u64, total: u64) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(covered as f64 / total as f64 * 100.0)
    }
}

/// Covered/total element counts. Summed as integers so that any roll-up
/// divides exactly once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub covered: u64,
    pub total: u64,
}

impl Totals {
    #[must_use]
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        percent(self.covered, self.total)
    }

    /// `None` if either count overflows.
    #[must_use]
    pub fn checked_add(self, rhs: Totals) -> Option<Totals> {
        Some(Totals {
            covered: self.covered.checked_add(rhs.covered)?,
            total: self.total.checked_add(rhs.total)?,
        })
    }
}

/// Unchecked; sums of indexed facts never exceed the index's grand total,
/// which `CoverageIndex::build` checks.
impl Add for Totals {
    type Output = Totals;

    fn add(self, rhs: Totals) -> Totals {
        Totals {
            covered: self.covered + rhs.covered,
            total: self.total + rhs.total,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, rhs: Totals) {
        self.covered += rhs.covered;
        self.total += rhs.total;
    }
}

impl std::iter::Sum for Totals {
    fn sum<I: Iterator<Item = Totals>>(iter: I) -> Totals {
        iter.fold(Totals::default(), Add::add)
    }
}

/// Which source tree a class was compiled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Application,
    Test,
}

/// Coverage of a single class (or nested class) as reported by the
/// instrumentation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FactRecord", into = "FactRecord")]
pub struct ClassCoverageFact {
    pub fully_qualified_name: String,
    pub elements_total: u64,
    pub elements_covered: u64,
    pub html_anchor: String,
    pub source: SourceKind,
}

impl ClassCoverageFact {
    /// Build a fact from raw counts, rejecting negative values and
    /// `covered > total`. The name itself is validated during aggregation.
    pub fn new(
        name: impl Into<String>,
        total: i64,
        covered: i64,
        html_anchor: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if total < 0 || covered < 0 || covered > total {
            return Err(CovtreeError::InconsistentCoverageFact {
                name,
                covered,
                total,
            });
        }
        Ok(Self {
            fully_qualified_name: name,
            elements_total: total as u64,
            elements_covered: covered as u64,
            html_anchor: html_anchor.into(),
            source: SourceKind::Application,
        })
    }

    #[must_use]
    pub fn with_source(mut self, source: SourceKind) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::new(self.elements_covered, self.elements_total)
    }

    /// Check the counts invariant. Facts built through `new` always pass,
    /// but the fields are public.
    pub fn validate(&self) -> Result<()> {
        if self.elements_covered > self.elements_total {
            return Err(CovtreeError::InconsistentCoverageFact {
                name: self.fully_qualified_name.clone(),
                covered: self.elements_covered as i64,
                total: self.elements_total as i64,
            });
        }
        Ok(())
    }

    pub fn qualified_name(&self) -> Result<QualifiedName> {
        QualifiedName::parse(&self.fully_qualified_name)
    }
}

/// On-disk shape of a fact in the JSON input format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FactRecord {
    name: String,
    elements: i64,
    covered: i64,
    #[serde(default)]
    anchor: String,
    #[serde(default)]
    test: bool,
}

impl TryFrom<FactRecord> for ClassCoverageFact {
    type Error = CovtreeError;

    fn try_from(r: FactRecord) -> Result<Self> {
        let source = if r.test {
            SourceKind::Test
        } else {
            SourceKind::Application
        };
        Ok(ClassCoverageFact::new(r.name, r.elements, r.covered, r.anchor)?.with_source(source))
    }
}

impl From<ClassCoverageFact> for FactRecord {
    fn from(f: ClassCoverageFact) -> Self {
        FactRecord {
            name: f.fully_qualified_name,
            elements: f.elements_total as i64,
            covered: f.elements_covered as i64,
            anchor: f.html_anchor,
            test: f.source == SourceKind::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_zero_total_is_none() {
        assert_eq!(percent(0, 0), None);
        assert_eq!(percent(0, 5), Some(0.0));
        assert_eq!(percent(5, 5), Some(100.0));
    }

    #[test]
    fn test_totals_sum() {
        let sum: Totals = [Totals::new(10, 10), Totals::new(0, 5)].into_iter().sum();
        assert_eq!(sum, Totals::new(10, 15));
        let pct = sum.percent().unwrap();
        assert!((pct - 66.666_666).abs() < 1e-3);
    }

    #[test]
    fn test_totals_checked_add() {
        let big = Totals::new(0, u64::MAX - 1);
        assert_eq!(big.checked_add(Totals::new(1, 1)), Some(Totals::new(1, u64::MAX)));
        assert_eq!(big.checked_add(Totals::new(0, 2)), None);
        assert_eq!(Totals::new(u64::MAX, u64::MAX).checked_add(Totals::new(1, 0)), None);
    }

    #[test]
    fn test_fact_rejects_inconsistent_counts() {
        for (total, covered) in [(5, 6), (-1, 0), (5, -1)] {
            let err = ClassCoverageFact::new("a.B", total, covered, "").unwrap_err();
            assert!(matches!(err, CovtreeError::InconsistentCoverageFact { .. }));
        }
    }

    #[test]
    fn test_fact_from_json() {
        let json = r#"{"name": "a.B", "elements": 4, "covered": 3, "test": true}"#;
        let fact: ClassCoverageFact = serde_json::from_str(json).unwrap();
        assert_eq!(fact.elements_total, 4);
        assert_eq!(fact.elements_covered, 3);
        assert_eq!(fact.html_anchor, "");
        assert_eq!(fact.source, SourceKind::Test);
    }

    #[test]
    fn test_fact_from_json_rejects_covered_over_total() {
        let json = r#"{"name": "a.B", "elements": 1, "covered": 3}"#;
        let err = serde_json::from_str::<ClassCoverageFact>(json).unwrap_err();
        assert!(err.to_string().contains("Inconsistent coverage"), "{err}");
    }
}
