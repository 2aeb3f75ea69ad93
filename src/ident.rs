//! Validation and decomposition of fully-qualified class names.
//!
//! Names use dots between package segments and the JVM binary-name `$`
//! separator for nested types:
//!
//!   guru.mikelue.foxglove.ColumnMeta$Property
//!   └──── package ──────┘ └ outer ┘ └nested┘
//!
//! A name without any dot before the first `$` lives in the default package.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CovtreeError, Result};

/// Package segments and outer class names: Java identifiers without `$`.
static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L}_][\p{L}\p{N}_]*$").unwrap());

/// Nested class segments may also be numeric (anonymous classes, `Outer$1`).
static NESTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\p{L}\p{N}_]+$").unwrap());

/// A validated fully-qualified class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    package: Vec<String>,
    /// Outer class first, then each nested type.
    class: Vec<String>,
}

impl QualifiedName {
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(malformed(name, "name is empty"));
        }

        let mut parts = name.split('$');
        // split always yields at least one item
        let head = parts.next().unwrap_or_default();
        let nested: Vec<&str> = parts.collect();

        let mut segments: Vec<&str> = head.split('.').collect();
        let outer = segments.pop().unwrap_or_default();

        for segment in &segments {
            check_segment(name, segment, &IDENT_RE, "package segment")?;
        }
        check_segment(name, outer, &IDENT_RE, "class name")?;
        for segment in &nested {
            check_segment(name, segment, &NESTED_RE, "nested class name")?;
        }

        let mut class = Vec::with_capacity(1 + nested.len());
        class.push(outer.to_string());
        class.extend(nested.iter().map(|s| s.to_string()));

        Ok(Self {
            package: segments.into_iter().map(String::from).collect(),
            class,
        })
    }

    /// Dotted package name; empty for the default package.
    #[must_use]
    pub fn package(&self) -> String {
        self.package.join(".")
    }

    #[must_use]
    pub fn package_segments(&self) -> &[String] {
        &self.package
    }

    #[must_use]
    pub fn is_default_package(&self) -> bool {
        self.package.is_empty()
    }

    /// Class name as shown in reports, nested types joined with `.`
    /// (`ColumnMeta.Property`).
    #[must_use]
    pub fn class_name(&self) -> String {
        self.class.join(".")
    }

    #[must_use]
    pub fn outer_class(&self) -> &str {
        &self.class[0]
    }

    #[must_use]
    pub fn is_nested(&self) -> bool {
        self.class.len() > 1
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.package {
            write!(f, "{segment}.")?;
        }
        f.write_str(&self.class.join("$"))
    }
}

fn check_segment(name: &str, segment: &str, re: &Regex, what: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(malformed(name, &format!("empty {what}")));
    }
    if !re.is_match(segment) {
        return Err(malformed(name, &format!("invalid {what} '{segment}'")));
    }
    Ok(())
}

fn malformed(name: &str, reason: &str) -> CovtreeError {
    CovtreeError::MalformedIdentifier {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
