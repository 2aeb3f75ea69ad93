//! Optional `covtree.toml` settings. Every key has a default, so an absent
//! file and an empty file behave the same; CLI flags override file values.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::ReportOptions;
use crate::error::Result;

pub const CONFIG_FILE: &str = "covtree.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Label of the project root node.
    pub project_name: String,
    /// Where `build` writes the payload files.
    pub output_dir: PathBuf,
    /// Merge single-child package chains in the outline.
    pub compact_packages: bool,
    /// Label for classes without a package.
    pub default_package: String,
    /// Stamp the generation time into the treemap root id.
    pub timestamp: bool,
    /// Input format override (clover, jacoco, json).
    pub format: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: "Coverage".to_string(),
            output_dir: PathBuf::from("coverage-report"),
            compact_packages: true,
            default_package: "default-pkg".to_string(),
            timestamp: true,
            format: None,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    #[must_use]
    pub fn report_options(&self, now: DateTime<Utc>) -> ReportOptions {
        ReportOptions {
            project_name: self.project_name.clone(),
            default_package: self.default_package.clone(),
            generated_at: self.timestamp.then_some(now),
        }
    }
}
