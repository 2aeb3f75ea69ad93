#![allow(dead_code)]

use std::path::{Path, PathBuf};

use covtree::model::ClassCoverageFact;
use covtree::ReportOptions;
use tempfile::TempDir;

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Copy a fixture into a fresh temp dir under `dest_name`, returning the dir
/// handle and the copied path. The caller must hold onto `TempDir`.
pub fn copy_fixture(name: &str, dest_name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(dest_name);
    std::fs::copy(fixture(name), &path).unwrap();
    (dir, path)
}

/// Write `content` to `name` inside `dir`.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A fact whose anchor is derived from its name.
pub fn fact(name: &str, total: i64, covered: i64) -> ClassCoverageFact {
    ClassCoverageFact::new(name, total, covered, format!("{name}.html")).unwrap()
}

/// Options without a timestamp so root ids are stable.
pub fn options(project: &str) -> ReportOptions {
    ReportOptions {
        project_name: project.to_string(),
        ..ReportOptions::default()
    }
}
