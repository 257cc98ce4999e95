//! Shared helpers for routelens integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use routelens::{RouteAnalyzer, RouteReport, RouteResult};
use tempfile::TempDir;

/// Write `files` (relative path, content) under `temp` and return its root.
pub fn create_test_project(temp: &TempDir, files: &[(&str, &str)]) -> PathBuf {
    let root = temp.path().to_path_buf();
    for (path, content) in files {
        let file_path = root.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&file_path, content).unwrap();
    }
    root
}

/// Analyze `entry` (relative to `root`).
pub fn analyze(root: &Path, entry: &str) -> RouteReport {
    RouteAnalyzer::new()
        .entry(root.join(entry))
        .cwd(root)
        .analyze()
        .unwrap()
}

/// The route registered as `method path`.
pub fn route<'r>(report: &'r RouteReport, method: &str, path: &str) -> &'r RouteResult {
    report
        .routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .unwrap_or_else(|| {
            let found: Vec<String> = report
                .routes
                .iter()
                .map(|r| format!("{} {}", r.method, r.path))
                .collect();
            panic!("no route {method} {path}, found {found:?}")
        })
}

pub fn fields(set: &indexmap::IndexSet<String>) -> Vec<&str> {
    set.iter().map(String::as_str).collect()
}
