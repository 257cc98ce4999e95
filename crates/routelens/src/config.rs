//! Analyzer configuration.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default maximum number of modules to load (DoS protection).
pub const DEFAULT_MAX_MODULES: usize = 10_000;

/// Maximum file size in bytes (10 MB).
///
/// Larger files are skipped rather than read into memory.
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default bound on chained import-following during handler and return
/// resolution.
pub const DEFAULT_MAX_IMPORT_DEPTH: usize = 8;

/// Extensions treated as JavaScript/TypeScript, in resolution order.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// Dependency-management directories never entered by the loader.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Configuration shared by every stage of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Base directory for relative entry paths. Falls back to the process cwd.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// Directory names excluded from the import graph.
    pub ignored_dirs: Vec<String>,

    /// File extensions (without dot) accepted as source modules.
    pub extensions: Vec<String>,

    /// Path aliases applied before relative resolution (e.g. `@` → `./src`).
    pub path_aliases: IndexMap<String, String>,

    /// Maximum number of modules loaded from the entry's import graph.
    pub max_modules: usize,

    /// Files larger than this many bytes are skipped.
    pub max_file_size: usize,

    /// How many `import` hops handler/return resolution may follow.
    pub max_import_depth: usize,

    /// Directory names searched for service modules by return resolution.
    pub service_dirs: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            cwd: None,
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            path_aliases: IndexMap::new(),
            max_modules: DEFAULT_MAX_MODULES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_import_depth: DEFAULT_MAX_IMPORT_DEPTH,
            service_dirs: vec!["services".to_string()],
        }
    }
}

impl AnalyzerConfig {
    /// Whether `ext` (without dot) is an accepted source extension.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "maxModules": 5, "serviceDirs": ["svc"] }"#).unwrap();

        assert_eq!(config.max_modules, 5);
        assert_eq!(config.service_dirs, vec!["svc".to_string()]);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert!(config.ignored_dirs.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_accepts_extension_is_case_insensitive() {
        let config = AnalyzerConfig::default();
        assert!(config.accepts_extension("TS"));
        assert!(config.accepts_extension("cjs"));
        assert!(!config.accepts_extension("json"));
    }
}
