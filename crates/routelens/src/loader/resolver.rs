//! Module specifier resolution.
//!
//! Node.js-style resolution limited to what static analysis needs: relative
//! and absolute paths, path aliases, extension probing and `index` files.
//! Bare package specifiers are external and never resolved.

use std::path::{Component, Path, PathBuf};

use path_clean::PathClean;

use crate::config::AnalyzerConfig;
use crate::runtime::FileSource;

/// Resolves import specifiers to files on a [`FileSource`].
#[derive(Debug)]
pub struct ModuleResolver<'a> {
    config: &'a AnalyzerConfig,
    cwd: &'a Path,
}

impl<'a> ModuleResolver<'a> {
    pub fn new(config: &'a AnalyzerConfig, cwd: &'a Path) -> Self {
        Self { config, cwd }
    }

    /// Resolve `specifier` as written in `from`.
    ///
    /// Order:
    /// 1. Path aliases (resolved against cwd)
    /// 2. Relative or absolute paths (resolved against `from`'s directory)
    /// 3. Anything else is an external package and yields `None`
    pub fn resolve(&self, specifier: &str, from: &Path, fs: &dyn FileSource) -> Option<PathBuf> {
        let candidate = if let Some(aliased) = self.apply_alias(specifier) {
            aliased
        } else if specifier.starts_with('.') || specifier.starts_with('/') {
            let base = from.parent().unwrap_or(self.cwd);
            base.join(specifier)
        } else {
            return None;
        };

        self.resolve_file(&candidate, fs)
    }

    /// Probe `candidate` as a file, then with each extension appended, then as
    /// a directory containing an `index` file.
    pub fn resolve_file(&self, candidate: &Path, fs: &dyn FileSource) -> Option<PathBuf> {
        let candidate = candidate.to_path_buf().clean();
        if self.is_ignored(&candidate) {
            return None;
        }

        if fs.is_file(&candidate) && self.has_source_extension(&candidate) {
            return Some(candidate);
        }

        for ext in &self.config.extensions {
            let with_ext = append_extension(&candidate, ext);
            if fs.is_file(&with_ext) {
                return Some(with_ext);
            }
        }

        for ext in &self.config.extensions {
            let index = candidate.join(format!("index.{ext}"));
            if fs.is_file(&index) {
                return Some(index);
            }
        }

        None
    }

    /// Whether the path runs through a dependency-management directory.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => self
                .config
                .ignored_dirs
                .iter()
                .any(|dir| name.to_str() == Some(dir.as_str())),
            _ => false,
        })
    }

    pub fn has_source_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.accepts_extension(ext))
    }

    fn apply_alias(&self, specifier: &str) -> Option<PathBuf> {
        for (alias, target) in &self.config.path_aliases {
            let rest = if specifier == alias {
                ""
            } else if let Some(rest) = specifier.strip_prefix(alias.as_str()) {
                match rest.strip_prefix('/') {
                    Some(rest) => rest,
                    None if alias.ends_with('/') => rest,
                    None => continue,
                }
            } else {
                continue;
            };

            let base = self.cwd.join(target);
            return Some(if rest.is_empty() { base } else { base.join(rest) });
        }
        None
    }
}

/// `user.controller` + `ts` is `user.controller.ts`, not `user.ts`.
fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}
