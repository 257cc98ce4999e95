//! Per-run analysis context.
//!
//! [`AnalysisContext`] is threaded through every stage. It owns the module
//! cache and the diagnostics sink, so a run has no hidden global state and two
//! runs never share anything.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

use crate::config::AnalyzerConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{AnalyzeError, Result};
use crate::loader::parser::{ParseFailure, ParsedModule, parse_module};
use crate::loader::resolver::ModuleResolver;
use crate::runtime::FileSource;

/// Why a file could not be loaded.
#[derive(Debug)]
enum LoadFailure {
    TooLarge(u64),
    Read(std::io::Error),
    Parse(ParseFailure),
}

/// Shared state of one analysis run.
pub struct AnalysisContext<'a> {
    allocator: &'a Allocator,
    pub config: &'a AnalyzerConfig,
    fs: &'a dyn FileSource,
    cwd: PathBuf,
    /// Parsed modules by cleaned absolute path. `None` marks a file that
    /// could not be loaded, so it is reported once.
    modules: RefCell<FxHashMap<PathBuf, Option<&'a ParsedModule<'a>>>>,
    pub diagnostics: Diagnostics,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        allocator: &'a Allocator,
        config: &'a AnalyzerConfig,
        fs: &'a dyn FileSource,
        cwd: PathBuf,
    ) -> Self {
        Self {
            allocator,
            config,
            fs,
            cwd,
            modules: RefCell::new(FxHashMap::default()),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn fs(&self) -> &dyn FileSource {
        self.fs
    }

    pub fn resolver(&self) -> ModuleResolver<'_> {
        ModuleResolver::new(self.config, &self.cwd)
    }

    /// Absolute, lexically cleaned form of `path`.
    pub fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    /// Resolve `specifier` imported from `from` and load the target module.
    pub fn load_import(&self, specifier: &str, from: &Path) -> Option<&'a ParsedModule<'a>> {
        let resolved = self.resolver().resolve(specifier, from, self.fs);
        match resolved {
            Some(path) => self.load(&path),
            None => {
                tracing::trace!("unresolved specifier '{}' from {}", specifier, from.display());
                None
            }
        }
    }

    /// Load a module through the cache. Failures become diagnostics.
    pub fn load(&self, path: &Path) -> Option<&'a ParsedModule<'a>> {
        let path = self.normalize(path);
        if let Some(cached) = self.modules.borrow().get(&path) {
            return *cached;
        }

        let module = match self.read_and_parse(&path) {
            Ok(module) => Some(module),
            Err(failure) => {
                self.report_failure(&path, failure);
                None
            }
        };
        self.modules.borrow_mut().insert(path, module);
        module
    }

    /// Load the entry module. Unlike [`load`](Self::load), failures are errors.
    pub fn load_entry(&self, path: &Path) -> Result<&'a ParsedModule<'a>> {
        let path = self.normalize(path);
        if !self.resolver().has_source_extension(&path) {
            return Err(AnalyzeError::UnsupportedEntry { path });
        }

        let module = self.read_and_parse(&path).map_err(|failure| match failure {
            LoadFailure::TooLarge(size) => AnalyzeError::EntryTooLarge {
                path: path.clone(),
                size,
                max: self.config.max_file_size,
            },
            LoadFailure::Read(source) => AnalyzeError::EntryUnreadable {
                path: path.clone(),
                source,
            },
            LoadFailure::Parse(ParseFailure::UnsupportedType) => {
                AnalyzeError::UnsupportedEntry { path: path.clone() }
            }
            LoadFailure::Parse(ParseFailure::Syntax(message)) => AnalyzeError::EntryUnparsable {
                path: path.clone(),
                message,
            },
        })?;

        self.modules.borrow_mut().insert(path, Some(module));
        Ok(module)
    }

    /// Number of modules parsed successfully so far.
    pub fn loaded_count(&self) -> usize {
        self.modules.borrow().values().filter(|m| m.is_some()).count()
    }

    fn read_and_parse(&self, path: &Path) -> std::result::Result<&'a ParsedModule<'a>, LoadFailure> {
        if let Some(size) = self.fs.file_size(path) {
            if size > self.config.max_file_size as u64 {
                return Err(LoadFailure::TooLarge(size));
            }
        }

        let source = self.fs.read_to_string(path).map_err(LoadFailure::Read)?;
        if source.len() > self.config.max_file_size {
            return Err(LoadFailure::TooLarge(source.len() as u64));
        }

        tracing::debug!("parsing {}", path.display());
        parse_module(self.allocator, path, &source).map_err(LoadFailure::Parse)
    }

    fn report_failure(&self, path: &Path, failure: LoadFailure) {
        match failure {
            LoadFailure::TooLarge(size) => self.diagnostics.report(
                DiagnosticKind::FileSkipped,
                Some(path),
                format!(
                    "file is too large: {size} bytes (max: {} bytes)",
                    self.config.max_file_size
                ),
            ),
            LoadFailure::Read(err) => self.diagnostics.report(
                DiagnosticKind::FileSkipped,
                Some(path),
                format!("failed to read file: {err}"),
            ),
            LoadFailure::Parse(ParseFailure::UnsupportedType) => self.diagnostics.report(
                DiagnosticKind::FileSkipped,
                Some(path),
                "not a JavaScript or TypeScript file",
            ),
            LoadFailure::Parse(ParseFailure::Syntax(message)) => self.diagnostics.report(
                DiagnosticKind::ParseFailed,
                Some(path),
                format!("failed to parse: {message}"),
            ),
        }
    }
}

impl std::fmt::Debug for AnalysisContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("cwd", &self.cwd)
            .field("modules", &self.modules.borrow().len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}
