//! Route analysis entry point.
//!
//! [`RouteAnalyzer`] loads the import graph of an Express-style server,
//! collects router mount prefixes and extracts every route with its request
//! fields and response shapes. Nothing is executed.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use serde::Serialize;

use crate::config::AnalyzerConfig;
use crate::context::AnalysisContext;
use crate::diagnostics::Diagnostic;
use crate::error::{AnalyzeError, Result};
use crate::loader::load_graph;
use crate::model::RouteResult;
use crate::prefix::collect_prefixes;
use crate::routes::find_routes;
use crate::runtime::{FileSource, NativeFs};

/// Typestate marker for an analyzer without an entry file.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured;

/// Typestate marker for an analyzer with an entry file.
#[derive(Debug, Clone, Copy)]
pub struct Configured;

/// Outcome of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct RouteReport {
    /// Routes in module order, then source order.
    pub routes: Vec<RouteResult>,
    /// Modules of the import graph, entry first.
    pub files: Vec<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Static route analyzer.
///
/// `analyze()` is only available once an entry file has been set.
///
/// # Example
///
/// ```rust,no_run
/// use routelens::RouteAnalyzer;
///
/// # fn example() -> routelens::Result<()> {
/// let report = RouteAnalyzer::new()
///     .entry("src/server.ts")
///     .path_alias("@", "./src")
///     .analyze()?;
///
/// for route in &report.routes {
///     println!("{} {}", route.method, route.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RouteAnalyzer<'f, State = Unconfigured> {
    config: AnalyzerConfig,
    entry: Option<PathBuf>,
    fs: Option<&'f dyn FileSource>,
    _state: PhantomData<State>,
}

impl RouteAnalyzer<'_, Unconfigured> {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            entry: None,
            fs: None,
            _state: PhantomData,
        }
    }
}

impl Default for RouteAnalyzer<'_, Unconfigured> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'f, State> RouteAnalyzer<'f, State> {
    /// Set the entry file, making the analyzer runnable.
    pub fn entry(self, path: impl Into<PathBuf>) -> RouteAnalyzer<'f, Configured> {
        RouteAnalyzer {
            config: self.config,
            entry: Some(path.into()),
            fs: self.fs,
            _state: PhantomData,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Base directory for relative paths.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.config.cwd = Some(cwd.into());
        self
    }

    /// Add a path alias for import resolution (`@` → `./src`).
    pub fn path_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.config.path_aliases.insert(from.into(), to.into());
        self
    }

    /// Maximum number of modules loaded from the import graph.
    pub fn max_modules(mut self, max: usize) -> Self {
        self.config.max_modules = max;
        self
    }

    /// Files larger than `max` bytes are skipped.
    pub fn max_file_size(mut self, max: usize) -> Self {
        self.config.max_file_size = max;
        self
    }

    /// How many import hops handler and return resolution may follow.
    pub fn max_import_depth(mut self, depth: usize) -> Self {
        self.config.max_import_depth = depth;
        self
    }

    /// Read sources through `fs` instead of the native filesystem.
    pub fn file_source(mut self, fs: &'f dyn FileSource) -> Self {
        self.fs = Some(fs);
        self
    }
}

impl RouteAnalyzer<'_, Configured> {
    /// Run the analysis.
    pub fn analyze(self) -> Result<RouteReport> {
        let cwd = match &self.config.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().map_err(AnalyzeError::CurrentDir)?,
        };
        let entry = self.entry.as_deref().unwrap_or_else(|| Path::new(""));
        let fs: &dyn FileSource = self.fs.unwrap_or(&NativeFs);

        let allocator = Allocator::default();
        let ctx = AnalysisContext::new(&allocator, &self.config, fs, cwd);

        let modules = load_graph(&ctx, entry)?;
        let prefixes = collect_prefixes(&ctx, &modules);

        let mut routes = Vec::new();
        for &module in &modules {
            routes.extend(find_routes(&ctx, module, &prefixes));
        }
        tracing::info!(
            "found {} routes in {} modules ({} diagnostics)",
            routes.len(),
            modules.len(),
            ctx.diagnostics.len()
        );

        Ok(RouteReport {
            routes,
            files: modules.iter().map(|m| m.path().to_path_buf()).collect(),
            diagnostics: ctx.diagnostics.to_vec(),
        })
    }
}

/// Analyze the server rooted at `entry` with default settings.
pub fn analyze_routes(entry: impl Into<PathBuf>) -> Result<Vec<RouteResult>> {
    Ok(RouteAnalyzer::new().entry(entry).analyze()?.routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MemoryFs;

    #[test]
    fn test_analyze_in_memory_project() {
        let fs = MemoryFs::new()
            .with_file(
                "/srv/index.ts",
                r#"
                import express from "express";
                import users from "./routes/users";
                const app = express();
                app.use("/api/users", users);
                app.get("/", (req, res) => res.send("home"));
                "#,
            )
            .with_file(
                "/srv/routes/users.ts",
                r#"
                const router = express.Router();
                router.post("/", (req, res) => {
                    const { name } = req.body;
                    res.status(201).json({ name });
                });
                export default router;
                "#,
            )
            .with_file("/srv/broken.ts", "export const = ;");

        let report = RouteAnalyzer::new()
            .entry("index.ts")
            .cwd("/srv")
            .file_source(&fs)
            .analyze()
            .unwrap();

        let summary: Vec<(&str, &str)> = report
            .routes
            .iter()
            .map(|r| (r.method.as_str(), r.path.as_str()))
            .collect();
        assert_eq!(summary, vec![("GET", "/"), ("POST", "/api/users/")]);
        assert_eq!(
            report.files,
            vec![PathBuf::from("/srv/index.ts"), PathBuf::from("/srv/routes/users.ts")]
        );
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_entry_errors() {
        let fs = MemoryFs::new().with_file("/srv/a.ts", "import './b'; import './c';");
        let missing = RouteAnalyzer::new()
            .entry("/srv/missing.ts")
            .cwd("/srv")
            .file_source(&fs)
            .analyze();
        assert!(matches!(missing, Err(AnalyzeError::EntryUnreadable { .. })));

        let fs = fs
            .with_file("/srv/b.ts", "export {};")
            .with_file("/srv/c.ts", "export {};");
        let limited = RouteAnalyzer::new()
            .entry("/srv/a.ts")
            .cwd("/srv")
            .max_modules(2)
            .file_source(&fs)
            .analyze();
        assert!(matches!(limited, Err(AnalyzeError::TooManyModules { count: 3, max: 2 })));
    }
}
