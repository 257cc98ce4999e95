//! Source graph loading.
//!
//! Walks the static import graph from the entry file in breadth-first order,
//! parsing each reachable JavaScript/TypeScript module once. Files that cannot
//! be read or parsed are dropped with a diagnostic; the walk continues with
//! whatever parses.

pub mod parser;
pub mod resolver;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::context::AnalysisContext;
use crate::error::{AnalyzeError, Result};

pub use parser::ParsedModule;

/// Load every module reachable from `entry`, entry first, in BFS order.
pub fn load_graph<'a>(ctx: &AnalysisContext<'a>, entry: &Path) -> Result<Vec<&'a ParsedModule<'a>>> {
    let entry_module = ctx.load_entry(entry)?;
    let entry_path = entry_module.path().to_path_buf();

    let mut modules = Vec::new();
    let mut visited: FxHashSet<PathBuf> = FxHashSet::default();
    let mut queue = VecDeque::new();

    visited.insert(entry_path.clone());
    queue.push_back(entry_path);

    while let Some(current) = queue.pop_front() {
        let Some(module) = ctx.load(&current) else {
            continue;
        };

        if modules.len() >= ctx.config.max_modules {
            return Err(AnalyzeError::TooManyModules {
                count: modules.len() + 1,
                max: ctx.config.max_modules,
            });
        }
        modules.push(module);

        let resolver = ctx.resolver();
        for specifier in parser::collect_specifiers(&module.program) {
            let Some(resolved) = resolver.resolve(&specifier, &current, ctx.fs()) else {
                continue;
            };
            if visited.insert(resolved.clone()) {
                tracing::trace!("queueing {} (from {})", resolved.display(), current.display());
                queue.push_back(resolved);
            }
        }
    }

    tracing::debug!("loaded {} modules from {}", modules.len(), entry.display());
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::diagnostics::DiagnosticKind;
    use crate::runtime::MemoryFs;
    use oxc_allocator::Allocator;

    fn paths(modules: &[&ParsedModule<'_>]) -> Vec<PathBuf> {
        modules.iter().map(|m| m.path().to_path_buf()).collect()
    }

    #[test]
    fn test_bfs_order_and_dedup() {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let fs = MemoryFs::new()
            .with_file("/app/index.js", "import './a'; const b = require('./b');")
            .with_file("/app/a.js", "import './c'; import './b';")
            .with_file("/app/b.ts", "export * from './a';")
            .with_file("/app/c.js", "import express from 'express';");
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));

        let modules = load_graph(&ctx, Path::new("index.js")).unwrap();
        assert_eq!(
            paths(&modules),
            vec![
                PathBuf::from("/app/index.js"),
                PathBuf::from("/app/a.js"),
                PathBuf::from("/app/b.ts"),
                PathBuf::from("/app/c.js"),
            ]
        );
    }

    #[test]
    fn test_unparsable_and_ignored_files_are_dropped() {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let fs = MemoryFs::new()
            .with_file("/app/index.js", "import './broken'; import './node_modules/x/index.js';")
            .with_file("/app/broken.js", "export const = 1")
            .with_file("/app/node_modules/x/index.js", "export default 1;");
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));

        let modules = load_graph(&ctx, Path::new("/app/index.js")).unwrap();
        assert_eq!(paths(&modules), vec![PathBuf::from("/app/index.js")]);

        let diagnostics = ctx.diagnostics.to_vec();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ParseFailed);
    }

    #[test]
    fn test_module_limit() {
        let allocator = Allocator::default();
        let mut config = AnalyzerConfig::default();
        config.max_modules = 2;
        let fs = MemoryFs::new()
            .with_file("/app/index.js", "import './a'; import './b';")
            .with_file("/app/a.js", "")
            .with_file("/app/b.js", "");
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));

        let err = load_graph(&ctx, Path::new("/app/index.js")).unwrap_err();
        assert!(matches!(err, AnalyzeError::TooManyModules { count: 3, max: 2 }));
    }
}
