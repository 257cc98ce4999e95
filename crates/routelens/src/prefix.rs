//! Router mount prefixes.
//!
//! Scans every module for `app.use("<prefix>", router)` and records which
//! router identifier is mounted where. When the same router name is mounted
//! more than once, the first mount found in module order wins on lookup.

use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};

use crate::bindings::find_import;
use crate::context::AnalysisContext;
use crate::loader::ParsedModule;
use crate::model::RoutePrefix;

/// Collect mount prefixes across all modules, in module order.
pub fn collect_prefixes<'a>(
    ctx: &AnalysisContext<'a>,
    modules: &[&'a ParsedModule<'a>],
) -> Vec<RoutePrefix> {
    let mut prefixes = Vec::new();
    for &module in modules {
        let mut collector = PrefixCollector {
            ctx,
            module,
            prefixes: &mut prefixes,
        };
        collector.visit_program(&module.program);
    }
    tracing::debug!("collected {} route prefixes", prefixes.len());
    prefixes
}

struct PrefixCollector<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    prefixes: &'c mut Vec<RoutePrefix>,
}

impl PrefixCollector<'_, '_> {
    fn mount(&self, call: &CallExpression<'_>) -> Option<RoutePrefix> {
        let Expression::StaticMemberExpression(callee) = &call.callee else {
            return None;
        };
        match &callee.object {
            Expression::Identifier(id) if id.name == "app" && callee.property.name == "use" => {}
            _ => return None,
        }

        let (Some(Argument::StringLiteral(prefix)), Some(Argument::Identifier(router))) =
            (call.arguments.first(), call.arguments.get(1))
        else {
            return None;
        };

        let router_name = router.name.to_string();
        let source_file = find_import(self.module, &router_name)
            .and_then(|binding| {
                self.ctx
                    .resolver()
                    .resolve(&binding.specifier, self.module.path(), self.ctx.fs())
            });

        Some(RoutePrefix {
            prefix: prefix.value.to_string(),
            router_name,
            file_path: self.module.path().to_path_buf(),
            source_file,
        })
    }
}

impl<'a> Visit<'a> for PrefixCollector<'_, 'a> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(prefix) = self.mount(call) {
            tracing::trace!("mount {} -> {}", prefix.prefix, prefix.router_name);
            self.prefixes.push(prefix);
        }
        walk::walk_call_expression(self, call);
    }
}

/// Prefix for a `<router>.*` call in `module`.
///
/// A mount whose router was imported from `module` matches first, then a
/// mount of the same `router` identifier inside `module` itself. Otherwise
/// the first mount whose router name is one of `module`'s exported names
/// wins. No match means no prefix.
pub fn prefix_for_router<'p>(
    prefixes: &'p [RoutePrefix],
    module: &ParsedModule<'_>,
    router: &str,
    exported: &[String],
) -> &'p str {
    let module_path = module.path();
    let mount = prefixes
        .iter()
        .find(|p| p.source_file.as_deref() == Some(module_path))
        .or_else(|| {
            prefixes
                .iter()
                .find(|p| p.file_path == module_path && p.router_name == router)
        })
        .or_else(|| {
            prefixes
                .iter()
                .find(|p| exported.iter().any(|name| *name == p.router_name))
        });
    mount.map_or("", |p| p.prefix.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::runtime::MemoryFs;
    use oxc_allocator::Allocator;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_collect_prefixes_with_source_files() {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let fs = MemoryFs::new()
            .with_file(
                "/app/index.js",
                r#"
                import usersRouter from "./routes/users";
                const ordersRouter = require("./routes/orders");
                app.use(express.json());
                app.use("/api/users", usersRouter);
                app.use("/api/orders", ordersRouter);
                app.use("/health", healthRouter);
                api.use("/ignored", usersRouter);
                "#,
            )
            .with_file("/app/routes/users.js", "export default router;")
            .with_file("/app/routes/orders.js", "module.exports = router;");
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));
        let module = ctx.load(Path::new("/app/index.js")).unwrap();

        let prefixes = collect_prefixes(&ctx, &[module]);
        assert_eq!(prefixes.len(), 3);
        assert_eq!(prefixes[0].prefix, "/api/users");
        assert_eq!(prefixes[0].router_name, "usersRouter");
        assert_eq!(prefixes[0].source_file, Some(PathBuf::from("/app/routes/users.js")));
        assert_eq!(prefixes[1].source_file, Some(PathBuf::from("/app/routes/orders.js")));
        assert_eq!(prefixes[2].source_file, None);
        assert_eq!(prefixes[2].file_path, PathBuf::from("/app/index.js"));
    }

    #[test]
    fn test_prefix_lookup_order() {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let fs = MemoryFs::new().with_file("/app/routes/users.js", "export default router;");
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));
        let module = ctx.load(Path::new("/app/routes/users.js")).unwrap();

        let mount = |prefix: &str, name: &str, source: Option<&str>| RoutePrefix {
            prefix: prefix.to_string(),
            router_name: name.to_string(),
            file_path: PathBuf::from("/app/index.js"),
            source_file: source.map(PathBuf::from),
        };

        let exported = ["router".to_string()];
        let by_name = vec![mount("/first", "router", None), mount("/second", "router", None)];
        assert_eq!(prefix_for_router(&by_name, module, "router", &exported), "/first");

        let by_source = vec![
            mount("/by-name", "router", None),
            mount("/by-source", "users", Some("/app/routes/users.js")),
        ];
        assert_eq!(prefix_for_router(&by_source, module, "router", &exported), "/by-source");

        let same_file = vec![
            mount("/by-name", "router", None),
            RoutePrefix {
                file_path: PathBuf::from("/app/routes/users.js"),
                ..mount("/local", "router", None)
            },
        ];
        assert_eq!(prefix_for_router(&same_file, module, "router", &exported), "/local");

        assert_eq!(prefix_for_router(&by_name, module, "router", &["other".to_string()]), "");
    }
}
