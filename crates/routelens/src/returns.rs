//! Return values of called functions.
//!
//! Given a `function_call` descriptor such as `productService.getAll()`, find
//! the function behind it and extract what it returns. The callee is looked up
//! through the caller's own bindings first, then by convention in sibling and
//! service directories (`./productService.ts`, `./services/product.service.ts`,
//! `../services/...`). Not finding one is a normal outcome.

use std::path::{Path, PathBuf};

use oxc_ast::ast::{Expression, Statement};
use serde_json::Value;

use crate::context::AnalysisContext;
use crate::loader::ParsedModule;
use crate::routes::handlers::{self, ResolvedFunction};
use crate::samples::{TypeSampleSynthesizer, merge_sample};
use crate::symbols;
use crate::value::{ValueExtractor, call_target, is_descriptor, unwrap_expression};

const CANDIDATE_EXTENSIONS: &[&str] = &["ts", "js"];

/// Resolve the value returned by the call `descriptor` stands for.
///
/// `descriptor` is a `function_call` descriptor produced by the value
/// extractor in `module`. The callee is searched through `module`'s own
/// declarations and imports, then in conventionally named service files.
///
/// # Returns
///
/// The extracted return value merged with a sample of the declared return
/// type. `None` when no callee is found or the callee only returns another
/// unresolved call. Types with no known shape are sampled as `"<Type>"` and
/// reported as [`DiagnosticKind::SampleFallback`](crate::DiagnosticKind::SampleFallback).
///
/// # Example
///
/// ```rust,ignore
/// // services/product.service.ts:
/// //   interface Product { id: number; name: string }
/// //   export class ProductService { getAll(): Product[] { return db.all(); } }
/// let descriptor = json!({
///     "type": "function_call",
///     "object": "productService",
///     "method": "getAll",
///     "identifier": "productService.getAll()",
/// });
/// let products = resolve_call(&ctx, controller, &descriptor);
/// assert_eq!(products, Some(json!([{ "id": 1, "name": "Sample Name" }])));
/// ```
pub fn resolve_call<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    descriptor: &Value,
) -> Option<Value> {
    let (object, method) = call_target(descriptor)?;
    let found = find_callee(ctx, module, object, method)
        .or_else(|| find_by_convention(ctx, module, object, method))?;
    let identifier = descriptor
        .get("identifier")
        .and_then(Value::as_str)
        .unwrap_or(method);
    tracing::debug!("resolved {} to {}", identifier, found.module.path().display());
    return_value(ctx, found)
}

/// The callee through the caller's own declarations and imports.
fn find_callee<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    object: Option<&str>,
    method: &str,
) -> Option<ResolvedFunction<'a, 'a>> {
    match object {
        None => handlers::resolve_identifier(ctx, module, method, 0),
        Some("this") => symbols::find_definition(module, method)
            .map(|func| ResolvedFunction { func, module }),
        Some(object) if !object.contains('.') => {
            handlers::resolve_member(ctx, module, object, method, 0)
        }
        Some(_) => None,
    }
}

/// The callee in a conventionally named file near `module`.
fn find_by_convention<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    object: Option<&str>,
    method: &str,
) -> Option<ResolvedFunction<'a, 'a>> {
    // `this.userService.find()` is looked up as `userService`
    let stem = match object {
        Some(object) => object.rsplit('.').next().unwrap_or(object),
        None => method,
    };
    if stem.is_empty() || stem == "this" {
        return None;
    }

    let dir = module.path().parent()?;
    for path in candidate_paths(ctx, dir, stem) {
        if path == module.path() || !ctx.fs().is_file(&path) {
            continue;
        }
        let Some(candidate) = ctx.load(&path) else {
            continue;
        };
        if let Some(func) = symbols::find_definition(candidate, method) {
            return Some(ResolvedFunction {
                func,
                module: candidate,
            });
        }
    }
    None
}

/// Candidate files in lookup order: directories outermost, then file name
/// variants, then extensions.
fn candidate_paths(ctx: &AnalysisContext<'_>, dir: &Path, stem: &str) -> Vec<PathBuf> {
    let mut dirs = vec![dir.to_path_buf()];
    for service_dir in &ctx.config.service_dirs {
        dirs.push(dir.join(service_dir));
        dirs.push(dir.join("..").join(service_dir));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for dir in &dirs {
        for name in name_variants(stem) {
            for ext in CANDIDATE_EXTENSIONS {
                let path = ctx.normalize(&dir.join(format!("{name}.{ext}")));
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
    }
    paths
}

/// `productService` → `productService`, `productservice`, `product.service`.
fn name_variants(stem: &str) -> Vec<String> {
    let mut variants = vec![stem.to_string()];
    let mut push = |name: String| {
        if !name.is_empty() && !variants.contains(&name) {
            variants.push(name);
        }
    };

    push(stem.to_lowercase());
    let mut chars = stem.chars();
    if let Some(first) = chars.next() {
        push(first.to_lowercase().chain(chars).collect());
    }
    for suffix in ["Service", "Controller", "Repository"] {
        if let Some(base) = stem.strip_suffix(suffix) {
            if !base.is_empty() {
                push(format!("{}.{}", base.to_lowercase(), suffix.to_lowercase()));
            }
        }
    }
    variants
}

/// What `found` returns, merged with a sample of its declared return type.
fn return_value<'a>(ctx: &AnalysisContext<'a>, found: ResolvedFunction<'a, 'a>) -> Option<Value> {
    let extractor = ValueExtractor::for_module(found.module);
    let extracted = match found.func.expression_body() {
        Some(expr) => extractor.extract(expr),
        None => {
            let mut returns = Vec::new();
            if let Some(body) = found.func.body() {
                collect_returns(&body.statements, &mut returns);
            }
            returns
                .into_iter()
                .find(|arg| !is_nullish(arg))
                .and_then(|arg| extractor.extract(arg))
        }
    };

    let sample = found
        .func
        .return_type()
        .and_then(|ty| TypeSampleSynthesizer::new(ctx, found.module).sample_return_type(ty));

    let value = match (extracted, sample) {
        (Some(extracted), Some(sample)) => merge_sample(extracted, sample),
        (Some(value), None) | (None, Some(value)) => value,
        (None, None) => return None,
    };
    (!is_descriptor(&value)).then_some(value)
}

fn is_nullish(expr: &Expression<'_>) -> bool {
    match unwrap_expression(expr) {
        Expression::NullLiteral(_) => true,
        Expression::Identifier(id) => id.name.as_str() == "undefined",
        _ => false,
    }
}

/// Arguments of every `return` reachable in `stmts`, in source order,
/// without entering nested functions.
fn collect_returns<'a>(stmts: &'a [Statement<'a>], out: &mut Vec<&'a Expression<'a>>) {
    for stmt in stmts {
        collect_statement(stmt, out);
    }
}

fn collect_statement<'a>(stmt: &'a Statement<'a>, out: &mut Vec<&'a Expression<'a>>) {
    match stmt {
        Statement::ReturnStatement(ret) => {
            if let Some(argument) = &ret.argument {
                out.push(argument);
            }
        }
        Statement::BlockStatement(block) => collect_returns(&block.body, out),
        Statement::IfStatement(stmt) => {
            collect_statement(&stmt.consequent, out);
            if let Some(alternate) = &stmt.alternate {
                collect_statement(alternate, out);
            }
        }
        Statement::TryStatement(stmt) => {
            collect_returns(&stmt.block.body, out);
            if let Some(handler) = &stmt.handler {
                collect_returns(&handler.body.body, out);
            }
            if let Some(finalizer) = &stmt.finalizer {
                collect_returns(&finalizer.body, out);
            }
        }
        Statement::SwitchStatement(stmt) => {
            for case in &stmt.cases {
                collect_returns(&case.consequent, out);
            }
        }
        Statement::ForStatement(stmt) => collect_statement(&stmt.body, out),
        Statement::ForInStatement(stmt) => collect_statement(&stmt.body, out),
        Statement::ForOfStatement(stmt) => collect_statement(&stmt.body, out),
        Statement::WhileStatement(stmt) => collect_statement(&stmt.body, out),
        Statement::DoWhileStatement(stmt) => collect_statement(&stmt.body, out),
        Statement::LabeledStatement(stmt) => collect_statement(&stmt.body, out),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::diagnostics::DiagnosticKind;
    use crate::runtime::MemoryFs;
    use oxc_allocator::Allocator;
    use serde_json::json;

    fn resolve(fs: MemoryFs, from: &str, descriptor: Value) -> Option<Value> {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));
        let module = ctx.load(Path::new(from)).unwrap();
        resolve_call(&ctx, module, &descriptor)
    }

    fn call(object: Option<&str>, method: &str) -> Value {
        match object {
            Some(object) => json!({
                "type": "function_call",
                "object": object,
                "method": method,
                "identifier": format!("{object}.{method}()"),
            }),
            None => json!({
                "type": "function_call",
                "method": method,
                "identifier": format!("{method}()"),
            }),
        }
    }

    #[test]
    fn test_name_variants() {
        assert_eq!(
            name_variants("ProductService"),
            vec!["ProductService", "productservice", "productService", "product.service"]
        );
        assert_eq!(name_variants("users"), vec!["users"]);
    }

    #[test]
    fn test_conventional_service_lookup() {
        let fs = MemoryFs::new()
            .with_file("/app/controllers/product.js", "export function list(req, res) {}")
            .with_file(
                "/app/services/product.service.js",
                r#"
                module.exports = {
                    getAll() {
                        const items = [{ id: 1, price: 10 }];
                        if (!items) {
                            return null;
                        }
                        return items;
                    },
                };
                "#,
            );
        let value = resolve(fs, "/app/controllers/product.js", call(Some("productService"), "getAll"));
        assert_eq!(value, Some(json!([{"id": 1, "price": 10}])));
    }

    #[test]
    fn test_imported_callee_with_type_sample() {
        let fs = MemoryFs::new()
            .with_file(
                "/app/routes.ts",
                r#"import { findUser } from "./lib/users"; export const h = (req, res) => {};"#,
            )
            .with_file(
                "/app/lib/users.ts",
                r#"
                interface User { id: number; email: string; name: string }
                export async function findUser(id: string): Promise<User | null> {
                    return { id: 7, name: lookupName(id) };
                }
                "#,
            );
        let value = resolve(fs, "/app/routes.ts", call(None, "findUser")).unwrap();
        assert_eq!(value, json!({"id": 7, "name": "Sample Name", "email": "user@example.com"}));
    }

    #[test]
    fn test_untyped_sample_reports_fallback_once() {
        let fs = MemoryFs::new()
            .with_file(
                "/app/files.ts",
                r#"import { readAvatar } from "./storage"; export const h = (req, res) => {};"#,
            )
            .with_file(
                "/app/storage.ts",
                "export function readAvatar(): Promise<Buffer> { return disk.read(); }",
            );
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));
        let module = ctx.load(Path::new("/app/files.ts")).unwrap();

        let value = resolve_call(&ctx, module, &call(None, "readAvatar"));
        assert_eq!(value, Some(json!("<Buffer>")));
        let diagnostics = ctx.diagnostics.to_vec();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SampleFallback);
    }

    #[test]
    fn test_unresolved_and_symbolic_returns() {
        let fs = MemoryFs::new().with_file(
            "/app/index.js",
            "function wrap() { return fetchAll(); } const nothing = () => undefined;",
        );
        assert_eq!(resolve(fs.clone(), "/app/index.js", call(None, "wrap")), None);
        assert_eq!(resolve(fs.clone(), "/app/index.js", call(None, "nothing")), None);
        assert_eq!(resolve(fs, "/app/index.js", call(Some("db.users"), "find")), None);
    }
}
