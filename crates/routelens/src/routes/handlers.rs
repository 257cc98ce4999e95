//! Handler reference resolution.
//!
//! Turns a handler argument that names a function (`listUsers`,
//! `userController.list`) into the function node and the module it lives in,
//! following imports and re-exports up to the configured depth.

use oxc_ast::ast::{Expression, ObjectPropertyKind, Statement};

use crate::bindings::{Imported, export_name, find_import};
use crate::context::AnalysisContext;
use crate::diagnostics::DiagnosticKind;
use crate::loader::ParsedModule;
use crate::symbols::{self, DefaultExport, FunctionRef};
use crate::value::symbolic::{property_key_name, unwrap_expression};

/// A function together with the module that defines it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedFunction<'b, 'a> {
    pub func: FunctionRef<'b, 'a>,
    pub module: &'a ParsedModule<'a>,
}

/// Resolve a plain identifier used in `module` to a function.
///
/// Tries, in order: a declaration in the same file, an object-literal method,
/// an export alias, then the import that bound the name.
pub fn resolve_identifier<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    name: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    if let Some(func) = symbols::find_local_handler(module, name) {
        return Some(ResolvedFunction { func, module });
    }

    let binding = find_import(module, name)?;
    let target = follow(ctx, module, &binding.specifier, depth)?;
    match binding.imported {
        Imported::Named(imported) => resolve_export(ctx, target, &imported, depth + 1),
        Imported::Default | Imported::Module => resolve_default(ctx, target, depth + 1),
        Imported::Namespace => None,
    }
}

/// Resolve `object.method` used in `module`, where `object` is a local or
/// imported object literal, class or class instance.
pub fn resolve_member<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    object: &str,
    method: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    if let Some(func) = symbols::find_member(module, object, method) {
        return Some(ResolvedFunction { func, module });
    }

    // `const service = new UserService()` with `UserService` imported
    if let Some(Expression::NewExpression(new)) = symbols::variable_init(module, object) {
        if let Expression::Identifier(class) = &new.callee {
            return imported_class_method(ctx, module, class.name.as_str(), method, depth);
        }
    }

    let binding = find_import(module, object)?;
    let target = follow(ctx, module, &binding.specifier, depth)?;
    match binding.imported {
        Imported::Named(imported) => resolve_member(ctx, target, &imported, method, depth + 1),
        Imported::Namespace => resolve_export(ctx, target, method, depth + 1),
        Imported::Default => default_member(ctx, target, method, depth + 1),
        // `const svc = require("./svc")` also sees `exports.method = …`
        Imported::Module => default_member(ctx, target, method, depth + 1)
            .or_else(|| resolve_export(ctx, target, method, depth + 1)),
    }
}

/// `method` of the class imported into `module` as `class`.
fn imported_class_method<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    class: &str,
    method: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    let binding = find_import(module, class)?;
    let target = follow(ctx, module, &binding.specifier, depth)?;
    let class = match binding.imported {
        Imported::Named(imported) => symbols::find_class(target, &imported)?,
        Imported::Default | Imported::Module => match symbols::default_export(target)? {
            DefaultExport::Class(class) => class,
            _ => return None,
        },
        Imported::Namespace => return None,
    };
    symbols::class_method(class, method).map(|func| ResolvedFunction { func, module: target })
}

/// `method` on whatever `module` exports as its default.
fn default_member<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    method: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    let func = match symbols::default_export(module)? {
        DefaultExport::Object(obj) => symbols::object_method(obj, method),
        DefaultExport::Class(class) | DefaultExport::Instance(class) => {
            symbols::class_method(class, method)
        }
        DefaultExport::Identifier(local) => {
            return resolve_member(ctx, module, local, method, depth);
        }
        DefaultExport::Function(..) => None,
    };
    func.map(|func| ResolvedFunction { func, module })
}

/// Resolve the export called `name` of `module`.
pub fn resolve_export<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    name: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    if let Some(func) = symbols::find_local_handler(module, name) {
        return Some(ResolvedFunction { func, module });
    }

    if let Some((_, value)) = symbols::commonjs_exports(module)
        .into_iter()
        .find(|(export, _)| export == name)
    {
        return resolve_value(ctx, module, value, depth);
    }

    if let Some(DefaultExport::Object(obj)) = symbols::default_export(module) {
        let value = obj.properties.iter().find_map(|property| match property {
            ObjectPropertyKind::ObjectProperty(prop)
                if property_key_name(&prop.key).as_deref() == Some(name) =>
            {
                Some(&prop.value)
            }
            _ => None,
        });
        if let Some(value) = value {
            return resolve_value(ctx, module, value, depth);
        }
    }

    resolve_reexport(ctx, module, name, depth)
}

/// The module's default export, when it is (or names) a function.
fn resolve_default<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    match symbols::default_export(module)? {
        DefaultExport::Function(func, _) => Some(ResolvedFunction { func, module }),
        DefaultExport::Identifier(name) => resolve_identifier(ctx, module, name, depth),
        _ => None,
    }
}

/// A function expression, or an identifier naming one.
fn resolve_value<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    value: &'a Expression<'a>,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    if let Some(func) = FunctionRef::from_expression(value) {
        return Some(ResolvedFunction { func, module });
    }
    match unwrap_expression(value) {
        Expression::Identifier(id) => resolve_identifier(ctx, module, id.name.as_str(), depth),
        _ => None,
    }
}

/// `export { name } from "…"`, `export { x as name } from "…"` and
/// `export * from "…"`.
fn resolve_reexport<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    name: &str,
    depth: usize,
) -> Option<ResolvedFunction<'a, 'a>> {
    for stmt in &module.program.body {
        match stmt {
            Statement::ExportNamedDeclaration(export) => {
                let Some(source) = &export.source else {
                    continue;
                };
                let Some(spec) = export
                    .specifiers
                    .iter()
                    .find(|spec| export_name(&spec.exported) == name)
                else {
                    continue;
                };
                let target = follow(ctx, module, source.value.as_str(), depth)?;
                let local = export_name(&spec.local);
                return if local == "default" {
                    resolve_default(ctx, target, depth + 1)
                } else {
                    resolve_export(ctx, target, &local, depth + 1)
                };
            }
            Statement::ExportAllDeclaration(export) if export.exported.is_none() => {
                let Some(target) = follow(ctx, module, export.source.value.as_str(), depth) else {
                    continue;
                };
                if let Some(found) = resolve_export(ctx, target, name, depth + 1) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

/// Load the module `specifier` names, unless the import chain is too deep.
fn follow<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    specifier: &str,
    depth: usize,
) -> Option<&'a ParsedModule<'a>> {
    if depth >= ctx.config.max_import_depth {
        ctx.diagnostics.report(
            DiagnosticKind::Unresolved,
            Some(module.path()),
            format!(
                "import chain through '{specifier}' exceeds depth {}",
                ctx.config.max_import_depth
            ),
        );
        return None;
    }
    ctx.load_import(specifier, module.path())
}
