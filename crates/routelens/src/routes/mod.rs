//! Route registration discovery.
//!
//! Finds `<object>.<method>(path, ...handlers)` calls, resolves every handler
//! argument and hands each one to the handler analyzer.

pub mod handlers;

use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{Visit, walk};

use crate::context::AnalysisContext;
use crate::diagnostics::DiagnosticKind;
use crate::handler::analyze_handler;
use crate::loader::ParsedModule;
use crate::model::{DYNAMIC_PATH, RoutePrefix, RouteResult, join_route_path};
use crate::prefix::prefix_for_router;
use crate::symbols::{self, FunctionRef};
use crate::value::symbolic::expression_label;
use crate::value::unwrap_expression;

use handlers::ResolvedFunction;

/// Identifiers treated as an application or router.
pub const ROUTER_OBJECTS: &[&str] = &["app", "router", "server", "express"];

/// Registration methods, lower case.
pub const ROUTE_METHODS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "all", "use", "head", "options",
];

/// Every route registered in `module`, in source order.
pub fn find_routes<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    prefixes: &[RoutePrefix],
) -> Vec<RouteResult> {
    let mut finder = RouteFinder {
        ctx,
        module,
        prefixes,
        exported: symbols::exported_names(module),
        routes: Vec::new(),
    };
    finder.visit_program(&module.program);
    tracing::debug!("{} routes in {}", finder.routes.len(), module.path().display());
    finder.routes
}

struct RouteFinder<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    prefixes: &'c [RoutePrefix],
    exported: Vec<String>,
    routes: Vec<RouteResult>,
}

impl<'a> RouteFinder<'_, 'a> {
    fn register(&mut self, call: &CallExpression<'a>) {
        let Expression::StaticMemberExpression(callee) = &call.callee else {
            return;
        };
        let Expression::Identifier(object) = &callee.object else {
            return;
        };
        let object = object.name.as_str();
        let method = callee.property.name.as_str();
        if !ROUTER_OBJECTS.contains(&object) || !ROUTE_METHODS.contains(&method) {
            return;
        }

        let path = route_path(call.arguments.first());
        let prefix = match object {
            "router" => prefix_for_router(self.prefixes, self.module, object, &self.exported),
            _ => "",
        };
        let full_path = join_route_path(prefix, &path);
        let http_method = method.to_uppercase();

        for argument in call.arguments.iter().skip(1) {
            let Some(expr) = argument.as_expression() else {
                continue;
            };
            let route = RouteResult::new(&http_method, &full_path, self.module.path().to_path_buf());

            if let Some(func) = FunctionRef::from_expression(expr) {
                self.routes.push(analyze_handler(self.ctx, self.module, func, route));
                continue;
            }

            match self.resolve_handler(expr) {
                Some(Some(found)) => {
                    self.routes
                        .push(analyze_handler(self.ctx, found.module, found.func, route));
                }
                Some(None) if method != "use" => self.ctx.diagnostics.report(
                    DiagnosticKind::Unresolved,
                    Some(self.module.path()),
                    format!(
                        "handler '{}' for {http_method} {full_path} was not resolved",
                        expression_label(expr, Some(self.module))
                    ),
                ),
                _ => {}
            }
        }
    }

    /// `None` when `expr` is not a handler reference at all (a middleware
    /// factory call, say); `Some(None)` when it is one but does not resolve.
    fn resolve_handler(&self, expr: &Expression<'a>) -> Option<Option<ResolvedFunction<'a, 'a>>> {
        match unwrap_expression(expr) {
            Expression::Identifier(id) => Some(handlers::resolve_identifier(
                self.ctx,
                self.module,
                id.name.as_str(),
                0,
            )),
            Expression::StaticMemberExpression(member) => match &member.object {
                Expression::Identifier(object) => Some(handlers::resolve_member(
                    self.ctx,
                    self.module,
                    object.name.as_str(),
                    member.property.name.as_str(),
                    0,
                )),
                _ => Some(None),
            },
            // `controller.list.bind(controller)`
            Expression::CallExpression(call) => match &call.callee {
                Expression::StaticMemberExpression(callee)
                    if callee.property.name.as_str() == "bind" =>
                {
                    self.resolve_handler(&callee.object)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl<'a> Visit<'a> for RouteFinder<'_, 'a> {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        self.register(call);
        walk::walk_call_expression(self, call);
    }
}

/// The literal path argument, or [`DYNAMIC_PATH`].
fn route_path(argument: Option<&Argument<'_>>) -> String {
    match argument.and_then(Argument::as_expression).map(unwrap_expression) {
        Some(Expression::StringLiteral(lit)) => lit.value.to_string(),
        Some(Expression::TemplateLiteral(template)) if template.expressions.is_empty() => template
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map_or_else(String::new, |cooked| cooked.to_string()),
        _ => DYNAMIC_PATH.to_string(),
    }
}
