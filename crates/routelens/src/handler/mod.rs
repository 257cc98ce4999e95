//! Handler body analysis.
//!
//! One [`HandlerAnalyzer`] walks one handler function. It owns the route being
//! built together with the handler's variable map and local arrays, and
//! nothing survives past [`analyze_handler`], so two handlers never share
//! state.

pub mod branch;
mod request;
mod response;

use oxc_ast::ast::{
    BindingPatternKind, CallExpression, ComputedMemberExpression, Expression, IfStatement,
    StaticMemberExpression, TryStatement, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use serde_json::Value;

use crate::context::AnalysisContext;
use crate::loader::ParsedModule;
use crate::model::{BranchKey, RouteResult};
use crate::returns;
use crate::symbols::{FunctionRef, binding_name};
use crate::value::symbolic::{expression_path, function_call_descriptor, member_access_descriptor};
use crate::value::{LocalArrays, ValueExtractor, VariableMap, unwrap_expression};

use branch::{BranchStack, if_key};

/// Analyze the body of `func` and fill in `route`'s request fields and
/// responses.
pub fn analyze_handler<'a>(
    ctx: &AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    func: FunctionRef<'_, 'a>,
    route: RouteResult,
) -> RouteResult {
    let params = &func.params().items;
    let param_name = |index: usize, fallback: &str| {
        params
            .get(index)
            .and_then(|param| binding_name(&param.pattern))
            .map_or_else(|| fallback.to_string(), str::to_string)
    };

    let mut analyzer = HandlerAnalyzer {
        ctx,
        module,
        req: param_name(0, "req"),
        res: param_name(1, "res"),
        branches: BranchStack::new(),
        route,
        variables: VariableMap::new(),
        arrays: LocalArrays::new(),
    };
    tracing::debug!(
        "analyzing handler for {} {} ({}, {})",
        analyzer.route.method,
        analyzer.route.path,
        analyzer.req,
        analyzer.res
    );

    if let Some(body) = func.body() {
        analyzer.visit_function_body(body);
    }
    analyzer.route
}

/// Per-handler analysis state.
pub struct HandlerAnalyzer<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    /// Name of the request parameter.
    req: String,
    /// Name of the response parameter.
    res: String,
    branches: BranchStack,
    route: RouteResult,
    variables: VariableMap,
    arrays: LocalArrays,
}

impl<'a> HandlerAnalyzer<'_, 'a> {
    fn extractor(&self) -> ValueExtractor<'_, 'a> {
        ValueExtractor::new(&self.arrays, &self.variables, Some(self.module))
    }

    /// Extract `expr`; calls become descriptors enriched with the callee's
    /// resolved return value when one is found.
    fn extract_value(&self, expr: &Expression<'a>) -> Option<Value> {
        match unwrap_expression(expr) {
            Expression::CallExpression(call) => Some(self.call_value(call)),
            _ => self.extractor().extract(expr),
        }
    }

    /// The sample behind a call, or its descriptor.
    fn call_value(&self, call: &CallExpression<'a>) -> Value {
        let descriptor = function_call_descriptor(&call.callee, Some(self.module));
        returns::resolve_call(self.ctx, self.module, &descriptor).unwrap_or(descriptor)
    }

    fn declare(&mut self, declarator: &VariableDeclarator<'a>) {
        let Some(init) = &declarator.init else {
            return;
        };
        match &declarator.id.kind {
            BindingPatternKind::BindingIdentifier(id) => {
                let name = id.name.to_string();
                if let Expression::ArrayExpression(_) = unwrap_expression(init) {
                    let items = match self.extractor().extract(init) {
                        Some(Value::Array(items)) => items,
                        _ => Vec::new(),
                    };
                    self.arrays.insert(name, items);
                } else if let Some(value) = self.initial_value(init) {
                    self.variables.insert(name, value);
                }
            }
            BindingPatternKind::ObjectPattern(pattern) => self.destructure(pattern, init),
            _ => {}
        }
    }

    fn initial_value(&self, init: &Expression<'a>) -> Option<Value> {
        match unwrap_expression(init) {
            Expression::CallExpression(call) => {
                let mut descriptor = function_call_descriptor(&call.callee, Some(self.module));
                if let Some(sample) = returns::resolve_call(self.ctx, self.module, &descriptor) {
                    if let Value::Object(map) = &mut descriptor {
                        map.insert("sample".to_string(), sample);
                    }
                }
                Some(descriptor)
            }
            member @ (Expression::StaticMemberExpression(_)
            | Expression::ComputedMemberExpression(_)) => {
                let path = expression_path(member)?;
                let (object, property) = path.rsplit_once('.')?;
                Some(member_access_descriptor(object, property))
            }
            _ => self.extractor().extract(init),
        }
    }
}

impl<'a> Visit<'a> for HandlerAnalyzer<'_, 'a> {
    fn visit_if_statement(&mut self, stmt: &IfStatement<'a>) {
        self.branches.enter(BranchKey::Default);
        self.visit_expression(&stmt.test);
        self.branches.leave();

        self.branches.enter(if_key(self.module, &stmt.test));
        self.visit_statement(&stmt.consequent);
        self.branches.leave();

        if let Some(alternate) = &stmt.alternate {
            self.branches.enter(BranchKey::Else);
            self.visit_statement(alternate);
            self.branches.leave();
        }
    }

    fn visit_try_statement(&mut self, stmt: &TryStatement<'a>) {
        self.branches.enter(BranchKey::Try);
        self.visit_block_statement(&stmt.block);
        self.branches.leave();

        if let Some(handler) = &stmt.handler {
            self.branches.enter(BranchKey::Catch);
            self.visit_catch_clause(handler);
            self.branches.leave();
        }

        if let Some(finalizer) = &stmt.finalizer {
            self.branches.enter(BranchKey::Default);
            self.visit_block_statement(finalizer);
            self.branches.leave();
        }
    }

    fn visit_variable_declarator(&mut self, declarator: &VariableDeclarator<'a>) {
        self.declare(declarator);
        walk::walk_variable_declarator(self, declarator);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        self.record_response(call);
        self.record_header_getter(call);
        self.record_push(call);
        walk::walk_call_expression(self, call);
    }

    fn visit_static_member_expression(&mut self, member: &StaticMemberExpression<'a>) {
        self.record_static_access(member);
        walk::walk_static_member_expression(self, member);
    }

    fn visit_computed_member_expression(&mut self, member: &ComputedMemberExpression<'a>) {
        self.record_computed_access(member);
        walk::walk_computed_member_expression(self, member);
    }
}
