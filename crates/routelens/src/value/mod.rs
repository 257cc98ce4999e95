//! Static value extraction.
//!
//! [`ValueExtractor`] turns expression nodes into concrete JSON values without
//! executing anything. Unsupported shapes yield `None`; calls become symbolic
//! descriptors. Identifiers are resolved through the handler's local arrays,
//! its variable map and finally a search of the whole file, with a guard
//! against self-referential definitions.

pub mod symbolic;

use indexmap::IndexMap;
use oxc_ast::ast::{
    ArrayExpression, ArrayExpressionElement, AssignmentExpression, AssignmentOperator,
    AssignmentTarget, BindingPatternKind, CallExpression, Expression, IdentifierReference,
    ObjectExpression, ObjectPropertyKind, UnaryOperator, VariableDeclarator,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::GetSpan;
use serde_json::{Map, Value};

use crate::loader::ParsedModule;

pub use symbolic::{
    call_target, function_call_descriptor, is_descriptor, member_access_descriptor,
    number_value, unwrap_expression,
};

/// Handler-scoped name → resolved value or descriptor.
pub type VariableMap = IndexMap<String, Value>;

/// Handler-scoped name → values accumulated by `const x = [...]` and `x.push(...)`.
pub type LocalArrays = IndexMap<String, Vec<Value>>;

/// The closed set of node categories the extractor understands.
enum NodeKind<'e, 'a> {
    Literal(Value),
    Object(&'e ObjectExpression<'a>),
    Array(&'e ArrayExpression<'a>),
    Identifier(&'e IdentifierReference<'a>),
    Call(&'e CallExpression<'a>),
    Unsupported,
}

impl<'e, 'a> NodeKind<'e, 'a> {
    fn classify(expr: &'e Expression<'a>) -> Self {
        match unwrap_expression(expr) {
            Expression::StringLiteral(lit) => Self::Literal(Value::String(lit.value.to_string())),
            Expression::NumericLiteral(lit) => Self::Literal(number_value(lit.value)),
            Expression::BooleanLiteral(lit) => Self::Literal(Value::Bool(lit.value)),
            Expression::NullLiteral(_) => Self::Literal(Value::Null),
            Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => {
                let text = tpl
                    .quasis
                    .iter()
                    .map(|q| q.value.cooked.as_ref().unwrap_or(&q.value.raw).as_str())
                    .collect::<String>();
                Self::Literal(Value::String(text))
            }
            Expression::UnaryExpression(unary) if unary.operator == UnaryOperator::UnaryNegation => {
                match &unary.argument {
                    Expression::NumericLiteral(lit) => Self::Literal(number_value(-lit.value)),
                    _ => Self::Unsupported,
                }
            }
            Expression::ObjectExpression(obj) => Self::Object(obj),
            Expression::ArrayExpression(arr) => Self::Array(arr),
            Expression::Identifier(id) => Self::Identifier(id),
            Expression::CallExpression(call) => Self::Call(call),
            _ => Self::Unsupported,
        }
    }
}

/// Converts expressions into JSON values.
#[derive(Clone, Copy, Default)]
pub struct ValueExtractor<'s, 'a> {
    arrays: Option<&'s LocalArrays>,
    variables: Option<&'s VariableMap>,
    module: Option<&'s ParsedModule<'a>>,
}

impl<'s, 'a> ValueExtractor<'s, 'a> {
    pub fn new(
        arrays: &'s LocalArrays,
        variables: &'s VariableMap,
        module: Option<&'s ParsedModule<'a>>,
    ) -> Self {
        Self {
            arrays: Some(arrays),
            variables: Some(variables),
            module,
        }
    }

    /// An extractor with no handler state, resolving identifiers only through
    /// the given file.
    pub fn for_module(module: &'s ParsedModule<'a>) -> Self {
        Self {
            arrays: None,
            variables: None,
            module: Some(module),
        }
    }

    /// Extract `expr`, or `None` when it has no static value.
    pub fn extract(&self, expr: &Expression<'a>) -> Option<Value> {
        let mut visited = Vec::new();
        self.extract_guarded(expr, &mut visited)
    }

    fn extract_guarded(&self, expr: &Expression<'a>, visited: &mut Vec<String>) -> Option<Value> {
        match NodeKind::classify(expr) {
            NodeKind::Literal(value) => Some(value),
            NodeKind::Object(obj) => self.extract_object(obj, visited),
            NodeKind::Array(arr) => Some(self.extract_array(arr, visited)),
            NodeKind::Identifier(id) => self.resolve_identifier(id, visited),
            NodeKind::Call(call) => Some(function_call_descriptor(&call.callee, self.module)),
            NodeKind::Unsupported => None,
        }
    }

    fn extract_object(&self, obj: &ObjectExpression<'a>, visited: &mut Vec<String>) -> Option<Value> {
        let mut map = Map::new();
        for property in &obj.properties {
            match property {
                ObjectPropertyKind::ObjectProperty(prop) => {
                    let Some(key) = symbolic::property_key_name(&prop.key) else {
                        continue;
                    };
                    if let Some(value) = self.extract_guarded(&prop.value, visited) {
                        map.insert(key, value);
                    }
                }
                ObjectPropertyKind::SpreadProperty(spread) => {
                    match self.extract_guarded(&spread.argument, visited) {
                        Some(Value::Object(source)) if !symbolic::is_descriptor_map(&source) => {
                            map.extend(source);
                        }
                        Some(Value::Array(items)) => {
                            for (index, item) in items.into_iter().enumerate() {
                                map.insert(index.to_string(), item);
                            }
                        }
                        _ => {
                            let placeholder =
                                format!("...{}", symbolic::expression_label(&spread.argument, self.module));
                            map.insert(placeholder.clone(), Value::String(placeholder));
                        }
                    }
                }
            }
        }

        if map.is_empty() { None } else { Some(Value::Object(map)) }
    }

    fn extract_array(&self, arr: &ArrayExpression<'a>, visited: &mut Vec<String>) -> Value {
        let mut items = Vec::with_capacity(arr.elements.len());
        for element in &arr.elements {
            match element {
                ArrayExpressionElement::SpreadElement(spread) => {
                    match self.extract_guarded(&spread.argument, visited) {
                        Some(Value::Array(source)) => items.extend(source),
                        _ => items.push(Value::String(format!(
                            "<spread:{}>",
                            symbolic::expression_label(&spread.argument, self.module)
                        ))),
                    }
                }
                ArrayExpressionElement::Elision(_) => items.push(Value::Null),
                _ => match element.as_expression() {
                    Some(expr) => items.push(self.extract_guarded(expr, visited).unwrap_or(Value::Null)),
                    None => items.push(Value::Null),
                },
            }
        }
        Value::Array(items)
    }

    fn resolve_identifier(
        &self,
        id: &IdentifierReference<'a>,
        visited: &mut Vec<String>,
    ) -> Option<Value> {
        let name = id.name.as_str();
        if name == "undefined" || visited.iter().any(|v| v == name) {
            return None;
        }

        if let Some(items) = self.arrays.and_then(|arrays| arrays.get(name)) {
            return Some(Value::Array(items.clone()));
        }
        if let Some(value) = self.variables.and_then(|vars| vars.get(name)) {
            return Some(value.get("sample").unwrap_or(value).clone());
        }

        let module = self.module?;
        visited.push(name.to_string());
        let value = self.search_file(module, name, id.span.start, visited);
        visited.pop();
        tracing::trace!("resolved '{}' by file search: {}", name, value.is_some());
        value
    }

    /// Find the declaration of `name` nearest to `reference` in the whole file
    /// and extract its initializer.
    ///
    /// Nearest is the last declarator or assignment that starts before the
    /// reference, falling back to the first one in the file.
    fn search_file(
        &self,
        module: &'s ParsedModule<'a>,
        name: &str,
        reference: u32,
        visited: &mut Vec<String>,
    ) -> Option<Value> {
        let mut locator = DefinitionLocator { name, sites: Vec::new() };
        locator.visit_program(&module.program);

        let target = locator
            .sites
            .iter()
            .copied()
            .rev()
            .find(|start| *start < reference)
            .or_else(|| locator.sites.first().copied())?;

        let mut extractor = DefinitionExtractor {
            extractor: self,
            target,
            visited,
            result: None,
            done: false,
        };
        extractor.visit_program(&module.program);
        extractor.result
    }
}

fn assignment_name<'b>(assign: &'b AssignmentExpression<'_>) -> Option<&'b str> {
    if assign.operator != AssignmentOperator::Assign {
        return None;
    }
    match &assign.left {
        AssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.as_str()),
        _ => None,
    }
}

fn declarator_name<'b>(decl: &'b VariableDeclarator<'_>) -> Option<&'b str> {
    match &decl.id.kind {
        BindingPatternKind::BindingIdentifier(id) if decl.init.is_some() => Some(id.name.as_str()),
        _ => None,
    }
}

/// Collects the start offsets of every definition of one name, in source order.
struct DefinitionLocator<'n> {
    name: &'n str,
    sites: Vec<u32>,
}

impl<'a> Visit<'a> for DefinitionLocator<'_> {
    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        if declarator_name(decl) == Some(self.name) {
            self.sites.push(decl.span.start);
        }
        walk::walk_variable_declarator(self, decl);
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        if assignment_name(assign) == Some(self.name) {
            self.sites.push(assign.span.start);
        }
        walk::walk_assignment_expression(self, assign);
    }
}

/// Extracts the value of the definition starting at `target`.
struct DefinitionExtractor<'x, 's, 'a> {
    extractor: &'x ValueExtractor<'s, 'a>,
    target: u32,
    visited: &'x mut Vec<String>,
    result: Option<Value>,
    done: bool,
}

impl<'a> Visit<'a> for DefinitionExtractor<'_, '_, 'a> {
    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        if self.done {
            return;
        }
        if decl.span.start == self.target && declarator_name(decl).is_some() {
            if let Some(init) = &decl.init {
                self.result = self.extractor.extract_guarded(init, self.visited);
            }
            self.done = true;
            return;
        }
        walk::walk_variable_declarator(self, decl);
    }

    fn visit_assignment_expression(&mut self, assign: &AssignmentExpression<'a>) {
        if self.done {
            return;
        }
        if assign.span.start == self.target && assignment_name(assign).is_some() {
            self.result = self.extractor.extract_guarded(&assign.right, self.visited);
            self.done = true;
            return;
        }
        walk::walk_assignment_expression(self, assign);
    }

    fn visit_expression(&mut self, expr: &Expression<'a>) {
        let span = expr.span();
        if !self.done && span.start <= self.target && self.target < span.end {
            walk::walk_expression(self, expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parser::parse_module;
    use oxc_allocator::Allocator;
    use oxc_ast::ast::Statement;
    use serde_json::json;
    use std::path::Path;

    /// Extract the initializer of the last top-level `const` in `source`.
    fn extract_last(source: &str) -> Option<Value> {
        let allocator = Allocator::default();
        let module = parse_module(&allocator, Path::new("/app/test.ts"), source).unwrap();
        let init = module
            .program
            .body
            .iter()
            .filter_map(|stmt| match stmt {
                Statement::VariableDeclaration(decl) => decl.declarations[0].init.as_ref(),
                _ => None,
            })
            .last()
            .unwrap();
        ValueExtractor::for_module(module).extract(init)
    }

    #[test]
    fn test_literals() {
        assert_eq!(extract_last("const a = 'x';"), Some(json!("x")));
        assert_eq!(extract_last("const a = 42;"), Some(json!(42)));
        assert_eq!(extract_last("const a = -1.5;"), Some(json!(-1.5)));
        assert_eq!(extract_last("const a = true;"), Some(json!(true)));
        assert_eq!(extract_last("const a = `plain`;"), Some(json!("plain")));
        assert_eq!(extract_last("const a = x + 1;"), None);
    }

    #[test]
    fn test_object_drops_unresolved_properties() {
        assert_eq!(
            extract_last("const a = { id: 1, missing: unknownThing, nested: { ok: true } };"),
            Some(json!({ "id": 1, "nested": { "ok": true } }))
        );
        assert_eq!(extract_last("const a = { gone: unknownThing };"), None);
    }

    #[test]
    fn test_null_literals_are_kept() {
        assert_eq!(extract_last("const a = null;"), Some(Value::Null));
        assert_eq!(
            extract_last("const a = { a: null, b: [1, null], gone: missing };"),
            Some(json!({ "a": null, "b": [1, null] }))
        );
    }

    #[test]
    fn test_spread_merge() {
        assert_eq!(
            extract_last("const base = { id: 1 }; const obj = { ...base, name: 'x' };"),
            Some(json!({ "id": 1, "name": "x" }))
        );
    }

    #[test]
    fn test_unresolved_spread_placeholder() {
        assert_eq!(
            extract_last("const obj = { ...other, name: 'x' };"),
            Some(json!({ "...other": "...other", "name": "x" }))
        );
        assert_eq!(
            extract_last("const list = [1, ...rest];"),
            Some(json!([1, "<spread:rest>"]))
        );
    }

    #[test]
    fn test_array_spread_splices() {
        assert_eq!(
            extract_last("const a = [1, 2]; const b = [0, ...a, missing];"),
            Some(json!([0, 1, 2, null]))
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let value = extract_last("const a = { ...b }; const b = { ...a }; const c = a;");
        assert_eq!(value, Some(json!({ "...a": "...a" })));
    }

    #[test]
    fn test_nearest_assignment_wins() {
        assert_eq!(
            extract_last("let status = 'draft'; status = 'published'; const s = status;"),
            Some(json!("published"))
        );
    }

    #[test]
    fn test_calls_become_descriptors() {
        assert_eq!(
            extract_last("const users = await userService.findAll();"),
            Some(json!({
                "type": "function_call",
                "object": "userService",
                "method": "findAll",
                "identifier": "userService.findAll()"
            }))
        );
        assert_eq!(
            extract_last("const now = Date.now; const x = compute();"),
            Some(json!({ "type": "function_call", "method": "compute", "identifier": "compute()" }))
        );
    }

    #[test]
    fn test_handler_state_takes_precedence() {
        let allocator = Allocator::default();
        let module =
            parse_module(&allocator, Path::new("/app/t.js"), "const items = ['file']; const r = items;")
                .unwrap();
        let mut arrays = LocalArrays::new();
        arrays.insert("items".to_string(), vec![json!("local")]);
        let mut variables = VariableMap::new();
        variables.insert(
            "user".to_string(),
            json!({ "type": "function_call", "method": "load", "identifier": "load()", "sample": { "id": 1 } }),
        );

        let extractor = ValueExtractor::new(&arrays, &variables, Some(module));
        let Statement::VariableDeclaration(decl) = &module.program.body[1] else {
            panic!("expected declaration");
        };
        let init = decl.declarations[0].init.as_ref().unwrap();
        assert_eq!(extractor.extract(init), Some(json!(["local"])));

        let allocator = Allocator::default();
        let other = parse_module(&allocator, Path::new("/app/u.js"), "const r = { user };").unwrap();
        let Statement::VariableDeclaration(decl) = &other.program.body[0] else {
            panic!("expected declaration");
        };
        let init = decl.declarations[0].init.as_ref().unwrap();
        let extractor = ValueExtractor::new(&arrays, &variables, Some(other));
        assert_eq!(extractor.extract(init), Some(json!({ "user": { "id": 1 } })));
    }
}
