//! Request field tracking.
//!
//! Field usage is recorded regardless of branch: `req.body.name` read in any
//! `if` arm counts the same as one destructured at the top of the handler.

use oxc_ast::ast::{
    BindingPatternKind, CallExpression, ComputedMemberExpression, Expression, ObjectPattern,
    StaticMemberExpression,
};

use crate::model::RequestPart;
use crate::value::member_access_descriptor;
use crate::value::symbolic::property_key_name;
use crate::value::unwrap_expression;

use super::HandlerAnalyzer;

impl<'a> HandlerAnalyzer<'_, 'a> {
    fn is_request(&self, expr: &Expression<'_>) -> bool {
        matches!(unwrap_expression(expr), Expression::Identifier(id) if id.name.as_str() == self.req)
    }

    /// `req.<part>` → the part and its property name.
    fn request_part<'e>(&self, expr: &'e Expression<'_>) -> Option<(RequestPart, &'e str)> {
        match unwrap_expression(expr) {
            Expression::StaticMemberExpression(member) if self.is_request(&member.object) => {
                let name = member.property.name.as_str();
                RequestPart::from_name(name).map(|part| (part, name))
            }
            _ => None,
        }
    }

    /// `req.body.name`
    pub(super) fn record_static_access(&mut self, member: &StaticMemberExpression<'a>) {
        if let Some((part, _)) = self.request_part(&member.object) {
            self.route.req.insert(part, member.property.name.as_str());
        }
    }

    /// `req.headers["x-api-key"]`
    pub(super) fn record_computed_access(&mut self, member: &ComputedMemberExpression<'a>) {
        let Expression::StringLiteral(key) = &member.expression else {
            return;
        };
        if let Some((part, _)) = self.request_part(&member.object) {
            self.route.req.insert(part, key.value.as_str());
        }
    }

    /// `req.get("X-Api-Key")` and `req.header("X-Api-Key")`
    pub(super) fn record_header_getter(&mut self, call: &CallExpression<'a>) {
        let Expression::StaticMemberExpression(callee) = &call.callee else {
            return;
        };
        if !matches!(callee.property.name.as_str(), "get" | "header") || !self.is_request(&callee.object) {
            return;
        }
        if let Some(name) = call
            .arguments
            .first()
            .and_then(|arg| arg.as_expression())
            .and_then(|arg| match unwrap_expression(arg) {
                Expression::StringLiteral(lit) => Some(lit.value.as_str()),
                _ => None,
            })
        {
            self.route.req.insert(RequestPart::Headers, name);
        }
    }

    /// `const { a, b: c } = req.body` and `const { body: { a } } = req`.
    pub(super) fn destructure(&mut self, pattern: &ObjectPattern<'a>, init: &Expression<'a>) {
        if let Some((part, part_name)) = self.request_part(init) {
            self.destructure_part(part, part_name, pattern);
            return;
        }
        if !self.is_request(init) {
            return;
        }

        for property in &pattern.properties {
            let Some(key) = property_key_name(&property.key) else {
                continue;
            };
            let Some(part) = RequestPart::from_name(&key) else {
                continue;
            };
            match &property.value.kind {
                BindingPatternKind::ObjectPattern(nested) => self.destructure_part(part, &key, nested),
                BindingPatternKind::BindingIdentifier(id) => {
                    let descriptor = member_access_descriptor(&self.req, &key);
                    self.variables.insert(id.name.to_string(), descriptor);
                }
                _ => {}
            }
        }
    }

    fn destructure_part(&mut self, part: RequestPart, part_name: &str, pattern: &ObjectPattern<'a>) {
        let object = format!("{}.{part_name}", self.req);
        for property in &pattern.properties {
            let Some(key) = property_key_name(&property.key) else {
                continue;
            };
            self.route.req.insert(part, &key);

            let local = match &property.value.kind {
                BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
                BindingPatternKind::AssignmentPattern(assign) => match &assign.left.kind {
                    BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
                    _ => None,
                },
                _ => None,
            };
            if let Some(local) = local {
                self.variables
                    .insert(local.to_string(), member_access_descriptor(&object, &key));
            }
        }
    }
}
