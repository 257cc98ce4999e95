//! Response call recording.

use oxc_ast::ast::{Argument, CallExpression, Expression, ObjectPropertyKind};
use serde_json::Value;

use crate::model::{BranchDetail, HeaderEntry};
use crate::value::symbolic::property_key_name;
use crate::value::{is_descriptor, unwrap_expression};

use super::HandlerAnalyzer;

const RESPONSE_METHODS: &[&str] = &[
    "status",
    "sendStatus",
    "json",
    "send",
    "setHeader",
    "header",
    "set",
];

/// Root identifier of a call/member chain: `res` for `res.status(200).json`.
fn chain_root<'e>(expr: &'e Expression<'_>) -> Option<&'e str> {
    match unwrap_expression(expr) {
        Expression::Identifier(id) => Some(id.name.as_str()),
        Expression::StaticMemberExpression(member) => chain_root(&member.object),
        Expression::CallExpression(call) => chain_root(&call.callee),
        _ => None,
    }
}

impl<'a> HandlerAnalyzer<'_, 'a> {
    /// Record `res.<method>(...)` under the current branch.
    pub(super) fn record_response(&mut self, call: &CallExpression<'a>) {
        let Expression::StaticMemberExpression(callee) = &call.callee else {
            return;
        };
        let method = callee.property.name.as_str();
        if !RESPONSE_METHODS.contains(&method)
            || chain_root(&callee.object) != Some(self.res.as_str())
        {
            return;
        }

        let args: Vec<&Expression<'a>> = call
            .arguments
            .iter()
            .filter_map(Argument::as_expression)
            .collect();
        tracing::trace!("{}.{}() in branch {}", self.res, method, self.branches.current());

        match (method, args.as_slice()) {
            ("status" | "sendStatus", [code, ..]) => {
                if let Some(code) = self.status_code(code) {
                    self.detail().status.push(code);
                }
            }
            ("json", [body, ..]) => {
                let value = self.json_body(body);
                self.record_json_fields(body, value.as_ref());
                if let Some(value) = value {
                    self.detail().json.push(value);
                }
            }
            ("send", [body, ..]) => {
                if let Some(value) = self.extract_value(body) {
                    self.detail().send.push(value);
                }
            }
            ("setHeader" | "header" | "set", [name, value, ..]) => {
                let Some(Value::String(key)) = self.extractor().extract(name) else {
                    return;
                };
                let value = self.extract_value(value).unwrap_or(Value::Null);
                self.detail().headers.push(HeaderEntry { key, value });
            }
            ("set", [headers]) => self.record_header_object(headers),
            _ => {}
        }
    }

    /// `items.push(...)` on a local array.
    pub(super) fn record_push(&mut self, call: &CallExpression<'a>) {
        let Expression::StaticMemberExpression(callee) = &call.callee else {
            return;
        };
        let Expression::Identifier(array) = &callee.object else {
            return;
        };
        if callee.property.name.as_str() != "push" || !self.arrays.contains_key(array.name.as_str()) {
            return;
        }

        let extractor = self.extractor();
        let pushed: Vec<Value> = call
            .arguments
            .iter()
            .filter_map(Argument::as_expression)
            .filter_map(|arg| extractor.extract(arg))
            .collect();
        if let Some(items) = self.arrays.get_mut(array.name.as_str()) {
            items.extend(pushed);
        }
    }

    fn detail(&mut self) -> &mut BranchDetail {
        let key = self.branches.current().clone();
        self.route.responses.detail_mut(&key)
    }

    fn status_code(&self, expr: &Expression<'a>) -> Option<u16> {
        self.extractor()
            .extract(expr)?
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
    }

    /// The value of a `res.json` argument. Calls written inline as property
    /// values are resolved like calls stored in variables.
    fn json_body(&self, body: &Expression<'a>) -> Option<Value> {
        let Expression::ObjectExpression(obj) = unwrap_expression(body) else {
            return self.extract_value(body);
        };
        let Some(Value::Object(mut map)) = self.extractor().extract(body) else {
            return None;
        };
        for property in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(prop) = property else {
                continue;
            };
            let Expression::CallExpression(call) = unwrap_expression(&prop.value) else {
                continue;
            };
            let Some(key) = property_key_name(&prop.key) else {
                continue;
            };
            if let Some(slot) = map.get_mut(&key) {
                if is_descriptor(slot) {
                    *slot = self.call_value(call);
                }
            }
        }
        Some(Value::Object(map))
    }

    /// Keys of an inline `res.json({...})` object, with their values taken
    /// from the already extracted `body`.
    fn record_json_fields(&mut self, body: &Expression<'a>, value: Option<&Value>) {
        let Expression::ObjectExpression(obj) = unwrap_expression(body) else {
            return;
        };
        for property in &obj.properties {
            let ObjectPropertyKind::ObjectProperty(prop) = property else {
                continue;
            };
            let Some(key) = property_key_name(&prop.key) else {
                continue;
            };
            let field = value.and_then(|body| body.get(&key)).cloned().unwrap_or(Value::Null);
            self.route.response_fields.entry(key).or_insert(field);
        }
    }

    /// `res.set({ "Cache-Control": "no-cache", ... })`
    fn record_header_object(&mut self, headers: &Expression<'a>) {
        let mut entries = Vec::new();
        match unwrap_expression(headers) {
            Expression::ObjectExpression(obj) => {
                for property in &obj.properties {
                    let ObjectPropertyKind::ObjectProperty(prop) = property else {
                        continue;
                    };
                    let Some(key) = property_key_name(&prop.key) else {
                        continue;
                    };
                    let value = self.extract_value(&prop.value).unwrap_or(Value::Null);
                    entries.push(HeaderEntry { key, value });
                }
            }
            _ => {
                if let Some(Value::Object(map)) = self.extractor().extract(headers) {
                    entries.extend(map.into_iter().map(|(key, value)| HeaderEntry { key, value }));
                }
            }
        }
        self.detail().headers.extend(entries);
    }
}
