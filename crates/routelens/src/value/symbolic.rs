//! Symbolic descriptors and small expression helpers.
//!
//! A descriptor stands in for a runtime value that cannot be known statically
//! (a function's result, a property of the request). Downstream consumers
//! render them as hints rather than real values.

use oxc_ast::ast::{Expression, PropertyKey};
use oxc_span::GetSpan;
use serde_json::{Map, Value, json};

use crate::loader::ParsedModule;

pub const FUNCTION_CALL: &str = "function_call";
pub const MEMBER_ACCESS: &str = "member_access";

/// Strip wrappers that do not change the value of an expression:
/// parentheses, `await` and TypeScript assertions.
pub fn unwrap_expression<'e, 'a>(mut expr: &'e Expression<'a>) -> &'e Expression<'a> {
    loop {
        expr = match expr {
            Expression::ParenthesizedExpression(e) => &e.expression,
            Expression::AwaitExpression(e) => &e.argument,
            Expression::TSAsExpression(e) => &e.expression,
            Expression::TSSatisfiesExpression(e) => &e.expression,
            Expression::TSNonNullExpression(e) => &e.expression,
            Expression::TSTypeAssertion(e) => &e.expression,
            _ => return expr,
        };
    }
}

/// Dotted path of a plain member chain: `req.body.user` or `this.service`.
pub fn expression_path(expr: &Expression<'_>) -> Option<String> {
    match unwrap_expression(expr) {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::ThisExpression(_) => Some("this".to_string()),
        Expression::StaticMemberExpression(member) => {
            let object = expression_path(&member.object)?;
            Some(format!("{object}.{}", member.property.name))
        }
        Expression::ComputedMemberExpression(member) => match &member.expression {
            Expression::StringLiteral(lit) => {
                let object = expression_path(&member.object)?;
                Some(format!("{object}.{}", lit.value))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Static name of an object key, including string-literal computed keys.
pub fn property_key_name(key: &PropertyKey<'_>) -> Option<String> {
    key.static_name().map(|name| name.into_owned())
}

/// Placeholder label for an expression that has no dotted path.
pub fn expression_label(expr: &Expression<'_>, module: Option<&ParsedModule<'_>>) -> String {
    if let Some(path) = expression_path(expr) {
        return path;
    }
    match module {
        Some(module) => module.text(expr.span()).to_string(),
        None => "<expression>".to_string(),
    }
}

/// `{type: "function_call", object?, method, identifier}` for a call.
pub fn function_call_descriptor(
    callee: &Expression<'_>,
    module: Option<&ParsedModule<'_>>,
) -> Value {
    let callee = unwrap_expression(callee);
    let (object, method) = match callee {
        Expression::StaticMemberExpression(member) => (
            Some(expression_label(&member.object, module)),
            member.property.name.to_string(),
        ),
        Expression::ComputedMemberExpression(member) => match &member.expression {
            Expression::StringLiteral(lit) => (
                Some(expression_label(&member.object, module)),
                lit.value.to_string(),
            ),
            _ => (None, expression_label(callee, module)),
        },
        _ => (None, expression_label(callee, module)),
    };

    let mut descriptor = Map::new();
    descriptor.insert("type".to_string(), json!(FUNCTION_CALL));
    let identifier = match &object {
        Some(object) => {
            descriptor.insert("object".to_string(), json!(object));
            format!("{object}.{method}()")
        }
        None => format!("{method}()"),
    };
    descriptor.insert("method".to_string(), json!(method));
    descriptor.insert("identifier".to_string(), json!(identifier));
    Value::Object(descriptor)
}

/// `{type: "member_access", object, property, identifier}`.
pub fn member_access_descriptor(object: &str, property: &str) -> Value {
    json!({
        "type": MEMBER_ACCESS,
        "object": object,
        "property": property,
        "identifier": format!("{object}.{property}"),
    })
}

/// Whether `value` is a symbolic descriptor rather than a real value.
pub fn is_descriptor(value: &Value) -> bool {
    value.as_object().is_some_and(is_descriptor_map)
}

pub fn is_descriptor_map(map: &Map<String, Value>) -> bool {
    matches!(
        map.get("type").and_then(Value::as_str),
        Some(FUNCTION_CALL | MEMBER_ACCESS)
    ) && map.contains_key("identifier")
}

/// `(object, method)` of a function-call descriptor.
pub fn call_target(descriptor: &Value) -> Option<(Option<&str>, &str)> {
    if descriptor.get("type").and_then(Value::as_str) != Some(FUNCTION_CALL) {
        return None;
    }
    let method = descriptor.get("method").and_then(Value::as_str)?;
    let object = descriptor.get("object").and_then(Value::as_str);
    Some((object, method))
}

/// JSON number for a JS numeric literal; integral values stay integers.
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
