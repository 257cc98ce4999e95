//! Sample values synthesized from TypeScript types.
//!
//! Used when a function's return value cannot be extracted literally. The
//! declared return type is turned into a structurally shaped example, with
//! field names driving string and number samples (`email` → an address,
//! `price` → `99.99`). Literal values recovered from code always win over
//! synthesized ones; see [`merge_sample`].

use oxc_ast::ast::{Declaration, TSLiteral, TSSignature, TSType, TSTypeName};
use oxc_span::GetSpan;
use serde_json::{Map, Value, json};

use crate::bindings::{Imported, find_import};
use crate::context::AnalysisContext;
use crate::diagnostics::DiagnosticKind;
use crate::loader::ParsedModule;
use crate::symbols;
use crate::value::symbolic::{is_descriptor, number_value, property_key_name};

const SAMPLE_DATE: &str = "2024-01-01T00:00:00.000Z";

/// A named type declaration the synthesizer can expand.
enum TypeDecl<'a> {
    Members(&'a [TSSignature<'a>]),
    Alias(&'a TSType<'a>),
}

/// Builds example JSON values from TypeScript types declared in a module.
///
/// Named types are looked up in the module first, then through one level of
/// imports. Types the synthesizer cannot shape become `"<Type>"` strings and
/// are reported to the context's diagnostics.
///
/// # Example
///
/// ```rust,ignore
/// // interface User { id: number; email: string; createdAt: Date }
/// // export function findUser(): Promise<User | null> { ... }
/// let func = symbols::find_function(module, "findUser").unwrap();
/// let sample = TypeSampleSynthesizer::new(&ctx, module)
///     .sample_return_type(func.return_type().unwrap());
/// assert_eq!(
///     sample,
///     Some(json!({ "id": 1, "email": "user@example.com", "createdAt": "2024-01-01T00:00:00.000Z" }))
/// );
/// ```
pub struct TypeSampleSynthesizer<'c, 'a> {
    ctx: &'c AnalysisContext<'a>,
    module: &'a ParsedModule<'a>,
    /// Named types currently being expanded, to stop recursive types.
    visiting: Vec<String>,
    followed_import: bool,
}

impl<'c, 'a> TypeSampleSynthesizer<'c, 'a> {
    pub fn new(ctx: &'c AnalysisContext<'a>, module: &'a ParsedModule<'a>) -> Self {
        Self {
            ctx,
            module,
            visiting: Vec::new(),
            followed_import: false,
        }
    }

    /// Sample for a function's declared return type.
    ///
    /// `Promise<T>` is unwrapped once, then `T | null` / `T | undefined`.
    ///
    /// # Returns
    ///
    /// `None` for `void`, `null` and `undefined` return types.
    pub fn sample_return_type(&mut self, ty: &'a TSType<'a>) -> Option<Value> {
        let ty = unwrap_promise(ty);
        let ty = strip_nullish(ty);
        match ty {
            ty if is_nullish(ty) => None,
            ty => Some(self.sample_type(ty, None)),
        }
    }

    fn sample_type(&mut self, ty: &'a TSType<'a>, field: Option<&str>) -> Value {
        match ty {
            TSType::TSStringKeyword(_) => string_sample(field),
            TSType::TSNumberKeyword(_) | TSType::TSBigIntKeyword(_) => number_sample(field),
            TSType::TSBooleanKeyword(_) => Value::Bool(true),
            TSType::TSNullKeyword(_) | TSType::TSUndefinedKeyword(_) | TSType::TSVoidKeyword(_) => {
                Value::Null
            }
            TSType::TSArrayType(array) => json!([self.sample_type(&array.element_type, field)]),
            TSType::TSLiteralType(literal) => match &literal.literal {
                TSLiteral::StringLiteral(lit) => Value::String(lit.value.to_string()),
                TSLiteral::NumericLiteral(lit) => number_value(lit.value),
                TSLiteral::BooleanLiteral(lit) => Value::Bool(lit.value),
                _ => self.fallback(ty),
            },
            TSType::TSTypeLiteral(literal) => self.sample_members(&literal.members),
            TSType::TSUnionType(union) => {
                let concrete: Vec<&'a TSType<'a>> =
                    union.types.iter().filter(|member| !is_nullish(member)).collect();
                let preferred = concrete
                    .iter()
                    .copied()
                    .find(|member| matches!(member, TSType::TSLiteralType(_)))
                    .or_else(|| concrete.first().copied());
                match preferred {
                    Some(member) => self.sample_type(member, field),
                    None => Value::Null,
                }
            }
            TSType::TSTypeReference(reference) => {
                let Some(name) = type_name(&reference.type_name) else {
                    return self.fallback(ty);
                };
                let args: Vec<&'a TSType<'a>> = reference
                    .type_arguments
                    .as_ref()
                    .map(|args| args.params.iter().collect())
                    .unwrap_or_default();
                self.sample_reference(ty, name, &args, field)
            }
            _ => self.fallback(ty),
        }
    }

    fn sample_reference(
        &mut self,
        ty: &'a TSType<'a>,
        name: &str,
        args: &[&'a TSType<'a>],
        field: Option<&str>,
    ) -> Value {
        match (name, args) {
            ("Date", _) => return Value::String(SAMPLE_DATE.to_string()),
            ("Array" | "ReadonlyArray", &[element, ..]) => {
                return json!([self.sample_type(element, field)]);
            }
            ("Promise" | "Partial" | "Required" | "Readonly", &[inner, ..]) => {
                return self.sample_type(inner, field);
            }
            ("Record", &[_, value, ..]) => {
                let mut map = Map::new();
                map.insert("key".to_string(), self.sample_type(value, Some("key")));
                return Value::Object(map);
            }
            _ => {}
        }

        if self.visiting.iter().any(|visiting| visiting == name) {
            return Value::Null;
        }
        self.visiting.push(name.to_string());
        let sample = match find_type(self.module, name) {
            Some(decl) => Some(self.sample_decl(decl)),
            None => self.sample_imported(name),
        };
        self.visiting.pop();
        sample.unwrap_or_else(|| self.fallback(ty))
    }

    fn sample_decl(&mut self, decl: TypeDecl<'a>) -> Value {
        match decl {
            TypeDecl::Members(members) => self.sample_members(members),
            TypeDecl::Alias(ty) => self.sample_type(ty, None),
        }
    }

    /// Follow the import that brought `name` into scope, once per sample.
    fn sample_imported(&mut self, name: &str) -> Option<Value> {
        if self.followed_import {
            return None;
        }
        let binding = find_import(self.module, name)?;
        let target = self.ctx.load_import(&binding.specifier, self.module.path())?;
        let exported = match &binding.imported {
            Imported::Named(exported) => exported.as_str(),
            _ => name,
        };
        let decl = find_type(target, exported)?;

        let previous = std::mem::replace(&mut self.module, target);
        self.followed_import = true;
        let sample = self.sample_decl(decl);
        self.module = previous;
        Some(sample)
    }

    fn sample_members(&mut self, members: &'a [TSSignature<'a>]) -> Value {
        let mut map = Map::new();
        for member in members {
            let TSSignature::TSPropertySignature(prop) = member else {
                continue;
            };
            let Some(key) = property_key_name(&prop.key) else {
                continue;
            };
            let value = match &prop.type_annotation {
                Some(annotation) => self.sample_type(&annotation.type_annotation, Some(key.as_str())),
                None => string_sample(Some(key.as_str())),
            };
            map.insert(key, value);
        }
        Value::Object(map)
    }

    fn fallback(&self, ty: &TSType<'_>) -> Value {
        let text = self.module.text(ty.span());
        self.ctx.diagnostics.report(
            DiagnosticKind::SampleFallback,
            Some(self.module.path()),
            format!("no sample for type '{text}', using a placeholder"),
        );
        Value::String(format!("<{text}>"))
    }
}

fn type_name<'b>(name: &'b TSTypeName<'_>) -> Option<&'b str> {
    match name {
        TSTypeName::IdentifierReference(id) => Some(id.name.as_str()),
        TSTypeName::QualifiedName(qualified) => Some(qualified.right.name.as_str()),
        _ => None,
    }
}

/// An interface or type alias called `name` declared at the top level.
fn find_type<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<TypeDecl<'a>> {
    symbols::declarations(module).find_map(|decl| match decl {
        Declaration::TSInterfaceDeclaration(interface) if interface.id.name.as_str() == name => {
            Some(TypeDecl::Members(&interface.body.body))
        }
        Declaration::TSTypeAliasDeclaration(alias) if alias.id.name.as_str() == name => {
            Some(TypeDecl::Alias(&alias.type_annotation))
        }
        _ => None,
    })
}

fn is_nullish(ty: &TSType<'_>) -> bool {
    matches!(
        ty,
        TSType::TSNullKeyword(_) | TSType::TSUndefinedKeyword(_) | TSType::TSVoidKeyword(_)
    )
}

fn unwrap_promise<'a>(ty: &'a TSType<'a>) -> &'a TSType<'a> {
    if let TSType::TSTypeReference(reference) = ty {
        if type_name(&reference.type_name) == Some("Promise") {
            let first = reference.type_arguments.as_ref().and_then(|args| args.params.first());
            if let Some(inner) = first {
                return inner;
            }
        }
    }
    ty
}

fn strip_nullish<'a>(ty: &'a TSType<'a>) -> &'a TSType<'a> {
    if let TSType::TSUnionType(union) = ty {
        let mut concrete = union.types.iter().filter(|member| !is_nullish(member));
        if let (Some(only), None) = (concrete.next(), concrete.next()) {
            return only;
        }
    }
    ty
}

fn string_sample(field: Option<&str>) -> Value {
    let Some(field) = field else {
        return Value::String("sample".to_string());
    };
    let lower = field.to_lowercase();
    let sample = if lower.contains("email") {
        "user@example.com".to_string()
    } else if lower.contains("date") || lower.contains("time") || field.ends_with("At") {
        SAMPLE_DATE.to_string()
    } else if lower.contains("url") || lower.contains("link") {
        "https://example.com".to_string()
    } else if lower.contains("phone") {
        "+1-555-0100".to_string()
    } else if lower.contains("status") {
        "active".to_string()
    } else if is_id(field) {
        "1".to_string()
    } else if lower.contains("name") {
        "Sample Name".to_string()
    } else {
        format!("sample {field}")
    };
    Value::String(sample)
}

fn number_sample(field: Option<&str>) -> Value {
    let Some(field) = field else {
        return json!(0);
    };
    let lower = field.to_lowercase();
    if is_id(field) {
        json!(1)
    } else if ["price", "amount", "cost"].iter().any(|k| lower.contains(k)) {
        json!(99.99)
    } else if ["count", "total", "quantity", "stock"].iter().any(|k| lower.contains(k)) {
        json!(10)
    } else if lower == "age" {
        json!(30)
    } else {
        json!(0)
    }
}

/// `id`, `userId`, `user_id`.
fn is_id(field: &str) -> bool {
    field.eq_ignore_ascii_case("id") || field.ends_with("Id") || field.to_lowercase().ends_with("_id")
}

/// Merge a synthesized `sample` into an `extracted` value.
///
/// Extracted values win; the sample only fills nulls, symbolic descriptors,
/// empty arrays and missing object keys.
///
/// # Example
///
/// ```
/// use routelens::samples::merge_sample;
/// use serde_json::json;
///
/// let extracted = json!({ "id": 7, "tags": [] });
/// let sample = json!({ "id": 1, "tags": ["sample tags"], "email": "user@example.com" });
/// assert_eq!(
///     merge_sample(extracted, sample),
///     json!({ "id": 7, "tags": ["sample tags"], "email": "user@example.com" })
/// );
/// ```
pub fn merge_sample(extracted: Value, sample: Value) -> Value {
    match (extracted, sample) {
        (extracted, Value::Null) => extracted,
        (Value::Null, sample) => sample,
        (extracted, sample) if is_descriptor(&extracted) => sample,
        (Value::Object(mut extracted), Value::Object(sample)) => {
            for (key, sample) in sample {
                match extracted.get_mut(&key) {
                    Some(value) => *value = merge_sample(value.take(), sample),
                    None => {
                        extracted.insert(key, sample);
                    }
                }
            }
            Value::Object(extracted)
        }
        (Value::Array(extracted), Value::Array(sample)) => match sample.into_iter().next() {
            Some(element) if extracted.is_empty() => Value::Array(vec![element]),
            Some(element) => Value::Array(
                extracted
                    .into_iter()
                    .map(|value| merge_sample(value, element.clone()))
                    .collect(),
            ),
            None => Value::Array(extracted),
        },
        (extracted, _) => extracted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::runtime::MemoryFs;
    use crate::symbols::find_function;
    use oxc_allocator::Allocator;
    use std::path::{Path, PathBuf};

    fn sample(fs: MemoryFs, path: &str, function: &str) -> (Option<Value>, usize) {
        let allocator = Allocator::default();
        let config = AnalyzerConfig::default();
        let ctx = AnalysisContext::new(&allocator, &config, &fs, PathBuf::from("/app"));
        let module = ctx.load(Path::new(path)).unwrap();
        let func = find_function(module, function).unwrap();
        let mut synthesizer = TypeSampleSynthesizer::new(&ctx, module);
        let value = synthesizer.sample_return_type(func.return_type().unwrap());
        (value, ctx.diagnostics.len())
    }

    #[test]
    fn test_interface_sample_with_heuristics() {
        let fs = MemoryFs::new().with_file(
            "/app/users.ts",
            r#"
            type Role = "admin" | "member";
            interface Address { city: string; zipCode?: string }
            interface User {
                id: number;
                userId: string;
                email: string;
                createdAt: Date;
                avatarUrl: string;
                price: number;
                itemCount: number;
                age: number;
                active: boolean;
                role: Role;
                tags: string[];
                address: Address;
                scores: Array<number>;
                meta: Record<string, number>;
                parent?: User;
            }
            export async function findUser(): Promise<User | undefined> { return undefined; }
            "#,
        );
        let (value, diagnostics) = sample(fs, "/app/users.ts", "findUser");
        assert_eq!(
            value,
            Some(json!({
                "id": 1,
                "userId": "1",
                "email": "user@example.com",
                "createdAt": SAMPLE_DATE,
                "avatarUrl": "https://example.com",
                "price": 99.99,
                "itemCount": 10,
                "age": 30,
                "active": true,
                "role": "admin",
                "tags": ["sample tags"],
                "address": {"city": "sample city", "zipCode": "sample zipCode"},
                "scores": [0],
                "meta": {"key": 0},
                "parent": null,
            }))
        );
        assert_eq!(diagnostics, 0);
    }

    #[test]
    fn test_imported_type_and_fallback() {
        let fs = MemoryFs::new()
            .with_file(
                "/app/handler.ts",
                r#"
                import type { Product } from "./types";
                export function load(): Product[] { return []; }
                export function raw(): Buffer { return read(); }
                "#,
            )
            .with_file(
                "/app/types.ts",
                "export interface Product { sku: string; name: string }",
            );
        let (product, diagnostics) = sample(fs.clone(), "/app/handler.ts", "load");
        assert_eq!(product, Some(json!([{"sku": "sample sku", "name": "Sample Name"}])));
        assert_eq!(diagnostics, 0);

        let (raw, diagnostics) = sample(fs, "/app/handler.ts", "raw");
        assert_eq!(raw, Some(json!("<Buffer>")));
        assert_eq!(diagnostics, 1);
    }

    #[test]
    fn test_merge_prefers_extracted_values() {
        let extracted = json!({
            "id": 7,
            "name": {"type": "function_call", "method": "lookup", "identifier": "lookup()"},
            "tags": [],
            "email": null,
        });
        let sample = json!({
            "id": 1,
            "name": "Sample Name",
            "tags": ["sample tags"],
            "email": "user@example.com",
            "age": 30,
        });
        assert_eq!(
            merge_sample(extracted, sample),
            json!({
                "id": 7,
                "name": "Sample Name",
                "tags": ["sample tags"],
                "email": "user@example.com",
                "age": 30,
            })
        );
        assert_eq!(merge_sample(json!("kept"), json!("sample")), json!("kept"));
        assert_eq!(
            merge_sample(json!([{"a": 1}]), json!([{"a": 0, "b": 2}])),
            json!([{"a": 1, "b": 2}])
        );
    }
}
