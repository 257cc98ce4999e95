//! Parsing source files into arena-allocated modules.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, Expression, ExportAllDeclaration, ExportNamedDeclaration,
    ImportDeclaration, ImportExpression, Program,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// A parsed source file. Lives in the run's arena for the whole analysis.
pub struct ParsedModule<'a> {
    path: &'a str,
    pub source: &'a str,
    pub program: Program<'a>,
}

impl<'a> ParsedModule<'a> {
    pub fn path(&self) -> &'a Path {
        Path::new(self.path)
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: oxc_span::Span) -> &'a str {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ParsedModule<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedModule").field("path", &self.path).finish()
    }
}

/// Why a file could not be turned into a [`ParsedModule`].
#[derive(Debug)]
pub enum ParseFailure {
    UnsupportedType,
    Syntax(String),
}

/// Parse `source` into the arena.
///
/// A file with any syntax error is rejected as a whole; partially recovered
/// trees are not analyzed.
pub fn parse_module<'a>(
    allocator: &'a Allocator,
    path: &Path,
    source: &str,
) -> Result<&'a ParsedModule<'a>, ParseFailure> {
    let source_type = SourceType::from_path(path).map_err(|_| ParseFailure::UnsupportedType)?;
    let source = allocator.alloc_str(source);
    let path = allocator.alloc_str(&path.to_string_lossy());

    let ret = Parser::new(allocator, source, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(ParseFailure::Syntax(message));
    }

    let module: &'a ParsedModule<'a> = allocator.alloc(ParsedModule {
        path,
        source,
        program: ret.program,
    });
    Ok(module)
}

/// Collect every statically known module specifier a program depends on:
/// `import`, `export … from`, `require("…")` and `import("…")` with a
/// string literal.
pub fn collect_specifiers(program: &Program<'_>) -> Vec<String> {
    let mut collector = SpecifierCollector::default();
    collector.visit_program(program);
    collector.specifiers
}

#[derive(Default)]
struct SpecifierCollector {
    specifiers: Vec<String>,
}

impl SpecifierCollector {
    fn push(&mut self, specifier: &str) {
        if !self.specifiers.iter().any(|s| s == specifier) {
            self.specifiers.push(specifier.to_string());
        }
    }
}

impl<'a> Visit<'a> for SpecifierCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.push(decl.source.value.as_str());
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            self.push(source.value.as_str());
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.push(decl.source.value.as_str());
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.push(lit.value.as_str());
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some(specifier) = require_specifier(call) {
            self.push(specifier);
        }
        walk::walk_call_expression(self, call);
    }
}

/// The literal argument of a `require("…")` call.
pub fn require_specifier<'b>(call: &'b CallExpression<'_>) -> Option<&'b str> {
    match &call.callee {
        Expression::Identifier(id) if id.name == "require" => {}
        _ => return None,
    }
    match call.arguments.first() {
        Some(Argument::StringLiteral(lit)) => Some(lit.value.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_specifiers_covers_all_forms() {
        let allocator = Allocator::default();
        let module = parse_module(
            &allocator,
            Path::new("/app/index.js"),
            r#"
            import express from "express";
            import { a } from "./a";
            export { b } from "./b";
            export * from "./c";
            const d = require("./d");
            async function load() { return import("./e"); }
            const again = require("./a");
            "#,
        )
        .unwrap();

        assert_eq!(
            collect_specifiers(&module.program),
            vec!["express", "./a", "./b", "./c", "./d", "./e"]
        );
    }

    #[test]
    fn test_syntax_errors_reject_module() {
        let allocator = Allocator::default();
        let result = parse_module(&allocator, Path::new("/app/broken.js"), "const = ;");
        assert!(matches!(result, Err(ParseFailure::Syntax(_))));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let allocator = Allocator::default();
        let result = parse_module(&allocator, Path::new("/app/readme.md"), "# hi");
        assert!(matches!(result, Err(ParseFailure::UnsupportedType)));
    }

    #[test]
    fn test_text_slices_source() {
        let allocator = Allocator::default();
        let module = parse_module(&allocator, Path::new("/app/a.ts"), "let x = 1;").unwrap();
        assert_eq!(module.text(module.program.span), "let x = 1;");
        assert_eq!(module.path(), Path::new("/app/a.ts"));
    }
}
