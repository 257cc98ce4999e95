//! Import bindings of a module.
//!
//! Maps a local name to the module specifier and export it was bound from,
//! covering ESM imports and top-level CommonJS `require` declarations.

use oxc_ast::ast::{
    BindingPatternKind, Expression, ImportDeclarationSpecifier, ModuleExportName, Statement,
    VariableDeclaration,
};

use crate::loader::ParsedModule;
use crate::loader::parser::require_specifier;
use crate::value::symbolic::{property_key_name, unwrap_expression};

/// Which export of the source module a local name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imported {
    /// `import x from "…"`
    Default,
    /// `import { x } from "…"` or `const { x } = require("…")`
    Named(String),
    /// `import * as x from "…"`
    Namespace,
    /// `const x = require("…")`: the whole `module.exports` value.
    Module,
}

/// A local name bound by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: Imported,
    pub specifier: String,
}

/// Every import binding declared at the top level of `module`.
pub fn import_bindings(module: &ParsedModule<'_>) -> Vec<ImportBinding> {
    let mut bindings = Vec::new();
    for stmt in &module.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let Some(specifiers) = &decl.specifiers else {
                    continue;
                };
                let specifier = decl.source.value.to_string();
                for spec in specifiers {
                    let (local, imported) = match spec {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            (s.local.name.as_str(), Imported::Named(export_name(&s.imported)))
                        }
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            (s.local.name.as_str(), Imported::Default)
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            (s.local.name.as_str(), Imported::Namespace)
                        }
                    };
                    bindings.push(ImportBinding {
                        local: local.to_string(),
                        imported,
                        specifier: specifier.clone(),
                    });
                }
            }
            Statement::VariableDeclaration(decl) => require_bindings(decl, &mut bindings),
            _ => {}
        }
    }
    bindings
}

/// The binding for `local`, if it was imported.
pub fn find_import(module: &ParsedModule<'_>, local: &str) -> Option<ImportBinding> {
    import_bindings(module).into_iter().find(|b| b.local == local)
}

pub fn export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn require_bindings(decl: &VariableDeclaration<'_>, bindings: &mut Vec<ImportBinding>) {
    for declarator in &decl.declarations {
        let Some(init) = &declarator.init else {
            continue;
        };
        let Expression::CallExpression(call) = unwrap_expression(init) else {
            continue;
        };
        let Some(specifier) = require_specifier(call) else {
            continue;
        };

        match &declarator.id.kind {
            BindingPatternKind::BindingIdentifier(id) => bindings.push(ImportBinding {
                local: id.name.to_string(),
                imported: Imported::Module,
                specifier: specifier.to_string(),
            }),
            BindingPatternKind::ObjectPattern(pattern) => {
                for property in &pattern.properties {
                    let Some(key) = property_key_name(&property.key) else {
                        continue;
                    };
                    let local = match &property.value.kind {
                        BindingPatternKind::BindingIdentifier(id) => id.name.to_string(),
                        BindingPatternKind::AssignmentPattern(assign) => match &assign.left.kind {
                            BindingPatternKind::BindingIdentifier(id) => id.name.to_string(),
                            _ => continue,
                        },
                        _ => continue,
                    };
                    bindings.push(ImportBinding {
                        local,
                        imported: Imported::Named(key),
                        specifier: specifier.to_string(),
                    });
                }
            }
            _ => {}
        }
    }
}
