//! Top-level symbol lookup within a single module.
//!
//! Finds functions, object-literal methods, class methods and exports by
//! name. Nothing here follows imports; see [`crate::routes::handlers`] and
//! [`crate::returns`] for cross-file resolution.

use oxc_ast::ast::{
    ArrowFunctionExpression, AssignmentTarget, BindingPattern, BindingPatternKind, Class,
    ClassElement, Declaration, ExportDefaultDeclarationKind, Expression, FormalParameters,
    Function, FunctionBody, MethodDefinitionKind, ObjectExpression, ObjectPropertyKind, Statement,
    TSType,
};

use crate::bindings::export_name;
use crate::loader::ParsedModule;
use crate::value::symbolic::{expression_path, property_key_name, unwrap_expression};

/// A function-like node: declaration, expression, method or arrow.
#[derive(Debug, Clone, Copy)]
pub enum FunctionRef<'b, 'a> {
    Function(&'b Function<'a>),
    Arrow(&'b ArrowFunctionExpression<'a>),
}

impl<'b, 'a> FunctionRef<'b, 'a> {
    /// A function or arrow expression, looking through parentheses.
    pub fn from_expression(expr: &'b Expression<'a>) -> Option<Self> {
        match unwrap_expression(expr) {
            Expression::FunctionExpression(func) => Some(Self::Function(func)),
            Expression::ArrowFunctionExpression(arrow) => Some(Self::Arrow(arrow)),
            _ => None,
        }
    }

    pub fn params(&self) -> &'b FormalParameters<'a> {
        match self {
            Self::Function(func) => &func.params,
            Self::Arrow(arrow) => &arrow.params,
        }
    }

    pub fn body(&self) -> Option<&'b FunctionBody<'a>> {
        match self {
            Self::Function(func) => func.body.as_deref(),
            Self::Arrow(arrow) => Some(&*arrow.body),
        }
    }

    /// The expression of an expression-bodied arrow (`() => value`).
    pub fn expression_body(&self) -> Option<&'b Expression<'a>> {
        match self {
            Self::Arrow(arrow) if arrow.expression => match arrow.body.statements.first() {
                Some(Statement::ExpressionStatement(stmt)) => Some(&stmt.expression),
                _ => None,
            },
            _ => None,
        }
    }

    /// Declared return type, if annotated.
    pub fn return_type(&self) -> Option<&'b TSType<'a>> {
        let annotation = match self {
            Self::Function(func) => func.return_type.as_deref(),
            Self::Arrow(arrow) => arrow.return_type.as_deref(),
        };
        annotation.map(|a| &a.type_annotation)
    }
}

/// Name bound by a plain identifier pattern.
pub fn binding_name<'b>(pattern: &'b BindingPattern<'_>) -> Option<&'b str> {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => Some(id.name.as_str()),
        _ => None,
    }
}

/// Top-level declarations, looking through `export` wrappers.
pub fn declarations<'a>(module: &'a ParsedModule<'a>) -> impl Iterator<Item = &'a Declaration<'a>> {
    module.program.body.iter().filter_map(|stmt| match stmt {
        Statement::ExportNamedDeclaration(export) => export.declaration.as_ref(),
        _ => stmt.as_declaration(),
    })
}

/// The value of a top-level `const name = …`.
///
/// # Returns
///
/// The initializer with parentheses, `await` and TypeScript assertions
/// removed, or
/// `None` when `name` is not declared at the top level or has no initializer.
pub fn variable_init<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<&'a Expression<'a>> {
    declarations(module).find_map(|decl| match decl {
        Declaration::VariableDeclaration(var) => var.declarations.iter().find_map(|d| {
            match (binding_name(&d.id), &d.init) {
                (Some(id), Some(init)) if id == name => Some(unwrap_expression(init)),
                _ => None,
            }
        }),
        _ => None,
    })
}

/// A function declaration or a `const` bound to a function/arrow.
pub fn find_function<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<FunctionRef<'a, 'a>> {
    let declared = declarations(module).find_map(|decl| match decl {
        Declaration::FunctionDeclaration(func)
            if func.id.as_ref().is_some_and(|id| id.name == name) =>
        {
            Some(FunctionRef::Function(func))
        }
        _ => None,
    });
    if declared.is_some() {
        return declared;
    }

    if let Some(init) = variable_init(module, name) {
        if let Some(func) = FunctionRef::from_expression(init) {
            return Some(func);
        }
    }

    match default_export(module) {
        Some(DefaultExport::Function(func, Some(id))) if id == name => Some(func),
        _ => None,
    }
}

/// A method named `key` on any top-level object literal.
pub fn find_object_method<'a>(module: &'a ParsedModule<'a>, key: &str) -> Option<FunctionRef<'a, 'a>> {
    top_level_objects(module)
        .into_iter()
        .find_map(|obj| object_method(obj, key))
}

/// `export { local as name }` where `local` is a function or object method.
pub fn find_export_alias<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<FunctionRef<'a, 'a>> {
    let local = module.program.body.iter().find_map(|stmt| match stmt {
        Statement::ExportNamedDeclaration(export) if export.source.is_none() => export
            .specifiers
            .iter()
            .find(|spec| export_name(&spec.exported) == name)
            .map(|spec| export_name(&spec.local)),
        _ => None,
    })?;
    if local == name {
        return None;
    }
    find_function(module, &local).or_else(|| find_object_method(module, &local))
}

/// Resolve `name` to a function within `module`: a declaration, an
/// object-literal method, then an export alias.
pub fn find_local_handler<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<FunctionRef<'a, 'a>> {
    find_function(module, name)
        .or_else(|| find_object_method(module, name))
        .or_else(|| find_export_alias(module, name))
}

/// A method called `key` on the object literal.
pub fn object_method<'a>(obj: &'a ObjectExpression<'a>, key: &str) -> Option<FunctionRef<'a, 'a>> {
    obj.properties.iter().find_map(|property| match property {
        ObjectPropertyKind::ObjectProperty(prop)
            if property_key_name(&prop.key).as_deref() == Some(key) =>
        {
            FunctionRef::from_expression(&prop.value)
        }
        _ => None,
    })
}

/// A method called `key` on the class, either a method definition or an
/// arrow-valued property.
pub fn class_method<'a>(class: &'a Class<'a>, key: &str) -> Option<FunctionRef<'a, 'a>> {
    class.body.body.iter().find_map(|element| match element {
        ClassElement::MethodDefinition(method)
            if method.kind == MethodDefinitionKind::Method
                && property_key_name(&method.key).as_deref() == Some(key) =>
        {
            Some(FunctionRef::Function(&method.value))
        }
        ClassElement::PropertyDefinition(prop)
            if property_key_name(&prop.key).as_deref() == Some(key) =>
        {
            prop.value.as_ref().and_then(FunctionRef::from_expression)
        }
        _ => None,
    })
}

/// A top-level class by name.
pub fn find_class<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<&'a Class<'a>> {
    let declared = declarations(module).find_map(|decl| match decl {
        Declaration::ClassDeclaration(class) if class.id.as_ref().is_some_and(|id| id.name == name) => {
            Some(&**class)
        }
        _ => None,
    });
    declared.or_else(|| default_class(module).filter(|class| {
        class.id.as_ref().is_some_and(|id| id.name == name)
    }))
}

/// `export default class …`, without resolving instances.
fn default_class<'a>(module: &'a ParsedModule<'a>) -> Option<&'a Class<'a>> {
    module.program.body.iter().find_map(|stmt| match stmt {
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::ClassDeclaration(class) => Some(&**class),
            _ => None,
        },
        _ => None,
    })
}

/// Method `method` on the local binding `object`: an object literal, a class,
/// or an instance created with `new Class()`.
///
/// # Example
///
/// ```rust,ignore
/// let source = r#"
///     class UserService { find(id) { return { id }; } }
///     const users = new UserService();
/// "#;
/// let module = parse_module(&allocator, Path::new("/app/users.js"), source)?;
/// assert!(find_member(&module, "users", "find").is_some());
/// assert!(find_member(&module, "UserService", "find").is_some());
/// assert!(find_member(&module, "users", "remove").is_none());
/// ```
pub fn find_member<'a>(
    module: &'a ParsedModule<'a>,
    object: &str,
    method: &str,
) -> Option<FunctionRef<'a, 'a>> {
    if let Some(class) = find_class(module, object) {
        return class_method(class, method);
    }
    match variable_init(module, object)? {
        Expression::ObjectExpression(obj) => object_method(obj, method),
        Expression::ClassExpression(class) => class_method(class, method),
        Expression::NewExpression(new) => {
            let class_name = expression_path(&new.callee)?;
            class_method(find_class(module, &class_name)?, method)
        }
        _ => None,
    }
}

/// Any function-like definition called `name`: a function, an object-literal
/// method, a class method or an `exports.name = …` assignment.
///
/// Used when the owner of `name` is unknown, as in conventional service
/// lookup, so the first match in that order wins.
///
/// # Example
///
/// ```rust,ignore
/// let source = "module.exports = { getAll() { return []; } };";
/// let module = parse_module(&allocator, Path::new("/app/product.service.js"), source)?;
/// let func = find_definition(&module, "getAll").unwrap();
/// assert!(func.body().is_some());
/// ```
pub fn find_definition<'a>(module: &'a ParsedModule<'a>, name: &str) -> Option<FunctionRef<'a, 'a>> {
    if let Some(func) = find_function(module, name).or_else(|| find_object_method(module, name)) {
        return Some(func);
    }

    let classes = declarations(module)
        .filter_map(|decl| match decl {
            Declaration::ClassDeclaration(class) => Some(&**class),
            _ => None,
        })
        .chain(default_class(module));
    for class in classes {
        if let Some(func) = class_method(class, name) {
            return Some(func);
        }
    }

    commonjs_exports(module)
        .into_iter()
        .find(|(export, _)| export == name)
        .and_then(|(_, value)| FunctionRef::from_expression(value))
}

/// What a module exports as its default.
#[derive(Debug, Clone, Copy)]
pub enum DefaultExport<'a> {
    /// A function, with its own name when declared with one.
    Function(FunctionRef<'a, 'a>, Option<&'a str>),
    Object(&'a ObjectExpression<'a>),
    Class(&'a Class<'a>),
    /// `export default name` / `module.exports = name`
    Identifier(&'a str),
    /// `export default new Name()`
    Instance(&'a Class<'a>),
}

/// The module's default export, ESM or `module.exports = …`.
///
/// An ESM `export default` takes precedence over a CommonJS assignment in
/// the same file.
///
/// # Example
///
/// ```rust,ignore
/// let module = parse_module(&allocator, path, "export default new UserController();\nclass UserController {}")?;
/// assert!(matches!(default_export(&module), Some(DefaultExport::Instance(_))));
/// ```
pub fn default_export<'a>(module: &'a ParsedModule<'a>) -> Option<DefaultExport<'a>> {
    for stmt in &module.program.body {
        if let Statement::ExportDefaultDeclaration(export) = stmt {
            return match &export.declaration {
                ExportDefaultDeclarationKind::FunctionDeclaration(func) => Some(DefaultExport::Function(
                    FunctionRef::Function(func),
                    func.id.as_ref().map(|id| id.name.as_str()),
                )),
                ExportDefaultDeclarationKind::ClassDeclaration(class) => Some(DefaultExport::Class(class)),
                kind => kind
                    .as_expression()
                    .and_then(|expr| default_from_expression(module, expr)),
            };
        }
    }

    module.program.body.iter().find_map(|stmt| match stmt {
        Statement::ExpressionStatement(stmt) => match unwrap_expression(&stmt.expression) {
            Expression::AssignmentExpression(assign) if is_module_exports(&assign.left) => {
                default_from_expression(module, &assign.right)
            }
            _ => None,
        },
        _ => None,
    })
}

fn default_from_expression<'a>(
    module: &'a ParsedModule<'a>,
    expr: &'a Expression<'a>,
) -> Option<DefaultExport<'a>> {
    let expr = unwrap_expression(expr);
    if let Some(func) = FunctionRef::from_expression(expr) {
        let name = match expr {
            Expression::FunctionExpression(f) => f.id.as_ref().map(|id| id.name.as_str()),
            _ => None,
        };
        return Some(DefaultExport::Function(func, name));
    }
    match expr {
        Expression::ObjectExpression(obj) => Some(DefaultExport::Object(obj)),
        Expression::ClassExpression(class) => Some(DefaultExport::Class(class)),
        Expression::Identifier(id) => Some(DefaultExport::Identifier(id.name.as_str())),
        Expression::NewExpression(new) => {
            let class_name = expression_path(&new.callee)?;
            find_class(module, &class_name).map(DefaultExport::Instance)
        }
        _ => None,
    }
}

fn is_module_exports(target: &AssignmentTarget<'_>) -> bool {
    match target {
        AssignmentTarget::StaticMemberExpression(member) => {
            member.property.name == "exports"
                && matches!(&member.object, Expression::Identifier(id) if id.name == "module")
        }
        _ => false,
    }
}

/// `exports.name = value` and `module.exports.name = value` assignments.
pub fn commonjs_exports<'a>(module: &'a ParsedModule<'a>) -> Vec<(String, &'a Expression<'a>)> {
    let mut exports = Vec::new();
    for stmt in &module.program.body {
        let Statement::ExpressionStatement(stmt) = stmt else {
            continue;
        };
        let Expression::AssignmentExpression(assign) = unwrap_expression(&stmt.expression) else {
            continue;
        };
        let AssignmentTarget::StaticMemberExpression(member) = &assign.left else {
            continue;
        };
        let target = expression_path(&member.object);
        if matches!(target.as_deref(), Some("exports" | "module.exports")) {
            exports.push((member.property.name.to_string(), &assign.right));
        }
    }
    exports
}

/// Local names and exported names of everything the module exports.
pub fn exported_names(module: &ParsedModule<'_>) -> Vec<String> {
    let mut names = Vec::new();
    let mut push = |name: String| {
        if !names.contains(&name) {
            names.push(name);
        }
    };

    for stmt in &module.program.body {
        match stmt {
            Statement::ExportNamedDeclaration(export) => {
                if let Some(Declaration::VariableDeclaration(var)) = &export.declaration {
                    for decl in &var.declarations {
                        if let Some(name) = binding_name(&decl.id) {
                            push(name.to_string());
                        }
                    }
                }
                if let Some(Declaration::FunctionDeclaration(func)) = &export.declaration {
                    if let Some(id) = &func.id {
                        push(id.name.to_string());
                    }
                }
                for spec in &export.specifiers {
                    push(export_name(&spec.local));
                    push(export_name(&spec.exported));
                }
            }
            Statement::ExportDefaultDeclaration(export) => {
                if let Some(Expression::Identifier(id)) = export.declaration.as_expression() {
                    push(id.name.to_string());
                }
            }
            Statement::ExpressionStatement(stmt) => {
                let Expression::AssignmentExpression(assign) = unwrap_expression(&stmt.expression) else {
                    continue;
                };
                if !is_module_exports(&assign.left) {
                    if let AssignmentTarget::StaticMemberExpression(member) = &assign.left {
                        if matches!(
                            expression_path(&member.object).as_deref(),
                            Some("exports" | "module.exports")
                        ) {
                            push(member.property.name.to_string());
                            if let Expression::Identifier(id) = unwrap_expression(&assign.right) {
                                push(id.name.to_string());
                            }
                        }
                    }
                    continue;
                }
                match unwrap_expression(&assign.right) {
                    Expression::Identifier(id) => push(id.name.to_string()),
                    Expression::ObjectExpression(obj) => {
                        for property in &obj.properties {
                            if let ObjectPropertyKind::ObjectProperty(prop) = property {
                                if let Some(key) = property_key_name(&prop.key) {
                                    push(key);
                                }
                                if let Expression::Identifier(id) = &prop.value {
                                    push(id.name.to_string());
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
    names
}

/// Object literals bound at the top level: `const x = {…}`, `export default
/// {…}` and `module.exports = {…}`.
fn top_level_objects<'a>(module: &'a ParsedModule<'a>) -> Vec<&'a ObjectExpression<'a>> {
    let mut objects: Vec<&'a ObjectExpression<'a>> = declarations(module)
        .filter_map(|decl| match decl {
            Declaration::VariableDeclaration(var) => Some(var.declarations.iter()),
            _ => None,
        })
        .flatten()
        .filter_map(|d| match d.init.as_ref().map(unwrap_expression) {
            Some(Expression::ObjectExpression(obj)) => Some(&**obj),
            _ => None,
        })
        .collect();
    if let Some(DefaultExport::Object(obj)) = default_export(module) {
        objects.push(obj);
    }
    objects
}
