//! Declaration phases: class registration, inheritance resolution, and
//! member declaration.
//!
//! These are the first three analysis phases. They populate the class
//! table and every method's variable table; the later phases only read
//! class structure.

use crate::table::{ClassSymbol, ClassTable, MethodSymbol, MethodTable, ParamSymbol, VarSymbol};
use crate::types::{assignable_ref, is_builtin_name};
use oc_par::ast::{Body, ClassDecl, Member, MethodDecl, Program, Stmt, TypeRef};
use oc_util::{CompileError, Result};
use rustc_hash::FxHashSet;

/// Phase 1: allocate a class symbol per declaration.
///
/// Duplicate class names fail. After registration the table must contain
/// a class named `Program`, the compilation entry point.
pub fn register_classes(table: &mut ClassTable, program: &Program) -> Result<()> {
    for class in &program.classes {
        table.insert(ClassSymbol::new(&class.name))?;
    }

    if !table.contains("Program") {
        return Err(CompileError::semantic("No class 'Program' found"));
    }

    Ok(())
}

/// Phase 2: resolve parent links, then reject inheritance cycles.
pub fn resolve_inheritance(table: &mut ClassTable, program: &Program) -> Result<()> {
    for class in &program.classes {
        let Some(parent) = &class.parent else {
            continue;
        };

        let parent_name = match parent {
            TypeRef::Simple(name) => name,
            TypeRef::Generic(_, _) => {
                return Err(CompileError::semantic(format!(
                    "Class '{}' cannot extend generic type '{}'",
                    class.name, parent
                )));
            },
        };

        if parent_name == &class.name {
            return Err(CompileError::semantic(format!(
                "Class '{}' cannot extend itself",
                class.name
            )));
        }
        if !table.contains(parent_name) {
            return Err(CompileError::semantic(format!(
                "Unknown parent class '{}' of class '{}'",
                parent_name, class.name
            )));
        }

        if let Some(symbol) = table.get_mut(&class.name) {
            symbol.parent = Some(parent_name.clone());
        }
    }

    for class in table.iter() {
        let mut visited = FxHashSet::default();
        let mut current = Some(class.name.as_str());
        while let Some(name) = current {
            if !visited.insert(name) {
                return Err(CompileError::semantic(format!(
                    "Inheritance cycle detected involving class '{}'",
                    class.name
                )));
            }
            current = table.get(name).and_then(|s| s.parent.as_deref());
        }
    }

    Ok(())
}

/// Phase 3: declare fields and methods, building each method's table.
pub fn declare_members(table: &mut ClassTable, program: &Program) -> Result<()> {
    for class in &program.classes {
        for member in &class.members {
            match member {
                Member::Var(field) => declare_field(table, class, field)?,
                Member::Method(method) => declare_method(table, class, method)?,
                // Constructors are carried in the AST but never enter
                // the symbol tables.
                Member::Constructor(_) => {},
            }
        }
    }
    Ok(())
}

fn declare_field(
    table: &mut ClassTable,
    class: &ClassDecl,
    field: &oc_par::ast::VarDecl,
) -> Result<()> {
    validate_type(table, &field.ty)?;

    let symbol = table
        .get_mut(&class.name)
        .ok_or_else(|| CompileError::semantic(format!("Unknown class '{}'", class.name)))?;

    if symbol.fields.contains_key(&field.name) {
        return Err(CompileError::semantic(format!(
            "Duplicate field '{}' in class '{}'",
            field.name, class.name
        )));
    }

    symbol.fields.insert(
        field.name.clone(),
        VarSymbol {
            name: field.name.clone(),
            ty: field.ty.clone(),
        },
    );
    Ok(())
}

fn declare_method(table: &mut ClassTable, class: &ClassDecl, method: &MethodDecl) -> Result<()> {
    let mut params = Vec::new();
    let mut method_table = MethodTable::default();

    for param in &method.params {
        validate_type(table, &param.ty)?;
        if method_table.declare(&param.name, param.ty.clone()).is_none() {
            return Err(CompileError::semantic(format!(
                "Duplicate parameter '{}' in method '{}' of class '{}'",
                param.name, method.name, class.name
            )));
        }
        params.push(ParamSymbol {
            name: param.name.clone(),
            ty: param.ty.clone(),
        });
    }

    if let Some(ret) = &method.ret {
        validate_type(table, ret)?;
    }

    let param_types: Vec<TypeRef> = params.iter().map(|p| p.ty.clone()).collect();
    check_override(table, class, method, &param_types)?;

    let symbol = table
        .get_mut(&class.name)
        .ok_or_else(|| CompileError::semantic(format!("Unknown class '{}'", class.name)))?;

    let overloads = symbol.methods.entry(method.name.clone()).or_default();
    if overloads.iter().any(|m| m.params_match(&param_types)) {
        return Err(CompileError::semantic(format!(
            "Duplicate method overload '{}' in class '{}'",
            method.name, class.name
        )));
    }

    let mut method_symbol = MethodSymbol {
        name: method.name.clone(),
        params,
        ret: method.ret.clone(),
        owner: class.name.clone(),
        table: method_table,
    };

    if let Some(body) = &method.body {
        register_locals(table, &mut method_symbol, &class.name, body)?;
    }

    // Re-borrow: register_locals only touched the method symbol.
    let symbol = table
        .get_mut(&class.name)
        .ok_or_else(|| CompileError::semantic(format!("Unknown class '{}'", class.name)))?;
    symbol
        .methods
        .entry(method.name.clone())
        .or_default()
        .push(method_symbol);

    Ok(())
}

/// Registers the body's locals into the method's one flat table,
/// recursing into nested `if`/`while` bodies.
fn register_locals(
    table: &ClassTable,
    method: &mut MethodSymbol,
    class_name: &str,
    body: &Body,
) -> Result<()> {
    for var in &body.vars {
        validate_type(table, &var.ty)?;
        if method.table.declare(&var.name, var.ty.clone()).is_none() {
            return Err(CompileError::semantic(format!(
                "Duplicate variable '{}' in method '{}' of class '{}'",
                var.name, method.name, class_name
            )));
        }
    }
    for stmt in &body.stmts {
        match stmt {
            Stmt::While { body, .. } => register_locals(table, method, class_name, body)?,
            Stmt::If {
                then_body,
                else_body,
                ..
            } => {
                register_locals(table, method, class_name, then_body)?;
                if let Some(else_body) = else_body {
                    register_locals(table, method, class_name, else_body)?;
                }
            },
            _ => {},
        }
    }
    Ok(())
}

/// If an ancestor declares a method with the same name and identical
/// parameter types, the override's return type must be assignable to the
/// overridden one (checked only when both are declared).
fn check_override(
    table: &ClassTable,
    class: &ClassDecl,
    method: &MethodDecl,
    param_types: &[TypeRef],
) -> Result<()> {
    let mut current = table.get(&class.name).and_then(|s| s.parent.as_deref());

    while let Some(ancestor_name) = current {
        let Some(ancestor) = table.get(ancestor_name) else {
            break;
        };
        if let Some(overridden) = ancestor.overload(&method.name, param_types) {
            if let (Some(child_ret), Some(parent_ret)) = (&method.ret, &overridden.ret) {
                if !assignable_ref(table, child_ret, parent_ret) {
                    return Err(CompileError::semantic(format!(
                        "Override of method '{}' in class '{}' has incompatible return type: \
                         '{}' is not assignable to '{}'",
                        method.name, class.name, child_ret, parent_ret
                    )));
                }
            }
            return Ok(());
        }
        current = ancestor.parent.as_deref();
    }
    Ok(())
}

/// Every referenced type name, except built-ins and `Array`, must name a
/// registered class. Generic arguments are validated recursively.
fn validate_type(table: &ClassTable, ty: &TypeRef) -> Result<()> {
    match ty {
        TypeRef::Simple(name) => {
            if is_builtin_name(name) || table.contains(name) {
                Ok(())
            } else {
                Err(CompileError::semantic(format!("Unknown type '{}'", name)))
            }
        },
        TypeRef::Generic(base, args) => {
            if !is_builtin_name(base) && !table.contains(base) {
                return Err(CompileError::semantic(format!("Unknown type '{}'", base)));
            }
            for arg in args {
                validate_type(table, arg)?;
            }
            Ok(())
        },
    }
}
