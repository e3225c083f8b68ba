//! Name resolution (phase 4).
//!
//! Walks every method body and checks that each plain name, assignment
//! target, and receiver-less call resolves. Plain names resolve against
//! the method table first, then the field chain of the class and its
//! ancestors; `this.`-qualified names resolve against the field chain
//! only. Receiver-less calls to the built-in `print` bypass resolution.

use crate::table::{ClassTable, MethodTable};
use oc_par::ast::{Body, ClassDecl, Expr, Member, Program, Stmt};
use oc_util::{CompileError, Result};

/// Runs name resolution over every method body in the program.
pub fn resolve_names(table: &ClassTable, program: &Program) -> Result<()> {
    for class in &program.classes {
        for member in &class.members {
            if let Member::Method(method) = member {
                let Some(body) = &method.body else {
                    continue;
                };
                let class_sym = table.require(&class.name)?;
                let param_types: Vec<_> =
                    method.params.iter().map(|p| p.ty.clone()).collect();
                let method_sym = class_sym
                    .overload(&method.name, &param_types)
                    .ok_or_else(|| {
                        CompileError::semantic(format!(
                            "Unknown method '{}' in class '{}'",
                            method.name, class.name
                        ))
                    })?;
                let resolver = Resolver {
                    table,
                    class,
                    locals: &method_sym.table,
                };
                resolver.resolve_body(body)?;
            }
        }
    }
    Ok(())
}

struct Resolver<'a> {
    table: &'a ClassTable,
    class: &'a ClassDecl,
    locals: &'a MethodTable,
}

impl Resolver<'_> {
    fn resolve_body(&self, body: &Body) -> Result<()> {
        // Local initializers are sentinels or constructor invocations;
        // they are not part of the statement walk.
        for stmt in &body.stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    fn resolve_stmt(&self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => {
                if target.this_qualified {
                    if self.table.find_field(&self.class.name, &target.name).is_none() {
                        return Err(CompileError::semantic(format!(
                            "Unknown field '{}' in class '{}'",
                            target.name, self.class.name
                        )));
                    }
                } else if !self.locals.contains(&target.name)
                    && self.table.find_field(&self.class.name, &target.name).is_none()
                {
                    return Err(CompileError::semantic(format!(
                        "Unknown variable '{}' in method of class '{}'",
                        target.name, self.class.name
                    )));
                }
                self.resolve_expr(value)
            },
            Stmt::While { cond, body } => {
                self.resolve_expr(cond)?;
                self.resolve_body(body)
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.resolve_expr(cond)?;
                self.resolve_body(then_body)?;
                if let Some(else_body) = else_body {
                    self.resolve_body(else_body)?;
                }
                Ok(())
            },
            Stmt::Return(value) => match value {
                Some(expr) => self.resolve_expr(expr),
                None => Ok(()),
            },
            Stmt::Expr(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_expr(&self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Ident(name) => {
                if self.locals.contains(name)
                    || self.table.find_field(&self.class.name, name).is_some()
                {
                    Ok(())
                } else {
                    Err(CompileError::semantic(format!(
                        "Unknown variable '{}' in method of class '{}'",
                        name, self.class.name
                    )))
                }
            },
            Expr::Field { receiver, .. } => {
                // The field name is receiver-typed; it is checked during
                // type checking.
                match receiver {
                    Some(receiver) => self.resolve_expr(receiver),
                    None => Ok(()),
                }
            },
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                match receiver {
                    Some(receiver) => self.resolve_expr(receiver)?,
                    None => {
                        if method != "print"
                            && self
                                .table
                                .find_method_class(&self.class.name, method)
                                .is_none()
                        {
                            return Err(CompileError::semantic(format!(
                                "Unknown method '{}' in class '{}'",
                                method, self.class.name
                            )));
                        }
                    },
                }
                for arg in args {
                    self.resolve_expr(arg)?;
                }
                Ok(())
            },
            Expr::Int(_)
            | Expr::Real(_)
            | Expr::Bool(_)
            | Expr::This
            | Expr::ClassRef(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare;
    use oc_lex::tokenize;

    fn resolve(source: &str) -> Result<()> {
        let program = oc_par::parse(tokenize(source))?;
        let mut table = ClassTable::new();
        declare::register_classes(&mut table, &program)?;
        declare::resolve_inheritance(&mut table, &program)?;
        declare::declare_members(&mut table, &program)?;
        resolve_names(&table, &program)
    }

    #[test]
    fn test_local_and_field_resolve() {
        let source = "class Program is
            var count: Integer
            method f(a: Integer) is
                var b: Integer
                b := a
                count := b
                this.count := a
            end
        end";
        assert!(resolve(source).is_ok());
    }

    #[test]
    fn test_unknown_variable() {
        let source = "class Program is method f() is x := 1 end end";
        let err = resolve(source).unwrap_err();
        assert!(err.to_string().contains("Unknown variable 'x'"));
    }

    #[test]
    fn test_this_qualified_requires_field() {
        let source = "class Program is
            method f(x: Integer) is
                this.x := 1
            end
        end";
        let err = resolve(source).unwrap_err();
        assert!(err.to_string().contains("Unknown field 'x'"));
    }

    #[test]
    fn test_inherited_field_resolves() {
        let source = "class Base is var n: Integer end
        class Program extends Base is
            method f() is n := 3 end
        end";
        assert!(resolve(source).is_ok());
    }

    #[test]
    fn test_print_bypasses_resolution() {
        let source = "class Program is method main() is print(1) end end";
        assert!(resolve(source).is_ok());
    }

    #[test]
    fn test_unknown_receiverless_method() {
        let source = "class Program is method main() is helper() end end";
        let err = resolve(source).unwrap_err();
        assert!(err.to_string().contains("Unknown method 'helper'"));
    }

    #[test]
    fn test_receiverless_call_any_arity_resolves() {
        // Resolution only requires the name to exist; arity is checked
        // during type checking.
        let source = "class Program is
            method helper(a: Integer) is end
            method main() is helper(1) end
        end";
        assert!(resolve(source).is_ok());
    }

    #[test]
    fn test_inherited_method_resolves() {
        let source = "class Base is method helper() is end end
        class Program extends Base is
            method main() is helper() end
        end";
        assert!(resolve(source).is_ok());
    }
}
