//! Type checking (phase 5).
//!
//! Infers a type for every expression and enforces assignability at
//! assignments and returns. The same inference, exposed as [`ExprTyper`],
//! is reused by the code generator to pick instructions and descriptors.

use crate::overload::resolve_overload;
use crate::table::{ClassTable, MethodTable};
use crate::types::{assignable, builtin_method_type, Ty};
use oc_par::ast::{Body, Expr, Member, Program, Stmt, TypeRef};
use oc_util::{CompileError, Result};

/// Expression type inference over a method context.
pub struct ExprTyper<'a> {
    pub table: &'a ClassTable,
    /// Name of the enclosing class (the type of `this`).
    pub class_name: &'a str,
    /// The method's variable table (params and locals).
    pub locals: &'a MethodTable,
}

impl ExprTyper<'_> {
    /// Infers the type of an expression.
    pub fn type_of(&self, expr: &Expr) -> Result<Ty> {
        match expr {
            Expr::Int(_) => Ok(Ty::integer()),
            Expr::Real(_) => Ok(Ty::real()),
            Expr::Bool(_) => Ok(Ty::bool()),
            Expr::This => Ok(Ty::Named(TypeRef::simple(self.class_name))),
            Expr::ClassRef(ty) => Ok(Ty::Named(ty.clone())),
            Expr::Ident(name) => self.type_of_name(name),
            Expr::Field { receiver, name } => {
                let receiver_ty = match receiver {
                    Some(receiver) => self.type_of(receiver)?,
                    None => Ty::Named(TypeRef::simple(self.class_name)),
                };
                self.type_of_field(&receiver_ty, name)
            },
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                let mut arg_tys = Vec::with_capacity(args.len());
                for arg in args {
                    arg_tys.push(self.type_of(arg)?);
                }
                self.type_of_call(receiver.as_deref(), method, args, &arg_tys)
            },
        }
    }

    /// Resolves a plain name: method table first, then the field chain.
    pub fn type_of_name(&self, name: &str) -> Result<Ty> {
        if let Some(local) = self.locals.get(name) {
            return Ok(Ty::Named(local.ty.clone()));
        }
        if let Some((_, field)) = self.table.find_field(self.class_name, name) {
            return Ok(Ty::Named(field.ty.clone()));
        }
        Err(CompileError::semantic(format!(
            "Unknown variable '{}' in method of class '{}'",
            name, self.class_name
        )))
    }

    fn type_of_field(&self, receiver_ty: &Ty, name: &str) -> Result<Ty> {
        let Some(type_ref) = receiver_ty.as_ref() else {
            return Ok(Ty::Unknown);
        };
        match self.table.lookup(type_ref) {
            Some(class) => match self.table.find_field(&class.name, name) {
                Some((_, field)) => Ok(Ty::Named(field.ty.clone())),
                None => Err(CompileError::semantic(format!(
                    "Unknown field '{}' in class '{}'",
                    name, class.name
                ))),
            },
            // Field access on a built-in receiver yields Unknown
            // without failing.
            None => Ok(Ty::Unknown),
        }
    }

    fn type_of_call(
        &self,
        receiver: Option<&Expr>,
        method: &str,
        args: &[Expr],
        arg_tys: &[Ty],
    ) -> Result<Ty> {
        match receiver {
            None if method == "print" => {
                if args.len() != 1 {
                    return Err(CompileError::semantic(format!(
                        "Built-in 'print' takes 1 argument, got {}",
                        args.len()
                    )));
                }
                Ok(Ty::void())
            },
            None => {
                let symbol = resolve_overload(self.table, self.class_name, method, arg_tys)?;
                Ok(Ty::from_ret(&symbol.ret))
            },
            Some(receiver) => {
                let receiver_ty = self.type_of(receiver)?;
                let Some(type_ref) = receiver_ty.as_ref() else {
                    return Ok(Ty::Unknown);
                };
                if let Some(class) = self.table.lookup(type_ref) {
                    let symbol = resolve_overload(self.table, &class.name, method, arg_tys)?;
                    return Ok(Ty::from_ret(&symbol.ret));
                }
                builtin_method_type(type_ref, method, arg_tys).ok_or_else(|| {
                    CompileError::semantic(format!(
                        "Unknown method '{}' on built-in type '{}'",
                        method, type_ref
                    ))
                })
            },
        }
    }
}

/// Runs type checking over every method body in the program.
pub fn check_types(table: &ClassTable, program: &Program) -> Result<()> {
    for class in &program.classes {
        for member in &class.members {
            let Member::Method(method) = member else {
                continue;
            };
            let Some(body) = &method.body else {
                continue;
            };
            let class_sym = table.require(&class.name)?;
            let param_types: Vec<_> = method.params.iter().map(|p| p.ty.clone()).collect();
            let method_sym = class_sym
                .overload(&method.name, &param_types)
                .ok_or_else(|| {
                    CompileError::semantic(format!(
                        "Unknown method '{}' in class '{}'",
                        method.name, class.name
                    ))
                })?;

            let checker = Checker {
                typer: ExprTyper {
                    table,
                    class_name: &class.name,
                    locals: &method_sym.table,
                },
                method_name: &method.name,
                ret: &method.ret,
            };
            checker.check_body(body)?;
        }
    }
    Ok(())
}

struct Checker<'a> {
    typer: ExprTyper<'a>,
    method_name: &'a str,
    ret: &'a Option<TypeRef>,
}

impl Checker<'_> {
    fn check_body(&self, body: &Body) -> Result<()> {
        for stmt in &body.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign { target, value } => {
                let value_ty = self.typer.type_of(value)?;
                let target_ty = if target.this_qualified {
                    match self
                        .typer
                        .table
                        .find_field(self.typer.class_name, &target.name)
                    {
                        Some((_, field)) => Ty::Named(field.ty.clone()),
                        None => {
                            return Err(CompileError::semantic(format!(
                                "Unknown field '{}' in class '{}'",
                                target.name, self.typer.class_name
                            )))
                        },
                    }
                } else {
                    self.typer.type_of_name(&target.name)?
                };
                if !assignable(self.typer.table, &value_ty, &target_ty) {
                    return Err(CompileError::semantic(format!(
                        "Type mismatch in assignment to '{}': cannot assign '{}' to '{}'",
                        target.name, value_ty, target_ty
                    )));
                }
                Ok(())
            },
            Stmt::While { cond, body } => {
                // Condition type is inferred but not constrained.
                self.typer.type_of(cond)?;
                self.check_body(body)
            },
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.typer.type_of(cond)?;
                self.check_body(then_body)?;
                if let Some(else_body) = else_body {
                    self.check_body(else_body)?;
                }
                Ok(())
            },
            Stmt::Return(None) => {
                if self.ret.is_some() {
                    return Err(CompileError::semantic(format!(
                        "Missing return value in method '{}'",
                        self.method_name
                    )));
                }
                Ok(())
            },
            Stmt::Return(Some(expr)) => {
                let value_ty = self.typer.type_of(expr)?;
                let Some(ret) = self.ret else {
                    return Err(CompileError::semantic(format!(
                        "Return value in void method '{}'",
                        self.method_name
                    )));
                };
                if !assignable(self.typer.table, &value_ty, &Ty::Named(ret.clone())) {
                    return Err(CompileError::semantic(format!(
                        "Return type mismatch in method '{}': cannot return '{}' as '{}'",
                        self.method_name, value_ty, ret
                    )));
                }
                Ok(())
            },
            Stmt::Expr(expr) => {
                self.typer.type_of(expr)?;
                Ok(())
            },
        }
    }
}
