//! Statement lowering.

use crate::descriptor::{field_descriptor, jvm_slot, kind_of, JvmKind};
use crate::{emit, put_label, CodeGenerator, MethodCtx};
use oc_par::ast::{AssignTarget, Body, Expr, Stmt};
use oc_util::{CompileError, Result};

impl<'a> CodeGenerator<'a> {
    pub(crate) fn emit_stmt(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        stmt: &Stmt,
    ) -> Result<()> {
        match stmt {
            Stmt::Return(value) => self.emit_return(out, ctx, value.as_ref()),
            Stmt::Expr(expr) => {
                self.emit_expr(out, ctx, expr)?;
                let ty = ctx.typer(self.table()).type_of(expr)?;
                if !ty.is_void() {
                    emit(out, "pop");
                }
                Ok(())
            },
            Stmt::Assign { target, value } => self.emit_assign(out, ctx, target, value),
            Stmt::While { cond, body } => self.emit_while(out, ctx, cond, body),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => self.emit_if(out, ctx, cond, then_body, else_body.as_ref()),
        }
    }

    fn emit_return(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        value: Option<&Expr>,
    ) -> Result<()> {
        let Some(expr) = value else {
            emit(out, "return");
            return Ok(());
        };

        self.emit_expr(out, ctx, expr)?;
        let descriptor = match ctx.ret {
            Some(ret) => field_descriptor(ret),
            None => self.expr_descriptor(ctx, expr)?,
        };
        match kind_of(&descriptor) {
            JvmKind::Int => emit(out, "ireturn"),
            JvmKind::Double => emit(out, "dreturn"),
            JvmKind::Void => emit(out, "return"),
            JvmKind::Reference => emit(out, "areturn"),
        }
        Ok(())
    }

    fn emit_assign(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        target: &AssignTarget,
        value: &Expr,
    ) -> Result<()> {
        // A plain name that lives in the method table is a local store;
        // everything else, including `this.name`, is a field store on the
        // ancestor that declares the field.
        if !target.this_qualified {
            if let Some(local) = ctx.locals.get(&target.name) {
                let descriptor = field_descriptor(&local.ty);
                let slot = jvm_slot(ctx.locals, &target.name).ok_or_else(|| {
                    CompileError::codegen(format!("Unknown local '{}'", target.name))
                })?;
                self.emit_expr(out, ctx, value)?;
                let op = match kind_of(&descriptor) {
                    JvmKind::Int => "istore",
                    JvmKind::Double => "dstore",
                    _ => "astore",
                };
                emit(out, &format!("{} {}", op, slot));
                return Ok(());
            }
        }

        let (owner, field) = self
            .table()
            .find_field(&ctx.class.name, &target.name)
            .ok_or_else(|| {
                CompileError::codegen(format!(
                    "Unknown field '{}' in class '{}'",
                    target.name, ctx.class.name
                ))
            })?;
        let descriptor = field_descriptor(&field.ty);

        emit(out, "aload_0");
        self.emit_expr(out, ctx, value)?;
        emit(
            out,
            &format!("putfield {}/{} {}", owner, target.name, descriptor),
        );
        Ok(())
    }

    fn emit_while(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        cond: &Expr,
        body: &Body,
    ) -> Result<()> {
        let n = self.next_label();
        put_label(out, &format!("Lstart_{}", n));
        self.emit_expr(out, ctx, cond)?;
        emit(out, &format!("ifeq Lend_{}", n));
        for stmt in &body.stmts {
            self.emit_stmt(out, ctx, stmt)?;
        }
        emit(out, &format!("goto Lstart_{}", n));
        put_label(out, &format!("Lend_{}", n));
        Ok(())
    }

    fn emit_if(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        cond: &Expr,
        then_body: &Body,
        else_body: Option<&Body>,
    ) -> Result<()> {
        let n = self.next_label();
        self.emit_expr(out, ctx, cond)?;
        emit(out, &format!("ifeq Lelse_{}", n));
        for stmt in &then_body.stmts {
            self.emit_stmt(out, ctx, stmt)?;
        }
        emit(out, &format!("goto Lend_{}", n));
        put_label(out, &format!("Lelse_{}", n));
        if let Some(else_body) = else_body {
            for stmt in &else_body.stmts {
                self.emit_stmt(out, ctx, stmt)?;
            }
        }
        put_label(out, &format!("Lend_{}", n));
        Ok(())
    }
}
