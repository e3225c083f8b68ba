//! Expression lowering.

use crate::descriptor::{field_descriptor, jvm_slot, kind_of, method_descriptor, JvmKind};
use crate::{emit, CodeGenerator, MethodCtx};
use oc_par::ast::{Expr, TypeRef};
use oc_sem::resolve_overload;
use oc_util::{CompileError, Result};

impl<'a> CodeGenerator<'a> {
    pub(crate) fn emit_expr(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        expr: &Expr,
    ) -> Result<()> {
        match expr {
            Expr::Int(value) => {
                emit(out, &int_const(*value));
                Ok(())
            },
            Expr::Bool(value) => {
                emit(out, if *value { "iconst_1" } else { "iconst_0" });
                Ok(())
            },
            Expr::Real(value) => {
                emit(out, &format!("ldc2_w {}", format_real(*value)));
                Ok(())
            },
            Expr::This => {
                emit(out, "aload_0");
                Ok(())
            },
            Expr::Ident(name) => self.emit_name_load(out, ctx, name),
            Expr::Field { receiver, name } => self.emit_field_load(out, ctx, receiver.as_deref(), name),
            Expr::Call {
                receiver,
                method,
                args,
            } => self.emit_call(out, ctx, receiver.as_deref(), method, args),
            Expr::ClassRef(ty) => Err(CompileError::codegen(format!(
                "type reference '{}' cannot be evaluated",
                ty
            ))),
        }
    }

    /// Loads a plain name: a local by slot, or a field of the enclosing
    /// class through `this`.
    fn emit_name_load(&mut self, out: &mut String, ctx: &MethodCtx<'_>, name: &str) -> Result<()> {
        if let Some(local) = ctx.locals.get(name) {
            let descriptor = field_descriptor(&local.ty);
            let slot = jvm_slot(ctx.locals, name)
                .ok_or_else(|| CompileError::codegen(format!("Unknown local '{}'", name)))?;
            let op = match kind_of(&descriptor) {
                JvmKind::Int => "iload",
                JvmKind::Double => "dload",
                _ => "aload",
            };
            emit(out, &format!("{} {}", op, slot));
            return Ok(());
        }

        let (owner, field) = self
            .table()
            .find_field(&ctx.class.name, name)
            .ok_or_else(|| {
                CompileError::codegen(format!(
                    "Unknown field '{}' in class '{}'",
                    name, ctx.class.name
                ))
            })?;
        emit(out, "aload_0");
        emit(
            out,
            &format!(
                "getfield {}/{} {}",
                owner,
                name,
                field_descriptor(&field.ty)
            ),
        );
        Ok(())
    }

    fn emit_field_load(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        receiver: Option<&Expr>,
        name: &str,
    ) -> Result<()> {
        let receiver_class = match receiver {
            Some(receiver) => {
                self.emit_expr(out, ctx, receiver)?;
                let ty = ctx.typer(self.table()).type_of(receiver)?;
                let class = ty
                    .as_ref()
                    .and_then(|t| self.table().lookup(t))
                    .ok_or_else(|| {
                        CompileError::codegen(format!(
                            "Unknown receiver class for field '{}'",
                            name
                        ))
                    })?;
                class.name.clone()
            },
            None => {
                emit(out, "aload_0");
                ctx.class.name.clone()
            },
        };

        let (owner, field) = self.table().find_field(&receiver_class, name).ok_or_else(|| {
            CompileError::codegen(format!(
                "Unknown field '{}' in class '{}'",
                name, receiver_class
            ))
        })?;
        emit(
            out,
            &format!(
                "getfield {}/{} {}",
                owner,
                name,
                field_descriptor(&field.ty)
            ),
        );
        Ok(())
    }

    fn emit_call(
        &mut self,
        out: &mut String,
        ctx: &MethodCtx<'_>,
        receiver: Option<&Expr>,
        method: &str,
        args: &[Expr],
    ) -> Result<()> {
        match receiver {
            None if method == "print" => self.emit_print(out, ctx, args),
            None => {
                // Receiver-less calls resolve on the enclosing class and
                // dispatch statically.
                let typer = ctx.typer(self.table());
                let mut arg_tys = Vec::with_capacity(args.len());
                for arg in args {
                    arg_tys.push(typer.type_of(arg)?);
                }
                let symbol = resolve_overload(self.table(), &ctx.class.name, method, &arg_tys)?;
                let descriptor =
                    method_descriptor(symbol.params.iter().map(|p| &p.ty), symbol.ret.as_ref());
                for arg in args {
                    self.emit_expr(out, ctx, arg)?;
                }
                emit(
                    out,
                    &format!("invokestatic {}/{}{}", symbol.owner, symbol.name, descriptor),
                );
                Ok(())
            },
            Some(receiver) => {
                let receiver_ty = ctx.typer(self.table()).type_of(receiver)?;
                let Some(receiver_ref) = receiver_ty.as_ref().cloned() else {
                    return Err(CompileError::codegen(format!(
                        "Unknown receiver class for method '{}'",
                        method
                    )));
                };

                self.emit_expr(out, ctx, receiver)?;
                for arg in args {
                    self.emit_expr(out, ctx, arg)?;
                }

                if let Some(class) = self.table().lookup(&receiver_ref) {
                    let typer = ctx.typer(self.table());
                    let mut arg_tys = Vec::with_capacity(args.len());
                    for arg in args {
                        arg_tys.push(typer.type_of(arg)?);
                    }
                    let symbol = resolve_overload(self.table(), &class.name, method, &arg_tys)?;
                    let descriptor =
                        method_descriptor(symbol.params.iter().map(|p| &p.ty), symbol.ret.as_ref());
                    emit(
                        out,
                        &format!(
                            "invokevirtual {}/{}{}",
                            symbol.owner, symbol.name, descriptor
                        ),
                    );
                    return Ok(());
                }

                self.emit_builtin_op(out, &receiver_ref, method)
            },
        }
    }

    /// The arithmetic subset supported on built-in receivers.
    fn emit_builtin_op(&mut self, out: &mut String, receiver: &TypeRef, method: &str) -> Result<()> {
        let op = match (receiver.name(), method) {
            ("Integer", "Plus") => "iadd",
            ("Integer", "Mult") => "imul",
            ("Real", "Plus") => "dadd",
            ("Real", "Mult") => "dmul",
            _ => {
                return Err(CompileError::codegen(format!(
                    "Unsupported built-in method '{}' on type '{}'",
                    method, receiver
                )))
            },
        };
        emit(out, op);
        Ok(())
    }

    /// Lowers `print(arg)` to `System.out.println`, selecting the
    /// overload by the argument's type.
    fn emit_print(&mut self, out: &mut String, ctx: &MethodCtx<'_>, args: &[Expr]) -> Result<()> {
        let arg = args.first().ok_or_else(|| {
            CompileError::codegen("Built-in 'print' requires an argument".to_string())
        })?;

        emit(out, "getstatic java/lang/System/out Ljava/io/PrintStream;");
        self.emit_expr(out, ctx, arg)?;

        let descriptor = self.expr_descriptor(ctx, arg)?;
        let println = match descriptor.as_str() {
            "I" => "println(I)V",
            "D" => "println(D)V",
            "Z" => "println(Z)V",
            _ => "println(Ljava/lang/Object;)V",
        };
        emit(out, &format!("invokevirtual java/io/PrintStream/{}", println));
        Ok(())
    }
}

/// Selects the smallest instruction that pushes an integer constant.
fn int_const(value: i64) -> String {
    match value {
        -1 => "iconst_m1".to_string(),
        0..=5 => format!("iconst_{}", value),
        -128..=127 => format!("bipush {}", value),
        -32768..=32767 => format!("sipush {}", value),
        _ => format!("ldc {}", value),
    }
}

/// Formats a real literal so Jasmin always sees a double constant.
fn format_real(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_real, int_const};
    use crate::{ClassFile, CodeGenerator};
    use oc_lex::tokenize;

    fn generate(source: &str) -> Vec<ClassFile> {
        let program = oc_par::parse(tokenize(source)).unwrap();
        let analysis = oc_sem::analyze(program).unwrap();
        let mut generator = CodeGenerator::new(&analysis.table);
        generator.generate(&analysis.program).unwrap()
    }

    fn method_text(source: &str) -> String {
        generate(source).into_iter().next().unwrap().text
    }

    #[test]
    fn test_int_const_selection() {
        assert_eq!(int_const(-1), "iconst_m1");
        assert_eq!(int_const(0), "iconst_0");
        assert_eq!(int_const(5), "iconst_5");
        assert_eq!(int_const(6), "bipush 6");
        assert_eq!(int_const(-2), "bipush -2");
        assert_eq!(int_const(127), "bipush 127");
        assert_eq!(int_const(128), "sipush 128");
        assert_eq!(int_const(-32768), "sipush -32768");
        assert_eq!(int_const(32768), "ldc 32768");
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(0.0), "0.0");
        assert_eq!(format_real(3.0), "3.0");
        assert_eq!(format_real(3.14), "3.14");
        assert_eq!(format_real(-2.5), "-2.5");
    }

    #[test]
    fn test_folded_chain_lowers_to_bipush() {
        let text = method_text(
            "class Program is
                method f(): Integer is
                    return 5.Plus(3).Mult(2)
                end
                method main() is end
            end",
        );
        assert!(text.contains("bipush 16"));
        assert!(!text.contains("iadd"));
    }

    #[test]
    fn test_unfolded_integer_plus_lowers_to_iadd() {
        let text = method_text(
            "class Program is
                method f(a: Integer, b: Integer): Integer is
                    return a.Plus(b)
                end
                method main() is end
            end",
        );
        assert!(text.contains("iload 1"));
        assert!(text.contains("iload 2"));
        assert!(text.contains("iadd"));
        assert!(text.contains("ireturn"));
    }

    #[test]
    fn test_real_mult_lowers_to_dmul() {
        let text = method_text(
            "class Program is
                method f(a: Real, b: Real): Real is
                    return a.Mult(b)
                end
                method main() is end
            end",
        );
        assert!(text.contains("dload 1"));
        assert!(text.contains("dload 3"));
        assert!(text.contains("dmul"));
    }

    #[test]
    fn test_unsupported_builtin_method_fails() {
        let program = oc_par::parse(tokenize(
            "class Program is
                method f(a: Integer, b: Integer): Integer is
                    return a.Minus(b)
                end
                method main() is end
            end",
        ))
        .unwrap();
        let analysis = oc_sem::analyze(program).unwrap();
        let mut generator = CodeGenerator::new(&analysis.table);
        let err = generator.generate(&analysis.program).unwrap_err();
        assert!(err.to_string().contains("Unsupported built-in method"));
    }

    #[test]
    fn test_print_integer() {
        let text = method_text(
            "class Program is
                method main() is print(42) end
            end",
        );
        assert!(text.contains("getstatic java/lang/System/out Ljava/io/PrintStream;"));
        assert!(text.contains("bipush 42"));
        assert!(text.contains("invokevirtual java/io/PrintStream/println(I)V"));
    }

    #[test]
    fn test_print_real_and_bool() {
        let text = method_text(
            "class Program is
                method main() is
                    print(1.5)
                    print(true)
                end
            end",
        );
        assert!(text.contains("println(D)V"));
        assert!(text.contains("println(Z)V"));
    }

    #[test]
    fn test_print_object() {
        let text = method_text(
            "class Program is
                method main() is print(this) end
            end",
        );
        assert!(text.contains("println(Ljava/lang/Object;)V"));
    }

    #[test]
    fn test_receiverless_call_is_static() {
        let text = method_text(
            "class Program is
                method helper(): Integer is return 1 end
                method main() is
                    var x: Integer
                    x := helper()
                end
            end",
        );
        assert!(text.contains("invokestatic Program/helper()I"));
    }

    #[test]
    fn test_virtual_call_on_user_class() {
        let files = generate(
            "class Greeter is
                method greet(): Integer is return 1 end
            end
            class Program is
                var g: Greeter
                method main() is
                    var x: Integer
                    x := g.greet()
                end
            end",
        );
        let text = &files[1].text;
        assert!(text.contains("getfield Program/g LGreeter;"));
        assert!(text.contains("invokevirtual Greeter/greet()I"));
    }

    #[test]
    fn test_virtual_call_names_declaring_class() {
        let files = generate(
            "class Base is
                method greet(): Integer is return 1 end
            end
            class Child extends Base is end
            class Program is
                var c: Child
                method main() is
                    var x: Integer
                    x := c.greet()
                end
            end",
        );
        let text = &files[2].text;
        assert!(text.contains("invokevirtual Base/greet()I"));
    }

    #[test]
    fn test_field_load_through_receiver() {
        let files = generate(
            "class Point is var x: Integer end
            class Program is
                var p: Point
                method f(): Integer is
                    return p.x
                end
                method main() is end
            end",
        );
        let text = &files[1].text;
        assert!(text.contains("getfield Program/p LPoint;"));
        assert!(text.contains("getfield Point/x I"));
    }

    #[test]
    fn test_this_load() {
        let text = method_text(
            "class Program is
                method f(): Program is return this end
                method main() is end
            end",
        );
        assert!(text.contains("aload_0"));
    }
}
