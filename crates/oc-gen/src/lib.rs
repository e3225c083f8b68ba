//! oc-gen - Jasmin code generation for the O language.
//!
//! The generator walks the optimized AST once per class and renders one
//! Jasmin text per class. Outputs are buffered as [`ClassFile`] values;
//! nothing touches the filesystem here, so the driver can write all
//! files only after every class generated successfully.

mod descriptor;
mod expr;
mod stmt;

pub use descriptor::{
    field_descriptor, jvm_slot, kind_of, method_descriptor, return_descriptor, slot_size, JvmKind,
};

use oc_par::ast::{ClassDecl, CtorDecl, Expr, Member, MethodDecl, Program, TypeRef, VarDecl};
use oc_sem::{ClassSymbol, ClassTable, ExprTyper, MethodTable};
use oc_util::{CompileError, Result};

/// One generated Jasmin class: the class name and the full file text.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub name: String,
    pub text: String,
}

/// Jasmin emitter over the class table and the optimized program.
///
/// The label counter is shared across every method the generator
/// compiles, so labels are globally unique within one generator
/// instance; a fresh generator starts over from zero.
pub struct CodeGenerator<'a> {
    table: &'a ClassTable,
    labels: u32,
}

/// Per-method emission context.
pub(crate) struct MethodCtx<'a> {
    pub class: &'a ClassSymbol,
    pub locals: &'a MethodTable,
    pub ret: Option<&'a TypeRef>,
}

impl<'a> MethodCtx<'a> {
    /// Builds an expression typer over this context. The lifetime is the
    /// shorter of the context's and the table's, so contexts over
    /// short-lived ad-hoc tables (constructors) work too.
    pub(crate) fn typer<'b>(&'b self, table: &'b ClassTable) -> ExprTyper<'b> {
        ExprTyper {
            table,
            class_name: &self.class.name,
            locals: self.locals,
        }
    }
}

/// Appends an instruction line, indented four spaces.
pub(crate) fn emit(out: &mut String, line: &str) {
    out.push_str("    ");
    out.push_str(line);
    out.push('\n');
}

/// Appends a directive line in column zero.
pub(crate) fn directive(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

/// Appends a label line in column zero.
pub(crate) fn put_label(out: &mut String, name: &str) {
    out.push_str(name);
    out.push_str(":\n");
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator over the analyzed class table.
    pub fn new(table: &'a ClassTable) -> Self {
        Self { table, labels: 0 }
    }

    /// Generates every class of the program, all-or-nothing.
    pub fn generate(&mut self, program: &Program) -> Result<Vec<ClassFile>> {
        program
            .classes
            .iter()
            .map(|class| self.emit_class(class))
            .collect()
    }

    /// Returns the next value of the shared label counter.
    pub(crate) fn next_label(&mut self) -> u32 {
        let label = self.labels;
        self.labels += 1;
        label
    }

    pub(crate) fn class_symbol(&self, name: &str) -> Result<&'a ClassSymbol> {
        self.table
            .get(name)
            .ok_or_else(|| CompileError::codegen(format!("Unknown class '{}'", name)))
    }

    pub(crate) fn table(&self) -> &'a ClassTable {
        self.table
    }

    fn emit_class(&mut self, class_decl: &ClassDecl) -> Result<ClassFile> {
        let class_sym = self.class_symbol(&class_decl.name)?;
        let super_name = class_sym.parent.as_deref().unwrap_or("java/lang/Object");

        let mut out = String::new();
        directive(&mut out, &format!(".class public {}", class_sym.name));
        directive(&mut out, &format!(".super {}", super_name));

        for (name, field) in class_sym.fields.iter() {
            directive(
                &mut out,
                &format!(
                    ".field protected {} {}",
                    name,
                    field_descriptor(&field.ty)
                ),
            );
        }

        let ctors: Vec<&CtorDecl> = class_decl
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Constructor(c) => Some(c),
                _ => None,
            })
            .collect();

        if ctors.is_empty() {
            self.emit_default_init(&mut out, class_sym, class_decl, super_name)?;
        } else {
            for ctor in ctors {
                self.emit_ctor(&mut out, class_sym, class_decl, super_name, ctor)?;
            }
        }

        for member in &class_decl.members {
            if let Member::Method(method) = member {
                if method.body.is_some() {
                    self.emit_method(&mut out, class_sym, method)?;
                }
            }
        }

        Ok(ClassFile {
            name: class_sym.name.clone(),
            text: out,
        })
    }

    /// Emits the synthesized `<init>()V` for a class with no declared
    /// constructor: super-init, then field initializers.
    fn emit_default_init(
        &mut self,
        out: &mut String,
        class_sym: &'a ClassSymbol,
        class_decl: &ClassDecl,
        super_name: &str,
    ) -> Result<()> {
        directive(out, "");
        directive(out, ".method public <init>()V");
        directive(out, ".limit stack 32");
        directive(out, ".limit locals 16");
        emit(out, "aload_0");
        emit(out, &format!("invokespecial {}/<init>()V", super_name));

        let no_locals = MethodTable::default();
        self.emit_field_initializers(out, class_sym, class_decl, &no_locals)?;

        emit(out, "return");
        directive(out, ".end method");
        Ok(())
    }

    /// Emits one declared constructor: super-init, field initializers,
    /// then the constructor body. Parameter slots come from an ad-hoc
    /// table, since constructors never enter the symbol tables.
    fn emit_ctor(
        &mut self,
        out: &mut String,
        class_sym: &'a ClassSymbol,
        class_decl: &ClassDecl,
        super_name: &str,
        ctor: &CtorDecl,
    ) -> Result<()> {
        let mut locals = MethodTable::default();
        for param in &ctor.params {
            if locals.declare(&param.name, param.ty.clone()).is_none() {
                return Err(CompileError::codegen(format!(
                    "Duplicate constructor parameter '{}' in class '{}'",
                    param.name, class_sym.name
                )));
            }
        }

        let desc = method_descriptor(ctor.params.iter().map(|p| &p.ty), None);
        directive(out, "");
        directive(out, &format!(".method public <init>{}", desc));
        directive(out, ".limit stack 32");
        directive(out, ".limit locals 16");
        emit(out, "aload_0");
        emit(out, &format!("invokespecial {}/<init>()V", super_name));

        self.emit_field_initializers(out, class_sym, class_decl, &locals)?;

        if let Some(body) = &ctor.body {
            let ctx = MethodCtx {
                class: class_sym,
                locals: &locals,
                ret: None,
            };
            for stmt in &body.stmts {
                self.emit_stmt(out, &ctx, stmt)?;
            }
        }

        emit(out, "return");
        directive(out, ".end method");
        Ok(())
    }

    /// Lowers the field initializer expressions recorded on `VarDecl`s.
    ///
    /// Only the constructor-invocation shape (a receiver-less call naming
    /// the field's own type) produces code; the bare sentinel and any
    /// other shape are skipped.
    fn emit_field_initializers(
        &mut self,
        out: &mut String,
        class_sym: &'a ClassSymbol,
        class_decl: &ClassDecl,
        locals: &MethodTable,
    ) -> Result<()> {
        for member in &class_decl.members {
            let Member::Var(field) = member else {
                continue;
            };
            self.emit_field_initializer(out, class_sym, field, locals)?;
        }
        Ok(())
    }

    fn emit_field_initializer(
        &mut self,
        out: &mut String,
        class_sym: &'a ClassSymbol,
        field: &VarDecl,
        locals: &MethodTable,
    ) -> Result<()> {
        let Expr::Call {
            receiver: None,
            method,
            args,
        } = &field.init
        else {
            return Ok(());
        };
        if method != field.ty.name() {
            return Ok(());
        }

        let ctx = MethodCtx {
            class: class_sym,
            locals,
            ret: None,
        };
        let desc = field_descriptor(&field.ty);
        let target = format!("putfield {}/{} {}", class_sym.name, field.name, desc);

        match &field.ty {
            ty if ty.is_simple_named("Integer") || ty.is_simple_named("Bool") => {
                emit(out, "aload_0");
                match args.first() {
                    Some(arg) => self.emit_expr(out, &ctx, arg)?,
                    None => emit(out, "iconst_0"),
                }
                emit(out, &target);
            },
            ty if ty.is_simple_named("Real") => {
                emit(out, "aload_0");
                match args.first() {
                    Some(arg) => self.emit_expr(out, &ctx, arg)?,
                    None => emit(out, "ldc2_w 0.0"),
                }
                emit(out, &target);
            },
            TypeRef::Simple(user_class) if self.table.contains(user_class) => {
                emit(out, "aload_0");
                emit(out, &format!("new {}", user_class));
                emit(out, "dup");
                let mut arg_descs = String::new();
                for arg in args {
                    self.emit_expr(out, &ctx, arg)?;
                    arg_descs.push_str(&self.expr_descriptor(&ctx, arg)?);
                }
                emit(
                    out,
                    &format!("invokespecial {}/<init>({})V", user_class, arg_descs),
                );
                emit(out, &target);
            },
            _ => {},
        }

        Ok(())
    }

    fn emit_method(
        &mut self,
        out: &mut String,
        class_sym: &'a ClassSymbol,
        method: &MethodDecl,
    ) -> Result<()> {
        let param_types: Vec<TypeRef> = method.params.iter().map(|p| p.ty.clone()).collect();
        let sym = class_sym
            .overload(&method.name, &param_types)
            .ok_or_else(|| {
                CompileError::codegen(format!(
                    "Unknown method '{}' in class '{}'",
                    method.name, class_sym.name
                ))
            })?;

        let desc = method_descriptor(sym.params.iter().map(|p| &p.ty), sym.ret.as_ref());
        directive(out, "");
        directive(out, &format!(".method public {}{}", sym.name, desc));
        directive(out, ".limit stack 32");
        directive(out, ".limit locals 16");

        let ctx = MethodCtx {
            class: class_sym,
            locals: &sym.table,
            ret: sym.ret.as_ref(),
        };
        if let Some(body) = &method.body {
            for stmt in &body.stmts {
                self.emit_stmt(out, &ctx, stmt)?;
            }
        }

        // Void methods always get a terminating return; a duplicate after
        // an explicit return is harmless at the assembler level.
        if sym.ret.is_none() {
            emit(out, "return");
        }
        directive(out, ".end method");

        if class_sym.name == "Program"
            && method.name == "main"
            && method.params.is_empty()
            && method.ret.is_none()
        {
            self.emit_main_wrapper(out);
        }

        Ok(())
    }

    /// Emits the static JVM entry point that allocates a `Program` and
    /// invokes its instance `main()V`.
    fn emit_main_wrapper(&mut self, out: &mut String) {
        directive(out, "");
        directive(out, ".method public static main([Ljava/lang/String;)V");
        directive(out, ".limit stack 32");
        directive(out, ".limit locals 16");
        emit(out, "new Program");
        emit(out, "dup");
        emit(out, "invokespecial Program/<init>()V");
        emit(out, "invokevirtual Program/main()V");
        emit(out, "return");
        directive(out, ".end method");
    }

    /// The field descriptor of an expression's inferred type.
    pub(crate) fn expr_descriptor(&self, ctx: &MethodCtx<'_>, expr: &Expr) -> Result<String> {
        let ty = ctx.typer(self.table).type_of(expr)?;
        match ty.as_ref() {
            Some(type_ref) => Ok(field_descriptor(type_ref)),
            None => Err(CompileError::codegen(
                "cannot derive a descriptor for an expression of unknown type".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_lex::tokenize;

    fn generate(source: &str) -> Result<Vec<ClassFile>> {
        let program = oc_par::parse(tokenize(source))?;
        let analysis = oc_sem::analyze(program)?;
        let mut generator = CodeGenerator::new(&analysis.table);
        generator.generate(&analysis.program)
    }

    fn generate_one(source: &str) -> String {
        let files = generate(source).unwrap();
        files.into_iter().next().unwrap().text
    }

    #[test]
    fn test_smallest_program() {
        let text = generate_one("class Program is method main() is end end");
        assert!(text.contains(".class public Program"));
        assert!(text.contains(".super java/lang/Object"));
        assert!(text.contains(".method public <init>()V"));
        assert!(text.contains("invokespecial java/lang/Object/<init>()V"));
        assert!(text.contains(".method public main()V"));
        assert!(text.contains(".method public static main([Ljava/lang/String;)V"));
        assert!(text.contains("new Program"));
        assert!(text.contains("invokevirtual Program/main()V"));
    }

    #[test]
    fn test_field_with_constructor_call() {
        let text =
            generate_one("class Program is var x: Integer(3) method main() is end end");
        assert!(text.contains(".field protected x I"));
        assert!(text.contains("iconst_3"));
        assert!(text.contains("putfield Program/x I"));
    }

    #[test]
    fn test_field_defaults() {
        let text = generate_one(
            "class Program is
                var i: Integer()
                var r: Real()
                var b: Bool()
                method main() is end
            end",
        );
        assert!(text.contains("putfield Program/i I"));
        assert!(text.contains("ldc2_w 0.0"));
        assert!(text.contains("putfield Program/r D"));
        assert!(text.contains("putfield Program/b Z"));
    }

    #[test]
    fn test_bare_field_sentinel_skipped() {
        let text = generate_one("class Program is var x: Integer method main() is end end");
        assert!(text.contains(".field protected x I"));
        assert!(!text.contains("putfield Program/x I"));
    }

    #[test]
    fn test_user_class_field_initializer() {
        let files = generate(
            "class Point is
                this(x: Integer) is end
            end
            class Program is
                var origin: Point(0)
                method main() is end
            end",
        )
        .unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].text.contains(".class public Point"));
        let program = &files[1].text;
        assert!(program.contains("new Point"));
        assert!(program.contains("dup"));
        assert!(program.contains("invokespecial Point/<init>(I)V"));
        assert!(program.contains("putfield Program/origin LPoint;"));
    }

    #[test]
    fn test_declared_constructor() {
        let text = generate_one(
            "class Program is
                var x: Integer
                this(v: Integer) is
                    this.x := v
                end
                method main() is end
            end",
        );
        assert!(text.contains(".method public <init>(I)V"));
        assert!(text.contains("iload 1"));
        assert!(text.contains("putfield Program/x I"));
        assert!(!text.contains(".method public <init>()V"));
    }

    #[test]
    fn test_parent_super() {
        let files = generate(
            "class Base is end
            class Program extends Base is method main() is end end",
        )
        .unwrap();
        let program = &files[1].text;
        assert!(program.contains(".super Base"));
        assert!(program.contains("invokespecial Base/<init>()V"));
    }

    #[test]
    fn test_method_without_body_not_emitted() {
        let text = generate_one(
            "class Program is
                method declared(): Integer
                method main() is end
            end",
        );
        assert!(!text.contains("declared"));
    }

    #[test]
    fn test_limits_present() {
        let text = generate_one("class Program is method main() is end end");
        assert!(text.contains(".limit stack 32"));
        assert!(text.contains(".limit locals 16"));
    }
}
