//! Declaration parsing: classes, members, variables, methods, constructors.

use crate::ast::*;
use crate::Parser;
use oc_lex::TokenKind;
use oc_util::{CompileError, Result};

impl Parser {
    /// Parses `'class' Ident [ 'extends' Type ] 'is' { Member } 'end'`.
    pub(crate) fn parse_class_decl(&mut self) -> Result<ClassDecl> {
        self.stream().expect_text("class")?;
        let name = self.expect_ident()?;

        let parent = if self.eat_keyword("extends") {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.stream().expect_text("is")?;

        let mut members = Vec::new();
        while !self.eat_keyword("end") {
            if self.stream().peek().is_none() {
                let line = self.stream().current_line();
                return Err(CompileError::syntax(
                    line,
                    format!("expected 'end' closing class '{}', found end of input", name),
                ));
            }
            members.push(self.parse_member()?);
        }

        Ok(ClassDecl {
            name,
            parent,
            members,
        })
    }

    /// Parses one class member: a field, a method, or a constructor.
    fn parse_member(&mut self) -> Result<Member> {
        let visibility = if self.eat_keyword("private") {
            Visibility::Private
        } else if self.eat_keyword("public") {
            Visibility::Public
        } else {
            Visibility::Default
        };

        if self.eat_keyword("var") {
            return Ok(Member::Var(self.parse_var_decl(visibility)?));
        }

        if visibility != Visibility::Default {
            let line = self.stream().current_line();
            return Err(CompileError::syntax(
                line,
                "expected 'var' after access modifier",
            ));
        }

        if self.eat_keyword("method") {
            return Ok(Member::Method(self.parse_method_decl()?));
        }
        if self.eat_keyword("this") {
            return Ok(Member::Constructor(self.parse_ctor_decl()?));
        }

        let line = self.stream().current_line();
        let found = self
            .stream()
            .peek()
            .map_or("end of input".to_string(), |t| format!("'{}'", t.text));
        Err(CompileError::syntax(
            line,
            format!("expected 'var', 'method', or 'this', found {}", found),
        ))
    }

    /// Parses `Ident ':' Type [ '(' Args ')' ]` after the `var` keyword.
    ///
    /// Without the argument form the initializer is the sentinel
    /// `ClassRef`; with it, a constructor invocation written as a
    /// receiver-less call to the type name.
    pub(crate) fn parse_var_decl(&mut self, visibility: Visibility) -> Result<VarDecl> {
        let name = self.expect_ident()?;
        self.stream().expect_text(":")?;
        let ty = self.parse_type()?;

        let init = if self.eat_symbol("(") {
            let args = self.parse_call_args()?;
            Expr::Call {
                receiver: None,
                method: ty.name().to_string(),
                args,
            }
        } else {
            Expr::ClassRef(ty.clone())
        };

        Ok(VarDecl {
            name,
            ty,
            init,
            visibility,
        })
    }

    /// Parses `Ident '(' Params ')' [ ':' Type ] [ 'is' Body ]`.
    fn parse_method_decl(&mut self) -> Result<MethodDecl> {
        let name = self.expect_ident()?;
        let params = self.parse_params()?;

        let ret = if self.eat_symbol(":") {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = if self.eat_keyword("is") {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(MethodDecl {
            name,
            params,
            ret,
            body,
        })
    }

    /// Parses `'(' Params ')' [ 'is' Body ]` after the `this` keyword.
    fn parse_ctor_decl(&mut self) -> Result<CtorDecl> {
        let params = self.parse_params()?;
        let body = if self.eat_keyword("is") {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(CtorDecl { params, body })
    }

    /// Parses a parenthesized, comma-separated parameter list.
    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.stream().expect_text("(")?;

        let mut params = Vec::new();
        if self.eat_symbol(")") {
            return Ok(params);
        }

        loop {
            let name = self.expect_ident()?;
            self.stream().expect_text(":")?;
            let ty = self.parse_type()?;
            params.push(Param { name, ty });

            if !self.eat_symbol(",") {
                break;
            }
        }
        self.stream().expect_text(")")?;

        Ok(params)
    }

    /// Parses call arguments after a consumed `'('`.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat_symbol(")") {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr()?);
            if !self.eat_symbol(",") {
                break;
            }
        }
        self.stream().expect_text(")")?;

        Ok(args)
    }

    pub(crate) fn starts_expr(&self) -> bool {
        match self.stream.peek() {
            Some(t) => match t.kind {
                TokenKind::Number | TokenKind::Identifier => true,
                TokenKind::Keyword => matches!(t.text.as_str(), "true" | "false" | "this"),
                TokenKind::SpecialSymbol => t.text == "(",
                TokenKind::Error => false,
            },
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oc_lex::tokenize;

    fn parse_program(source: &str) -> Result<Program> {
        crate::parse(tokenize(source))
    }

    #[test]
    fn test_class_with_parent() {
        let program = parse_program("class B extends A is end").unwrap();
        let class = &program.classes[0];
        assert_eq!(class.name, "B");
        assert_eq!(class.parent, Some(TypeRef::simple("A")));
    }

    #[test]
    fn test_generic_parent_parses() {
        // Rejected later, in semantic analysis.
        let program = parse_program("class B extends Array[Integer] is end").unwrap();
        assert!(matches!(
            program.classes[0].parent,
            Some(TypeRef::Generic(_, _))
        ));
    }

    #[test]
    fn test_field_without_initializer_gets_sentinel() {
        let program = parse_program("class A is var x: Integer end").unwrap();
        match &program.classes[0].members[0] {
            Member::Var(v) => {
                assert_eq!(v.name, "x");
                assert_eq!(v.init, Expr::ClassRef(TypeRef::simple("Integer")));
                assert_eq!(v.visibility, Visibility::Default);
            },
            other => panic!("expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_field_with_constructor_call() {
        let program = parse_program("class A is var x: Integer(3) end").unwrap();
        match &program.classes[0].members[0] {
            Member::Var(v) => assert_eq!(
                v.init,
                Expr::Call {
                    receiver: None,
                    method: "Integer".to_string(),
                    args: vec![Expr::Int(3)],
                }
            ),
            other => panic!("expected field, got {:?}", other),
        }
    }

    #[test]
    fn test_visibility_modifiers() {
        let program =
            parse_program("class A is private var x: Integer public var y: Real end").unwrap();
        match (&program.classes[0].members[0], &program.classes[0].members[1]) {
            (Member::Var(x), Member::Var(y)) => {
                assert_eq!(x.visibility, Visibility::Private);
                assert_eq!(y.visibility, Visibility::Public);
            },
            other => panic!("expected two fields, got {:?}", other),
        }
    }

    #[test]
    fn test_visibility_requires_var() {
        assert!(parse_program("class A is private method f() is end end").is_err());
    }

    #[test]
    fn test_method_with_params_and_return() {
        let program =
            parse_program("class A is method f(a: Integer, b: Real): Bool is end end").unwrap();
        match &program.classes[0].members[0] {
            Member::Method(m) => {
                assert_eq!(m.name, "f");
                assert_eq!(m.params.len(), 2);
                assert_eq!(m.params[0].name, "a");
                assert_eq!(m.params[1].ty, TypeRef::simple("Real"));
                assert_eq!(m.ret, Some(TypeRef::simple("Bool")));
            },
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_method_without_body() {
        let program = parse_program("class A is method f(): Integer end").unwrap();
        match &program.classes[0].members[0] {
            Member::Method(m) => assert!(m.body.is_none()),
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor() {
        let program =
            parse_program("class A is this(x: Integer) is end end").unwrap();
        match &program.classes[0].members[0] {
            Member::Constructor(c) => {
                assert_eq!(c.params.len(), 1);
                assert!(c.body.is_some());
            },
            other => panic!("expected constructor, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_class() {
        let err = parse_program("class A is").unwrap_err();
        assert!(err.to_string().contains("end of input"));
    }

}
