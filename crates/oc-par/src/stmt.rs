//! Statement and body parsing.

use crate::ast::*;
use crate::Parser;
use oc_util::{CompileError, Result};

impl Parser {
    /// Parses `{ 'var' VarDecl | Stmt } 'end'`, consuming the `end`.
    pub(crate) fn parse_body(&mut self) -> Result<Body> {
        let mut body = Body::default();

        loop {
            if self.eat_keyword("end") {
                return Ok(body);
            }
            if self.stream.peek().is_none() {
                let line = self.stream.current_line();
                return Err(CompileError::syntax(
                    line,
                    "expected 'end' closing body, found end of input",
                ));
            }
            self.parse_body_item(&mut body)?;
        }
    }

    /// Parses the statements of one `if` branch.
    ///
    /// Branches do not own a terminator: parsing stops (without consuming)
    /// at `else` or at the single `end` shared by both branches. Nested
    /// `if`/`while` bodies consume their own `end` inside their own parse
    /// calls, so the terminators always balance.
    fn parse_branch_body(&mut self) -> Result<Body> {
        let mut body = Body::default();

        loop {
            if self.at_text("else") || self.at_text("end") {
                return Ok(body);
            }
            if self.stream.peek().is_none() {
                let line = self.stream.current_line();
                return Err(CompileError::syntax(
                    line,
                    "expected 'end' closing if statement, found end of input",
                ));
            }
            self.parse_body_item(&mut body)?;
        }
    }

    fn parse_body_item(&mut self, body: &mut Body) -> Result<()> {
        if self.eat_keyword("var") {
            body.vars.push(self.parse_var_decl(Visibility::Default)?);
        } else {
            body.stmts.push(self.parse_stmt()?);
        }
        Ok(())
    }

    /// Parses a single statement.
    fn parse_stmt(&mut self) -> Result<Stmt> {
        if self.eat_keyword("return") {
            let value = if self.starts_expr() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Stmt::Return(value));
        }

        if self.eat_keyword("while") {
            let cond = self.parse_expr()?;
            self.stream.expect_text("loop")?;
            let body = self.parse_body()?;
            return Ok(Stmt::While { cond, body });
        }

        if self.eat_keyword("if") {
            let cond = self.parse_expr()?;
            self.stream.expect_text("then")?;
            let then_body = self.parse_branch_body()?;
            let else_body = if self.eat_keyword("else") {
                Some(self.parse_branch_body()?)
            } else {
                None
            };
            self.stream.expect_text("end")?;
            return Ok(Stmt::If {
                cond,
                then_body,
                else_body,
            });
        }

        if self.eat_keyword("this") {
            return self.parse_this_stmt();
        }

        if self.stream.match_kind(oc_lex::TokenKind::Identifier) {
            return self.parse_ident_stmt();
        }

        let line = self.stream.current_line();
        let found = self
            .stream
            .peek()
            .map_or("end of input".to_string(), |t| format!("'{}'", t.text));
        Err(CompileError::syntax(
            line,
            format!("expected statement, found {}", found),
        ))
    }

    /// Parses a statement beginning with `this`: a qualified field
    /// assignment `this.x := e` or an expression statement.
    fn parse_this_stmt(&mut self) -> Result<Stmt> {
        if !self.eat_symbol(".") {
            // Bare `this` as an expression statement.
            return Ok(Stmt::Expr(self.parse_postfix_chain(Expr::This)?));
        }

        let name = self.expect_ident()?;

        if self.eat_symbol(":=") {
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign {
                target: AssignTarget {
                    name,
                    this_qualified: true,
                },
                value,
            });
        }

        let head = self.finish_member_sel(Expr::This, name)?;
        Ok(Stmt::Expr(self.parse_postfix_chain(head)?))
    }

    /// Parses a statement beginning with an identifier: a plain
    /// assignment `x := e` or an expression statement.
    fn parse_ident_stmt(&mut self) -> Result<Stmt> {
        let name = self.expect_ident()?;

        if self.eat_symbol(":=") {
            let value = self.parse_expr()?;
            return Ok(Stmt::Assign {
                target: AssignTarget {
                    name,
                    this_qualified: false,
                },
                value,
            });
        }

        let head = if self.eat_symbol("(") {
            let args = self.parse_call_args()?;
            Expr::Call {
                receiver: None,
                method: name,
                args,
            }
        } else {
            Expr::Ident(name)
        };

        Ok(Stmt::Expr(self.parse_postfix_chain(head)?))
    }
}
