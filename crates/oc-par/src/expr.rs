//! Expression parsing.

use crate::ast::Expr;
use crate::Parser;
use oc_lex::TokenKind;
use oc_util::{CompileError, Result};

impl Parser {
    /// Parses `Primary { '.' MemberSel }`.
    pub(crate) fn parse_expr(&mut self) -> Result<Expr> {
        let primary = self.parse_primary()?;
        self.parse_postfix_chain(primary)
    }

    /// Continues a member-selection chain on an already-parsed receiver.
    pub(crate) fn parse_postfix_chain(&mut self, mut expr: Expr) -> Result<Expr> {
        while self.eat_symbol(".") {
            let name = self.expect_ident()?;
            expr = self.finish_member_sel(expr, name)?;
        }
        Ok(expr)
    }

    /// Builds a field access or call from a receiver and a selected name.
    pub(crate) fn finish_member_sel(&mut self, receiver: Expr, name: String) -> Result<Expr> {
        if self.eat_symbol("(") {
            let args = self.parse_call_args()?;
            Ok(Expr::Call {
                receiver: Some(Box::new(receiver)),
                method: name,
                args,
            })
        } else {
            Ok(Expr::Field {
                receiver: Some(Box::new(receiver)),
                name,
            })
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        if self.stream.match_kind(TokenKind::Number) {
            return self.parse_number();
        }

        if self.eat_keyword("true") {
            return Ok(Expr::Bool(true));
        }
        if self.eat_keyword("false") {
            return Ok(Expr::Bool(false));
        }
        if self.eat_keyword("this") {
            return Ok(Expr::This);
        }

        if self.stream.match_kind(TokenKind::Identifier) {
            let name = self.expect_ident()?;
            if self.eat_symbol("(") {
                let args = self.parse_call_args()?;
                return Ok(Expr::Call {
                    receiver: None,
                    method: name,
                    args,
                });
            }
            return Ok(Expr::Ident(name));
        }

        if self.eat_symbol("(") {
            let expr = self.parse_expr()?;
            self.stream.expect_text(")")?;
            return Ok(expr);
        }

        let line = self.stream.current_line();
        let found = self
            .stream
            .peek()
            .map_or("end of input".to_string(), |t| format!("'{}'", t.text));
        Err(CompileError::syntax(
            line,
            format!("expected expression, found {}", found),
        ))
    }

    /// Converts a number token into an integer or real literal.
    ///
    /// A token containing `.` or `e` becomes a real; anything else parses
    /// as a signed 64-bit integer.
    fn parse_number(&mut self) -> Result<Expr> {
        let token = self.stream.expect(TokenKind::Number)?;

        if token.text.contains('.') || token.text.contains('e') {
            let value: f64 = token.text.parse().map_err(|_| {
                CompileError::syntax(
                    token.line,
                    format!("invalid real literal '{}'", token.text),
                )
            })?;
            Ok(Expr::Real(value))
        } else {
            let value: i64 = token.text.parse().map_err(|_| {
                CompileError::syntax(
                    token.line,
                    format!("integer literal '{}' out of range", token.text),
                )
            })?;
            Ok(Expr::Int(value))
        }
    }
}
