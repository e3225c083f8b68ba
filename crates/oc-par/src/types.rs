//! Type reference parsing.

use crate::ast::TypeRef;
use crate::Parser;
use oc_util::Result;

impl Parser {
    /// Parses a type reference: `Ident [ '[' Type { ',' Type } ']' ]`.
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef> {
        let name = self.expect_ident()?;

        if !self.eat_symbol("[") {
            return Ok(TypeRef::Simple(name));
        }

        let mut args = vec![self.parse_type()?];
        while self.eat_symbol(",") {
            args.push(self.parse_type()?);
        }
        self.stream().expect_text("]")?;

        Ok(TypeRef::Generic(name, args))
    }
}
