//! oc-par - Recursive-descent parser for the O language.
//!
//! The parser consumes the lexer's token list through a [`TokenStream`]
//! with single-token lookahead and produces the [`ast::Program`] tree.
//! There is no error recovery: the first unexpected token aborts parsing
//! with a syntax error naming the offending text and line.

pub mod ast;
mod expr;
mod items;
mod stmt;
mod stream;
mod types;

pub use stream::TokenStream;

use ast::Program;
use oc_lex::{Token, TokenKind};
use oc_util::Result;

/// Parses a token list into a program.
pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse_program()
}

/// Recursive-descent parser over a [`TokenStream`].
pub struct Parser {
    pub(crate) stream: TokenStream,
}

impl Parser {
    /// Creates a parser over the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            stream: TokenStream::new(tokens),
        }
    }

    /// Parses the whole program: a sequence of class declarations.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut classes = Vec::new();
        while self.stream.peek().is_some() {
            classes.push(self.parse_class_decl()?);
        }
        Ok(Program { classes })
    }

    /// Returns true if the next token has exactly the given text.
    pub(crate) fn at_text(&self, text: &str) -> bool {
        self.stream.peek().is_some_and(|t| t.text == text)
    }

    /// Consumes a keyword token with the given text, if present.
    pub(crate) fn eat_keyword(&mut self, text: &str) -> bool {
        self.stream.match_and_consume(TokenKind::Keyword, Some(text))
    }

    /// Consumes a symbol token with the given text, if present.
    pub(crate) fn eat_symbol(&mut self, text: &str) -> bool {
        self.stream
            .match_and_consume(TokenKind::SpecialSymbol, Some(text))
    }

    /// Consumes and returns an identifier's text.
    pub(crate) fn expect_ident(&mut self) -> Result<String> {
        Ok(self.stream.expect(TokenKind::Identifier)?.text)
    }

    pub(crate) fn stream(&mut self) -> &mut TokenStream {
        &mut self.stream
    }
}
