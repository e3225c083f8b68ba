//! Token stream with single-token lookahead.

use oc_lex::{Token, TokenKind};
use oc_util::{CompileError, Result};

/// A cursor over the lexer's token list.
///
/// All parser decisions are made by peeking at most one token ahead.
/// Expectation failures produce a syntax error carrying the offending
/// token's text and line.
pub struct TokenStream {
    tokens: Vec<Token>,
    position: usize,
}

impl TokenStream {
    /// Creates a stream over the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Consumes and returns the next token.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// Consumes the next token, requiring the given kind.
    pub fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.peek() {
            Some(token) if token.kind == kind => Ok(self.advance_unchecked()),
            Some(token) => Err(self.unexpected(&format!("expected {}", kind), token.clone())),
            None => Err(self.unexpected_eof(&format!("expected {}", kind))),
        }
    }

    /// Consumes the next token, requiring its text to equal `text`.
    pub fn expect_text(&mut self, text: &str) -> Result<Token> {
        match self.peek() {
            Some(token) if token.text == text => Ok(self.advance_unchecked()),
            Some(token) => Err(self.unexpected(&format!("expected '{}'", text), token.clone())),
            None => Err(self.unexpected_eof(&format!("expected '{}'", text))),
        }
    }

    /// Returns true if the next token has the given kind.
    pub fn match_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Consumes the next token if it has the given kind and, when a text
    /// is supplied, exactly that text. Returns whether it consumed.
    pub fn match_and_consume(&mut self, kind: TokenKind, text: Option<&str>) -> bool {
        let matches = self
            .peek()
            .is_some_and(|t| t.kind == kind && text.map_or(true, |s| t.text == s));
        if matches {
            self.position += 1;
        }
        matches
    }

    /// The line of the next token, or of the last token at end of input.
    pub fn current_line(&self) -> u32 {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn advance_unchecked(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        self.position += 1;
        token
    }

    fn unexpected(&self, expected: &str, found: Token) -> CompileError {
        CompileError::syntax(
            found.line,
            format!("{}, found '{}'", expected, found.text),
        )
    }

    fn unexpected_eof(&self, expected: &str) -> CompileError {
        CompileError::syntax(
            self.current_line(),
            format!("{}, found end of input", expected),
        )
    }
}
