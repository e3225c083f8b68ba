//! Token model for the O language.

use std::fmt;

/// The category a token belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An integer or real literal, e.g. `42` or `3.14`.
    Number,
    /// A user-chosen name.
    Identifier,
    /// A punctuation symbol, including the two-character `:=`.
    SpecialSymbol,
    /// A reserved word such as `class` or `while`.
    Keyword,
    /// An invalid character run, carried through with its message.
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number => write!(f, "number"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::SpecialSymbol => write!(f, "symbol"),
            TokenKind::Keyword => write!(f, "keyword"),
            TokenKind::Error => write!(f, "error"),
        }
    }
}

/// A single lexical unit.
///
/// Tokens are produced once by the lexer and never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The exact source text of the token.
    pub text: String,
    /// The token's category.
    pub kind: TokenKind,
    /// The 1-based line the token starts on.
    pub line: u32,
    /// A diagnostic message, present only on `Error` tokens.
    pub error: Option<String>,
}

impl Token {
    /// Creates a token with no error message.
    pub fn new(text: impl Into<String>, kind: TokenKind, line: u32) -> Self {
        Self {
            text: text.into(),
            kind,
            line,
            error: None,
        }
    }

    /// Creates an `Error` token carrying the bad text and a message.
    pub fn error(text: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Error,
            line,
            error: Some(message.into()),
        }
    }

    /// Returns true for a token of the given kind with the given text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Returns true if `text` is a reserved word of the language.
pub fn is_keyword(text: &str) -> bool {
    matches!(
        text,
        "class"
            | "extends"
            | "is"
            | "end"
            | "var"
            | "method"
            | "this"
            | "return"
            | "while"
            | "loop"
            | "if"
            | "then"
            | "else"
            | "true"
            | "false"
            | "private"
            | "public"
    )
}

/// Returns true if `c` is a member of the single-character symbol set.
pub fn is_symbol_char(c: char) -> bool {
    matches!(
        c,
        ':' | ';' | '.' | ',' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '='
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert!(is_keyword("class"));
        assert!(is_keyword("while"));
        assert!(is_keyword("true"));
        assert!(is_keyword("private"));
        assert!(!is_keyword("Program"));
        assert!(!is_keyword("classes"));
    }

    #[test]
    fn test_symbol_set() {
        for c in [':', ';', '.', ',', '(', ')', '[', ']', '{', '}', '"', '='] {
            assert!(is_symbol_char(c), "expected {:?} to be a symbol", c);
        }
        assert!(!is_symbol_char('#'));
        assert!(!is_symbol_char('@'));
    }

    #[test]
    fn test_token_is() {
        let token = Token::new(":=", TokenKind::SpecialSymbol, 1);
        assert!(token.is(TokenKind::SpecialSymbol, ":="));
        assert!(!token.is(TokenKind::Keyword, ":="));
        assert!(token.error.is_none());
    }

    #[test]
    fn test_error_token() {
        let token = Token::error("12ab", 4, "malformed number literal '12ab'");
        assert_eq!(token.kind, TokenKind::Error);
        assert_eq!(token.line, 4);
        assert!(token.error.as_deref().unwrap().contains("12ab"));
    }
}
