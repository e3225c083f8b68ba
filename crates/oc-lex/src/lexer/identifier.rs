//! Identifier and keyword scanning.

use crate::lexer::core::is_letter_or_digit;
use crate::token::{is_keyword, Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans an identifier starting at the current character.
    ///
    /// Identifiers are a letter (or underscore) followed by letters and
    /// digits. A lookup against the keyword set promotes the token kind
    /// to `Keyword`.
    pub(crate) fn lex_identifier(&mut self) -> Token {
        while is_letter_or_digit(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        let kind = if is_keyword(text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Token::new(text, kind, self.token_line)
    }
}

#[cfg(test)]
mod tests {
    use crate::{tokenize, TokenKind};

    #[test]
    fn test_simple_identifier() {
        let tokens = tokenize("counter");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "counter");
    }

    #[test]
    fn test_identifier_with_digits_and_underscores() {
        let tokens = tokenize("foo_bar_2");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "foo_bar_2");
    }

    #[test]
    fn test_unicode_identifier() {
        let tokens = tokenize("переменная");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "переменная");
    }

    #[test]
    fn test_keywords_promoted() {
        for kw in [
            "class", "extends", "is", "end", "var", "method", "this", "return", "while", "loop",
            "if", "then", "else", "true", "false", "private", "public",
        ] {
            let tokens = tokenize(kw);
            assert_eq!(tokens[0].kind, TokenKind::Keyword, "keyword {}", kw);
            assert_eq!(tokens[0].text, kw);
        }
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = tokenize("classy");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_identifier_closed_by_symbol() {
        let tokens = tokenize("x:Integer");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "x");
        assert_eq!(tokens[1].text, ":");
        assert_eq!(tokens[2].text, "Integer");
    }
}
