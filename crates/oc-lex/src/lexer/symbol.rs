//! Special-symbol scanning.

use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans a special symbol.
    ///
    /// All symbols are single characters except the assignment combination
    /// `:=`, which is recognized by one character of lookahead after `:`.
    pub(crate) fn lex_symbol(&mut self) -> Token {
        let c = self.cursor.current_char();
        self.cursor.advance();

        if c == ':' && self.cursor.match_char('=') {
            return Token::new(":=", TokenKind::SpecialSymbol, self.token_line);
        }

        Token::new(c.to_string(), TokenKind::SpecialSymbol, self.token_line)
    }
}

#[cfg(test)]
mod tests {
    use crate::{tokenize, TokenKind};

    #[test]
    fn test_single_symbols() {
        let tokens = tokenize(": ; . , ( ) [ ] { } \" =");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![":", ";", ".", ",", "(", ")", "[", "]", "{", "}", "\"", "="]
        );
        assert!(tokens.iter().all(|t| t.kind == TokenKind::SpecialSymbol));
    }

    #[test]
    fn test_assignment_symbol() {
        let tokens = tokenize("x := 1");
        assert_eq!(tokens[1].text, ":=");
        assert_eq!(tokens[1].kind, TokenKind::SpecialSymbol);
    }

    #[test]
    fn test_colon_without_equals() {
        let tokens = tokenize("x : Integer");
        assert_eq!(tokens[1].text, ":");
    }

    #[test]
    fn test_adjacent_symbols() {
        let tokens = tokenize("()");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["(", ")"]);
    }
}
