//! Number literal scanning.

use crate::lexer::core::is_letter;
use crate::token::{Token, TokenKind};
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Scans a number literal: digits optionally followed by one `.` and
    /// more digits.
    ///
    /// A `.` is consumed only when no dot has been seen yet and the next
    /// character is a digit, so `5.Plus(3)` closes the number at `5` and
    /// leaves the dot to be re-processed as a symbol. A letter directly
    /// adjoining the digits enters error mode.
    pub(crate) fn lex_number(&mut self) -> Token {
        let mut seen_dot = false;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                self.cursor.advance();
            } else if c == '.' && !seen_dot && self.cursor.peek_char(1).is_ascii_digit() {
                seen_dot = true;
                self.cursor.advance();
            } else if is_letter(c) {
                let message = format!(
                    "malformed number literal starting with '{}'",
                    self.cursor.slice_from(self.token_start)
                );
                return self.lex_error(message);
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        Token::new(text, TokenKind::Number, self.token_line)
    }
}
