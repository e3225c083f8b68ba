//! Whitespace and comment skipping.

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips whitespace and `#` line comments.
    ///
    /// Comments run to the end of the line and are discarded entirely.
    /// The newline terminating a comment is ordinary whitespace, so the
    /// cursor's line counter still advances through it.
    pub(crate) fn skip_whitespace_and_comments(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if c.is_whitespace() {
                self.cursor.advance();
            } else if c == '#' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }
}
