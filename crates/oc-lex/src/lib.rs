//! oc-lex - Lexical analysis for the O language.
//!
//! The lexer scans a character sequence into a finite ordered list of
//! [`Token`]s. It is total: any input, valid or not, produces a token
//! list terminating at end of input. Invalid character runs surface as
//! `Error` tokens rather than aborting the scan; the driver decides
//! whether those are fatal.

pub mod cursor;
mod lexer;
mod token;

pub use lexer::Lexer;
pub use token::{is_keyword, is_symbol_char, Token, TokenKind};

/// Scans the whole source into a token list.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_smallest_program() {
        let tokens = tokenize("class Program is method main() is end end");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["class", "Program", "is", "method", "main", "(", ")", "is", "end", "end"]
        );
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[5].kind, TokenKind::SpecialSymbol);
    }

    #[test]
    fn test_tokenize_var_with_initializer() {
        let tokens = tokenize("var x: Integer(3)");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["var", "x", ":", "Integer", "(", "3", ")"]);
    }

    #[test]
    fn test_tokenize_generic_type() {
        let tokens = tokenize("var a: Array[Integer]");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["var", "a", ":", "Array", "[", "Integer", "]"]);
    }

    #[test]
    fn test_tokens_are_in_source_order() {
        let tokens = tokenize("a := b.Plus(1)");
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert!(lines.windows(2).all(|w| w[0] <= w[1]));
    }
}
