//! Tokenizer
//!
//! Wraps the logos lexer ([raw]) and turns its byte spans into positioned [Token] values.
//!
//! The sequence is lazy and forward-only and always ends with a single `Eof` token, unless a
//! malformed literal stops it early with a [LexError]. Whitespace is never a token: the
//! distance between two token positions is all a consumer needs to rebuild it.
//!
//! The wrapper also feeds the lexer the one bit of context it cannot derive itself, namely
//! whether the previous token allows a regular expression literal to start.

pub mod raw;
pub mod stream;

pub use stream::TokenStream;

use crate::shift::error::LexError;
use crate::shift::token::{Position, Token, TokenKind};
use logos::Logos;
use raw::RawToken;

pub struct Tokenizer<'src> {
    source: &'src str,
    lexer: logos::Lexer<'src, RawToken>,
    /// Byte offset `position` refers to
    offset: usize,
    position: Position,
    done: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Tokenizer {
            source,
            lexer: RawToken::lexer(source),
            offset: 0,
            position: Position::start(),
            done: false,
        }
    }

    /// Move the line/column cursor forward to a byte offset
    fn advance_to(&mut self, target: usize) -> Position {
        if target > self.offset {
            for c in self.source[self.offset..target].chars() {
                if c == '\n' {
                    self.position.line += 1;
                    self.position.column = 1;
                } else {
                    self.position.column += 1;
                }
            }
            self.offset = target;
        }
        self.position
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.lexer.next() {
            None => {
                self.done = true;
                let end = self.source.len();
                let position = self.advance_to(end);
                Some(Ok(Token::new(TokenKind::Eof, "", position, end..end)))
            }
            Some(Err(kind)) => {
                self.done = true;
                let position = self.advance_to(self.lexer.span().start);
                Some(Err(LexError { kind, position }))
            }
            Some(Ok(raw)) => {
                let span = self.lexer.span();
                let text = self.lexer.slice().to_string();
                if raw != RawToken::Comment {
                    self.lexer.extras.regex_allowed = raw.allows_regex_after(&text);
                }
                let position = self.advance_to(span.start);
                self.advance_to(span.end);
                Some(Ok(Token::new(raw.kind(), text, position, span)))
            }
        }
    }
}

/// Tokenize a whole source, `Eof` included
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::error::LexErrorKind;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_tokenizes_with_positions() {
        let tokens = tokenize("let x = 5;\n  foo(x)").unwrap();

        assert_eq!(tokens[0].text, "let");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].position, Position::new(1, 1));
        assert_eq!(tokens[1].position, Position::new(1, 5));
        assert_eq!(tokens[3].kind, TokenKind::Number);
        assert_eq!(tokens[4].text, ";");
        assert_eq!(tokens[4].position, Position::new(1, 10));
        assert_eq!(tokens[5].text, "foo");
        assert_eq!(tokens[5].position, Position::new(2, 3));
        assert_eq!(tokens[5].span, 13..16);
    }

    #[test]
    fn test_ends_with_single_eof() {
        let tokens = tokenize("a\n").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[1].is_eof());
        assert_eq!(tokens[1].position, Position::new(2, 1));

        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_whitespace_is_not_a_token() {
        assert_eq!(texts("a  \t b\n\n c"), vec!["a", "b", "c", ""]);
    }

    #[test]
    fn test_type_syntax() {
        assert_eq!(
            texts("function id<T>(x: T): T {}"),
            vec!["function", "id", "<", "T", ">", "(", "x", ":", "T", ")", ":", "T", "{", "}", ""]
        );
    }

    #[test]
    fn test_division_versus_regex() {
        let tokens = tokenize("a / b / c").unwrap();
        assert!(tokens[1].kind == TokenKind::Punctuation && tokens[1].is("/"));
        assert!(tokens[3].kind == TokenKind::Punctuation && tokens[3].is("/"));

        let tokens = tokenize("x = /b/g.test(y)").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Regex);
        assert_eq!(tokens[2].text, "/b/g");

        let tokens = tokenize("return /re/").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Regex);
    }

    #[test]
    fn test_comments_do_not_change_regex_context() {
        let tokens = tokenize("a /* note */ / 2").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[2].kind, TokenKind::Punctuation);
    }

    #[test]
    fn test_multiline_template_positions() {
        let tokens = tokenize("`a\nb` c").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::RawString);
        assert_eq!(tokens[1].text, "c");
        assert_eq!(tokens[1].position, Position::new(2, 4));
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let mut tokenizer = Tokenizer::new("ok\n  \"never closed");
        assert!(tokenizer.next().unwrap().is_ok());
        let error = tokenizer.next().unwrap().unwrap_err();
        assert_eq!(error.kind, LexErrorKind::UnterminatedString);
        assert_eq!(error.position, Position::new(2, 3));
        assert!(tokenizer.next().is_none());
    }

    #[test]
    fn test_tokenize_propagates_error() {
        let error = tokenize("a /* open").unwrap_err();
        assert_eq!(error.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(error.position, Position::new(1, 3));
    }
}
