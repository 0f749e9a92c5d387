//! Core token types shared by the tokenizer, the transforms and the layout preserver.
//!
//! A token is an immutable value: its kind, the exact source text, the position of its
//! first character and its byte span. Positions are 1-based and count characters, not bytes.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// Names and keywords (`function`, `interface`, `foo`, `$el`)
    Identifier,
    Number,
    /// Single or double quoted literal
    String,
    /// Template literal, possibly spanning lines
    RawString,
    /// Regular expression literal
    Regex,
    /// Line or block comment
    Comment,
    /// Operators and delimiters, single or multi-character
    Punctuation,
    /// End of input marker. Has empty text.
    Eof,
}

/// Line and column of a character in the source (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Position { line, column }
    }

    /// Position of the first character of any source
    pub fn start() -> Self {
        Position::new(1, 1)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
    /// Byte range of the token in the source
    pub span: Range<usize>,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        position: Position,
        span: Range<usize>,
    ) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            span,
        }
    }

    /// Check the token text
    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }

    /// Check for an identifier (or keyword) with the given text
    pub fn is_word(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Position just past the last character of the token.
    ///
    /// Template literals and block comments may contain line breaks, in which case the end
    /// lands on a later line.
    pub fn end(&self) -> Position {
        match self.text.rfind('\n') {
            Some(last_break) => Position::new(
                self.position.line + self.text.matches('\n').count(),
                self.text[last_break + 1..].chars().count() + 1,
            ),
            None => Position::new(
                self.position.line,
                self.position.column + self.text.chars().count(),
            ),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, line: usize, column: usize) -> Token {
        Token::new(TokenKind::Punctuation, text, Position::new(line, column), 0..text.len())
    }

    #[test]
    fn test_end_single_line() {
        assert_eq!(token("=>", 3, 7).end(), Position::new(3, 9));
    }

    #[test]
    fn test_end_counts_characters_not_bytes() {
        let t = Token::new(TokenKind::String, "'é'", Position::new(1, 1), 0..4);
        assert_eq!(t.end(), Position::new(1, 4));
    }

    #[test]
    fn test_end_multiline() {
        let t = Token::new(
            TokenKind::Comment,
            "/* one\n   two\n  */",
            Position::new(2, 5),
            0..18,
        );
        assert_eq!(t.end(), Position::new(4, 5));
    }

    #[test]
    fn test_predicates() {
        let word = Token::new(TokenKind::Identifier, "type", Position::start(), 0..4);
        assert!(word.is_word("type"));
        assert!(word.is("type"));
        assert!(!word.is_word("interface"));
        assert!(!token("type", 1, 1).is_word("type"));
        assert_eq!(Position::new(4, 2).to_string(), "4:2");
    }
}
