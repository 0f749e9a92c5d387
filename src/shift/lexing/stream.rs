//! Buffered lookahead over the lazy tokenizer
//!
//! The transforms are single pass, but a few decisions need to see ahead: whether `<` opens
//! a generic list, whether `type` starts an alias, whether a `(` belongs to an arrow
//! function. Tokens pulled for lookahead are kept in a queue and handed out in order.
//!
//! The `Eof` marker is absorbed here: `next_token` returns `None` once input is exhausted.

use crate::shift::error::LexError;
use crate::shift::lexing::Tokenizer;
use crate::shift::token::Token;
use std::collections::VecDeque;

pub struct TokenStream<'src> {
    tokenizer: Tokenizer<'src>,
    buffer: VecDeque<Token>,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str) -> Self {
        TokenStream {
            tokenizer: Tokenizer::new(source),
            buffer: VecDeque::new(),
        }
    }

    /// Pull tokens until the buffer holds more than `n` of them or input ends
    fn fill(&mut self, n: usize) -> Result<(), LexError> {
        while self.buffer.len() <= n {
            match self.tokenizer.next() {
                Some(Ok(token)) if token.is_eof() => break,
                Some(Ok(token)) => self.buffer.push_back(token),
                Some(Err(error)) => return Err(error),
                None => break,
            }
        }
        Ok(())
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.fill(0)?;
        Ok(self.buffer.pop_front())
    }

    pub fn peek(&mut self) -> Result<Option<&Token>, LexError> {
        self.peek_nth(0)
    }

    pub fn peek_nth(&mut self, n: usize) -> Result<Option<&Token>, LexError> {
        self.fill(n)?;
        Ok(self.buffer.get(n))
    }

    /// The `n`th upcoming token that is not a comment
    pub fn peek_code(&mut self, n: usize) -> Result<Option<&Token>, LexError> {
        let index = self.code_index(n)?;
        Ok(index.and_then(|i| self.buffer.get(i)))
    }

    fn code_index(&mut self, n: usize) -> Result<Option<usize>, LexError> {
        let mut seen = 0;
        let mut index = 0;
        loop {
            self.fill(index)?;
            let Some(token) = self.buffer.get(index) else {
                return Ok(None);
            };
            if !token.is_comment() {
                if seen == n {
                    return Ok(Some(index));
                }
                seen += 1;
            }
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut stream = TokenStream::new("a b c");
        assert_eq!(stream.peek_nth(2).unwrap().unwrap().text, "c");
        assert_eq!(stream.peek().unwrap().unwrap().text, "a");
        assert_eq!(stream.next_token().unwrap().unwrap().text, "a");
        assert_eq!(stream.next_token().unwrap().unwrap().text, "b");
        assert_eq!(stream.next_token().unwrap().unwrap().text, "c");
        assert!(stream.next_token().unwrap().is_none());
        assert!(stream.next_token().unwrap().is_none());
    }

    #[test]
    fn test_peek_code_skips_comments() {
        let mut stream = TokenStream::new("/* a */ b // c\n d");
        assert_eq!(stream.peek_code(0).unwrap().unwrap().text, "b");
        assert_eq!(stream.peek_code(1).unwrap().unwrap().text, "d");
        assert!(stream.peek_code(2).unwrap().is_none());
        assert!(stream.peek().unwrap().unwrap().is_comment());
    }

    #[test]
    fn test_lookahead_surfaces_lex_errors() {
        let mut stream = TokenStream::new("a 'open");
        assert!(stream.peek_nth(1).is_err());
    }
}
