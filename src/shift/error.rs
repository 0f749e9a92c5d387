//! Error types of the conversion core

use crate::shift::token::Position;
use std::io;

/// What went wrong while tokenizing.
///
/// Doubles as the logos error type, hence `Default`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[default]
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated template literal")]
    UnterminatedTemplate,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unterminated regular expression literal")]
    UnterminatedRegex,
}

/// A malformed literal or comment. Always fatal to the current conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {position}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
