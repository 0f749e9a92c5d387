//! Token transforms
//!
//! A transform owns a [TokenStream](crate::shift::lexing::TokenStream) and a
//! [Layout](crate::shift::layout::Layout), walks the tokens once and decides per token
//! whether to write it, drop it, or write something next to it.
//!
//! - [strip]: typed -> untyped, drops interfaces, type aliases, annotations, generics.
//! - [annotate]: untyped -> typed stub, inserts a placeholder type after parameters,
//!   parameter lists and declared variables.

pub mod annotate;
pub mod strip;

use crate::shift::token::Token;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transform a conversion runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    StripTypes,
    AddPlaceholders,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::StripTypes => write!(f, "strip"),
            Direction::AddPlaceholders => write!(f, "annotate"),
        }
    }
}

/// Whether a type expression ending in `token` must continue on the next token
pub(crate) fn type_continues_after(token: &Token) -> bool {
    matches!(
        token.text.as_str(),
        ":" | "=" | "|" | "&" | "," | "=>" | "<" | "?" | "." | "(" | "[" | "{"
    ) || token.is_word("extends")
        || token.is_word("keyof")
        || token.is_word("typeof")
        || token.is_word("infer")
}

/// Whether `token` on a new line continues the type expression of the previous line
pub(crate) fn type_continues_with(token: &Token) -> bool {
    matches!(
        token.text.as_str(),
        "|" | "&" | "." | "=>" | "?" | ":" | "=" | "<" | "{" | "["
    ) || token.is_word("extends")
}
