//! Main module for typeshift library functionality
//!
//! Both conversion directions share the same shape:
//!
//!     source text -> Tokenizer -> per-token state machine -> Layout -> output
//!
//! Whitespace never becomes a token. The layout preserver rebuilds it from the gap between
//! the positions of consecutive tokens, which is what lets the stripping transform drop
//! tokens in the middle of a line without disturbing the columns of what survives.

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod lexing;
pub mod pipeline;
pub mod token;
pub mod transforms;
