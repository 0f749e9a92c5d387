//! # typeshift
//!
//! Token-level conversion between the typed and the untyped dialect of a script language.
//!
//! File Layout
//!
//! Everything lives under [shift]:
//! src/shift
//!   ├── token        Token, TokenKind and Position values
//!   ├── lexing       logos tokenizer, positions and the lookahead stream
//!   ├── layout       Layout preserver used by both transforms
//!   ├── transforms   The stripping and the annotating state machines
//!   ├── convert      Reader/writer entry points
//!   ├── config       Layered configuration
//!   └── pipeline     File and directory conversion
//!
//! The core (lexing, layout, transforms, convert) does no logging and knows nothing about
//! paths. The pipeline and the binary own files, directories and progress reporting.

pub mod shift;

pub use shift::convert::{
    convert, convert_source, convert_str, convert_str_with, convert_with, ConvertOptions,
};
pub use shift::error::{ConvertError, LexError, LexErrorKind};
pub use shift::transforms::Direction;
