//! Conversion entry points
//!
//! Each call owns a fresh tokenizer, transform and layout; nothing is shared between
//! conversions. The whole input is read before the first token is produced, since tokens
//! borrow nothing from the reader but positions refer to the full source.

use crate::shift::error::ConvertError;
use crate::shift::transforms::annotate::Annotator;
use crate::shift::transforms::strip::Stripper;
use crate::shift::transforms::Direction;
use std::io::{Read, Write};

pub const DEFAULT_PLACEHOLDER: &str = "any";

/// Knobs of a single conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Type name inserted by the annotate transform
    pub placeholder: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

/// Convert everything `reader` yields and write the result to `writer`
pub fn convert<R: Read, W: Write>(
    direction: Direction,
    reader: R,
    writer: W,
) -> Result<(), ConvertError> {
    convert_with(direction, reader, writer, &ConvertOptions::default())
}

pub fn convert_with<R: Read, W: Write>(
    direction: Direction,
    mut reader: R,
    writer: W,
    options: &ConvertOptions,
) -> Result<(), ConvertError> {
    let mut source = String::new();
    reader.read_to_string(&mut source)?;
    convert_source(direction, &source, writer, options)?;
    Ok(())
}

/// Convert an in-memory source, handing the writer back
pub fn convert_source<W: Write>(
    direction: Direction,
    source: &str,
    writer: W,
    options: &ConvertOptions,
) -> Result<W, ConvertError> {
    match direction {
        Direction::StripTypes => Stripper::new(source, writer).run(),
        Direction::AddPlaceholders => Annotator::new(source, writer, &options.placeholder).run(),
    }
}

pub fn convert_str(direction: Direction, source: &str) -> Result<String, ConvertError> {
    convert_str_with(direction, source, &ConvertOptions::default())
}

pub fn convert_str_with(
    direction: Direction,
    source: &str,
    options: &ConvertOptions,
) -> Result<String, ConvertError> {
    let bytes = convert_source(direction, source, Vec::with_capacity(source.len()), options)?;
    // Output is assembled from slices of a `str` and ASCII line breaks
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
