//! Layout preserver
//!
//! Writes tokens at their original line and column. The cursor remembers where the last
//! written token ended (in source coordinates); before the next token it writes the line
//! breaks and the padding needed to get from the cursor to that token's position.
//!
//! Tokens a transform drops are reported with [Layout::skip]. A dropped token on the cursor
//! line moves the cursor past it, so the gap it occupied is not padded:
//!
//!     function bar(a: string)     ->     function bar(a)
//!
//! A dropped token on a later line writes the line breaks up to it, so every surviving
//! token stays on its original line. When a line starts with dropped tokens, the first
//! surviving token on it takes the indentation of the first dropped one:
//!
//!         private x: number;      ->         x;
//!
//! When a dropped declaration ends mid-line ([Layout::end_dropped]), a surviving token
//! later on that line goes back to its own column instead.
//!
//! Padding copies the original characters when the gap is pure horizontal whitespace (tabs
//! and a byte order mark survive) and falls back to spaces otherwise. Line breaks are
//! copied one by one, so CRLF and LF keep their place even when a file mixes them, and
//! whitespace at the end of a line is kept unless the line ended with dropped tokens.

use crate::shift::token::{Position, Token};
use std::io::{self, Write};

/// Indentation of a line whose leading tokens were dropped
#[derive(Debug, Clone, Copy)]
struct Anchor {
    column: usize,
    offset: usize,
}

pub struct Layout<'src, W> {
    source: &'src str,
    out: W,
    line: usize,
    column: usize,
    /// Byte offset in `source` where the cursor stands
    offset: usize,
    /// Something was written on the current line
    written: bool,
    /// The last token accounted for on the current line was dropped
    dropped: bool,
    anchor: Option<Anchor>,
    last_char: Option<char>,
}

impl<'src, W: Write> Layout<'src, W> {
    pub fn new(source: &'src str, out: W) -> Self {
        Layout {
            source,
            out,
            line: 1,
            column: 1,
            offset: 0,
            written: false,
            dropped: false,
            anchor: None,
            last_char: None,
        }
    }

    /// Write a token at its original position
    pub fn emit(&mut self, token: &Token) -> io::Result<()> {
        let position = token.position;
        if position.line > self.line {
            self.break_to(position.line)?;
            self.pad_before(token.span.start, position.column.saturating_sub(1))?;
        } else if let Some(anchor) = self.anchor.take() {
            self.pad_before(anchor.offset, anchor.column.saturating_sub(1))?;
        } else if position.column > self.column {
            self.pad_before(token.span.start, position.column - self.column)?;
        }

        self.out.write_all(token.text.as_bytes())?;

        let end = token.end();
        self.line = end.line;
        self.column = end.column;
        self.offset = token.span.end;
        self.written = true;
        self.dropped = false;
        self.anchor = None;
        if let Some(c) = token.text.chars().last() {
            self.last_char = Some(c);
        }
        Ok(())
    }

    /// Account for a dropped token
    pub fn skip(&mut self, token: &Token) -> io::Result<()> {
        let position = token.position;
        if position.line > self.line {
            self.break_to(position.line)?;
        }
        if !self.written && self.anchor.is_none() {
            self.anchor = Some(Anchor {
                column: position.column,
                offset: token.span.start,
            });
        }

        let end = token.end();
        if end.line > self.line {
            // Only the line breaks of a dropped multi-line token are kept
            for (i, _) in token.text.match_indices('\n') {
                let terminator = if token.text[..i].ends_with('\r') {
                    "\r\n"
                } else {
                    "\n"
                };
                self.out.write_all(terminator.as_bytes())?;
            }
            self.line = end.line;
            self.column = 1;
            self.written = false;
            self.anchor = None;
        }
        self.column = self.column.max(end.column);
        self.offset = token.span.end;
        self.dropped = true;
        Ok(())
    }

    /// Account for dropped tokens that prefix the token at `next`, such as a modifier or a
    /// generic list. The next token takes their place and keeps the spacing that preceded
    /// the first of them.
    pub fn skip_prefix(&mut self, tokens: &[Token], next: Option<Position>) -> io::Result<()> {
        let Some(first) = tokens.first() else {
            return Ok(());
        };
        let start_line = self.line;
        let mid_line = first.position.line == start_line && self.written;
        let gap = first.position.column.saturating_sub(self.column);
        for token in tokens {
            self.skip(token)?;
        }
        if let Some(next) = next.filter(|next| next.line == self.line) {
            self.column = if mid_line && self.line == start_line {
                next.column.saturating_sub(gap)
            } else {
                next.column
            };
        }
        Ok(())
    }

    /// A dropped declaration ended. If nothing was written on this line, the next token on
    /// it is padded to its own column rather than to the first dropped token.
    pub fn end_dropped(&mut self) {
        if !self.written {
            self.anchor = None;
            self.column = 1;
        }
    }

    /// Write synthetic text right after the last token. The cursor does not move, so the
    /// next token keeps its original spacing relative to the previous one.
    pub fn insert(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.written = true;
        if let Some(c) = text.chars().last() {
            self.last_char = Some(c);
        }
        Ok(())
    }

    /// Last character written, synthetic text included
    pub fn last_char(&self) -> Option<char> {
        self.last_char
    }

    /// Write what follows the last token and hand back the writer
    pub fn finish(mut self) -> io::Result<W> {
        let last_line = 1 + self.source.matches('\n').count();
        if last_line > self.line {
            self.break_to(last_line)?;
        }
        let rest = self.source.get(self.offset..).unwrap_or_default();
        if !self.dropped && rest.chars().all(is_padding) {
            self.out.write_all(rest.as_bytes())?;
        }
        self.out.flush()?;
        Ok(self.out)
    }

    /// Copy the line breaks up to `line`, with the whitespace-only stretches between them
    fn break_to(&mut self, line: usize) -> io::Result<()> {
        let mut keep_tail = !self.dropped;
        while self.line < line {
            let rest = self.source.get(self.offset..).unwrap_or_default();
            let (segment, terminator, consumed) = match rest.find('\n') {
                Some(i) => match rest[..i].strip_suffix('\r') {
                    Some(segment) => (segment, "\r\n", i + 1),
                    None => (&rest[..i], "\n", i + 1),
                },
                None => ("", "\n", rest.len()),
            };
            if keep_tail && segment.chars().all(is_padding) {
                self.out.write_all(segment.as_bytes())?;
            }
            self.out.write_all(terminator.as_bytes())?;
            self.offset += consumed;
            self.line += 1;
            keep_tail = true;
        }
        self.column = 1;
        self.written = false;
        self.dropped = false;
        self.anchor = None;
        Ok(())
    }

    /// Pad `width` columns, copying the source characters that end at byte `offset` when
    /// they are all horizontal whitespace
    fn pad_before(&mut self, offset: usize, width: usize) -> io::Result<()> {
        if width == 0 {
            return Ok(());
        }
        let gap = self
            .source
            .get(..offset)
            .and_then(|before| {
                let (start, _) = before.char_indices().rev().nth(width - 1)?;
                Some(&before[start..])
            })
            .filter(|gap| gap.chars().all(is_padding));

        match gap {
            Some(original) => self.out.write_all(original.as_bytes()),
            None => self.out.write_all(" ".repeat(width).as_bytes()),
        }
    }
}

fn is_padding(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\n' && c != '\r')
}
