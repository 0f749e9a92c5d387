//! Raw token definitions for the logos lexer
//!
//! Whitespace is skipped here; the tokenizer wrapper recovers it from positions.
//! Literals whose end cannot be expressed as a regular pattern (quoted strings with escapes,
//! template literals with nested substitutions, block comments, regular expressions) are
//! matched on their opening characters and finished by callbacks that scan the remainder.

use crate::shift::error::LexErrorKind;
use crate::shift::token::TokenKind;
use logos::{Lexer, Logos};

/// Lexer state carried between tokens.
#[derive(Debug, Clone, Copy)]
pub struct LexState {
    /// Whether a `/` at this point starts a regular expression literal rather than a division
    pub regex_allowed: bool,
}

impl Default for LexState {
    fn default() -> Self {
        LexState {
            regex_allowed: true,
        }
    }
}

/// What a `/` turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashKind {
    Divide,
    Regex,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(extras = LexState)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[\s\u{FEFF}]+")]
pub enum RawToken {
    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Identifier,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?n?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+n?")]
    Number,

    #[token("\"", |lex| quoted(lex, b'"'))]
    #[token("'", |lex| quoted(lex, b'\''))]
    Str,

    #[token("`", template)]
    Template,

    #[regex(r"//[^\r\n]*")]
    #[token("/*", block_comment)]
    Comment,

    #[token("/", slash)]
    #[token("/=", slash)]
    Slash(SlashKind),

    // `>` is never joined with a following `>`: nested generic lists close one token at a time.
    #[token("=>")]
    #[token("...")]
    #[token("===")]
    #[token("!==")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("<<")]
    #[token("<<=")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("?.")]
    #[token("++")]
    #[token("--")]
    #[token("**")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("**=")]
    #[token("&&=")]
    #[token("||=")]
    #[token("??=")]
    #[regex(r#"[^\s\u{FEFF}\p{L}0-9_$"'`/]"#)]
    Punct,
}

impl RawToken {
    pub fn kind(self) -> TokenKind {
        match self {
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::Number => TokenKind::Number,
            RawToken::Str => TokenKind::String,
            RawToken::Template => TokenKind::RawString,
            RawToken::Comment => TokenKind::Comment,
            RawToken::Slash(SlashKind::Regex) => TokenKind::Regex,
            RawToken::Slash(SlashKind::Divide) | RawToken::Punct => TokenKind::Punctuation,
        }
    }

    /// Whether a `/` directly after this token (with `text`) would start a regex literal
    pub fn allows_regex_after(self, text: &str) -> bool {
        match self {
            RawToken::Identifier => matches!(
                text,
                "return"
                    | "typeof"
                    | "instanceof"
                    | "in"
                    | "of"
                    | "new"
                    | "delete"
                    | "void"
                    | "throw"
                    | "case"
                    | "do"
                    | "else"
                    | "yield"
                    | "await"
            ),
            RawToken::Number
            | RawToken::Str
            | RawToken::Template
            | RawToken::Slash(SlashKind::Regex) => false,
            RawToken::Slash(SlashKind::Divide) => true,
            RawToken::Punct => !matches!(text, ")" | "]" | "}" | "++" | "--"),
            RawToken::Comment => true,
        }
    }
}

fn quoted(lex: &mut Lexer<RawToken>, quote: u8) -> Result<(), LexErrorKind> {
    let consumed = scan_quoted(lex.remainder(), quote).ok_or(LexErrorKind::UnterminatedString)?;
    lex.bump(consumed);
    Ok(())
}

fn template(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    let consumed = scan_template(lex.remainder()).ok_or(LexErrorKind::UnterminatedTemplate)?;
    lex.bump(consumed);
    Ok(())
}

fn block_comment(lex: &mut Lexer<RawToken>) -> Result<(), LexErrorKind> {
    let close = lex
        .remainder()
        .find("*/")
        .ok_or(LexErrorKind::UnterminatedComment)?;
    lex.bump(close + 2);
    Ok(())
}

fn slash(lex: &mut Lexer<RawToken>) -> Result<SlashKind, LexErrorKind> {
    if !lex.extras.regex_allowed {
        return Ok(SlashKind::Divide);
    }
    let consumed = scan_regex(lex.remainder()).ok_or(LexErrorKind::UnterminatedRegex)?;
    lex.bump(consumed);
    Ok(SlashKind::Regex)
}

/// Length of a quoted literal body including the closing quote.
/// Raw line breaks end the search; escaped ones are line continuations.
fn scan_quoted(src: &str, quote: u8) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if src[i + 1..].starts_with("\r\n") => i += 3,
            b'\\' => i += 2,
            b'\n' => return None,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Length of a template literal body including the closing backtick.
fn scan_template(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Some(i + 1),
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                i += 2 + scan_substitution(&src[i + 2..])?;
            }
            _ => i += 1,
        }
    }
    None
}

/// Length of a `${ ... }` body including its closing brace.
fn scan_substitution(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(i + 1),
            b'}' => depth -= 1,
            b'`' => {
                i += 1 + scan_template(&src[i + 1..])?;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i += 1 + scan_quoted(&src[i + 1..], quote)?;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Length of a regex literal after its opening `/`, flags included.
fn scan_regex(src: &str) -> Option<usize> {
    let bytes = src.as_bytes();
    let mut in_class = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                return Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(source: &str) -> Vec<(RawToken, &str)> {
        let mut lexer = RawToken::lexer(source);
        let mut tokens = Vec::new();
        while let Some(result) = lexer.next() {
            if let Ok(token) = result {
                tokens.push((token, lexer.slice()));
            }
        }
        tokens
    }

    #[test]
    fn test_multi_character_operators() {
        let tokens = raw("a => b === c ?? d?.e");
        let texts: Vec<_> = tokens.iter().map(|(_, s)| *s).collect();
        assert_eq!(texts, vec!["a", "=>", "b", "===", "c", "??", "d", "?.", "e"]);
    }

    #[test]
    fn test_closing_angles_stay_separate() {
        let tokens = raw("Map<K, Array<V>>");
        let closers = tokens.iter().filter(|(_, s)| *s == ">").count();
        assert_eq!(closers, 2);
    }

    #[test]
    fn test_numbers() {
        for source in ["42", "3.14", ".5", "1e10", "0xFF", "1_000n"] {
            assert_eq!(raw(source), vec![(RawToken::Number, source)], "{}", source);
        }
    }

    #[test]
    fn test_strings_with_escapes() {
        let tokens = raw(r#""a \"quoted\" word" 'it\'s'"#);
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|(t, _)| *t == RawToken::Str));
    }

    #[test]
    fn test_template_with_nested_substitution() {
        let source = "`outer ${cond ? `inner ${x}` : '}'} end`";
        assert_eq!(raw(source), vec![(RawToken::Template, source)]);
    }

    #[test]
    fn test_comments() {
        let tokens = raw("// line\n/* block\n */x");
        assert_eq!(tokens[0], (RawToken::Comment, "// line"));
        assert_eq!(tokens[1], (RawToken::Comment, "/* block\n */"));
        assert_eq!(tokens[2], (RawToken::Identifier, "x"));
    }

    #[test]
    fn test_unterminated_literals_error() {
        let mut lexer = RawToken::lexer("'open");
        assert_eq!(lexer.next(), Some(Err(LexErrorKind::UnterminatedString)));

        let mut lexer = RawToken::lexer("/* open");
        assert_eq!(lexer.next(), Some(Err(LexErrorKind::UnterminatedComment)));

        let mut lexer = RawToken::lexer("`open ${x}");
        assert_eq!(lexer.next(), Some(Err(LexErrorKind::UnterminatedTemplate)));
    }

    #[test]
    fn test_regex_depends_on_state() {
        let mut lexer = RawToken::lexer("/a[/]b/gi");
        assert_eq!(lexer.next(), Some(Ok(RawToken::Slash(SlashKind::Regex))));
        assert_eq!(lexer.slice(), "/a[/]b/gi");

        let mut lexer = RawToken::lexer("/ 2");
        lexer.extras.regex_allowed = false;
        assert_eq!(lexer.next(), Some(Ok(RawToken::Slash(SlashKind::Divide))));
        assert_eq!(lexer.slice(), "/");
    }
}
