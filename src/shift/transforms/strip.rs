//! Strip transform: typed source in, untyped source out
//!
//! A single forward pass over the token stream. Most tokens are written unchanged; the
//! transform drops:
//!
//! - `interface` declarations, header and body
//! - `type` aliases, up to their `;` or the line break that ends them
//! - type annotations after `:`, up to the first token at nesting level 0 that cannot be
//!   part of the type (`;` `=` `{` `)` `,` `]` `}` or `=>`)
//! - generic parameter and argument lists, when the token after `<` looks like a type
//! - optional markers (`?` right before an annotation colon), `implements` clauses and the
//!   accessibility modifiers of class members
//!
//! Colons that are not annotations stay: ternaries, `case`/`default` labels, object literal
//! properties, labels of loop statements, and anything written right after a string literal.
//!
//! Import statements are copied through verbatim, so a type-only name inside one survives.
//! Dropped tokens never remove line breaks, which keeps every surviving token on its
//! original line.

use crate::shift::error::{ConvertError, LexError};
use crate::shift::layout::Layout;
use crate::shift::lexing::TokenStream;
use crate::shift::token::{Token, TokenKind};
use crate::shift::transforms::{type_continues_after, type_continues_with};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripState {
    Normal,
    /// `interface` seen, dropping its header up to the body
    AwaitingBody,
    /// Inside an interface body that was opened at brace depth `depth`
    InterfaceBody { depth: i32 },
    TypeAlias(TypeTail),
}

/// Progress through a type expression that is being dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TypeTail {
    nesting: u32,
    /// Line the last dropped token ended on
    line: usize,
    /// The last dropped token needs more type after it
    continues: bool,
}

impl TypeTail {
    fn new(line: usize) -> Self {
        TypeTail {
            nesting: 0,
            line,
            continues: true,
        }
    }

    /// Whether `next` starts a new statement on a later line
    fn ends_before(&self, next: &Token) -> bool {
        self.nesting == 0
            && next.position.line > self.line
            && !self.continues
            && !type_continues_with(next)
    }

    fn consume(&mut self, token: &Token) {
        if token.is_comment() {
            return;
        }
        match token.text.as_str() {
            "(" | "[" | "{" | "<" => self.nesting += 1,
            ")" | "]" | "}" | ">" => self.nesting = self.nesting.saturating_sub(1),
            _ => {}
        }
        self.line = token.end().line;
        self.continues = type_continues_after(token);
    }
}

/// Declarations that are dropped as a whole
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaration {
    Interface,
    TypeAlias,
}

/// One brace scope of the written code
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Opened where an expression is expected: an object literal or a destructuring pattern
    literal: bool,
    /// Open parentheses and brackets inside this scope
    parens: u32,
    /// Tokens of the current member, counted at paren level 0
    member_tokens: u32,
    /// `?` still waiting for their `:`
    ternaries: u32,
}

pub struct Stripper<'src, W> {
    tokens: TokenStream<'src>,
    layout: Layout<'src, W>,
    state: StripState,
    brace_depth: i32,
    /// Never empty, the root scope is not popped
    scopes: Vec<Scope>,
    /// A `case` or `default` label is waiting for its colon
    pending_case: bool,
    /// Last written token that is not a comment
    previous: Option<Token>,
    /// `previous` is an identifier at the start of a statement
    statement_word: bool,
}

impl<'src, W: Write> Stripper<'src, W> {
    pub fn new(source: &'src str, out: W) -> Self {
        Stripper {
            tokens: TokenStream::new(source),
            layout: Layout::new(source, out),
            state: StripState::Normal,
            brace_depth: 0,
            scopes: vec![Scope::default()],
            pending_case: false,
            previous: None,
            statement_word: false,
        }
    }

    pub fn run(mut self) -> Result<W, ConvertError> {
        while let Some(token) = self.tokens.next_token()? {
            self.step(token)?;
        }
        Ok(self.layout.finish()?)
    }

    fn step(&mut self, token: Token) -> Result<(), ConvertError> {
        match self.state {
            StripState::Normal => self.normal(token),
            StripState::AwaitingBody => {
                if token.is("{") {
                    self.state = StripState::InterfaceBody {
                        depth: self.brace_depth,
                    };
                    self.brace_depth += 1;
                }
                Ok(self.layout.skip(&token)?)
            }
            StripState::InterfaceBody { depth } => {
                self.layout.skip(&token)?;
                if token.is("{") {
                    self.brace_depth += 1;
                } else if token.is("}") {
                    self.brace_depth -= 1;
                    if self.brace_depth == depth {
                        self.state = StripState::Normal;
                        self.layout.end_dropped();
                    }
                }
                Ok(())
            }
            StripState::TypeAlias(mut tail) => {
                if tail.ends_before(&token) {
                    self.state = StripState::Normal;
                    return self.normal(token);
                }
                self.layout.skip(&token)?;
                if tail.nesting == 0 && token.is(";") {
                    self.state = StripState::Normal;
                    self.layout.end_dropped();
                } else {
                    tail.consume(&token);
                    self.state = StripState::TypeAlias(tail);
                }
                Ok(())
            }
        }
    }

    fn normal(&mut self, token: Token) -> Result<(), ConvertError> {
        if token.is_comment() {
            return Ok(self.layout.emit(&token)?);
        }

        if token.is_identifier() && !self.after_member_access() {
            match token.text.as_str() {
                "import" => {
                    let dynamic =
                        matches!(self.tokens.peek()?, Some(next) if next.is("(") || next.is("."));
                    if !dynamic {
                        return self.pass_import(token);
                    }
                }
                "export" => {
                    if let Some(default) = self.declaration_follows()? {
                        self.layout.skip(&token)?;
                        if default {
                            self.drop_through("default")?;
                        }
                        return Ok(());
                    }
                }
                "interface" | "type" => {
                    if let Some(declaration) = self.declaration_at(&token.text, 0)? {
                        return self.enter(declaration, &token);
                    }
                }
                "implements" => return self.drop_implements(&token),
                "public" | "private" | "protected" | "readonly" | "abstract" | "override" => {
                    let modifies = matches!(self.tokens.peek_code(0)?, Some(next) if next.is_identifier());
                    if modifies {
                        return self.drop_prefix(&token);
                    }
                }
                "case" => self.pending_case = true,
                "default" => {
                    if matches!(self.tokens.peek_code(0)?, Some(next) if next.is(":")) {
                        self.pending_case = true;
                    }
                }
                _ => {}
            }
            return self.emit(token);
        }

        match token.text.as_str() {
            ":" => self.colon(token),
            "?" => self.question(token),
            "<" => self.angle(token),
            _ => self.emit(token),
        }
    }

    /// Write a token and keep the scope bookkeeping current
    fn emit(&mut self, token: Token) -> Result<(), ConvertError> {
        match token.text.as_str() {
            "{" => {
                let literal = self.expression_expected();
                self.count_member_token();
                self.brace_depth += 1;
                self.scopes.push(Scope {
                    literal,
                    ..Scope::default()
                });
            }
            "}" => {
                self.brace_depth -= 1;
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
            }
            "(" | "[" => {
                self.count_member_token();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.parens += 1;
                }
            }
            ")" | "]" => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.parens = scope.parens.saturating_sub(1);
                }
            }
            "," => {
                if let Some(scope) = self.scopes.last_mut() {
                    if scope.parens == 0 {
                        scope.member_tokens = 0;
                    }
                }
            }
            ";" => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.member_tokens = 0;
                    scope.ternaries = 0;
                }
                self.pending_case = false;
            }
            _ => self.count_member_token(),
        }

        self.layout.emit(&token)?;
        self.statement_word = token.is_identifier()
            && self
                .previous
                .as_ref()
                .map_or(true, |previous| matches!(previous.text.as_str(), ";" | "{" | "}"));
        self.previous = Some(token);
        Ok(())
    }

    fn count_member_token(&mut self) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.parens == 0 {
                scope.member_tokens += 1;
            }
        }
    }

    fn after_member_access(&self) -> bool {
        matches!(&self.previous, Some(previous) if previous.is(".") || previous.is("?."))
    }

    /// Whether a `{` written now would open an object literal rather than a block
    fn expression_expected(&self) -> bool {
        let Some(previous) = &self.previous else {
            return false;
        };
        match previous.kind {
            TokenKind::Punctuation => {
                !matches!(previous.text.as_str(), ")" | "]" | "}" | ";" | "=>" | "++" | "--")
            }
            TokenKind::Identifier => matches!(
                previous.text.as_str(),
                "return"
                    | "const"
                    | "let"
                    | "var"
                    | "yield"
                    | "await"
                    | "typeof"
                    | "in"
                    | "of"
                    | "new"
                    | "throw"
                    | "case"
                    | "delete"
                    | "void"
            ),
            _ => false,
        }
    }

    /// Copy an import statement through verbatim. It ends at `;`, or after the module string
    /// when nothing else follows on its line.
    fn pass_import(&mut self, keyword: Token) -> Result<(), ConvertError> {
        self.layout.emit(&keyword)?;
        self.previous = Some(keyword);
        self.statement_word = false;
        while let Some(token) = self.tokens.next_token()? {
            self.layout.emit(&token)?;
            if token.is_comment() {
                continue;
            }
            let done = token.is(";")
                || (token.kind == TokenKind::String
                    && !matches!(self.tokens.peek()?, Some(next) if next.position.line == token.end().line));
            self.previous = Some(token);
            if done {
                break;
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.member_tokens = 0;
        }
        Ok(())
    }

    /// Whether `keyword` followed by the code tokens from lookahead index `offset` on opens
    /// a declaration that is dropped entirely
    fn declaration_at(
        &mut self,
        keyword: &str,
        offset: usize,
    ) -> Result<Option<Declaration>, LexError> {
        let named = matches!(self.tokens.peek_code(offset)?, Some(name) if name.is_identifier());
        if !named {
            return Ok(None);
        }
        match keyword {
            "interface" => Ok(Some(Declaration::Interface)),
            "type" => {
                let aliased = matches!(
                    self.tokens.peek_code(offset + 1)?,
                    Some(next) if next.is("=") || next.is("<")
                );
                Ok(aliased.then_some(Declaration::TypeAlias))
            }
            _ => Ok(None),
        }
    }

    /// Whether the upcoming tokens are an `interface` or `type` declaration, and if so
    /// whether a `default` comes before it
    fn declaration_follows(&mut self) -> Result<Option<bool>, LexError> {
        let default = matches!(self.tokens.peek_code(0)?, Some(next) if next.is_word("default"));
        let at = usize::from(default);
        let keyword = match self.tokens.peek_code(at)? {
            Some(next) if next.is_word("interface") || next.is_word("type") => next.text.clone(),
            _ => return Ok(None),
        };
        Ok(self.declaration_at(&keyword, at + 1)?.map(|_| default))
    }

    /// Drop tokens up to and including the word `last`
    fn drop_through(&mut self, last: &str) -> Result<(), ConvertError> {
        while let Some(token) = self.tokens.next_token()? {
            self.layout.skip(&token)?;
            if token.is_word(last) {
                break;
            }
        }
        Ok(())
    }

    fn enter(&mut self, declaration: Declaration, keyword: &Token) -> Result<(), ConvertError> {
        self.layout.skip(keyword)?;
        self.state = match declaration {
            Declaration::Interface => StripState::AwaitingBody,
            Declaration::TypeAlias => StripState::TypeAlias(TypeTail::new(keyword.position.line)),
        };
        Ok(())
    }

    /// Drop a modifier together with the whitespace after it
    fn drop_prefix(&mut self, token: &Token) -> Result<(), ConvertError> {
        let next = self.tokens.peek()?.map(|next| next.position);
        Ok(self.layout.skip_prefix(std::slice::from_ref(token), next)?)
    }

    /// Drop `implements A, B<C>` up to the class body
    fn drop_implements(&mut self, keyword: &Token) -> Result<(), ConvertError> {
        self.layout.skip(keyword)?;
        loop {
            let at_body = match self.tokens.peek()? {
                None => true,
                Some(next) => next.is("{"),
            };
            if at_body {
                return Ok(());
            }
            if let Some(token) = self.tokens.next_token()? {
                self.layout.skip(&token)?;
            }
        }
    }

    fn colon(&mut self, token: Token) -> Result<(), ConvertError> {
        if self.pending_case {
            self.pending_case = false;
            return self.emit(token);
        }
        if matches!(self.layout.last_char(), Some('"' | '\'')) {
            return self.emit(token);
        }
        if let Some(scope) = self.scopes.last_mut() {
            if scope.ternaries > 0 {
                scope.ternaries -= 1;
                return self.emit(token);
            }
        }
        if self.is_property_colon() || self.is_label_colon()? {
            return self.emit(token);
        }

        self.layout.skip(&token)?;
        self.drop_annotation(token.position.line)
    }

    /// A colon right after the key of an object literal member
    fn is_property_colon(&self) -> bool {
        let Some(scope) = self.scopes.last() else {
            return false;
        };
        let after_computed_key = matches!(&self.previous, Some(previous) if previous.is("]"));
        scope.literal && scope.parens == 0 && (scope.member_tokens == 1 || after_computed_key)
    }

    /// A colon after a statement label such as `outer: for (...)`
    fn is_label_colon(&mut self) -> Result<bool, LexError> {
        if !self.statement_word {
            return Ok(false);
        }
        Ok(matches!(
            self.tokens.peek_code(0)?,
            Some(next) if next.is_word("for") || next.is_word("while") || next.is_word("do")
        ))
    }

    fn question(&mut self, token: Token) -> Result<(), ConvertError> {
        let optional = matches!(self.tokens.peek()?, Some(next) if next.is(":"));
        if optional {
            return Ok(self.layout.skip(&token)?);
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.ternaries += 1;
        }
        self.emit(token)
    }

    /// Either a comparison or the start of a generic list
    fn angle(&mut self, token: Token) -> Result<(), ConvertError> {
        let generic = matches!(self.tokens.peek()?, Some(next) if looks_like_type(next));
        if !generic {
            return self.emit(token);
        }

        let mut dropped = vec![token];
        let mut depth = 1u32;
        while let Some(inner) = self.tokens.next_token()? {
            let closes = if inner.is("<") {
                depth += 1;
                false
            } else if inner.is(">") {
                depth -= 1;
                depth == 0
            } else {
                false
            };
            dropped.push(inner);
            if closes {
                break;
            }
        }
        let next = self.tokens.peek()?.map(|next| next.position);
        Ok(self.layout.skip_prefix(&dropped, next)?)
    }

    /// Drop the type after an annotation colon, leaving the token that ends it in the stream
    fn drop_annotation(&mut self, line: usize) -> Result<(), ConvertError> {
        let mut tail = TypeTail::new(line);
        let mut after_parameters = false;
        loop {
            let ends = match self.tokens.peek()? {
                None => true,
                Some(next) => {
                    tail.nesting == 0
                        && (ends_annotation(next, after_parameters) || tail.ends_before(next))
                }
            };
            if ends {
                return Ok(());
            }
            let Some(token) = self.tokens.next_token()? else {
                return Ok(());
            };
            self.layout.skip(&token)?;
            if !token.is_comment() {
                after_parameters = token.is(")");
            }
            tail.consume(&token);
        }
    }
}

/// Whether `next`, at nesting level 0, closes an annotation. `=>` only belongs to the type
/// when it follows a parameter list, as in `cb: (x: number) => void`.
fn ends_annotation(next: &Token, after_parameters: bool) -> bool {
    match next.text.as_str() {
        ";" | "=" | "{" | ")" | "," | "]" | "}" => true,
        "=>" => !after_parameters,
        _ => false,
    }
}

/// The token after a `<` that opens a generic list rather than a comparison
fn looks_like_type(token: &Token) -> bool {
    token.is_word("extends")
        || token.is_word("keyof")
        || (token.is_identifier() && token.text.chars().next().is_some_and(char::is_uppercase))
}
