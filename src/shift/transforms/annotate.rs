//! Annotate transform: untyped source in, typed stub out
//!
//! Inserts a placeholder annotation (`: any` unless configured otherwise) after
//!
//! - every parameter binding of a recognized parameter list, and after its closing `)` as
//!   the return type (constructors and setters have no return slot)
//! - the binding of a `var`/`let`/`const` declaration that has an initializer
//!
//! A parameter list is recognized after `function`, after `constructor`, after a method
//! name directly inside a class body, and when its matching `)` is followed by `=>`. Calls
//! and control-flow parentheses are left alone.
//!
//! The input is assumed to be untyped. Annotations already present are not detected and
//! end up doubled.

use crate::shift::error::{ConvertError, LexError};
use crate::shift::layout::Layout;
use crate::shift::lexing::TokenStream;
use crate::shift::token::Token;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callable {
    Function,
    Constructor,
    Method,
    Setter,
    Arrow,
}

impl Callable {
    fn has_return_slot(self) -> bool {
        !matches!(self, Callable::Constructor | Callable::Setter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ParameterList {
    callable: Callable,
    nesting: u32,
    /// The next token at nesting 0 starts a parameter
    at_start: bool,
    /// A destructuring pattern is open; its closing bracket gets the placeholder
    pattern: bool,
}

impl ParameterList {
    fn new(callable: Callable) -> Self {
        ParameterList {
            callable,
            nesting: 0,
            at_start: true,
            pattern: false,
        }
    }
}

/// Where a variable declaration stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    /// Right after `var`, `let` or `const`
    Name,
    /// Inside a destructuring pattern, with its bracket depth
    Pattern(u32),
    /// The binding is complete, an `=` would start its initializer
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnnotateState {
    Normal,
    /// Between a callable keyword or name and its `(`
    Header(Callable),
    Parameters(ParameterList),
    Declaration(Binding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Block,
    Class {
        parens: u32,
        /// Inside a field initializer, where a name followed by `(` is a call
        initializer: bool,
    },
}

pub struct Annotator<'src, W> {
    tokens: TokenStream<'src>,
    layout: Layout<'src, W>,
    state: AnnotateState,
    /// The inserted text, colon included
    annotation: String,
    scopes: Vec<Scope>,
    /// `class` seen, its body has not opened yet
    pending_class: bool,
    previous: Option<Token>,
}

impl<'src, W: Write> Annotator<'src, W> {
    pub fn new(source: &'src str, out: W, placeholder: &str) -> Self {
        Annotator {
            tokens: TokenStream::new(source),
            layout: Layout::new(source, out),
            state: AnnotateState::Normal,
            annotation: format!(": {}", placeholder),
            scopes: vec![Scope::Block],
            pending_class: false,
            previous: None,
        }
    }

    pub fn run(mut self) -> Result<W, ConvertError> {
        while let Some(token) = self.tokens.next_token()? {
            self.step(token)?;
        }
        Ok(self.layout.finish()?)
    }

    fn step(&mut self, token: Token) -> Result<(), ConvertError> {
        if token.is_comment() {
            return Ok(self.layout.emit(&token)?);
        }
        match self.state {
            AnnotateState::Normal => self.normal(token),
            AnnotateState::Header(callable) => self.header(callable, token),
            AnnotateState::Parameters(list) => self.parameter(list, token),
            AnnotateState::Declaration(binding) => self.declaration(binding, token),
        }
    }

    fn normal(&mut self, token: Token) -> Result<(), ConvertError> {
        if token.is("(") && self.arrow_parameters_follow()? {
            self.state = AnnotateState::Parameters(ParameterList::new(Callable::Arrow));
            return self.emit(token);
        }
        self.track_class_member(&token);

        if token.is_identifier() && !self.after_member_access() {
            match token.text.as_str() {
                "function" => self.state = AnnotateState::Header(Callable::Function),
                "constructor" => self.state = AnnotateState::Header(Callable::Constructor),
                "var" | "let" | "const" => self.state = AnnotateState::Declaration(Binding::Name),
                "class" => self.pending_class = true,
                _ => {
                    if self.method_name(&token)? {
                        let setter = matches!(&self.previous, Some(p) if p.is_word("set"));
                        let callable = if setter {
                            Callable::Setter
                        } else {
                            Callable::Method
                        };
                        self.state = AnnotateState::Header(callable);
                    }
                }
            }
            return self.emit(token);
        }

        match token.text.as_str() {
            "{" => {
                let scope = if self.pending_class {
                    Scope::Class {
                        parens: 0,
                        initializer: false,
                    }
                } else {
                    Scope::Block
                };
                self.pending_class = false;
                self.scopes.push(scope);
            }
            "}" => {
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
            }
            _ => {}
        }
        self.emit(token)
    }

    fn header(&mut self, callable: Callable, token: Token) -> Result<(), ConvertError> {
        if token.is("(") {
            self.state = AnnotateState::Parameters(ParameterList::new(callable));
            return self.emit(token);
        }
        let name_or_star = token.is_identifier() || token.is("*");
        if callable == Callable::Function && name_or_star {
            return self.emit(token);
        }
        self.state = AnnotateState::Normal;
        self.normal(token)
    }

    fn parameter(&mut self, mut list: ParameterList, token: Token) -> Result<(), ConvertError> {
        let top = list.nesting == 0;
        match token.text.as_str() {
            ")" if top => {
                self.emit(token)?;
                if list.callable.has_return_slot() {
                    self.annotate()?;
                }
                self.state = AnnotateState::Normal;
                return Ok(());
            }
            "," if top => {
                list.at_start = true;
                self.emit(token)?;
            }
            "..." if top && list.at_start => self.emit(token)?,
            "{" | "[" if top && list.at_start => {
                list.at_start = false;
                list.pattern = true;
                list.nesting = 1;
                self.emit(token)?;
            }
            _ if top && list.at_start && token.is_identifier() => {
                list.at_start = false;
                self.emit(token)?;
                self.annotate()?;
            }
            "(" | "[" | "{" => {
                list.nesting += 1;
                self.emit(token)?;
            }
            ")" | "]" | "}" => {
                list.nesting = list.nesting.saturating_sub(1);
                self.emit(token)?;
                if list.nesting == 0 && list.pattern {
                    list.pattern = false;
                    self.annotate()?;
                }
            }
            _ => {
                if top {
                    list.at_start = false;
                }
                self.emit(token)?;
            }
        }
        self.state = AnnotateState::Parameters(list);
        Ok(())
    }

    fn declaration(&mut self, binding: Binding, token: Token) -> Result<(), ConvertError> {
        let next = match binding {
            Binding::Name if token.is_identifier() => Binding::After,
            Binding::Name if token.is("{") || token.is("[") => Binding::Pattern(1),
            Binding::Pattern(depth) => match token.text.as_str() {
                "{" | "[" => Binding::Pattern(depth + 1),
                "}" | "]" if depth <= 1 => Binding::After,
                "}" | "]" => Binding::Pattern(depth - 1),
                _ => Binding::Pattern(depth),
            },
            Binding::After if token.is("=") => {
                self.annotate()?;
                self.state = AnnotateState::Normal;
                return self.emit(token);
            }
            Binding::After if token.is(",") => Binding::Name,
            _ => {
                self.state = AnnotateState::Normal;
                return self.normal(token);
            }
        };
        self.state = AnnotateState::Declaration(next);
        self.emit(token)
    }

    fn emit(&mut self, token: Token) -> Result<(), ConvertError> {
        self.layout.emit(&token)?;
        self.previous = Some(token);
        Ok(())
    }

    fn annotate(&mut self) -> Result<(), ConvertError> {
        Ok(self.layout.insert(&self.annotation)?)
    }

    fn after_member_access(&self) -> bool {
        matches!(&self.previous, Some(previous) if previous.is(".") || previous.is("?."))
    }

    /// Keep the field/method boundary of a class body current
    fn track_class_member(&mut self, token: &Token) {
        let new_line = matches!(&self.previous, Some(p) if token.position.line > p.end().line);
        if let Some(Scope::Class {
            parens,
            initializer,
        }) = self.scopes.last_mut()
        {
            match token.text.as_str() {
                "(" | "[" => *parens += 1,
                ")" | "]" => *parens = parens.saturating_sub(1),
                "=" if *parens == 0 => *initializer = true,
                ";" if *parens == 0 => *initializer = false,
                _ if *parens == 0 && new_line => *initializer = false,
                _ => {}
            }
        }
    }

    /// A name directly inside a class body that is followed by `(`
    fn method_name(&mut self, token: &Token) -> Result<bool, LexError> {
        let member_position = matches!(
            self.scopes.last(),
            Some(Scope::Class {
                parens: 0,
                initializer: false
            })
        );
        if !member_position || !token.is_identifier() {
            return Ok(false);
        }
        Ok(matches!(self.tokens.peek()?, Some(next) if next.is("(")))
    }

    /// Whether the `(` just taken from the stream closes with a `)` that is followed by `=>`
    fn arrow_parameters_follow(&mut self) -> Result<bool, LexError> {
        let mut depth = 1usize;
        let mut index = 0;
        loop {
            let Some(token) = self.tokens.peek_nth(index)? else {
                return Ok(false);
            };
            if token.is("(") {
                depth += 1;
            } else if token.is(")") {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            index += 1;
        }
        Ok(matches!(self.tokens.peek_nth(index + 1)?, Some(next) if next.is("=>")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate(source: &str) -> String {
        let out = Annotator::new(source, Vec::new(), "any").run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_function_parameters_and_return() {
        assert_eq!(
            annotate("function add(a, b) { return a + b; }"),
            "function add(a: any, b: any): any { return a + b; }"
        );
    }

    #[test]
    fn test_variable_with_initializer() {
        assert_eq!(annotate("let x = 5;"), "let x: any = 5;");
    }

    #[test]
    fn test_declaration_without_initializer() {
        assert_eq!(
            annotate("for (const x of xs) { f(x); }"),
            "for (const x of xs) { f(x); }"
        );
        assert_eq!(annotate("let a, b = 2;"), "let a, b: any = 2;");
    }

    #[test]
    fn test_calls_are_left_alone() {
        let source = "if (ready(a)) { run(a, b); }";
        assert_eq!(annotate(source), source);
    }

    #[test]
    fn test_arrow_function() {
        assert_eq!(
            annotate("const mul = (x, y) => x * y;"),
            "const mul: any = (x: any, y: any): any => x * y;"
        );
    }

    #[test]
    fn test_constructor_has_no_return_slot() {
        assert_eq!(
            annotate("class A {\n  constructor(n) { this.n = n; }\n}"),
            "class A {\n  constructor(n: any) { this.n = n; }\n}"
        );
    }

    #[test]
    fn test_methods_and_setters() {
        assert_eq!(
            annotate("class A {\n  greet(m) { log(m); }\n  set v(x) { this.x = x; }\n}"),
            "class A {\n  greet(m: any): any { log(m); }\n  set v(x: any) { this.x = x; }\n}"
        );
    }

    #[test]
    fn test_rest_defaults_and_patterns() {
        assert_eq!(
            annotate("function f({ a, b }, c = g(1, 2), ...rest) {}"),
            "function f({ a, b }: any, c: any = g(1, 2), ...rest: any): any {}"
        );
    }

    #[test]
    fn test_custom_placeholder() {
        let out = Annotator::new("let x = 1;", Vec::new(), "unknown")
            .run()
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "let x: unknown = 1;");
    }

    #[test]
    fn test_member_named_constructor() {
        let source = "const c = obj.constructor;";
        assert_eq!(annotate(source), "const c: any = obj.constructor;");
    }
}
