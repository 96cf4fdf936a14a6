//! Recursive-descent reader
//!
//! Turns a stream of characters into [`Object`] trees, one expression per
//! call to [`Reader::read`]. The reader never looks more than one
//! character ahead.
//!
//! ```text
//! expr := integer | symbol | boolean | '(' expr* ')' | '\'' expr
//! ```

use std::iter::Peekable;
use std::str::Chars;

use crate::MAX_READ_DEPTH;
use crate::error::{Error, Position, Result};
use crate::language::{Object, list};

// ============================================================================
// Character Classes
// ============================================================================

fn is_delimiter(ch: Option<char>) -> bool {
    match ch {
        None => true,
        Some(c) => c.is_whitespace() || c == '(' || c == ')' || c == ';',
    }
}

fn is_symbol_initial(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '_' | '+' | '-' | '*' | '/' | '<' | '>' | '?' | '=')
}

fn is_symbol_subsequent(c: char) -> bool {
    is_symbol_initial(c) || c.is_ascii_digit()
}

fn describe(ch: Option<char>) -> String {
    match ch {
        Some(c) => format!("'{c}'"),
        None => "end of input".to_string(),
    }
}

// ============================================================================
// Reader
// ============================================================================

pub struct Reader<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    line: usize,
    column: usize,
    /// Lists and quotes currently open
    depth: usize,
}

impl<'a> Reader<Chars<'a>> {
    pub fn from_text(input: &'a str) -> Self {
        Reader::new(input.chars())
    }
}

impl<I: Iterator<Item = char>> Reader<I> {
    pub fn new(chars: I) -> Self {
        Reader {
            chars: chars.peekable(),
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    /// Position of the next unread character.
    pub fn location(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    /// Skip whitespace and `;` comments.
    fn skip_atmosphere(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else if c == ';' {
                while let Some(c) = self.advance() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    /// Read the next expression. `Ok(None)` means the input ran out
    /// before any token started.
    pub fn read(&mut self) -> Result<Option<Object>> {
        self.depth = 0;
        self.skip_atmosphere();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.read_expr().map(Some)
    }

    /// Read an expression that must be present.
    fn read_expr(&mut self) -> Result<Object> {
        self.skip_atmosphere();
        let start = self.location();
        let Some(c) = self.advance() else {
            return Err(Error::incomplete("unexpected end of input").at(start));
        };

        match c {
            '(' => {
                self.enter(start)?;
                let items = self.read_list(start)?;
                self.depth -= 1;
                Ok(items)
            }
            '\'' => {
                self.enter(start)?;
                let quoted = self.read_expr()?;
                self.depth -= 1;
                Ok(list([Object::symbol("quote"), quoted]))
            }
            '#' => self.read_boolean(start),
            '-' if self.peek().is_some_and(|d| d.is_ascii_digit()) => {
                self.read_integer(c, start)
            }
            c if c.is_ascii_digit() => self.read_integer(c, start),
            c if is_symbol_initial(c) => self.read_symbol(c, start),
            c => Err(Error::parse(format!("unrecognized token starting with '{c}'"))
                .with_context(c)
                .at(start)),
        }
    }

    fn enter(&mut self, start: Position) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_READ_DEPTH {
            return Err(Error::parse(format!(
                "expression nested deeper than {MAX_READ_DEPTH} levels"
            ))
            .at(start));
        }
        Ok(())
    }

    /// Read list elements after the opening `(`.
    fn read_list(&mut self, start: Position) -> Result<Object> {
        let mut items = Vec::new();
        loop {
            self.skip_atmosphere();
            match self.peek() {
                Some(')') => {
                    self.advance();
                    return Ok(list(items));
                }
                Some(_) => items.push(self.read_expr()?),
                None => {
                    return Err(Error::incomplete(format!(
                        "list opened at {start} is never closed"
                    ))
                    .at(self.location()));
                }
            }
        }
    }

    fn read_boolean(&mut self, start: Position) -> Result<Object> {
        let value = match self.advance() {
            Some('t') => Object::TRUE,
            Some('f') => Object::FALSE,
            other => {
                let token = other.map(|c| format!("#{c}")).unwrap_or_else(|| "#".into());
                return Err(Error::parse(format!(
                    "unrecognized literal starting with {token}"
                ))
                .with_context(token)
                .at(start));
            }
        };
        if !is_delimiter(self.peek()) {
            let next = self.peek();
            return Err(Error::parse(format!(
                "boolean literal followed by non-delimiter {}",
                describe(next)
            ))
            .with_context(value.to_string())
            .at(self.location()));
        }
        Ok(value)
    }

    fn read_integer(&mut self, first: char, start: Position) -> Result<Object> {
        let mut text = String::from(first);
        while let Some(d) = self.peek().filter(char::is_ascii_digit) {
            text.push(d);
            self.advance();
        }

        if !is_delimiter(self.peek()) {
            let next = self.peek();
            return Err(Error::parse(format!(
                "number '{text}' followed by non-delimiter {}",
                describe(next)
            ))
            .with_context(text)
            .at(self.location()));
        }

        text.parse::<i64>()
            .map(Object::Integer)
            .map_err(|_| {
                Error::parse(format!("integer literal '{text}' out of range"))
                    .with_context(&text)
                    .at(start)
            })
    }

    fn read_symbol(&mut self, first: char, start: Position) -> Result<Object> {
        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(|c| is_symbol_subsequent(*c)) {
            name.push(c);
            self.advance();
        }

        if !is_delimiter(self.peek()) {
            let next = self.peek();
            return Err(Error::parse(format!(
                "symbol '{name}' contains disallowed character {}",
                describe(next)
            ))
            .with_context(name)
            .at(self.location()));
        }

        log::trace!("symbol {name} at {start}");
        Ok(Object::symbol(&name))
    }
}

impl<I: Iterator<Item = char>> Iterator for Reader<I> {
    type Item = Result<Object>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

// ============================================================================
// Convenience Entry Points
// ============================================================================

/// Read exactly one expression from `input`.
pub fn parse(input: &str) -> Result<Object> {
    let mut reader = Reader::from_text(input);
    let expr = reader
        .read()?
        .ok_or_else(|| Error::incomplete("no expression found"))?;

    reader.skip_atmosphere();
    if let Some(c) = reader.peek() {
        return Err(Error::parse(format!(
            "unexpected trailing content starting with '{c}'"
        ))
        .at(reader.location()));
    }
    Ok(expr)
}

/// Read every expression in `input`, in order.
pub fn parse_all(input: &str) -> Result<Vec<Object>> {
    Reader::from_text(input).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::language::cons;

    fn read_one(text: &str) -> Object {
        parse(text).unwrap()
    }

    fn err_kind(text: &str) -> ErrorKind {
        parse(text).unwrap_err().kind
    }

    #[test]
    fn test_integers() {
        assert_eq!(read_one("42"), Object::Integer(42));
        assert_eq!(read_one("-17"), Object::Integer(-17));
        assert_eq!(read_one("  007 "), Object::Integer(7));
    }

    #[test]
    fn test_lone_minus_is_symbol() {
        assert_eq!(read_one("-"), Object::symbol("-"));
        assert_eq!(read_one("-x"), Object::symbol("-x"));
    }

    #[test]
    fn test_symbols() {
        assert_eq!(read_one("zero?"), Object::symbol("zero?"));
        assert_eq!(read_one("make-adder2"), Object::symbol("make-adder2"));
        assert_eq!(read_one("<"), Object::symbol("<"));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(read_one("#t"), Object::TRUE);
        assert_eq!(read_one("#f"), Object::FALSE);
        assert_eq!(err_kind("#x"), ErrorKind::ParseError);
        assert_eq!(err_kind("#tt"), ErrorKind::ParseError);
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(read_one("()"), Object::Empty);
        assert_eq!(read_one("(  )"), Object::Empty);
    }

    #[test]
    fn test_nested_list() {
        let expr = read_one("(a (1 #t) ())");
        let items = expr.to_vec("test").unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], Object::symbol("a"));
        assert_eq!(
            items[1],
            cons(Object::Integer(1), cons(Object::TRUE, Object::Empty))
        );
        assert_eq!(items[2], Object::Empty);
    }

    #[test]
    fn test_quote_shorthand() {
        assert_eq!(read_one("'x"), read_one("(quote x)"));
        assert_eq!(read_one("'()"), read_one("(quote ())"));
    }

    #[test]
    fn test_number_followed_by_non_delimiter() {
        let err = parse("12abc").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.context.as_deref(), Some("12"));
        assert!(err.message.contains("'a'"));
    }

    #[test]
    fn test_symbol_with_disallowed_character() {
        let err = parse("foo#").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert!(err.message.contains("'#'"));
    }

    #[test]
    fn test_unrecognized_leading_character() {
        assert_eq!(err_kind(")"), ErrorKind::ParseError);
        assert_eq!(err_kind("[1]"), ErrorKind::ParseError);
    }

    #[test]
    fn test_integer_out_of_range() {
        assert_eq!(err_kind("99999999999999999999"), ErrorKind::ParseError);
    }

    #[test]
    fn test_unclosed_list_is_incomplete() {
        assert_eq!(err_kind("(+ 1 (2"), ErrorKind::IncompleteInput);
        assert_eq!(err_kind("'"), ErrorKind::IncompleteInput);
    }

    #[test]
    fn test_end_of_input_before_token() {
        let mut reader = Reader::from_text("   ; only a comment\n  ");
        assert!(reader.read().unwrap().is_none());
    }

    #[test]
    fn test_reads_successive_expressions() {
        let exprs = parse_all("(define x 5)\nx ; trailing\n#f").unwrap();
        assert_eq!(exprs.len(), 3);
        assert_eq!(exprs[1], Object::symbol("x"));
        assert_eq!(exprs[2], Object::FALSE);
    }

    #[test]
    fn test_parse_rejects_trailing_content() {
        assert_eq!(err_kind("1 2"), ErrorKind::ParseError);
    }

    #[test]
    fn test_error_position() {
        let err = parse("(a\n  3b)").unwrap_err();
        let position = err.position.unwrap();
        assert_eq!(position.line, 2);
        assert_eq!(position.column, 4);
    }

    #[test]
    fn test_comment_directly_after_token() {
        assert_eq!(read_one("(a;c\n)"), read_one("(a)"));
        assert_eq!(read_one("foo;c"), Object::symbol("foo"));
        assert_eq!(read_one("42;answer"), Object::Integer(42));
        assert_eq!(read_one("#t;yes"), Object::TRUE);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let text = format!("{}{}", "(".repeat(5_000), ")".repeat(5_000));
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ParseError);
        let position = err.position.unwrap();
        assert_eq!(position.line, 1);
        assert_eq!(position.column, MAX_READ_DEPTH + 1);
    }

    #[test]
    fn test_deep_quote_nesting_is_rejected() {
        let text = format!("{}x", "'".repeat(5_000));
        assert_eq!(err_kind(&text), ErrorKind::ParseError);
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let text = format!("{}{}", "(".repeat(MAX_READ_DEPTH), ")".repeat(MAX_READ_DEPTH));
        assert!(parse(&text).is_ok());
    }

    #[test]
    fn test_depth_resets_between_expressions() {
        let nested = format!("{}{}", "(".repeat(MAX_READ_DEPTH), ")".repeat(MAX_READ_DEPTH));
        let text = format!("{nested} {nested}");
        assert_eq!(parse_all(&text).unwrap().len(), 2);
    }

    #[test]
    fn test_long_flat_list() {
        let items: Vec<String> = (0..300_000).map(|n| n.to_string()).collect();
        let text = format!("({})", items.join(" "));
        let expr = read_one(&text);
        assert_eq!(expr.to_vec("test").unwrap().len(), 300_000);
    }
}
