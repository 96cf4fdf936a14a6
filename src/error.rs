//! Error types shared by the reader, evaluator and primitives.

use std::fmt;

/// Categories of failures the interpreter core can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token, stray `)` or unrecognized leading character
    ParseError,
    /// Input ended in the middle of an expression
    IncompleteInput,
    /// Identifier not bound in any frame of the environment chain
    UnboundIdentifier,
    /// Attempt to apply something that is neither a primitive nor a closure
    UnknownOperator,
    /// Operand of the wrong variant (e.g. a symbol passed to `+`)
    TypeMismatch,
    /// Wrong number of operands to a procedure or special form
    ArityMismatch,
    DivisionByZero,
    /// Result does not fit in a fixed-width integer
    IntegerOverflow,
    /// More than `MAX_EVAL_DEPTH` closure applications active at once
    RecursionLimit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ParseError => "parse error",
            ErrorKind::IncompleteInput => "incomplete input",
            ErrorKind::UnboundIdentifier => "unbound identifier",
            ErrorKind::UnknownOperator => "unknown operator",
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::ArityMismatch => "arity mismatch",
            ErrorKind::DivisionByZero => "division by zero",
            ErrorKind::IntegerOverflow => "integer overflow",
            ErrorKind::RecursionLimit => "recursion limit exceeded",
        };
        f.write_str(name)
    }
}

/// Line and column (both 1-based) of a character in reader input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A failure with its category and whatever context was at hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// The offending token, identifier or expression, when known
    pub context: Option<String>,
    /// Where in the input a parse failure happened
    pub position: Option<Position>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
            position: None,
        }
    }

    pub fn with_context(mut self, context: impl fmt::Display) -> Self {
        self.context = Some(context.to_string());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompleteInput, message)
    }

    pub fn unbound(name: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnboundIdentifier,
            format!("could not find value for identifier: {name}"),
        )
        .with_context(name)
    }

    pub fn unknown_operator(operator: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnknownOperator,
            format!("unknown operator {operator}"),
        )
        .with_context(operator)
    }

    pub fn type_mismatch(who: &str, expected: &str, got: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("{who}: expected {expected}, got {got}"),
        )
        .with_context(got)
    }

    pub fn arity(who: impl fmt::Display, expected: impl fmt::Display, got: usize) -> Self {
        Self::new(
            ErrorKind::ArityMismatch,
            format!("{who}: expected {expected} argument(s), got {got}"),
        )
    }

    pub fn division_by_zero(who: &str) -> Self {
        Self::new(ErrorKind::DivisionByZero, format!("{who}: division by zero"))
    }

    pub fn overflow(who: &str) -> Self {
        Self::new(ErrorKind::IntegerOverflow, format!("{who}: integer overflow"))
    }

    pub fn recursion_limit(limit: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimit,
            format!("evaluation nested deeper than {limit} levels"),
        )
    }

    /// True for both kinds of reader failure.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ParseError | ErrorKind::IncompleteInput
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(position) = self.position {
            write!(f, " at {position}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}
