//! Error types for the solver crate.
//!
//! Empty regions, unbounded optima and missing integer points are ordinary
//! results and are reported through return values. The types here cover
//! the only fallible input the crate accepts: constraint systems written
//! as text.

use crate::utils::location::Span;
use std::fmt;
use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Error, Debug, Clone)]
pub enum PresburgerError {
    /// Error during tokenization
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    /// Error during parsing
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl PresburgerError {
    /// The source span the error points at.
    pub fn span(&self) -> Span {
        match self {
            PresburgerError::Lexer(err) => err.span,
            PresburgerError::Parse(err) => err.span,
        }
    }
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone)]
pub struct LexerError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// Character outside the constraint syntax
    UnexpectedChar,
    /// Malformed integer literal
    InvalidNumber,
}

/// Error during parsing.
#[derive(Error, Debug, Clone)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// Expected tokens (if applicable)
    pub expected: Vec<String>,
    /// What was found
    pub found: Option<String>,
}

impl ParseError {
    /// Create an error with no expectation list.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            expected: Vec::new(),
            found: None,
        }
    }

    /// Record what the parser was looking for.
    pub fn expecting(mut self, expected: impl Into<String>) -> Self {
        self.expected.push(expected.into());
        self
    }

    /// Record what the parser found instead.
    pub fn found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)?;
        if !self.expected.is_empty() {
            write!(f, " (expected: {})", self.expected.join(", "))?;
        }
        if let Some(ref found) = self.found {
            write!(f, " (found: {})", found)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that cannot start or continue the current construct
    UnexpectedToken,
    /// A specific token was required
    ExpectedToken,
    /// An identifier was required
    ExpectedIdentifier,
    /// An identifier that is neither a dimension nor a symbol
    UnknownIdentifier,
    /// The same name declared twice
    DuplicateIdentifier,
    /// A product of two variables
    NonAffineTerm,
    /// A coefficient that does not fit the term it scales
    InvalidCoefficient,
}

/// Result type using PresburgerError.
pub type PresburgerResult<T> = Result<T, PresburgerError>;
