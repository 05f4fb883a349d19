//! Token types for textual constraint systems.

use crate::utils::location::Span;
use std::fmt;

/// A token in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source span
    pub span: Span,
    /// The lexeme (raw text)
    pub lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// Check if this is an EOF token.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Integer literal
    Integer,
    /// Variable or symbol name
    Identifier,

    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,

    /// `==`
    EqualEqual,
    /// `=`
    Equal,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Check if this token relates two affine expressions.
    pub fn is_comparison(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            EqualEqual | Equal | Less | LessEqual | Greater | GreaterEqual
        )
    }

    /// Get a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Integer => "integer",
            Identifier => "identifier",
            Plus => "+",
            Minus => "-",
            Star => "*",
            EqualEqual => "==",
            Equal => "=",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            LeftParen => "(",
            RightParen => ")",
            LeftBracket => "[",
            RightBracket => "]",
            Comma => ",",
            Colon => ":",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
