//! Tokenizer for textual constraint systems.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{LexerError, LexerErrorKind};
use crate::utils::location::{SourceLocation, Span};
use std::iter::Peekable;
use std::str::Chars;
use unicode_xid::UnicodeXID;

/// Splits a constraint system into tokens, tracking line and column.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    /// Byte offset of the next character
    offset: usize,
    /// 1-indexed
    line: usize,
    /// 1-indexed
    column: usize,
    /// Where the token being scanned begins
    token_start: SourceLocation,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
        }
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    fn make_span(&self) -> Span {
        Span::new(self.token_start, self.current_location())
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// `with_eq` if the next character is `=` (consuming it), else `bare`.
    fn with_optional_eq(&mut self, with_eq: TokenKind, bare: TokenKind) -> Token {
        if self.peek() == Some('=') {
            self.advance();
            self.make_token(with_eq)
        } else {
            self.make_token(bare)
        }
    }

    /// Skip whitespace and `#` line comments.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('#') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        Token::new(kind, span, span.slice(self.source).to_string())
    }

    fn make_error(&self, message: &str, kind: LexerErrorKind) -> LexerError {
        LexerError {
            message: message.to_string(),
            span: self.make_span(),
            kind,
        }
    }

    fn scan_number(&mut self) -> Result<Token, LexerError> {
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
        // A digit run glued to a name is a coefficient (`3x`), which the
        // parser handles; a digit run glued to `.` is not an integer.
        if self.peek() == Some('.') {
            self.advance();
            return Err(self.make_error(
                "Only integer coefficients are allowed",
                LexerErrorKind::InvalidNumber,
            ));
        }
        Ok(self.make_token(TokenKind::Integer))
    }

    fn scan_identifier(&mut self) -> Token {
        while self.peek().map_or(false, |c| c.is_xid_continue()) {
            self.advance();
        }
        self.make_token(TokenKind::Identifier)
    }

    /// Scan the next token. Once the input is exhausted every call yields
    /// `Eof`.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();
        self.token_start = self.current_location();

        let Some(c) = self.advance() else {
            return Ok(self.make_token(TokenKind::Eof));
        };

        match c {
            '(' => Ok(self.make_token(TokenKind::LeftParen)),
            ')' => Ok(self.make_token(TokenKind::RightParen)),
            '[' => Ok(self.make_token(TokenKind::LeftBracket)),
            ']' => Ok(self.make_token(TokenKind::RightBracket)),
            ',' => Ok(self.make_token(TokenKind::Comma)),
            ':' => Ok(self.make_token(TokenKind::Colon)),
            '+' => Ok(self.make_token(TokenKind::Plus)),
            '-' => Ok(self.make_token(TokenKind::Minus)),
            '*' => Ok(self.make_token(TokenKind::Star)),
            '=' => Ok(self.with_optional_eq(TokenKind::EqualEqual, TokenKind::Equal)),
            '<' => Ok(self.with_optional_eq(TokenKind::LessEqual, TokenKind::Less)),
            '>' => Ok(self.with_optional_eq(TokenKind::GreaterEqual, TokenKind::Greater)),
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_xid_start() || c == '_' => Ok(self.scan_identifier()),
            _ => Err(self.make_error(
                &format!("Unexpected character: '{}'", c),
                LexerErrorKind::UnexpectedChar,
            )),
        }
    }

    /// Scan the whole input, ending with the `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}
