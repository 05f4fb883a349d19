//! Parser for textual constraint systems.
//!
//! ```text
//! system     := '(' names? ')' ('[' names? ']')? (':' '(' constraints? ')')?
//! names      := IDENT (',' IDENT)*
//! constraints:= constraint (',' constraint)*
//! constraint := affine ('>=' | '<=' | '==' | '=' | '>' | '<') affine
//! affine     := ('+' | '-')? term (('+' | '-') term)*
//! term       := factor (('*')? factor)*
//! factor     := INTEGER | IDENT
//! ```
//!
//! Parenthesized names are the dimensions, bracketed names the symbols.
//! A coefficient may be glued to a name (`3x`). Strict comparisons use
//! integer semantics: `a > b` is read as `a - b - 1 >= 0`.

use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::polyhedral::{AffineExpr, Constraint, IntegerPolyhedron, Space};
use crate::utils::errors::{ParseError, ParseErrorKind, PresburgerResult};
use crate::utils::location::Span;
use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Zero};

/// A parser for textual constraint systems.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    names: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Create a new parser from a lexer.
    pub fn new(mut lexer: Lexer<'a>) -> PresburgerResult<Self> {
        let first_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current: first_token.clone(),
            previous: first_token,
            names: Vec::new(),
        })
    }

    /// Parse a complete constraint system.
    pub fn parse_polyhedron(&mut self) -> PresburgerResult<IntegerPolyhedron> {
        self.consume(TokenKind::LeftParen, "Expected '(' before the dimension list")?;
        let dims = self.parse_names(TokenKind::RightParen)?;
        self.consume(TokenKind::RightParen, "Expected ')' after the dimension list")?;

        let params = if self.match_token(TokenKind::LeftBracket)? {
            let params = self.parse_names(TokenKind::RightBracket)?;
            self.consume(TokenKind::RightBracket, "Expected ']' after the symbol list")?;
            params
        } else {
            Vec::new()
        };

        let space = Space::set_with_params(dims.len(), params.len())
            .with_dim_names(dims)
            .with_param_names(params);
        let mut polyhedron = IntegerPolyhedron::new(space);

        if self.match_token(TokenKind::Colon)? {
            self.consume(TokenKind::LeftParen, "Expected '(' before the constraint list")?;
            if !self.check(TokenKind::RightParen) {
                loop {
                    let constraint = self.parse_constraint()?;
                    polyhedron.add_constraint(&constraint);
                    if !self.match_token(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "Expected ')' after the constraint list")?;
        }

        if !self.check(TokenKind::Eof) {
            return Err(self
                .error_here(ParseErrorKind::UnexpectedToken, "Unexpected trailing input")
                .expecting("end of input")
                .into());
        }
        debug!(
            "parsed {} variable(s) with {} constraint(s)",
            polyhedron.num_vars(),
            polyhedron.num_constraints()
        );
        Ok(polyhedron)
    }

    fn parse_names(&mut self, close: TokenKind) -> PresburgerResult<Vec<String>> {
        let mut names = Vec::new();
        if self.check(close) {
            return Ok(names);
        }
        loop {
            if !self.check(TokenKind::Identifier) {
                return Err(self
                    .error_here(ParseErrorKind::ExpectedIdentifier, "Expected a variable name")
                    .expecting("identifier")
                    .into());
            }
            let name = self.current.lexeme.clone();
            if self.names.contains(&name) {
                return Err(self
                    .error_here(
                        ParseErrorKind::DuplicateIdentifier,
                        format!("Variable '{}' is declared twice", name),
                    )
                    .into());
            }
            self.advance()?;
            self.names.push(name.clone());
            names.push(name);
            if !self.match_token(TokenKind::Comma)? {
                return Ok(names);
            }
        }
    }

    fn parse_constraint(&mut self) -> PresburgerResult<Constraint> {
        let lhs = self.parse_affine()?;
        let op = self.current.kind;
        if !op.is_comparison() {
            return Err(self
                .error_here(ParseErrorKind::ExpectedToken, "Expected a comparison")
                .expecting(">=, <=, ==, =, > or <")
                .into());
        }
        self.advance()?;
        let rhs = self.parse_affine()?;

        let n = self.names.len();
        let one = AffineExpr::constant(1, n);
        Ok(match op {
            TokenKind::GreaterEqual => Constraint::ge(lhs, rhs),
            TokenKind::LessEqual => Constraint::le(lhs, rhs),
            TokenKind::Greater => Constraint::ge(lhs, rhs + one),
            TokenKind::Less => Constraint::le(lhs + one, rhs),
            _ => Constraint::eq(lhs, rhs),
        })
    }

    fn parse_affine(&mut self) -> PresburgerResult<AffineExpr> {
        let mut expr = AffineExpr::zero(self.names.len());
        let mut negate = match self.current.kind {
            TokenKind::Minus => {
                self.advance()?;
                true
            }
            TokenKind::Plus => {
                self.advance()?;
                false
            }
            _ => false,
        };
        loop {
            let (coeff, var) = self.parse_term()?;
            let coeff = if negate { -coeff } else { coeff };
            match var {
                Some(index) => {
                    let total = expr.coeff(index) + coeff;
                    expr.set_coeff(index, total);
                }
                None => expr.constant += coeff,
            }
            negate = match self.current.kind {
                TokenKind::Plus => false,
                TokenKind::Minus => true,
                _ => return Ok(expr),
            };
            self.advance()?;
        }
    }

    /// A product of integers and at most one variable.
    fn parse_term(&mut self) -> PresburgerResult<(BigInt, Option<usize>)> {
        let start = self.current.span;
        let mut coeff = BigInt::one();
        let mut var = None;
        loop {
            match self.current.kind {
                TokenKind::Integer => {
                    let value: BigInt = self.current.lexeme.parse().map_err(|_| {
                        self.error_here(ParseErrorKind::InvalidCoefficient, "Invalid integer")
                    })?;
                    coeff *= value;
                }
                TokenKind::Identifier => {
                    let index = self.lookup(&self.current.lexeme)?;
                    if var.is_some() {
                        let span = start.merge(&self.current.span);
                        return Err(ParseError::new(
                            ParseErrorKind::NonAffineTerm,
                            "Product of two variables is not affine",
                            span,
                        )
                        .into());
                    }
                    var = Some(index);
                }
                _ => {
                    return Err(self
                        .error_here(ParseErrorKind::UnexpectedToken, "Expected a term")
                        .expecting("integer or identifier")
                        .into())
                }
            }
            self.advance()?;

            if self.match_token(TokenKind::Star)? {
                continue;
            }
            // `3x` multiplies without a star.
            let glued = self.previous.kind == TokenKind::Integer
                && self.check(TokenKind::Identifier)
                && self.previous.span.end.offset == self.current.span.start.offset;
            if !glued {
                break;
            }
        }
        if coeff.is_zero() {
            var = None;
        }
        Ok((coeff, var))
    }

    fn lookup(&self, name: &str) -> PresburgerResult<usize> {
        self.names.iter().position(|n| n == name).ok_or_else(|| {
            self.error_here(
                ParseErrorKind::UnknownIdentifier,
                format!("Unknown variable '{}'", name),
            )
            .into()
        })
    }

    // Helper methods
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn advance(&mut self) -> PresburgerResult<&Token> {
        let next = self.lexer.next_token()?;
        self.previous = std::mem::replace(&mut self.current, next);
        Ok(&self.previous)
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> PresburgerResult<&Token> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self
                .error_here(ParseErrorKind::ExpectedToken, message)
                .expecting(kind.name())
                .into())
        }
    }

    fn match_token(&mut self, kind: TokenKind) -> PresburgerResult<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn error_here(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        let span: Span = self.current.span;
        ParseError::new(kind, message, span).found(self.current.kind.name())
    }
}
