//! Frontend: lexer and parser for textual constraint systems.
//!
//! ## Syntax
//!
//! ```text
//! (i, j)[N] : (i >= 0, i < N, j >= 0, 2j <= i + 3, i + j == N)
//! ```
//!
//! Names in parentheses are set dimensions and names in brackets are
//! symbols. Constraints relate two affine expressions with integer
//! coefficients.

pub mod lexer;
pub mod parser;
pub mod token;

// Re-exports
pub use crate::utils::errors::ParseError;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

use crate::polyhedral::IntegerPolyhedron;
use crate::utils::errors::PresburgerResult;

/// Parse a constraint system into a polyhedron.
pub fn parse_polyhedron(source: &str) -> PresburgerResult<IntegerPolyhedron> {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer)?;
    parser.parse_polyhedron()
}
