//! Syntax errors reported by the parser

use crate::ast::Span;
use crate::lexer::Token;
use thiserror::Error;

/// The parser could not derive an AST from the token sequence
#[derive(Debug, Clone, PartialEq, Error)]
#[error("syntax error: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Option<Span>,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        SyntaxError {
            message: message.into(),
            span,
        }
    }

    /// Create an "expected X, found Y" error
    pub fn expected(expected: &str, found: Option<&Token>, eof: Span) -> Self {
        match found {
            Some(token) => SyntaxError::new(
                format!("expected {expected}, found {}", token.kind),
                Some(token.span),
            ),
            None => SyntaxError::new(
                format!("expected {expected}, found end of input"),
                Some(eof),
            ),
        }
    }
}
