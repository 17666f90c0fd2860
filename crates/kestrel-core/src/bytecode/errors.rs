//! Errors raised while lowering the AST to bytecode

use crate::ast::Span;
use thiserror::Error;

/// The compiler could not derive bytecode from the AST
#[derive(Debug, Clone, PartialEq, Error)]
#[error("compile error: {message}")]
pub struct CompileError {
    pub message: String,
    /// Span of the offending AST construct
    pub span: Option<Span>,
}

impl CompileError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        CompileError {
            message: message.into(),
            span,
        }
    }
}
