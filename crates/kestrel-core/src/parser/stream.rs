//! Token stream wrapper for the hand-written parser.

use super::SyntaxError;
use crate::ast::Span;
use crate::lexer::{Token, TokenKind};

/// Token stream with lookahead and position tracking.
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    pub fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Check if the current token has the same kind as `expected`.
    pub fn check(&self, expected: &TokenKind) -> bool {
        let expected = std::mem::discriminant(expected);
        self.peek()
            .is_some_and(|t| std::mem::discriminant(&t.kind) == expected)
    }

    /// Consume the current token if it matches `expected`.
    pub fn eat(&mut self, expected: &TokenKind) -> Option<&'t Token> {
        if self.check(expected) {
            self.advance()
        } else {
            None
        }
    }

    /// Expect a specific token and advance if it matches.
    pub fn expect(&mut self, expected: TokenKind, describe: &str) -> Result<Span, SyntaxError> {
        match self.eat(&expected) {
            Some(token) => Ok(token.span),
            None => Err(SyntaxError::expected(describe, self.peek(), self.eof_span())),
        }
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span)
            .unwrap_or_default()
    }

    /// Zero-width span just past the last token.
    pub fn eof_span(&self) -> Span {
        let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
        Span::new(end, end)
    }

    /// Skip statement separators, returning how many were consumed.
    pub fn skip_separators(&mut self) -> usize {
        let mut skipped = 0;
        while matches!(self.peek_kind(), Some(kind) if kind.is_separator()) {
            self.pos += 1;
            skipped += 1;
        }
        skipped
    }

    /// Skip newlines only if the first token after them has kind `expected`.
    pub fn skip_newlines_before(&mut self, expected: &TokenKind) -> bool {
        let mut n = 0;
        while matches!(self.peek_nth(n), Some(t) if t.kind == TokenKind::Newline) {
            n += 1;
        }
        match self.peek_nth(n) {
            Some(t) if std::mem::discriminant(&t.kind) == std::mem::discriminant(expected) => {
                self.pos += n;
                true
            }
            _ => false,
        }
    }
}
