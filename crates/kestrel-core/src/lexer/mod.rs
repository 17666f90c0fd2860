//! Lexer for Kestrel source text
//!
//! Built on chumsky combinators over `&str`. Tokenization is total: every
//! character either belongs to a token, is skipped as whitespace or comment,
//! or becomes a [`TokenKind::Unknown`] token. Runs of newlines collapse into a
//! single [`TokenKind::Newline`] token.

use crate::ast::Span;
use chumsky::prelude::*;

mod token;

pub use token::{Token, TokenKind};

/// Parser for line comments (// to end of line)
fn line_comment<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
    just("//").then(none_of("\n").repeated()).ignored()
}

/// Whitespace (other than newlines) and comments between tokens
fn skip<'a>() -> impl Parser<'a, &'a str, (), extra::Err<Rich<'a, char>>> + Clone {
    choice((line_comment(), one_of(" \t\r").ignored()))
        .repeated()
        .ignored()
}

fn operator<'a>() -> impl Parser<'a, &'a str, TokenKind, extra::Err<Rich<'a, char>>> + Clone {
    let two_char = choice((
        just("==").to(TokenKind::EqEq),
        just("!=").to(TokenKind::NotEq),
        just("<=").to(TokenKind::Le),
        just(">=").to(TokenKind::Ge),
        just("+=").to(TokenKind::PlusAssign),
        just("-=").to(TokenKind::MinusAssign),
        just("*=").to(TokenKind::StarAssign),
        just("/=").to(TokenKind::SlashAssign),
    ));

    let one_char = choice((
        just('+').to(TokenKind::Plus),
        just('-').to(TokenKind::Minus),
        just('*').to(TokenKind::Star),
        just('/').to(TokenKind::Slash),
        just('%').to(TokenKind::Percent),
        just('^').to(TokenKind::Caret),
        just('=').to(TokenKind::Assign),
        just('<').to(TokenKind::Lt),
        just('>').to(TokenKind::Gt),
        just('(').to(TokenKind::LParen),
        just(')').to(TokenKind::RParen),
        just('{').to(TokenKind::LBrace),
        just('}').to(TokenKind::RBrace),
        just(';').to(TokenKind::Semicolon),
    ));

    two_char.or(one_char)
}

pub fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<Token>, extra::Err<Rich<'a, char>>> {
    // Leading zeros are allowed: `007` is one number
    let number = text::digits(10)
        .then(just('.').then(text::digits(10)).or_not())
        .to_slice()
        .map(|s: &str| TokenKind::Number(s.parse::<f64>().unwrap_or(0.0)));

    let word = text::ascii::ident().map(TokenKind::from_word);

    let newline = just('\n').to(TokenKind::Newline);

    let token = choice((
        number,
        word,
        operator(),
        newline,
        any().map(TokenKind::Unknown),
    ))
    .map_with(|kind, e| Token::new(kind, Span::from_chumsky(e.span())));

    skip()
        .ignore_then(token.then_ignore(skip()).repeated().collect::<Vec<Token>>())
        .then_ignore(end())
}

/// Collapse consecutive newline tokens into one covering the whole run
fn collapse_newlines(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == TokenKind::Newline
            && let Some(last) = out.last_mut()
            && last.kind == TokenKind::Newline
        {
            last.span = last.span.merge(token.span);
            continue;
        }
        out.push(token);
    }
    out
}

/// The reference lexer stage
#[derive(Debug, Default, Clone, Copy)]
pub struct Lexer;

impl Lexer {
    pub fn new() -> Self {
        Lexer
    }

    /// Convert source text into tokens. Never fails.
    pub fn tokenize(&self, source: &str) -> Vec<Token> {
        let (output, errors) = lexer().parse(source).into_output_errors();
        if !errors.is_empty() {
            tracing::warn!(errors = errors.len(), "lexer grammar reported errors");
        }
        collapse_newlines(output.unwrap_or_default())
    }
}
