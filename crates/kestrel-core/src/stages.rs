//! Stage contracts consumed by the pipeline
//!
//! Each stage of the pipeline is a trait so that any implementation with the
//! same input and output can be swapped in, including stubs that return
//! canned data in tests. The reference implementations live in
//! [`crate::lexer`], [`crate::parser`], [`crate::bytecode`] and [`crate::vm`].

use crate::ast::Stmt;
use crate::bytecode::{BytecodeCompiler, CompileError, Instruction};
use crate::lexer::{Lexer, Token};
use crate::parser::{Parser, SyntaxError};
use crate::vm::{Execution, Interpreter};
use std::io::Write;

/// Source text to tokens. Total: malformed input yields unknown tokens.
pub trait Lex {
    fn tokenize(&self, source: &str) -> Vec<Token>;
}

/// Tokens to top-level statements.
pub trait Parse {
    fn parse(&self, tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError>;
}

/// Statements to a linear instruction sequence.
pub trait Compile {
    fn compile(&self, program: &[Stmt]) -> Result<Vec<Instruction>, CompileError>;
}

/// Executes bytecode against a fresh stack and register file.
pub trait Interpret {
    fn interpret(&mut self, code: &[Instruction]) -> Execution;
}

impl Lex for Lexer {
    fn tokenize(&self, source: &str) -> Vec<Token> {
        Lexer::tokenize(self, source)
    }
}

impl Parse for Parser {
    fn parse(&self, tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError> {
        Parser::parse(self, tokens)
    }
}

impl Compile for BytecodeCompiler {
    fn compile(&self, program: &[Stmt]) -> Result<Vec<Instruction>, CompileError> {
        BytecodeCompiler::compile(self, program)
    }
}

impl<W: Write> Interpret for Interpreter<W> {
    fn interpret(&mut self, code: &[Instruction]) -> Execution {
        Interpreter::interpret(self, code)
    }
}
