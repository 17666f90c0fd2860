//! Pipeline orchestration: lex → parse → compile → interpret
//!
//! [`Pipeline`] runs the four stages in strict sequence on the caller's
//! thread. Each stage consumes the whole output of the previous one, and the
//! first failing stage ends the run. Whether that failure reaches the caller
//! is an explicit [`FailurePolicy`] in the [`RunConfig`] passed to each call.
//!
//! ## Usage
//!
//! ```no_run
//! # use kestrel_core::pipeline::{Pipeline, RunConfig};
//! let mut pipeline = Pipeline::new();
//! pipeline.run("x = 6 * 7\nprint(x)", &RunConfig::new().verbose(true))?;
//! # Ok::<(), kestrel_core::pipeline::PipelineError>(())
//! ```
//!
//! ## Individual Stages
//!
//! ```
//! # use kestrel_core::pipeline::Pipeline;
//! # use kestrel_core::trace::Tracer;
//! let mut pipeline = Pipeline::with_output(Vec::new());
//! let code = pipeline.compile("40 + 2")?;
//! assert_eq!(code.len(), 4);
//!
//! let state = pipeline.execute("40 + 2", &mut Tracer::disabled())?;
//! assert_eq!(state.stack.len(), 1);
//! # Ok::<(), kestrel_core::pipeline::PipelineError>(())
//! ```

use crate::ast::Stmt;
use crate::bytecode::{BytecodeCompiler, CompileError, Instruction, listing};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::lexer::Lexer;
use crate::parser::{Parser, SyntaxError};
use crate::source::{self, SourceError};
use crate::stages::{Compile, Interpret, Lex, Parse};
use crate::trace::{StdoutSink, TraceSink, Tracer};
use crate::vm::{ExecutionState, Interpreter, RuntimeError};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// The stages that can fail. Lexing is total and has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Parse,
    Compile,
    Interpret,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Compile => "compile",
            Stage::Interpret => "interpret",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage failure, tagged by the stage that produced it
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Syntax(_) => Stage::Parse,
            PipelineError::Compile(_) => Stage::Compile,
            PipelineError::Runtime(_) => Stage::Interpret,
        }
    }

    pub fn to_diagnostic(&self, filename: &str) -> Diagnostic {
        match self {
            PipelineError::Syntax(e) => {
                Diagnostic::error(DiagnosticKind::Syntax, e.message.clone(), e.span, filename)
            }
            PipelineError::Compile(e) => {
                Diagnostic::error(DiagnosticKind::Compile, e.message.clone(), e.span, filename)
            }
            PipelineError::Runtime(e) => {
                let diag =
                    Diagnostic::error(DiagnosticKind::Runtime, e.message.clone(), None, filename);
                match e.instruction {
                    Some(ip) => diag.with_note(format!("at instruction {ip}")),
                    None => diag,
                }
            }
        }
    }

    /// Format error with source code context
    pub fn format_with_source(&self, source: &str, filename: &str) -> String {
        self.to_diagnostic(filename).format(source)
    }

    /// One-line description for the trace, with line and column when known
    fn describe(&self, source: &str) -> String {
        let span = match self {
            PipelineError::Syntax(e) => e.span,
            PipelineError::Compile(e) => e.span,
            PipelineError::Runtime(_) => None,
        };
        match span {
            Some(span) => {
                let loc = span.location(source);
                format!("{self} (line {}, column {})", loc.line, loc.col)
            }
            None => self.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of the file-based entry point
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// What [`Pipeline::run`] does with a stage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Trace the error when verbose, then report success to the caller
    #[default]
    Absorb,
    /// Trace the error when verbose, then return it
    Propagate,
}

/// Per-call configuration of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunConfig {
    pub verbose_diagnostics: bool,
    pub failure_policy: FailurePolicy,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose_diagnostics = verbose;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

/// Sequences lexer, parser, compiler and interpreter
pub struct Pipeline<L = Lexer, P = Parser, C = BytecodeCompiler, I = Interpreter> {
    lexer: L,
    parser: P,
    compiler: C,
    interpreter: I,
}

impl Pipeline {
    /// Reference stages, program output on stdout
    pub fn new() -> Self {
        Pipeline::with_stages(Lexer, Parser, BytecodeCompiler, Interpreter::new())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Pipeline<Lexer, Parser, BytecodeCompiler, Interpreter<W>> {
    /// Reference stages, program output written to `out`
    pub fn with_output(out: W) -> Self {
        let interpreter = Interpreter::with_output(out);
        Pipeline::with_stages(Lexer, Parser, BytecodeCompiler, interpreter)
    }
}

impl<L, P, C, I> Pipeline<L, P, C, I>
where
    L: Lex,
    P: Parse,
    C: Compile,
    I: Interpret,
{
    pub fn with_stages(lexer: L, parser: P, compiler: C, interpreter: I) -> Self {
        Pipeline {
            lexer,
            parser,
            compiler,
            interpreter,
        }
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn into_interpreter(self) -> I {
        self.interpreter
    }

    /// Lex and parse without running anything
    pub fn parse(&self, source: &str) -> PipelineResult<Vec<Stmt>> {
        let tokens = self.lexer.tokenize(source);
        Ok(self.parser.parse(&tokens)?)
    }

    /// Lex, parse and compile without running anything
    pub fn compile(&self, source: &str) -> PipelineResult<Vec<Instruction>> {
        let ast = self.parse(source)?;
        Ok(self.compiler.compile(&ast)?)
    }

    /// Run source text, tracing to stdout when verbose
    pub fn run(&mut self, source: &str, config: &RunConfig) -> PipelineResult<()> {
        self.run_traced(source, config, &mut StdoutSink)
    }

    /// Run source text, tracing to `sink` when verbose
    pub fn run_traced(
        &mut self,
        source: &str,
        config: &RunConfig,
        sink: &mut dyn TraceSink,
    ) -> PipelineResult<()> {
        let mut tracer = Tracer::new(config.verbose_diagnostics, sink);
        match self.execute(source, &mut tracer) {
            Ok(_) => Ok(()),
            Err(e) => match config.failure_policy {
                FailurePolicy::Absorb => Ok(()),
                FailurePolicy::Propagate => Err(e),
            },
        }
    }

    /// Load a file and run it. Load failures always reach the caller.
    pub fn run_file(&mut self, path: impl AsRef<Path>, config: &RunConfig) -> Result<(), RunError> {
        self.run_file_traced(path, config, &mut StdoutSink)
    }

    pub fn run_file_traced(
        &mut self,
        path: impl AsRef<Path>,
        config: &RunConfig,
        sink: &mut dyn TraceSink,
    ) -> Result<(), RunError> {
        let source = source::load(path)?;
        self.run_traced(&source, config, sink)?;
        Ok(())
    }

    /// Run every stage and return the final execution state.
    ///
    /// The first failing stage ends the run; its error is traced (when the
    /// tracer is enabled) and returned. Total run time is traced either way.
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
    pub fn execute(
        &mut self,
        source: &str,
        tracer: &mut Tracer<'_>,
    ) -> PipelineResult<ExecutionState> {
        let started = tracer.is_enabled().then(Instant::now);

        if tracer.is_enabled() {
            tracer.banner("Source code");
            tracer.lines(source.split('\n'));
        }

        let result = self.run_stages(source, tracer);

        if let Err(e) = &result {
            warn!(stage = %e.stage(), error = %e, "pipeline stopped");
            if tracer.is_enabled() {
                tracer.line(&e.describe(source));
            }
        }

        if let Some(started) = started {
            tracer.elapsed(started.elapsed());
        }

        result
    }

    fn run_stages(
        &mut self,
        source: &str,
        tracer: &mut Tracer<'_>,
    ) -> PipelineResult<ExecutionState> {
        // Lex
        if tracer.is_enabled() {
            tracer.banner("Start lexer");
        }
        let tokens = self.lexer.tokenize(source);
        debug!(tokens = tokens.len(), "lexed");
        if tracer.is_enabled() {
            tracer.line(&format!("Number of tokens: {}", tokens.len()));
            tracer.lines(&tokens);
        }

        // Parse
        if tracer.is_enabled() {
            tracer.banner("Start parser");
        }
        let ast = self.parser.parse(&tokens)?;
        debug!(nodes = ast.len(), "parsed");
        if tracer.is_enabled() {
            tracer.line("Parsed AST:");
            tracer.lines(&ast);
        }

        // Compile
        if tracer.is_enabled() {
            tracer.banner("Start bytecode compiler");
        }
        let code = self.compiler.compile(&ast)?;
        debug!(instructions = code.len(), "compiled");
        if tracer.is_enabled() {
            tracer.lines(listing(&code));
        }

        // Interpret
        if tracer.is_enabled() {
            tracer.banner("Start bytecode interpreter");
        }
        let execution = self.interpreter.interpret(&code);
        execution.outcome?;
        debug!(
            stack = execution.state.stack.len(),
            registers = execution.state.registers.len(),
            "interpreted"
        );
        if tracer.is_enabled() {
            tracer.line("Stack at end of execution:");
            tracer.line(&execution.state.render_stack());
            tracer.line("Registers at end of execution:");
            tracer.line(&execution.state.render_registers());
        }

        Ok(execution.state)
    }
}
