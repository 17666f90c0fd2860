// Common test utilities, fixture loading and stub stages
#![allow(dead_code)]

use kestrel_core::ast::Stmt;
use kestrel_core::bytecode::{BytecodeCompiler, CompileError, Instruction};
use kestrel_core::lexer::{Lexer, Token};
use kestrel_core::parser::{Parser, SyntaxError};
use kestrel_core::pipeline::{FailurePolicy, Pipeline, PipelineError, RunConfig};
use kestrel_core::stages::{Compile, Interpret, Parse};
use kestrel_core::trace::{MemorySink, Tracer};
use kestrel_core::vm::{Execution, ExecutionState, Interpreter};
use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

pub type BufferedPipeline = Pipeline<Lexer, Parser, BytecodeCompiler, Interpreter<Vec<u8>>>;

/// Path of a test fixture file by name
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.kes", name))
}

/// Load a test fixture file by name
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// Everything observable about one run
pub struct Outcome {
    pub result: Result<ExecutionState, PipelineError>,
    pub output: String,
    pub trace: Vec<String>,
}

/// Run source through the reference stages, capturing program output and trace
pub fn run_captured(source: &str, verbose: bool) -> Outcome {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let mut sink = MemorySink::new();
    let mut tracer = Tracer::new(verbose, &mut sink);
    let result = pipeline.execute(source, &mut tracer);
    Outcome {
        result,
        output: output_of(pipeline),
        trace: sink.into_lines(),
    }
}

pub fn output_of(pipeline: BufferedPipeline) -> String {
    String::from_utf8(pipeline.into_interpreter().into_output()).expect("output is not UTF-8")
}

/// Assert that a program runs successfully and prints `expected`
pub fn assert_program_output(source: &str, expected: &str) {
    let outcome = run_captured(source, false);
    if let Err(e) = &outcome.result {
        panic!("Program failed: {e}\nSource:\n{source}");
    }
    assert_eq!(outcome.output, expected, "Source:\n{source}");
}

/// Assert that a program fails and return the error
pub fn assert_program_fails(source: &str) -> PipelineError {
    match run_captured(source, false).result {
        Ok(state) => panic!("Expected failure, final stack {}", state.render_stack()),
        Err(e) => e,
    }
}

pub fn propagate() -> RunConfig {
    RunConfig::new().failure_policy(FailurePolicy::Propagate)
}

/// Shared invocation counter for stub stages
#[derive(Debug, Clone, Default)]
pub struct Calls(Rc<Cell<usize>>);

impl Calls {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Parser that always rejects its input
pub struct RejectingParser {
    pub calls: Calls,
}

impl Parse for RejectingParser {
    fn parse(&self, _tokens: &[Token]) -> Result<Vec<Stmt>, SyntaxError> {
        self.calls.bump();
        Err(SyntaxError::new("rejected by stub", None))
    }
}

/// Compiler that returns a canned instruction sequence
pub struct CannedCompiler {
    pub calls: Calls,
    pub code: Vec<Instruction>,
}

impl Compile for CannedCompiler {
    fn compile(&self, _program: &[Stmt]) -> Result<Vec<Instruction>, CompileError> {
        self.calls.bump();
        Ok(self.code.clone())
    }
}

/// Compiler that always fails
pub struct RejectingCompiler {
    pub calls: Calls,
}

impl Compile for RejectingCompiler {
    fn compile(&self, _program: &[Stmt]) -> Result<Vec<Instruction>, CompileError> {
        self.calls.bump();
        Err(CompileError::new("rejected by stub", None))
    }
}

/// Interpreter that records the code it was handed and returns a fixed state
pub struct RecordingInterpreter {
    pub calls: Calls,
    pub seen: Vec<Vec<Instruction>>,
    pub state: ExecutionState,
}

impl RecordingInterpreter {
    pub fn new(calls: Calls) -> Self {
        RecordingInterpreter {
            calls,
            seen: Vec::new(),
            state: ExecutionState::new(),
        }
    }
}

impl Interpret for RecordingInterpreter {
    fn interpret(&mut self, code: &[Instruction]) -> Execution {
        self.calls.bump();
        self.seen.push(code.to_vec());
        Execution {
            state: self.state.clone(),
            outcome: Ok(()),
        }
    }
}
