//! Orchestration tests: sequencing, short-circuiting, failure policy and tracing

mod common;

use common::{
    Calls, CannedCompiler, RecordingInterpreter, RejectingCompiler, RejectingParser, fixture_path,
    load_fixture, output_of, propagate, run_captured,
};
use kestrel_core::bytecode::Instruction;
use kestrel_core::lexer::Lexer;
use kestrel_core::parser::Parser;
use kestrel_core::pipeline::{Pipeline, PipelineError, RunConfig, RunError, Stage};
use kestrel_core::trace::{DELIMITER, MemorySink, Tracer};
use kestrel_core::vm::Value;

const BANNERS: [&str; 5] = [
    "Source code",
    "Start lexer",
    "Start parser",
    "Start bytecode compiler",
    "Start bytecode interpreter",
];

fn banners_in(trace: &[String]) -> Vec<&str> {
    trace
        .iter()
        .map(String::as_str)
        .filter(|line| BANNERS.contains(line))
        .collect()
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_bare_literal_runs_silently() {
    let outcome = run_captured("42", false);
    let state = outcome.result.expect("run failed");
    assert_eq!(state.stack, vec![Value::Number(42.0)]);
    assert!(state.registers.is_empty());
    assert!(outcome.trace.is_empty());
    assert_eq!(outcome.output, "");
}

#[test]
fn test_bare_literal_through_run_reports_success() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let mut sink = MemorySink::new();
    let result = pipeline.run_traced(&load_fixture("answer"), &RunConfig::new(), &mut sink);
    assert!(result.is_ok());
    assert!(sink.is_empty());
}

#[test]
fn test_syntax_error_stops_before_compiler() {
    let outcome = run_captured("(1 + 2", true);
    let err = outcome.result.unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);

    let trace = &outcome.trace;
    assert_eq!(
        &trace[..15],
        &[
            DELIMITER,
            "Source code",
            DELIMITER,
            "",
            "(1 + 2",
            "",
            DELIMITER,
            "Start lexer",
            DELIMITER,
            "",
            "Number of tokens: 4",
            "'(' at 0..1",
            "number 1 at 1..2",
            "'+' at 3..4",
            "number 2 at 5..6",
        ]
    );
    assert_eq!(banners_in(trace), BANNERS[..3].to_vec());
    let described = "syntax error: expected ')', found end of input (line 1, column 7)";
    assert!(trace.iter().any(|l| l == described));
    for absent in [
        "Parsed AST:",
        "Stack at end of execution:",
        "Registers at end of execution:",
    ] {
        assert!(!trace.iter().any(|l| l == absent), "unexpected {absent:?}");
    }
    let last = trace.last().unwrap();
    assert!(last.starts_with("Total execution time: "));
    assert!(last.ends_with("ms"));
    assert_eq!(trace[trace.len() - 2], "");
}

#[test]
fn test_syntax_error_absorbed_by_default() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let mut sink = MemorySink::new();
    let config = RunConfig::new().verbose(true);
    let result = pipeline.run_traced(&load_fixture("unbalanced"), &config, &mut sink);
    assert!(result.is_ok());
    assert!(sink.contains("Start parser"));
    assert!(!sink.contains("Parsed AST:"));
}

#[test]
fn test_missing_file_fails_before_any_stage() {
    let parser_calls = Calls::default();
    let mut pipeline = Pipeline::with_stages(
        Lexer,
        RejectingParser {
            calls: parser_calls.clone(),
        },
        RejectingCompiler {
            calls: Calls::default(),
        },
        RecordingInterpreter::new(Calls::default()),
    );
    let mut sink = MemorySink::new();
    let config = RunConfig::new().verbose(true);
    let path = std::env::temp_dir().join("kestrel_definitely_missing.kes");

    let result = pipeline.run_file_traced(&path, &config, &mut sink);
    match result {
        Err(RunError::Source(e)) => {
            assert_eq!(e.path, path);
            assert_eq!(e.source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected a source error, got {other:?}"),
    }
    assert_eq!(parser_calls.get(), 0);
    assert!(sink.is_empty());
}

#[test]
fn test_run_file_executes_fixture() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    pipeline
        .run_file(fixture_path("countdown"), &propagate())
        .expect("run failed");
    assert_eq!(output_of(pipeline), "5\n4\n3\n2\n1\ntrue\n");
}

#[test]
fn test_run_file_propagates_stage_error() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let err = pipeline
        .run_file(fixture_path("unbalanced"), &propagate())
        .unwrap_err();
    assert!(matches!(err, RunError::Pipeline(PipelineError::Syntax(_))));
}

// ============================================================================
// Short-circuiting with substituted stages
// ============================================================================

#[test]
fn test_parse_failure_skips_compile_and_interpret() {
    let parser_calls = Calls::default();
    let compiler_calls = Calls::default();
    let interpreter_calls = Calls::default();
    let mut pipeline = Pipeline::with_stages(
        Lexer,
        RejectingParser {
            calls: parser_calls.clone(),
        },
        CannedCompiler {
            calls: compiler_calls.clone(),
            code: vec![Instruction::Halt],
        },
        RecordingInterpreter::new(interpreter_calls.clone()),
    );

    let mut sink = MemorySink::new();
    let mut tracer = Tracer::new(true, &mut sink);
    let err = pipeline.execute("print(1)", &mut tracer).unwrap_err();

    assert_eq!(err.stage(), Stage::Parse);
    assert_eq!(parser_calls.get(), 1);
    assert_eq!(compiler_calls.get(), 0);
    assert_eq!(interpreter_calls.get(), 0);
    assert_eq!(
        banners_in(sink.lines()),
        vec!["Source code", "Start lexer", "Start parser"]
    );
    assert!(sink.contains("syntax error: rejected by stub"));
}

#[test]
fn test_compile_failure_skips_interpret() {
    let interpreter_calls = Calls::default();
    let mut pipeline = Pipeline::with_stages(
        Lexer,
        Parser,
        RejectingCompiler {
            calls: Calls::default(),
        },
        RecordingInterpreter::new(interpreter_calls.clone()),
    );

    let result = pipeline.run_traced("1 + 1", &propagate(), &mut MemorySink::new());
    assert!(matches!(result, Err(PipelineError::Compile(_))));
    assert_eq!(interpreter_calls.get(), 0);
}

#[test]
fn test_interpreter_receives_compiler_output_unchanged() {
    let code = vec![
        Instruction::Push(Value::Bool(true)),
        Instruction::Print,
        Instruction::Halt,
    ];
    let mut pipeline = Pipeline::with_stages(
        Lexer,
        Parser,
        CannedCompiler {
            calls: Calls::default(),
            code: code.clone(),
        },
        RecordingInterpreter::new(Calls::default()),
    );

    pipeline
        .execute("anything_at_all = 1", &mut Tracer::disabled())
        .expect("run failed");
    assert_eq!(pipeline.interpreter().seen, vec![code]);
}

// ============================================================================
// Tracing
// ============================================================================

#[test]
fn test_tracing_does_not_change_program_output() {
    for name in ["countdown", "multiples", "collatz"] {
        let source = load_fixture(name);
        let quiet = run_captured(&source, false);
        let verbose = run_captured(&source, true);
        assert_eq!(quiet.output, verbose.output, "fixture {name}");
        assert_eq!(
            quiet.result.expect("quiet run failed"),
            verbose.result.expect("verbose run failed"),
            "fixture {name}"
        );
        assert!(quiet.trace.is_empty());
        assert!(!verbose.trace.is_empty());
    }
}

#[test]
fn test_successful_trace_sections_in_order() {
    let outcome = run_captured("x = 6 * 7\nprint(x)", true);
    outcome.result.expect("run failed");
    let trace = &outcome.trace;

    assert_eq!(banners_in(trace), BANNERS.to_vec());
    assert!(trace.iter().any(|l| l == "Number of tokens: 10"));

    let ast = trace.iter().position(|l| l == "Parsed AST:").unwrap();
    assert_eq!(trace[ast + 1], "Assignment(x = (6 * 7))");
    assert_eq!(trace[ast + 2], "Print(x)");

    let stack = trace
        .iter()
        .position(|l| l == "Stack at end of execution:")
        .unwrap();
    assert_eq!(
        &trace[stack..stack + 4],
        &[
            "Stack at end of execution:",
            "[]",
            "Registers at end of execution:",
            "{r0: 42}",
        ]
    );
    assert!(trace[trace.len() - 1].starts_with("Total execution time: "));
}

#[test]
fn test_runtime_failure_traced_after_interpreter_banner() {
    let outcome = run_captured("print(1)\nprint(true + 1)", true);
    assert_eq!(outcome.result.unwrap_err().stage(), Stage::Interpret);
    assert_eq!(outcome.output, "1\n");
    assert_eq!(banners_in(&outcome.trace), BANNERS.to_vec());
    assert!(
        outcome
            .trace
            .iter()
            .any(|l| l.contains("cannot apply '+' to boolean and number"))
    );
    let stack_line = "Stack at end of execution:";
    assert!(!outcome.trace.iter().any(|l| l == stack_line));
}

#[test]
fn test_verbosity_is_per_call() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let mut loud = MemorySink::new();
    let mut quiet = MemorySink::new();

    pipeline
        .run_traced("print(1)", &RunConfig::new().verbose(true), &mut loud)
        .unwrap();
    pipeline
        .run_traced("print(2)", &RunConfig::new(), &mut quiet)
        .unwrap();

    assert!(!loud.is_empty());
    assert!(quiet.is_empty());
    assert_eq!(output_of(pipeline), "1\n2\n");
}

#[test]
fn test_each_run_starts_from_fresh_state() {
    let mut pipeline = Pipeline::with_output(Vec::new());
    let first = pipeline.execute("a = 1\na", &mut Tracer::disabled()).unwrap();
    let second = pipeline.execute("2", &mut Tracer::disabled()).unwrap();
    assert_eq!(first.stack, vec![Value::Number(1.0)]);
    assert_eq!(second.stack, vec![Value::Number(2.0)]);
    assert!(second.registers.is_empty());
}
