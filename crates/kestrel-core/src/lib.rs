pub mod ast;
pub mod bytecode;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod stages;
pub mod trace;
pub mod vm;

// Re-export commonly used types for convenience
pub use ast::{Expr, Span, Stmt};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use pipeline::{FailurePolicy, Pipeline, PipelineError, RunConfig, RunError, Stage};
pub use stages::{Compile, Interpret, Lex, Parse};
pub use trace::{MemorySink, StdoutSink, TraceSink, Tracer};
