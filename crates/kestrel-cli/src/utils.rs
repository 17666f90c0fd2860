//! Shared CLI utilities for reading input and reporting errors

use kestrel_core::pipeline::PipelineError;
use kestrel_core::source::{self, STDIN_PATH};
use std::process;

/// Read source code from a file or stdin, exiting with status 1 on failure
pub fn read_source_or_exit(file: &str) -> String {
    match source::read_source(file) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

/// Name shown in diagnostics for `file`
pub fn display_name(file: &str) -> &str {
    if file == STDIN_PATH { "<stdin>" } else { file }
}

/// Print a stage error with a source snippet to stderr
pub fn report(err: &PipelineError, source: &str, file: &str) {
    tracing::debug!(stage = %err.stage(), "reporting failure");
    eprint!("{}", err.format_with_source(source, display_name(file)));
}

/// Report a stage error and exit with status 1
pub fn fail(err: &PipelineError, source: &str, file: &str) -> ! {
    report(err, source, file);
    process::exit(1);
}
