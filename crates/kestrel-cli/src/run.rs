//! `run` subcommand handler

use crate::utils::{fail, read_source_or_exit};
use kestrel_core::pipeline::{FailurePolicy, Pipeline, RunConfig};

/// Execute a Kestrel script, optionally tracing every stage
pub fn handle_run(file: &str, verbose: bool) {
    let source = read_source_or_exit(file);
    let config = RunConfig::new()
        .verbose(verbose)
        .failure_policy(FailurePolicy::Propagate);

    let mut pipeline = Pipeline::new();
    if let Err(e) = pipeline.run(&source, &config) {
        fail(&e, &source, file);
    }
}
