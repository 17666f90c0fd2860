//! `check` subcommand handler

use crate::utils::{fail, read_source_or_exit};
use kestrel_core::pipeline::Pipeline;

/// Lex, parse and compile a script without executing it
pub fn handle_check(file: &str) {
    let source = read_source_or_exit(file);

    match Pipeline::new().compile(&source) {
        Ok(_) => println!("Check: OK"),
        Err(e) => fail(&e, &source, file),
    }
}
