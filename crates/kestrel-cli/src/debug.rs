//! Debug subcommands: `ast` and `bytecode`

use crate::utils::{fail, read_source_or_exit};
use kestrel_core::bytecode::listing;
use kestrel_core::pipeline::Pipeline;
use std::process;

/// Print the parsed AST for debugging
pub fn handle_ast(file: &str, json: bool) {
    let source = read_source_or_exit(file);

    let ast = match Pipeline::new().parse(&source) {
        Ok(ast) => ast,
        Err(e) => fail(&e, &source, file),
    };

    if !json {
        println!("{ast:#?}");
        return;
    }
    match serde_json::to_string_pretty(&ast) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => {
            eprintln!("Error serializing AST: {e}");
            process::exit(1);
        }
    }
}

/// Print the compiled bytecode listing for debugging
pub fn handle_bytecode(file: &str) {
    let source = read_source_or_exit(file);

    let code = match Pipeline::new().compile(&source) {
        Ok(code) => code,
        Err(e) => fail(&e, &source, file),
    };

    for line in listing(&code) {
        println!("{line}");
    }
}
