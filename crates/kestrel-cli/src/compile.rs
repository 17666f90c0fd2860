//! `compile` subcommand handler

use crate::utils::{fail, read_source_or_exit};
use kestrel_core::bytecode::Instruction;
use kestrel_core::pipeline::Pipeline;
use kestrel_core::source::STDIN_PATH;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// Extension of serialized bytecode files
pub const BYTECODE_EXTENSION: &str = "kbc";

/// Where compiled output goes: `output` if given, else `file` with a .kbc extension.
/// Stdin input has no name to derive from, so it needs an explicit output.
pub fn output_path(file: &str, output: Option<&str>) -> Option<PathBuf> {
    match output {
        Some(o) => Some(PathBuf::from(o)),
        None if file == STDIN_PATH => None,
        None => Some(Path::new(file).with_extension(BYTECODE_EXTENSION)),
    }
}

/// Serialize bytecode as pretty-printed RON
pub fn serialize(code: &[Instruction]) -> Result<String, ron::Error> {
    ron::ser::to_string_pretty(code, ron::ser::PrettyConfig::default())
}

/// Compile a Kestrel script to bytecode
pub fn handle_compile(file: &str, output: Option<&str>) {
    let source = read_source_or_exit(file);

    let code = match Pipeline::new().compile(&source) {
        Ok(code) => code,
        Err(e) => fail(&e, &source, file),
    };

    let Some(output_file) = output_path(file, output) else {
        eprintln!("Error: Cannot compile from stdin without --output flag");
        process::exit(1);
    };

    let serialized = match serialize(&code) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error serializing bytecode: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&output_file, serialized) {
        eprintln!("Error writing to '{}': {e}", output_file.display());
        process::exit(1);
    }

    tracing::debug!(instructions = code.len(), "bytecode written");
    println!("Compiled '{file}' to '{}'", output_file.display());
}
