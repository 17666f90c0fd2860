//! Loading program text
//!
//! Sources are read whole and decoded as UTF-8 before lexing starts; there is
//! no streaming or partial read.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Path that stands for standard input
pub const STDIN_PATH: &str = "-";

/// The source could not be loaded: missing, unreadable or not UTF-8
#[derive(Debug, Error)]
#[error("failed to read '{}': {source}", .path.display())]
pub struct SourceError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Read a whole file as UTF-8 text
pub fn load(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|source| SourceError {
        path: path.to_path_buf(),
        source,
    })
}

/// Name recorded in errors for standard input
const STDIN_NAME: &str = "<stdin>";

/// Read everything from `reader` as UTF-8 text; `name` labels errors
pub fn load_reader(mut reader: impl Read, name: &str) -> Result<String, SourceError> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|source| SourceError {
            path: PathBuf::from(name),
            source,
        })?;
    Ok(source)
}

/// Read all of standard input as UTF-8 text
pub fn load_stdin() -> Result<String, SourceError> {
    load_reader(io::stdin().lock(), STDIN_NAME)
}

/// Read source code from a file, or from stdin when `file` is "-"
pub fn read_source(file: &str) -> Result<String, SourceError> {
    read_source_with(file, io::stdin().lock())
}

/// [`read_source`] with an explicit reader standing in for stdin
pub fn read_source_with(file: &str, stdin: impl Read) -> Result<String, SourceError> {
    if file == STDIN_PATH {
        load_reader(stdin, STDIN_NAME)
    } else {
        load(file)
    }
}
