use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod check;
mod compile;
mod debug;
mod run;
mod utils;

#[cfg(test)]
mod tests;

use check::handle_check;
use compile::handle_compile;
use debug::{handle_ast, handle_bytecode};
use run::handle_run;

/// Get the version string including git revision
fn version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (git:", env!("GIT_HASH"), ")")
}

#[derive(Parser)]
#[command(
    author,
    version = version(),
    about = "Kestrel programming language",
    long_about = None,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// The file to run (default if no subcommand), or "-" for stdin
    file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a Kestrel script
    Run {
        /// The file to execute
        file: String,
        /// Trace every pipeline stage to stdout
        #[arg(short, long)]
        verbose: bool,
    },
    /// Lex, parse and compile a script without executing it
    Check {
        /// The file to check
        file: String,
    },
    /// Compile a Kestrel script to a .kbc bytecode file
    Compile {
        /// The file to compile
        file: String,
        /// Output file (defaults to input.kbc)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the parsed AST (debug)
    #[command(hide = true)]
    Ast {
        /// The file to parse
        file: String,
        /// Emit JSON instead of the debug representation
        #[arg(long)]
        json: bool,
    },
    /// Print the compiled bytecode (debug)
    #[command(hide = true)]
    Bytecode {
        /// The file to compile
        file: String,
    },
}

/// Structured logs go to stderr, filtered by RUST_LOG
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run { file, verbose }) => {
            handle_run(file, *verbose);
        }
        Some(Commands::Check { file }) => {
            handle_check(file);
        }
        Some(Commands::Compile { file, output }) => {
            handle_compile(file, output.as_deref());
        }
        Some(Commands::Ast { file, json }) => {
            handle_ast(file, *json);
        }
        Some(Commands::Bytecode { file }) => {
            handle_bytecode(file);
        }
        None => {
            // Default: run the file if provided, otherwise print help
            let Some(file) = &cli.file else {
                let _ = Cli::command().print_help();
                println!();
                std::process::exit(0);
            };
            handle_run(file, false);
        }
    }
}
