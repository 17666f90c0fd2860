use super::errors::RuntimeError;
use super::state::ExecutionState;
use crate::bytecode::Instruction;
use std::io::{self, Write};

/// Executed-instruction budget for one run before it is aborted.
pub const MAX_STEPS: usize = 10_000_000;

/// Result of one interpretation run
///
/// The state is returned whether or not execution succeeded so that callers
/// can inspect the stack and registers at the point of failure.
#[derive(Debug)]
pub struct Execution {
    pub state: ExecutionState,
    pub outcome: Result<(), RuntimeError>,
}

/// The reference interpreter stage.
///
/// `print` output goes to `W`; each call to [`Interpreter::interpret`] starts
/// from an empty [`ExecutionState`].
pub struct Interpreter<W: Write = io::Stdout> {
    out: W,
    max_steps: usize,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    pub fn with_output(out: W) -> Self {
        Interpreter {
            out,
            max_steps: MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn interpret(&mut self, code: &[Instruction]) -> Execution {
        let mut machine = Machine {
            code,
            ip: 0,
            steps: 0,
            max_steps: self.max_steps,
            state: ExecutionState::new(),
            out: &mut self.out,
        };
        let outcome = machine.execute();
        let state = machine.state;
        let flushed = self
            .out
            .flush()
            .map_err(|e| RuntimeError::runtime(format!("failed to flush output: {e}")));
        Execution {
            state,
            outcome: outcome.and(flushed),
        }
    }
}

/// One run of the dispatch loop over borrowed bytecode
pub(super) struct Machine<'a, W: Write + ?Sized> {
    pub(super) code: &'a [Instruction],
    pub(super) ip: usize,
    pub(super) steps: usize,
    pub(super) max_steps: usize,
    pub(super) state: ExecutionState,
    pub(super) out: &'a mut W,
}
