mod errors;
mod execute;
mod interpreter;
mod state;

pub mod operators;
pub mod value;

pub use errors::RuntimeError;
pub use interpreter::{Execution, Interpreter, MAX_STEPS};
pub use state::ExecutionState;
pub use value::Value;
