pub mod compile;
mod errors;
pub mod ir;

pub use compile::BytecodeCompiler;
pub use errors::CompileError;
pub use ir::{Instruction, Register, listing};
