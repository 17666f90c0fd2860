use crate::vm::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into the interpreter's register file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Register(pub u16);

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Push a literal
    Push(Value),
    /// Discard the top of the stack
    Pop,
    /// Push a register value
    Load(Register),
    /// Pop into a register
    Store(Register),
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Neg,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    /// Absolute instruction index
    Jump(usize),
    /// Pops a boolean
    JumpIfFalse(usize),
    /// Pops and writes a line to program output
    Print,
    Halt,
}

impl Instruction {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instruction::Push(_) => "push",
            Instruction::Pop => "pop",
            Instruction::Load(_) => "load",
            Instruction::Store(_) => "store",
            Instruction::Add => "add",
            Instruction::Sub => "sub",
            Instruction::Mul => "mul",
            Instruction::Div => "div",
            Instruction::Mod => "mod",
            Instruction::Pow => "pow",
            Instruction::Neg => "neg",
            Instruction::Eq => "eq",
            Instruction::Ne => "ne",
            Instruction::Lt => "lt",
            Instruction::Le => "le",
            Instruction::Gt => "gt",
            Instruction::Ge => "ge",
            Instruction::And => "and",
            Instruction::Or => "or",
            Instruction::Not => "not",
            Instruction::Jump(_) => "jump",
            Instruction::JumpIfFalse(_) => "jump_if_false",
            Instruction::Print => "print",
            Instruction::Halt => "halt",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(value) => write!(f, "{} {value}", self.mnemonic()),
            Instruction::Load(reg) | Instruction::Store(reg) => {
                write!(f, "{} {reg}", self.mnemonic())
            }
            Instruction::Jump(target) | Instruction::JumpIfFalse(target) => {
                write!(f, "{} {target}", self.mnemonic())
            }
            other => write!(f, "{}", other.mnemonic()),
        }
    }
}

/// Render a program one instruction per line, prefixed with its index
pub fn listing(code: &[Instruction]) -> impl Iterator<Item = String> + '_ {
    let width = code.len().saturating_sub(1).to_string().len();
    code.iter()
        .enumerate()
        .map(move |(i, instr)| format!("{i:>width$}: {instr}"))
}
