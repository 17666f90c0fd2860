//! Bytecode compiler for Kestrel.
//!
//! Lowers the statement list into a single linear instruction sequence for a
//! stack machine with a register file:
//!
//! - Variables live in registers, allocated in order of first assignment.
//!   Reading a variable before any assignment to it has been compiled is a
//!   compile error.
//! - Top-level expression statements leave their value on the operand stack;
//!   expression statements inside blocks are popped.
//! - Loops record `break` jumps for back-patching once the loop end is known.
//!
//! The program always ends with `halt`.

use super::CompileError;
use super::ir::{Instruction, Register};
use crate::ast::{AssignOp, BinaryOp, Expr, Span, Stmt, UnaryOp};
use crate::vm::value::Value;
use std::collections::HashMap;

/// The reference compiler stage
#[derive(Debug, Default, Clone, Copy)]
pub struct BytecodeCompiler;

impl BytecodeCompiler {
    pub fn new() -> Self {
        BytecodeCompiler
    }

    pub fn compile(&self, program: &[Stmt]) -> Result<Vec<Instruction>, CompileError> {
        compile_program(program)
    }
}

pub fn compile_program(program: &[Stmt]) -> Result<Vec<Instruction>, CompileError> {
    let mut c = Compiler::default();
    for stmt in program {
        c.emit_stmt(stmt)?;
    }
    c.code.push(Instruction::Halt);
    Ok(c.code)
}

struct LoopContext {
    start: usize,
    break_patches: Vec<usize>,
}

#[derive(Default)]
struct Compiler {
    code: Vec<Instruction>,
    registers: HashMap<String, Register>,
    loops: Vec<LoopContext>,
    /// Block nesting; zero at top level
    depth: usize,
}

impl Compiler {
    fn emit(&mut self, instr: Instruction) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    fn patch_jump(&mut self, at: usize, target: usize) {
        match &mut self.code[at] {
            Instruction::Jump(t) | Instruction::JumpIfFalse(t) => *t = target,
            other => unreachable!("patching non-jump instruction {other}"),
        }
    }

    fn lookup(&self, name: &str, span: Span) -> Result<Register, CompileError> {
        self.registers
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::new(format!("undefined variable '{name}'"), Some(span)))
    }

    fn register_for(&mut self, name: &str, span: Span) -> Result<Register, CompileError> {
        if let Some(reg) = self.registers.get(name) {
            return Ok(*reg);
        }
        let index = u16::try_from(self.registers.len()).map_err(|_| {
            CompileError::new(
                format!("too many variables; cannot allocate a register for '{name}'"),
                Some(span),
            )
        })?;
        let reg = Register(index);
        self.registers.insert(name.to_string(), reg);
        Ok(reg)
    }

    fn emit_block(&mut self, block: &[Stmt]) -> Result<(), CompileError> {
        self.depth += 1;
        let result = block.iter().try_for_each(|stmt| self.emit_stmt(stmt));
        self.depth -= 1;
        result
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expression { expr, .. } => {
                self.emit_expr(expr)?;
                if self.depth > 0 {
                    self.emit(Instruction::Pop);
                }
            }
            Stmt::Assignment {
                name,
                op,
                value,
                span,
            } => self.emit_assignment(name, *op, value, *span)?,
            Stmt::Print { value, .. } => {
                self.emit_expr(value)?;
                self.emit(Instruction::Print);
            }
            Stmt::If {
                condition,
                then_block,
                else_block,
                ..
            } => {
                self.emit_expr(condition)?;
                let jump_to_else = self.emit(Instruction::JumpIfFalse(0));
                self.emit_block(then_block)?;
                match else_block {
                    Some(else_block) => {
                        let jump_to_end = self.emit(Instruction::Jump(0));
                        let else_start = self.code.len();
                        self.patch_jump(jump_to_else, else_start);
                        self.emit_block(else_block)?;
                        let end = self.code.len();
                        self.patch_jump(jump_to_end, end);
                    }
                    None => {
                        let end = self.code.len();
                        self.patch_jump(jump_to_else, end);
                    }
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                let start = self.code.len();
                self.emit_expr(condition)?;
                let exit_jump = self.emit(Instruction::JumpIfFalse(0));
                self.loops.push(LoopContext {
                    start,
                    break_patches: Vec::new(),
                });
                let body_result = self.emit_block(body);
                let ctx = self.loops.pop();
                body_result?;
                self.emit(Instruction::Jump(start));
                let end = self.code.len();
                self.patch_jump(exit_jump, end);
                if let Some(ctx) = ctx {
                    for at in ctx.break_patches {
                        self.patch_jump(at, end);
                    }
                }
            }
            Stmt::Break { span } => {
                let at = self.emit(Instruction::Jump(0));
                match self.loops.last_mut() {
                    Some(ctx) => ctx.break_patches.push(at),
                    None => {
                        return Err(CompileError::new("'break' outside of a loop", Some(*span)));
                    }
                }
            }
            Stmt::Continue { span } => match self.loops.last() {
                Some(ctx) => {
                    let start = ctx.start;
                    self.emit(Instruction::Jump(start));
                }
                None => {
                    return Err(CompileError::new("'continue' outside of a loop", Some(*span)));
                }
            },
        }
        Ok(())
    }

    fn emit_assignment(
        &mut self,
        name: &str,
        op: AssignOp,
        value: &Expr,
        span: Span,
    ) -> Result<(), CompileError> {
        match op.binary_op() {
            None => {
                // Value first so `x = x + 1` on a fresh name is rejected.
                self.emit_expr(value)?;
            }
            Some(binary) => {
                let reg = self.lookup(name, span)?;
                self.emit(Instruction::Load(reg));
                self.emit_expr(value)?;
                self.emit(binary_instruction(binary));
            }
        }
        let reg = self.register_for(name, span)?;
        self.emit(Instruction::Store(reg));
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number { value, .. } => {
                self.emit(Instruction::Push(Value::Number(*value)));
            }
            Expr::Boolean { value, .. } => {
                self.emit(Instruction::Push(Value::Bool(*value)));
            }
            Expr::Identifier { name, span } => {
                let reg = self.lookup(name, *span)?;
                self.emit(Instruction::Load(reg));
            }
            Expr::Unary { op, operand, .. } => {
                self.emit_expr(operand)?;
                self.emit(match op {
                    UnaryOp::Neg => Instruction::Neg,
                    UnaryOp::Not => Instruction::Not,
                });
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                self.emit_expr(left)?;
                self.emit_expr(right)?;
                self.emit(binary_instruction(*op));
            }
        }
        Ok(())
    }
}

fn binary_instruction(op: BinaryOp) -> Instruction {
    match op {
        BinaryOp::Add => Instruction::Add,
        BinaryOp::Sub => Instruction::Sub,
        BinaryOp::Mul => Instruction::Mul,
        BinaryOp::Div => Instruction::Div,
        BinaryOp::Mod => Instruction::Mod,
        BinaryOp::Pow => Instruction::Pow,
        BinaryOp::Eq => Instruction::Eq,
        BinaryOp::Ne => Instruction::Ne,
        BinaryOp::Lt => Instruction::Lt,
        BinaryOp::Le => Instruction::Le,
        BinaryOp::Gt => Instruction::Gt,
        BinaryOp::Ge => Instruction::Ge,
        BinaryOp::And => Instruction::And,
        BinaryOp::Or => Instruction::Or,
    }
}
