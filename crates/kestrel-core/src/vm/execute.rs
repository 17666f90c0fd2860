//! Instruction execution logic for the VM
//!
//! This module contains the dispatch loop and the handlers for every
//! bytecode instruction.

use super::errors::RuntimeError;
use super::interpreter::Machine;
use super::operators::{self, Arith, Comparison};
use super::value::Value;
use crate::bytecode::{Instruction, Register};
use std::io::Write;

impl<W: Write + ?Sized> Machine<'_, W> {
    /// Execute until `halt`, the end of the code, or the first fault
    pub(super) fn execute(&mut self) -> Result<(), RuntimeError> {
        let code = self.code;
        while let Some(instr) = code.get(self.ip) {
            let at = self.ip;
            if self.steps >= self.max_steps {
                return Err(RuntimeError::at(
                    format!("step limit of {} instructions exceeded", self.max_steps),
                    at,
                ));
            }
            self.steps += 1;
            self.ip += 1;

            let result = match instr {
                Instruction::Halt => return Ok(()),
                Instruction::Push(value) => {
                    self.state.stack.push(*value);
                    Ok(())
                }
                Instruction::Pop => self.pop().map(|_| ()),
                Instruction::Load(reg) => self.exec_load(*reg),
                Instruction::Store(reg) => self.exec_store(*reg),
                Instruction::Add => self.exec_arith(Arith::Add),
                Instruction::Sub => self.exec_arith(Arith::Sub),
                Instruction::Mul => self.exec_arith(Arith::Mul),
                Instruction::Div => self.exec_arith(Arith::Div),
                Instruction::Mod => self.exec_arith(Arith::Mod),
                Instruction::Pow => self.exec_arith(Arith::Pow),
                Instruction::Neg => self.exec_unary(operators::negate),
                Instruction::Not => self.exec_unary(operators::not),
                Instruction::Eq => {
                    self.exec_binary(|a, b| Ok(Value::Bool(operators::equals(a, b))))
                }
                Instruction::Ne => {
                    self.exec_binary(|a, b| Ok(Value::Bool(!operators::equals(a, b))))
                }
                Instruction::Lt => self.exec_compare(Comparison::Lt),
                Instruction::Le => self.exec_compare(Comparison::Le),
                Instruction::Gt => self.exec_compare(Comparison::Gt),
                Instruction::Ge => self.exec_compare(Comparison::Ge),
                Instruction::And => self.exec_binary(operators::logical_and),
                Instruction::Or => self.exec_binary(operators::logical_or),
                Instruction::Jump(target) => self.exec_jump(*target),
                Instruction::JumpIfFalse(target) => self.exec_jump_if_false(*target),
                Instruction::Print => self.exec_print(),
            };

            result.map_err(|message| RuntimeError::at(message, at))?;
        }
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, String> {
        self.state
            .stack
            .pop()
            .ok_or_else(|| "stack underflow".to_string())
    }

    fn exec_load(&mut self, reg: Register) -> Result<(), String> {
        let value = self
            .state
            .registers
            .get(&reg)
            .copied()
            .ok_or_else(|| format!("read of unset register {reg}"))?;
        self.state.stack.push(value);
        Ok(())
    }

    fn exec_store(&mut self, reg: Register) -> Result<(), String> {
        let value = self.pop()?;
        self.state.registers.insert(reg, value);
        Ok(())
    }

    fn exec_unary(&mut self, op: fn(Value) -> Result<Value, String>) -> Result<(), String> {
        let value = self.pop()?;
        self.state.stack.push(op(value)?);
        Ok(())
    }

    fn exec_binary(
        &mut self,
        op: impl FnOnce(Value, Value) -> Result<Value, String>,
    ) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;
        self.state.stack.push(op(left, right)?);
        Ok(())
    }

    fn exec_arith(&mut self, op: Arith) -> Result<(), String> {
        self.exec_binary(|a, b| operators::arithmetic(op, a, b))
    }

    fn exec_compare(&mut self, op: Comparison) -> Result<(), String> {
        self.exec_binary(|a, b| operators::compare(op, a, b))
    }

    fn exec_jump(&mut self, target: usize) -> Result<(), String> {
        if target > self.code.len() {
            return Err(format!("jump target {target} out of bounds"));
        }
        self.ip = target;
        Ok(())
    }

    fn exec_jump_if_false(&mut self, target: usize) -> Result<(), String> {
        match self.pop()? {
            Value::Bool(true) => Ok(()),
            Value::Bool(false) => self.exec_jump(target),
            other => Err(format!(
                "condition must be a boolean, found {}",
                other.type_name()
            )),
        }
    }

    fn exec_print(&mut self) -> Result<(), String> {
        let value = self.pop()?;
        writeln!(self.out, "{value}").map_err(|e| format!("failed to write output: {e}"))
    }
}
