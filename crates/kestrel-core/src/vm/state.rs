//! Interpreter state: operand stack and register file

use super::value::Value;
use crate::bytecode::Register;
use std::collections::BTreeMap;

/// Stack and registers of one interpretation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionState {
    pub stack: Vec<Value>,
    pub registers: BTreeMap<Register, Value>,
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, reg: Register) -> Option<&Value> {
        self.registers.get(&reg)
    }

    /// `[1, 2, true]`, bottom of the stack first
    pub fn render_stack(&self) -> String {
        let items: Vec<String> = self.stack.iter().map(|v| v.to_string()).collect();
        format!("[{}]", items.join(", "))
    }

    /// `{r0: 1, r1: true}`, ordered by register
    pub fn render_registers(&self) -> String {
        let items: Vec<String> = self
            .registers
            .iter()
            .map(|(reg, v)| format!("{reg}: {v}"))
            .collect();
        format!("{{{}}}", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        let mut state = ExecutionState::new();
        assert_eq!(state.render_stack(), "[]");
        assert_eq!(state.render_registers(), "{}");

        state.stack.push(Value::Number(1.5));
        state.stack.push(Value::Bool(true));
        state.registers.insert(Register(2), Value::Number(7.0));
        state.registers.insert(Register(0), Value::Bool(false));
        assert_eq!(state.render_stack(), "[1.5, true]");
        assert_eq!(state.render_registers(), "{r0: false, r2: 7}");
    }
}
