//! Error types for VM runtime errors

use thiserror::Error;

/// The interpreter faulted while executing bytecode
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", self.format_display())]
pub struct RuntimeError {
    pub message: String,
    /// Index of the faulting instruction, if known
    pub instruction: Option<usize>,
}

impl RuntimeError {
    /// Create a simple runtime error without location info
    pub fn runtime(message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
            instruction: None,
        }
    }

    pub fn at(message: impl Into<String>, instruction: usize) -> Self {
        RuntimeError {
            message: message.into(),
            instruction: Some(instruction),
        }
    }

    pub fn format_display(&self) -> String {
        match self.instruction {
            Some(ip) => format!("runtime error at instruction {ip}: {}", self.message),
            None => format!("runtime error: {}", self.message),
        }
    }
}
