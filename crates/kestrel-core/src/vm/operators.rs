//! Operator semantics for the Kestrel VM
//!
//! Arithmetic and ordering require numbers, logic requires booleans, and
//! equality accepts any pair of values (values of different types are never
//! equal). Errors are returned as plain messages; the dispatch loop attaches
//! the faulting instruction index.

use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl Arith {
    fn symbol(&self) -> &'static str {
        match self {
            Arith::Add => "+",
            Arith::Sub => "-",
            Arith::Mul => "*",
            Arith::Div => "/",
            Arith::Mod => "%",
            Arith::Pow => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

fn operand_error(symbol: &str, left: Value, right: Value) -> String {
    format!(
        "cannot apply '{symbol}' to {} and {}",
        left.type_name(),
        right.type_name()
    )
}

pub fn arithmetic(op: Arith, left: Value, right: Value) -> Result<Value, String> {
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(operand_error(op.symbol(), left, right));
    };
    let result = match op {
        Arith::Add => a + b,
        Arith::Sub => a - b,
        Arith::Mul => a * b,
        Arith::Div => {
            if b == 0.0 {
                return Err("division by zero".to_string());
            }
            a / b
        }
        Arith::Mod => {
            if b == 0.0 {
                return Err("modulo by zero".to_string());
            }
            a % b
        }
        Arith::Pow => a.powf(b),
    };
    Ok(Value::Number(result))
}

pub fn compare(op: Comparison, left: Value, right: Value) -> Result<Value, String> {
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(operand_error(op.symbol(), left, right));
    };
    Ok(Value::Bool(match op {
        Comparison::Lt => a < b,
        Comparison::Le => a <= b,
        Comparison::Gt => a > b,
        Comparison::Ge => a >= b,
    }))
}

pub fn equals(left: Value, right: Value) -> bool {
    left == right
}

pub fn logical_and(left: Value, right: Value) -> Result<Value, String> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
        _ => Err(operand_error("and", left, right)),
    }
}

pub fn logical_or(left: Value, right: Value) -> Result<Value, String> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
        _ => Err(operand_error("or", left, right)),
    }
}

pub fn negate(value: Value) -> Result<Value, String> {
    value
        .as_number()
        .map(|n| Value::Number(-n))
        .ok_or_else(|| format!("cannot negate {}", value.type_name()))
}

pub fn not(value: Value) -> Result<Value, String> {
    value
        .as_bool()
        .map(|b| Value::Bool(!b))
        .ok_or_else(|| format!("cannot apply 'not' to {}", value.type_name()))
}
