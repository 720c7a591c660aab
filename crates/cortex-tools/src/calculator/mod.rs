//! Restricted expression evaluator
//!
//! Arithmetic over `f64` with an explicit allow-list of functions and
//! constants. There is no name lookup beyond that list; unknown names
//! fail while parsing.

pub mod functions;
pub mod parser;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use parser::{BinaryOp, Expr};

pub use functions::{Function, CONSTANTS};
pub use parser::parse;

/// Longest accepted expression
pub const MAX_EXPRESSION_LEN: usize = 1_000;

/// Nesting depth limit for evaluation
const MAX_DEPTH: usize = 64;

fn eval(expr: &Expr, depth: usize) -> Result<f64> {
    if depth > MAX_DEPTH {
        return Err(Error::InvalidInput("expression nested too deeply".to_string()));
    }

    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Neg(inner) => Ok(-eval(inner, depth + 1)?),
        Expr::Binary(op, left, right) => {
            let a = eval(left, depth + 1)?;
            let b = eval(right, depth + 1)?;
            binary(*op, a, b)
        }
        Expr::Call(function, args) => {
            let values = args
                .iter()
                .map(|arg| eval(arg, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            function.apply(&values)
        }
    }
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64> {
    let zero_division = || Error::Execution("division by zero".to_string());
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Sub => Ok(a - b),
        BinaryOp::Mul => Ok(a * b),
        BinaryOp::Div if b == 0.0 => Err(zero_division()),
        BinaryOp::Div => Ok(a / b),
        BinaryOp::FloorDiv if b == 0.0 => Err(zero_division()),
        BinaryOp::FloorDiv => Ok((a / b).floor()),
        // Python modulo takes the sign of the divisor
        BinaryOp::Mod if b == 0.0 => Err(zero_division()),
        BinaryOp::Mod => Ok(a - b * (a / b).floor()),
        BinaryOp::Pow => Ok(a.powf(b)),
    }
}

/// Evaluate `input` against the allow-list
pub fn evaluate(input: &str) -> Result<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("No expression provided".to_string()));
    }
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(Error::InvalidInput(format!(
            "expression longer than {MAX_EXPRESSION_LEN} characters"
        )));
    }
    if input.contains("__") {
        return Err(Error::Denied(
            "access to dunder names is not allowed".to_string(),
        ));
    }

    let expr = parse(input)?;
    let value = eval(&expr, 0)?;
    if !value.is_finite() {
        return Err(Error::Execution("result is not a finite number".to_string()));
    }
    Ok(value)
}

/// Render a result the way a calculator would (integral values without `.0`)
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
