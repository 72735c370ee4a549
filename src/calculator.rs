//! Calculation engine shared by the create and update paths

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while validating or evaluating a calculation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("Invalid operator '{0}'. Supported operators are +, -, *, /")]
    InvalidOperator(String),

    #[error("Division by zero is not allowed")]
    DivisionByZero,
}

/// The four supported arithmetic operators, stored as a single character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            other => Err(CalcError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Apply `operator` to the operands.
///
/// Division fails when `num2` is exactly zero; no tolerance is applied.
pub fn apply(operator: Operator, num1: f64, num2: f64) -> Result<f64, CalcError> {
    match operator {
        Operator::Add => Ok(num1 + num2),
        Operator::Subtract => Ok(num1 - num2),
        Operator::Multiply => Ok(num1 * num2),
        Operator::Divide => {
            if num2 == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            Ok(num1 / num2)
        }
    }
}

/// Parse the operator symbol and evaluate in one step
pub fn evaluate(symbol: &str, num1: f64, num2: f64) -> Result<(Operator, f64), CalcError> {
    let operator: Operator = symbol.parse()?;
    let result = apply(operator, num1, num2)?;
    Ok((operator, result))
}
