//! Two-operand arithmetic tool.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::tools::extract;
use crate::tools::tool::{
    ExecutionContext, ParamKind, ParameterSpec, Tool, ToolError, ToolOutput, number_param,
    str_param,
};

/// A basic arithmetic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub const NAMES: &'static [&'static str] = &["add", "subtract", "multiply", "divide"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Subtract => "subtract",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
        }
    }

    /// Map an infix symbol (`+ - * /`) to an operation.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(ArithmeticOp::Add),
            '-' => Some(ArithmeticOp::Subtract),
            '*' | '×' => Some(ArithmeticOp::Multiply),
            '/' | '÷' => Some(ArithmeticOp::Divide),
            _ => None,
        }
    }

    pub fn apply(&self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            ArithmeticOp::Add => Ok(a + b),
            ArithmeticOp::Subtract => Ok(a - b),
            ArithmeticOp::Multiply => Ok(a * b),
            ArithmeticOp::Divide if b == 0.0 => {
                Err(ToolError::ExecutionFailed("division by zero".to_string()))
            }
            ArithmeticOp::Divide => Ok(a / b),
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArithmeticOp {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" | "+" => Ok(ArithmeticOp::Add),
            "subtract" | "-" => Ok(ArithmeticOp::Subtract),
            "multiply" | "*" => Ok(ArithmeticOp::Multiply),
            "divide" | "/" => Ok(ArithmeticOp::Divide),
            other => Err(ToolError::InvalidParameters(format!(
                "unsupported operation: {}",
                other
            ))),
        }
    }
}

/// One `a <op> b` calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub a: f64,
    pub b: f64,
    pub operation: ArithmeticOp,
}

impl Operation {
    pub fn new(a: f64, operation: ArithmeticOp, b: f64) -> Self {
        Self { a, b, operation }
    }

    pub fn evaluate(&self) -> Result<f64, ToolError> {
        self.operation.apply(self.a, self.b)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.a, self.operation, self.b)
    }
}

/// Tool for basic arithmetic on two operands.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Basic arithmetic on two numbers (add, subtract, multiply, divide)."
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required(
                "operation",
                ParamKind::Choice(ArithmeticOp::NAMES),
                "The operation to perform",
            ),
            ParameterSpec::required("a", ParamKind::Number, "First operand"),
            ParameterSpec::required("b", ParamKind::Number, "Second operand"),
        ]
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        let operation = match str_param(&params, "operation") {
            Some(op) => op.parse()?,
            None => extract::arithmetic_operation(ctx.message).unwrap_or(ArithmeticOp::Add),
        };

        // The reasoning service often omits operands; recover them from the request.
        let (a, b) = match (number_param(&params, "a"), number_param(&params, "b")) {
            (Some(a), Some(b)) => (a, b),
            _ => extract::operand_pair(ctx.message).ok_or_else(|| {
                ToolError::InvalidParameters("missing operands 'a' and 'b'".to_string())
            })?,
        };

        let op = Operation::new(a, operation, b);
        let result = op.evaluate()?;

        Ok(ToolOutput::success(
            serde_json::json!(result),
            format!("{} = {}", op, result),
            start.elapsed(),
        ))
    }
}
