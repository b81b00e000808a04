//! Arithmetic tools
//!
//! Basic calculation tools for math-solving agents.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::{Result, TelosError};
use crate::tools::{arg_f64, Tool};

fn number_params(a_desc: &str, b_desc: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("a".to_string(), format!("float - {}", a_desc)),
        ("b".to_string(), format!("float - {}", b_desc)),
    ])
}

fn operands(args: &Value) -> (f64, f64) {
    (
        arg_f64(args, "a").unwrap_or(0.0),
        arg_f64(args, "b").unwrap_or(0.0),
    )
}

/// Addition tool
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Adds two numbers together"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        number_params("The first number", "The second number")
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let (a, b) = operands(args);
        Ok(json!(a + b))
    }
}

/// Subtraction tool
pub struct SubtractTool;

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        "subtract"
    }

    fn description(&self) -> &str {
        "Subtracts the second number from the first number"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        number_params("The number to subtract from", "The number to subtract")
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let (a, b) = operands(args);
        Ok(json!(a - b))
    }
}

/// Multiplication tool
pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        "multiply"
    }

    fn description(&self) -> &str {
        "Multiplies two numbers together"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        number_params("The first number", "The second number")
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let (a, b) = operands(args);
        Ok(json!(a * b))
    }
}

/// Division tool
pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        "divide"
    }

    fn description(&self) -> &str {
        "Divides the first number by the second number"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        number_params(
            "The dividend (number to be divided)",
            "The divisor (number to divide by)",
        )
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let (a, b) = operands(args);
        if b == 0.0 {
            return Err(TelosError::tool("Cannot divide by zero"));
        }
        Ok(json!(a / b))
    }
}

/// All four arithmetic tools, boxed for registration
pub fn math_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(AddTool),
        Box::new(SubtractTool),
        Box::new(MultiplyTool),
        Box::new(DivideTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add() {
        let result = AddTool.execute(&json!({"a": 3.0, "b": 4.0})).await.unwrap();
        assert_eq!(result, json!(7.0));
    }

    #[tokio::test]
    async fn test_add_accepts_integers() {
        let result = AddTool.execute(&json!({"a": 3, "b": 4})).await.unwrap();
        assert_eq!(result, json!(7.0));
    }

    #[tokio::test]
    async fn test_divide_by_zero_is_error() {
        let err = DivideTool
            .execute(&json!({"a": 1.0, "b": 0.0}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("divide by zero"));
    }

    #[tokio::test]
    async fn test_missing_operands_default_to_zero() {
        let result = MultiplyTool.execute(&json!({})).await.unwrap();
        assert_eq!(result, json!(0.0));
    }
}
