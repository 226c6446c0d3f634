//! Value-kind rules for Nova expressions
//!
//! Nova has no type annotations; the kind of every expression follows from
//! its operands. These rules are the subset the target language accepts
//! without conversions.

use crate::ast::{BinaryOp, UnaryOp, ValueKind};
use thiserror::Error;

/// Result type for kind checks
pub type TypeResult<T> = Result<T, TypeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("operator `{op}` cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    #[error("operator `{op}` cannot be applied to {operand}")]
    InvalidOperand { op: &'static str, operand: ValueKind },

    #[error("{context} must be {expected}, found {actual}")]
    Mismatch {
        context: String,
        expected: ValueKind,
        actual: ValueKind,
    },
}

/// Kind produced by `left op right`
pub fn binary_result(op: BinaryOp, left: ValueKind, right: ValueKind) -> TypeResult<ValueKind> {
    use ValueKind::*;

    let result = match op {
        BinaryOp::Add => match (left, right) {
            (Number, Number) => Some(Number),
            (String, _) | (_, String) => Some(String),
            _ => None,
        },
        BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => {
            (left == Number && right == Number).then_some(Number)
        }
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => (left == Bool && right == Bool).then_some(Bool),
        BinaryOp::Equal | BinaryOp::NotEqual => (left == right).then_some(Bool),
        BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
            (left == Number && right == Number).then_some(Bool)
        }
    };

    result.ok_or(TypeError::InvalidOperands {
        op: op.symbol(),
        left,
        right,
    })
}

/// Kind produced by `op operand`
pub fn unary_result(op: UnaryOp, operand: ValueKind) -> TypeResult<ValueKind> {
    match (op, operand) {
        (UnaryOp::Not, ValueKind::Bool) => Ok(ValueKind::Bool),
        (UnaryOp::Negate, ValueKind::Number) => Ok(ValueKind::Number),
        (UnaryOp::Not, _) => Err(TypeError::InvalidOperand { op: "!", operand }),
        (UnaryOp::Negate, _) => Err(TypeError::InvalidOperand { op: "-", operand }),
    }
}

/// Require `actual == expected`, describing the failing construct
pub fn expect_kind(context: &str, expected: ValueKind, actual: ValueKind) -> TypeResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(TypeError::Mismatch {
            context: context.to_string(),
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueKind::*;

    #[test]
    fn test_addition_and_concatenation() {
        assert_eq!(binary_result(BinaryOp::Add, Number, Number), Ok(Number));
        assert_eq!(binary_result(BinaryOp::Add, String, Number), Ok(String));
        assert_eq!(binary_result(BinaryOp::Add, Bool, String), Ok(String));
        assert!(binary_result(BinaryOp::Add, Bool, Number).is_err());
    }

    #[test]
    fn test_arithmetic_requires_numbers() {
        let err = binary_result(BinaryOp::Subtract, String, Number).unwrap_err();
        assert_eq!(err.to_string(), "operator `-` cannot be applied to string and number");
        assert_eq!(binary_result(BinaryOp::Modulo, Number, Number), Ok(Number));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary_result(BinaryOp::Equal, String, String), Ok(Bool));
        assert!(binary_result(BinaryOp::NotEqual, String, Number).is_err());
        assert_eq!(binary_result(BinaryOp::Less, Number, Number), Ok(Bool));
        assert!(binary_result(BinaryOp::GreaterEqual, String, String).is_err());
    }

    #[test]
    fn test_logical_and_unary() {
        assert_eq!(binary_result(BinaryOp::LogicalOr, Bool, Bool), Ok(Bool));
        assert!(binary_result(BinaryOp::LogicalAnd, Bool, Number).is_err());
        assert_eq!(unary_result(UnaryOp::Not, Bool), Ok(Bool));
        assert_eq!(unary_result(UnaryOp::Negate, Number), Ok(Number));
        assert!(unary_result(UnaryOp::Negate, String).is_err());
    }

    #[test]
    fn test_mismatch_message() {
        let err = expect_kind("`when` condition", Bool, Number).unwrap_err();
        assert_eq!(err.to_string(), "`when` condition must be bool, found number");
    }
}
