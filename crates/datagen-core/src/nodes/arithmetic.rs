//! Arithmetic combinators over pulled operand values.

use crate::error::GenerateError;
use crate::nodes::sampler::NumberKind;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Binary operator applied left-to-right across all operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Fold the operator over the coerced operands, then cast to the declared
/// result kind. Division by a zero-valued operand fails.
pub fn apply(
    op: ArithmeticOp,
    kind: NumberKind,
    operands: &[f64],
) -> Result<Value, GenerateError> {
    let mut iter = operands.iter().copied();
    // Builder guarantees at least two operands
    let mut acc = iter.next().unwrap_or(0.0);
    for operand in iter {
        acc = match op {
            ArithmeticOp::Add => acc + operand,
            ArithmeticOp::Subtract => acc - operand,
            ArithmeticOp::Multiply => acc * operand,
            ArithmeticOp::Divide => {
                if operand == 0.0 {
                    return Err(GenerateError::DivisionByZero);
                }
                acc / operand
            }
        };
    }
    Ok(kind.cast(acc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_long() {
        let value = apply(ArithmeticOp::Add, NumberKind::Long, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(value, Value::Int64(6));
    }

    #[test]
    fn test_subtract_folds_left() {
        let value = apply(ArithmeticOp::Subtract, NumberKind::Long, &[10.0, 3.0, 2.0]).unwrap();
        assert_eq!(value, Value::Int64(5));
    }

    #[test]
    fn test_multiply_double() {
        let value = apply(ArithmeticOp::Multiply, NumberKind::Double, &[2.5, 4.0]).unwrap();
        assert_eq!(value, Value::Float64(10.0));
    }

    #[test]
    fn test_integer_division_truncates_toward_zero() {
        let value = apply(ArithmeticOp::Divide, NumberKind::Integer, &[7.0, 2.0]).unwrap();
        assert_eq!(value, Value::Int32(3));

        let value = apply(ArithmeticOp::Divide, NumberKind::Integer, &[-7.0, 2.0]).unwrap();
        assert_eq!(value, Value::Int32(-3));
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert!(matches!(
            apply(ArithmeticOp::Divide, NumberKind::Double, &[1.0, 0.0]),
            Err(GenerateError::DivisionByZero)
        ));
    }
}
