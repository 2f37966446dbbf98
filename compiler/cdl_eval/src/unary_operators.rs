//! Unary operator implementations.

use cdl_ir::{OpCode, Value};

use crate::errors::{integer_overflow, unary_type_mismatch, EvalResult};

/// Evaluates a prefix operator over a popped operand.
pub fn evaluate_unary(op: OpCode, operand: Value) -> EvalResult<Value> {
    match (op, operand) {
        (OpCode::Neg, Value::Int(v)) => v
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (OpCode::Pos, Value::Int(v)) => Ok(Value::Int(v)),
        (OpCode::Inc, Value::Int(v)) => v
            .checked_add(1)
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("increment")),
        (OpCode::Dec, Value::Int(v)) => v
            .checked_sub(1)
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("decrement")),
        (OpCode::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
        (OpCode::Pos, Value::Float(v)) => Ok(Value::Float(v)),
        (OpCode::Inc, Value::Float(v)) => Ok(Value::Float(v + 1.0)),
        (OpCode::Dec, Value::Float(v)) => Ok(Value::Float(v - 1.0)),
        (OpCode::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
        (op, operand) => Err(unary_type_mismatch(op, operand.kind())),
    }
}

#[cfg(test)]
mod tests {
    use cdl_ir::ValueKind;

    use super::*;
    use crate::errors::EvalError;

    #[test]
    fn int_ops() {
        assert_eq!(evaluate_unary(OpCode::Neg, Value::Int(5)), Ok(Value::Int(-5)));
        assert_eq!(evaluate_unary(OpCode::Pos, Value::Int(5)), Ok(Value::Int(5)));
        assert_eq!(evaluate_unary(OpCode::Inc, Value::Int(5)), Ok(Value::Int(6)));
        assert_eq!(evaluate_unary(OpCode::Dec, Value::Int(5)), Ok(Value::Int(4)));
    }

    #[test]
    fn int_overflow() {
        assert!(evaluate_unary(OpCode::Neg, Value::Int(i32::MIN)).is_err());
        assert!(evaluate_unary(OpCode::Inc, Value::Int(i32::MAX)).is_err());
        assert!(evaluate_unary(OpCode::Dec, Value::Int(i32::MIN)).is_err());
    }

    #[test]
    fn float_ops() {
        assert_eq!(evaluate_unary(OpCode::Neg, Value::Float(1.5)), Ok(Value::Float(-1.5)));
        assert_eq!(evaluate_unary(OpCode::Pos, Value::Float(1.5)), Ok(Value::Float(1.5)));
        assert_eq!(evaluate_unary(OpCode::Inc, Value::Float(1.5)), Ok(Value::Float(2.5)));
    }

    #[test]
    fn not_is_bool_only() {
        assert_eq!(evaluate_unary(OpCode::Not, Value::Bool(true)), Ok(Value::Bool(false)));
        assert_eq!(
            evaluate_unary(OpCode::Not, Value::Int(0)),
            Err(EvalError::UnaryTypeMismatch {
                op: OpCode::Not,
                operand: ValueKind::Int
            })
        );
        assert!(evaluate_unary(OpCode::Neg, Value::Bool(true)).is_err());
        assert!(evaluate_unary(OpCode::Neg, Value::from("s")).is_err());
    }
}
