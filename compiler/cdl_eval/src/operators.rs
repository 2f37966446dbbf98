//! Binary operator implementations.
//!
//! Dispatch is on the pair of operand kinds. Mixed `int`/`float` promotes to
//! `float`; a string on either side turns the other operand into its string
//! form. `&&` and `||` arrive here only when short-circuiting did not apply.

use cdl_ir::{OpCode, Value, ValueKind};

use crate::errors::{
    binary_type_mismatch, division_by_zero, integer_overflow, modulo_by_zero, EvalResult,
};

/// Evaluates a binary operator over two popped operands.
pub fn evaluate_binary(op: OpCode, left: Value, right: Value) -> EvalResult<Value> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => eval_int_binary(op, *a, *b),
        (Value::Float(a), Value::Float(b)) => eval_float_binary(op, *a, *b),
        (Value::Int(a), Value::Float(b)) => eval_float_binary(op, promote(*a), *b),
        (Value::Float(a), Value::Int(b)) => eval_float_binary(op, *a, promote(*b)),
        (Value::Bool(a), Value::Bool(b)) => eval_bool_binary(op, *a, *b),
        (Value::Str(a), Value::Str(b)) => eval_string_binary(op, a, b),
        (Value::Str(a), other) if other.kind() != ValueKind::Void => {
            eval_string_binary(op, a, &other.to_string())
        }
        (other, Value::Str(b)) if other.kind() != ValueKind::Void => {
            eval_string_binary(op, &other.to_string(), b)
        }
        (Value::Object(_) | Value::Null, Value::Object(_) | Value::Null) => {
            eval_object_binary(op, &left, &right)
        }
        _ => Err(binary_type_mismatch(op, left.kind(), right.kind())),
    }
}

/// `int` to `float` promotion used by mixed arithmetic.
#[expect(
    clippy::cast_precision_loss,
    reason = "i32 to f32 promotion is the language's mixed-arithmetic rule"
)]
pub fn promote(v: i32) -> f32 {
    v as f32
}

/// Maps an overflowing checked operation to an error.
#[inline]
fn checked_arith(result: Option<i32>, op_name: &str) -> EvalResult<Value> {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

#[inline]
fn checked_div(b: i32, result: Option<i32>, op_name: &str) -> EvalResult<Value> {
    if b == 0 {
        return Err(division_by_zero());
    }
    checked_arith(result, op_name)
}

#[inline]
fn checked_mod(b: i32, result: Option<i32>, op_name: &str) -> EvalResult<Value> {
    if b == 0 {
        return Err(modulo_by_zero());
    }
    checked_arith(result, op_name)
}

fn eval_int_binary(op: OpCode, a: i32, b: i32) -> EvalResult<Value> {
    match op {
        OpCode::Add => checked_arith(a.checked_add(b), "addition"),
        OpCode::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        OpCode::Mult => checked_arith(a.checked_mul(b), "multiplication"),
        OpCode::Div => checked_div(b, a.checked_div(b), "division"),
        OpCode::Mod => checked_mod(b, a.checked_rem(b), "remainder"),
        OpCode::Pow => int_pow(a, b),
        OpCode::Eq => Ok(Value::Bool(a == b)),
        OpCode::Ne => Ok(Value::Bool(a != b)),
        OpCode::Lt => Ok(Value::Bool(a < b)),
        OpCode::Le => Ok(Value::Bool(a <= b)),
        OpCode::Gt => Ok(Value::Bool(a > b)),
        OpCode::Ge => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op, ValueKind::Int, ValueKind::Int)),
    }
}

/// Integer power goes through `f64` and truncates toward zero, so negative
/// exponents yield `0` (or `±1` for bases `±1`).
fn int_pow(a: i32, b: i32) -> EvalResult<Value> {
    let result = f64::from(a).powf(f64::from(b)).trunc();
    if !result.is_finite() || result < f64::from(i32::MIN) || result > f64::from(i32::MAX) {
        return Err(integer_overflow("exponentiation"));
    }
    #[expect(
        clippy::cast_possible_truncation,
        reason = "range checked above, value already truncated"
    )]
    let value = result as i32;
    Ok(Value::Int(value))
}

fn eval_float_binary(op: OpCode, a: f32, b: f32) -> EvalResult<Value> {
    let value = match op {
        OpCode::Add => Value::Float(a + b),
        OpCode::Sub => Value::Float(a - b),
        OpCode::Mult => Value::Float(a * b),
        OpCode::Div => Value::Float(a / b),
        OpCode::Mod => Value::Float(a % b),
        OpCode::Pow => Value::Float(a.powf(b)),
        OpCode::Eq => Value::Bool(float_eq(a, b)),
        OpCode::Ne => Value::Bool(!float_eq(a, b)),
        OpCode::Lt => Value::Bool(a < b),
        OpCode::Le => Value::Bool(a <= b),
        OpCode::Gt => Value::Bool(a > b),
        OpCode::Ge => Value::Bool(a >= b),
        _ => return Err(binary_type_mismatch(op, ValueKind::Float, ValueKind::Float)),
    };
    Ok(value)
}

/// Float equality within one machine epsilon.
pub fn float_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= f32::EPSILON
}

fn eval_bool_binary(op: OpCode, a: bool, b: bool) -> EvalResult<Value> {
    match op {
        OpCode::And => Ok(Value::Bool(a && b)),
        OpCode::Or => Ok(Value::Bool(a || b)),
        OpCode::Eq => Ok(Value::Bool(a == b)),
        OpCode::Ne => Ok(Value::Bool(a != b)),
        _ => Err(binary_type_mismatch(op, ValueKind::Bool, ValueKind::Bool)),
    }
}

fn eval_string_binary(op: OpCode, a: &str, b: &str) -> EvalResult<Value> {
    match op {
        OpCode::Add => {
            let mut joined = String::with_capacity(a.len() + b.len());
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::from(joined))
        }
        OpCode::Eq => Ok(Value::Bool(a == b)),
        OpCode::Ne => Ok(Value::Bool(a != b)),
        OpCode::Lt => Ok(Value::Bool(a < b)),
        OpCode::Le => Ok(Value::Bool(a <= b)),
        OpCode::Gt => Ok(Value::Bool(a > b)),
        OpCode::Ge => Ok(Value::Bool(a >= b)),
        _ => Err(binary_type_mismatch(op, ValueKind::String, ValueKind::String)),
    }
}

/// Objects only compare by identity.
fn eval_object_binary(op: OpCode, a: &Value, b: &Value) -> EvalResult<Value> {
    let same = match (a, b) {
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        (Value::Null, Value::Null) => true,
        _ => false,
    };
    match op {
        OpCode::Eq => Ok(Value::Bool(same)),
        OpCode::Ne => Ok(Value::Bool(!same)),
        _ => Err(binary_type_mismatch(op, ValueKind::Object, ValueKind::Object)),
    }
}
