//! Evaluation errors and their constructors.
//!
//! Every failure the evaluator can report is a variant of [`EvalError`].
//! Call sites go through the `#[cold]` constructors below rather than
//! building variants inline, so message wording lives in one place.

use cdl_ir::{ObjectRef, OpCode, ValueKind};
use thiserror::Error;

use crate::ValueInfo;

/// Result of an evaluation step. Defaults to the descriptor of the value
/// the step left on the stack.
pub type EvalResult<T = ValueInfo> = Result<T, EvalError>;

/// Evaluation stack exhausted or misused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("evaluation stack overflow: {requested} bytes requested, {available} of {capacity} free")]
    ArenaOverflow {
        requested: usize,
        available: usize,
        capacity: usize,
    },
    #[error("object table overflow: all {capacity} slots in use")]
    ObjectTableOverflow { capacity: usize },
    #[error("evaluation stack underflow: {requested} bytes requested, {available} on the stack")]
    Underflow { requested: usize, available: usize },
    #[error("offset {offset} is outside the live stack ({len} bytes)")]
    InvalidOffset { offset: i32, len: usize },
    #[error("object slot {stored} is not the top of the object table ({objects} live objects)")]
    ObjectIndexMismatch { stored: u32, objects: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("operator `{op}` is not defined for {left} and {right}")]
    BinaryTypeMismatch {
        op: OpCode,
        left: ValueKind,
        right: ValueKind,
    },
    #[error("operator `{op}` is not defined for {operand}")]
    UnaryTypeMismatch { op: OpCode, operand: ValueKind },
    #[error("operator `{op}` takes {expected} operand(s), found {found}")]
    InvalidArity {
        op: OpCode,
        expected: usize,
        found: usize,
    },
    #[error("ternary condition must be bool, found {found}")]
    TernaryCondition { found: ValueKind },
    #[error("undefined identifier `{name}`")]
    UndefinedIdentifier { name: String },
    #[error("`{owner}` has no member `{name}`")]
    UnknownMember { owner: String, name: String },
    #[error("identifier `{name}` cannot be assigned")]
    UnassignableIdentifier { name: String },
    #[error("left side of `=` must be an identifier or a member access")]
    InvalidAssignmentTarget,
    #[error("member access requires an object on the left, found {found}")]
    InvalidMemberOwner { found: ValueKind },
    #[error("right side of `.` must be an identifier or an integer index")]
    InvalidMemberOperand,
    #[error("index {index} is out of range for a collection of {len} elements")]
    IndexOutOfRange { index: i32, len: usize },
    #[error("no initializer registered for object type `{type_name}`")]
    UnknownObjectType { type_name: String },
    #[error("object initializer is missing its type name")]
    MissingObjectType,
    #[error("object fields must be written as `name = expression`")]
    InvalidFieldInit,
    #[error("cannot set `{type_name}.{field}`: {reason}")]
    FieldInit {
        type_name: String,
        field: String,
        reason: String,
    },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },
    #[error("null object reference")]
    NullReference,
    #[error("integer overflow in {op}")]
    IntegerOverflow { op: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("cannot convert {from} to {to}: {reason}")]
    Conversion {
        from: String,
        to: String,
        reason: String,
    },
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

// Operators

#[cold]
pub fn binary_type_mismatch(op: OpCode, left: ValueKind, right: ValueKind) -> EvalError {
    EvalError::BinaryTypeMismatch { op, left, right }
}

#[cold]
pub fn unary_type_mismatch(op: OpCode, operand: ValueKind) -> EvalError {
    EvalError::UnaryTypeMismatch { op, operand }
}

#[cold]
pub fn invalid_arity(op: OpCode, found: usize) -> EvalError {
    EvalError::InvalidArity {
        op,
        expected: op.operand_count(),
        found,
    }
}

#[cold]
pub fn ternary_condition(found: ValueKind) -> EvalError {
    EvalError::TernaryCondition { found }
}

// Arithmetic

#[cold]
pub fn integer_overflow(op: &str) -> EvalError {
    EvalError::IntegerOverflow { op: op.to_string() }
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::DivisionByZero
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::ModuloByZero
}

// Identifiers and members

#[cold]
pub fn undefined_identifier(name: &str) -> EvalError {
    EvalError::UndefinedIdentifier {
        name: name.to_string(),
    }
}

#[cold]
pub fn unknown_member(owner: &ObjectRef, name: &str) -> EvalError {
    EvalError::UnknownMember {
        owner: owner.type_name().to_string(),
        name: name.to_string(),
    }
}

#[cold]
pub fn unassignable_identifier(name: &str) -> EvalError {
    EvalError::UnassignableIdentifier {
        name: name.to_string(),
    }
}

#[cold]
pub fn invalid_assignment_target() -> EvalError {
    EvalError::InvalidAssignmentTarget
}

#[cold]
pub fn invalid_member_owner(found: ValueKind) -> EvalError {
    EvalError::InvalidMemberOwner { found }
}

#[cold]
pub fn invalid_member_operand() -> EvalError {
    EvalError::InvalidMemberOperand
}

#[cold]
pub fn index_out_of_range(index: i32, len: usize) -> EvalError {
    EvalError::IndexOutOfRange { index, len }
}

// Objects

#[cold]
pub fn unknown_object_type(type_name: &str) -> EvalError {
    EvalError::UnknownObjectType {
        type_name: type_name.to_string(),
    }
}

#[cold]
pub fn invalid_field_init() -> EvalError {
    EvalError::InvalidFieldInit
}

#[cold]
pub fn field_init(type_name: &str, field: &str, reason: impl Into<String>) -> EvalError {
    EvalError::FieldInit {
        type_name: type_name.to_string(),
        field: field.to_string(),
        reason: reason.into(),
    }
}

// Types

#[cold]
pub fn type_mismatch(expected: ValueKind, found: ValueKind) -> EvalError {
    EvalError::TypeMismatch { expected, found }
}

#[cold]
pub fn null_reference() -> EvalError {
    EvalError::NullReference
}

#[cold]
pub fn conversion(from: &str, to: &str, reason: impl Into<String>) -> EvalError {
    EvalError::Conversion {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.into(),
    }
}
