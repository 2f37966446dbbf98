//! Errors raised by the facade, and the umbrella [`Error`] every public
//! entry point returns.

use cdl_eval::{CapacityError, EvalError};
use cdl_ir::ValueKind;
use cdl_lexer::LexError;
use cdl_parse::ParseError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure to bind an instruction to its function, arguments or result.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("undefined function `{name}`")]
    UndefinedFunction { name: String },
    #[error("undefined return modifier `{name}`")]
    UndefinedModifier { name: String },
    #[error("insufficient argument count for `{function}`: {needed} required, {given} given")]
    InsufficientArguments {
        function: String,
        needed: usize,
        given: usize,
    },
    #[error("argument {index} of `{function}` expects {expected}, found {found}")]
    ArgumentType {
        function: String,
        index: usize,
        expected: &'static str,
        found: ValueKind,
    },
    #[error("expected a result of type {expected}, found {found}")]
    ReturnTypeMismatch {
        expected: &'static str,
        found: ValueKind,
    },
    #[error("return modifier `{modifier}` does not support {kind}")]
    UnsupportedModifierKind { modifier: String, kind: ValueKind },
    #[error("`{function}` failed: {message}")]
    NativeFailure { function: String, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl From<CapacityError> for Error {
    fn from(err: CapacityError) -> Self {
        Error::Eval(err.into())
    }
}

#[cold]
pub fn undefined_function(name: &str) -> BindingError {
    BindingError::UndefinedFunction {
        name: name.to_string(),
    }
}

#[cold]
pub fn undefined_modifier(name: &str) -> BindingError {
    BindingError::UndefinedModifier {
        name: name.to_string(),
    }
}

#[cold]
pub fn insufficient_arguments(function: &str, needed: usize, given: usize) -> BindingError {
    BindingError::InsufficientArguments {
        function: function.to_string(),
        needed,
        given,
    }
}

#[cold]
pub fn argument_type(
    function: &str,
    index: usize,
    expected: &'static str,
    found: ValueKind,
) -> BindingError {
    BindingError::ArgumentType {
        function: function.to_string(),
        index,
        expected,
        found,
    }
}

#[cold]
pub fn return_type_mismatch(expected: &'static str, found: ValueKind) -> BindingError {
    BindingError::ReturnTypeMismatch { expected, found }
}

#[cold]
pub fn unsupported_modifier_kind(modifier: &str, kind: ValueKind) -> BindingError {
    BindingError::UnsupportedModifierKind {
        modifier: modifier.to_string(),
        kind,
    }
}

#[cold]
pub fn native_failure(function: &str, message: impl std::fmt::Display) -> BindingError {
    BindingError::NativeFailure {
        function: function.to_string(),
        message: message.to_string(),
    }
}
