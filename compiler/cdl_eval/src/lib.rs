//! CDL Eval - evaluation of CDL expression trees.
//!
//! This crate contains:
//! - [`EvaluationStack`], the dual-region stack every value passes through
//! - [`Evaluator`], which walks a [`Node`](cdl_ir::Node) tree and resolves
//!   identifiers through host-registered [`ValueSelector`]s
//! - operator semantics ([`evaluate_binary`], [`evaluate_unary`])
//! - constant folding ([`Evaluator::optimize`])
//! - host extension points: [`ObjectInitializer`] and [`ConverterRegistry`]

mod convert;
pub mod errors;
mod evaluator;
mod initializer;
mod operators;
mod optimize;
mod selector;
mod stack;
mod unary_operators;
mod value_info;

pub use convert::{source_type_id, ConverterRegistry};
pub use errors::{CapacityError, EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use initializer::{DefaultInitializer, ObjectInitializer};
pub use operators::{evaluate_binary, float_eq, promote};
pub use selector::{FnSelector, SelectorId, ValueSelector};
pub use stack::{EvaluationStack, Scalar, StackConfig, StackMark};
pub use unary_operators::evaluate_unary;
pub use value_info::ValueInfo;
