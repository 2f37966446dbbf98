//! Return-value modifiers, applied to an instruction's result after its
//! function returns.

use std::fmt;
use std::sync::Arc;

use cdl_eval::{evaluate_unary, ValueInfo};
use cdl_ir::{OpCode, ValueKind};

use crate::error::{unsupported_modifier_kind, Result};
use crate::Context;

pub trait Modifier<C: Context>: Send + Sync {
    fn name(&self) -> &str;

    /// Consumes the value `value` describes and leaves its replacement on
    /// the stack.
    fn apply(&self, ctx: &mut C, value: ValueInfo) -> Result<ValueInfo>;
}

/// Arithmetic negation for numbers, logical negation for booleans.
#[derive(Copy, Clone, Debug, Default)]
pub struct ValueNegator;

impl ValueNegator {
    pub const NAME: &'static str = "neg";
}

impl<C: Context> Modifier<C> for ValueNegator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, ctx: &mut C, value: ValueInfo) -> Result<ValueInfo> {
        let op = match value.kind {
            ValueKind::Int | ValueKind::Float => OpCode::Neg,
            ValueKind::Bool => OpCode::Not,
            kind => return Err(unsupported_modifier_kind(Self::NAME, kind).into()),
        };
        let evaluator = ctx.evaluator();
        let operand = evaluator.pop_value(value)?;
        let negated = evaluate_unary(op, operand)?;
        Ok(evaluator.push_value(negated)?)
    }
}

type ModifierBody<C> = dyn Fn(&mut C, ValueInfo) -> Result<ValueInfo> + Send + Sync;

/// Modifier backed by a closure.
pub struct FnModifier<C> {
    name: Arc<str>,
    apply: Box<ModifierBody<C>>,
}

impl<C: Context> FnModifier<C> {
    pub fn new<F>(name: impl Into<Arc<str>>, apply: F) -> Self
    where
        F: Fn(&mut C, ValueInfo) -> Result<ValueInfo> + Send + Sync + 'static,
    {
        FnModifier {
            name: name.into(),
            apply: Box::new(apply),
        }
    }
}

impl<C: Context> Modifier<C> for FnModifier<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, ctx: &mut C, value: ValueInfo) -> Result<ValueInfo> {
        (self.apply)(ctx, value)
    }
}

impl<C> fmt::Debug for FnModifier<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModifier")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
