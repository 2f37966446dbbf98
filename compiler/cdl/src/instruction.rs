//! A parsed, reusable function call.

use std::fmt;
use std::sync::Arc;

use cdl_eval::ValueInfo;
use cdl_ir::Node;

use crate::binding::{pop_as, FromValue};
use crate::error::Result;
use crate::{Context, Function, Modifier};

/// Function, argument trees and return modifiers bound from one line of
/// source.
///
/// Build once, optionally [`optimize`](Self::optimize), then execute any
/// number of times. Execution only reads the instruction, so one instance
/// may be shared across threads as long as each execution brings its own
/// context.
pub struct Instruction<C: Context> {
    source: Arc<str>,
    function: Arc<dyn Function<C>>,
    parameters: Box<[Node]>,
    modifiers: Box<[Arc<dyn Modifier<C>>]>,
    optimized: bool,
}

impl<C: Context> Instruction<C> {
    pub(crate) fn new(
        source: Arc<str>,
        function: Arc<dyn Function<C>>,
        parameters: Vec<Node>,
        modifiers: Vec<Arc<dyn Modifier<C>>>,
    ) -> Self {
        Instruction {
            source,
            function,
            parameters: parameters.into_boxed_slice(),
            modifiers: modifiers.into_boxed_slice(),
            optimized: false,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn source_arc(&self) -> &Arc<str> {
        &self.source
    }

    pub fn function_name(&self) -> &str {
        self.function.name()
    }

    pub fn parameters(&self) -> &[Node] {
        &self.parameters
    }

    pub fn modifier_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.modifiers.iter().map(|m| m.name())
    }

    pub fn is_optimized(&self) -> bool {
        self.optimized
    }

    /// Constant-folds every parameter. Later calls do nothing.
    ///
    /// On error the instruction is left unchanged.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %self.source))]
    pub fn optimize(&mut self, ctx: &mut C) -> Result<()> {
        if self.optimized {
            return Ok(());
        }
        let evaluator = ctx.evaluator();
        let parameters = self
            .parameters
            .iter()
            .map(|param| evaluator.optimize(param.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        self.parameters = parameters.into_boxed_slice();
        self.optimized = true;
        Ok(())
    }

    /// Invokes the function, then the return modifiers in order.
    ///
    /// The result is left on the stack. On error the stack is restored to
    /// its height before the call.
    #[tracing::instrument(level = "debug", skip_all, fields(function = %self.function.name()))]
    pub fn execute(&self, ctx: &mut C) -> Result<ValueInfo> {
        let mark = ctx.evaluator().stack().mark();
        let result = self.execute_inner(ctx);
        if let Err(err) = &result {
            tracing::debug!(%err, "instruction failed");
            ctx.evaluator().stack_mut().reset_to(mark);
        }
        result
    }

    fn execute_inner(&self, ctx: &mut C) -> Result<ValueInfo> {
        ctx.on_execute_instruction(self);
        let mut result = self.function.invoke(ctx, &self.parameters)?;
        for modifier in self.modifiers.iter() {
            result = modifier.apply(ctx, result)?;
        }
        ctx.on_instruction_evaluated(self, result);
        Ok(result)
    }

    /// Executes and pops the result as a `T`; a result of another kind is a
    /// [`BindingError::ReturnTypeMismatch`](crate::BindingError).
    pub fn execute_as<T: FromValue>(&self, ctx: &mut C) -> Result<T> {
        let info = self.execute(ctx)?;
        pop_as(ctx.evaluator(), info)
    }
}

impl<C: Context> fmt::Debug for Instruction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("source", &self.source)
            .field("function", &self.function.name())
            .field("parameters", &self.parameters)
            .field("modifiers", &self.modifier_names().collect::<Vec<_>>())
            .field("optimized", &self.optimized)
            .finish()
    }
}
