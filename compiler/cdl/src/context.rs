//! The runtime an instruction executes against.

use std::sync::Arc;

use cdl_eval::{Evaluator, StackConfig, ValueInfo};

use crate::Instruction;

/// Host runtime: owns the evaluator and observes instruction execution.
///
/// One context must not be used by two executions at once. Functions and
/// modifiers receive it mutably, so a host can keep per-run state next to
/// the evaluator.
pub trait Context: 'static {
    fn evaluator(&mut self) -> &mut Evaluator;

    /// Called before the instruction's function is invoked.
    fn on_execute_instruction(&mut self, instruction: &Instruction<Self>)
    where
        Self: Sized,
    {
        let _ = instruction;
    }

    /// Called with the final result, after return modifiers ran.
    fn on_instruction_evaluated(&mut self, instruction: &Instruction<Self>, result: ValueInfo)
    where
        Self: Sized,
    {
        let _ = (instruction, result);
    }
}

/// Context with nothing but an evaluator. Remembers which instruction is
/// executing.
#[derive(Debug, Default)]
pub struct BasicContext {
    evaluator: Evaluator,
    executing: Option<Arc<str>>,
    last_result: Option<ValueInfo>,
}

impl BasicContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StackConfig) -> Self {
        BasicContext {
            evaluator: Evaluator::with_config(config),
            executing: None,
            last_result: None,
        }
    }

    /// Source text of the instruction currently executing.
    pub fn executing(&self) -> Option<&str> {
        self.executing.as_deref()
    }

    /// Result of the last instruction that completed.
    pub fn last_result(&self) -> Option<ValueInfo> {
        self.last_result
    }

    /// Empties the evaluation stack. Required after a failed execution if
    /// the stack is inspected directly.
    pub fn clear(&mut self) {
        self.evaluator.clear_stack();
    }
}

impl Context for BasicContext {
    fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    fn on_execute_instruction(&mut self, instruction: &Instruction<Self>) {
        self.executing = Some(Arc::clone(instruction.source_arc()));
    }

    fn on_instruction_evaluated(&mut self, _instruction: &Instruction<Self>, result: ValueInfo) {
        self.executing = None;
        self.last_result = Some(result);
    }
}
