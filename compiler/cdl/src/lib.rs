//! CDL - an embeddable expression and instruction language.
//!
//! An instruction is a function name followed by comma separated argument
//! expressions and optional return modifiers:
//!
//! ```text
//! SetPosition: player.X + 1, clamp ? 0 : player.Y -> neg
//! ```
//!
//! The [`Interpreter`] owns the function and modifier registries and turns
//! such text into [`Instruction`]s: tokenized by `cdl_lexer`, parsed by
//! `cdl_parse`, constant-folded and evaluated by `cdl_eval`. Instructions
//! run against a host [`Context`], which owns the evaluator and with it the
//! value selectors, object initializers and value converters the host
//! registered.
//!
//! # Example
//!
//! ```
//! use cdl::{BasicContext, Interpreter};
//!
//! let mut interpreter = Interpreter::<BasicContext>::new();
//! interpreter.register_native_function("Add", |a: i32, b: i32| a + b);
//!
//! let mut ctx = BasicContext::new();
//! let sum: i32 = interpreter.execute_as(&mut ctx, "Add: 2 ^ 3, 1").unwrap();
//! assert_eq!(sum, 9);
//! ```
//!
//! # Debugging
//!
//! Call [`init_tracing`] once and set `RUST_LOG`, e.g.
//! `RUST_LOG=cdl=debug,cdl_eval=trace`. Set `CDL_LOG_TREE` as well for
//! indented, span-nested output.

mod binding;
mod context;
mod error;
mod function;
mod instruction;
mod interpreter;
mod modifier;
mod print_handler;

use std::sync::Once;

pub use binding::{pop_as, FromValue, IntoReturn};
pub use context::{BasicContext, Context};
pub use error::{BindingError, Error, Result};
pub use function::{ArgBuffer, ContextFn, ConvertedFunction, Function, NativeFn, StandardFunction};
pub use instruction::Instruction;
pub use interpreter::{Interpreter, InterpreterBuilder, DEFAULT_CACHE_CAPACITY, EVALUATE, PRINT};
pub use modifier::{FnModifier, Modifier, ValueNegator};
pub use print_handler::{PrintHandler, SharedPrintHandler};

pub use cdl_eval::{
    CapacityError, DefaultInitializer, EvalError, Evaluator, FnSelector, ObjectInitializer,
    SelectorId, StackConfig, ValueInfo, ValueSelector,
};
pub use cdl_ir::{
    HostCollection, HostObject, MemberSelector, Node, ObjectRef, OpCode, Value, ValueKind,
};
pub use cdl_lexer::LexError;
pub use cdl_parse::ParseError;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call multiple times, and
/// leaves an already installed global subscriber alone.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let installed = if std::env::var("CDL_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("global subscriber already installed");
        }
    });
}
