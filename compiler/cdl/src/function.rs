//! Functions callable from instructions.
//!
//! A [`StandardFunction`] receives the raw argument trees and evaluates them
//! itself. A [`ConvertedFunction`] wraps an ordinary Rust function: its
//! arguments are evaluated, converted and bound to the native parameters,
//! and its return value is pushed back. The adaptation is generated at
//! compile time for functions of up to six parameters, optionally preceded
//! by `&mut C` for the context.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use cdl_eval::{Evaluator, ValueInfo};
use cdl_ir::{Node, Value};
use smallvec::SmallVec;

use crate::binding::{FromValue, IntoReturn};
use crate::error::{argument_type, insufficient_arguments, Result};
use crate::Context;

/// Evaluated arguments of one native call.
pub type ArgBuffer = SmallVec<[Value; 4]>;

pub trait Function<C: Context>: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the function and returns the descriptor of its result, which is
    /// left on the stack.
    fn invoke(&self, ctx: &mut C, args: &[Node]) -> Result<ValueInfo>;
}

type StandardBody<C> = dyn Fn(&mut C, &[Node]) -> Result<ValueInfo> + Send + Sync;

/// Function that works on the argument trees directly.
pub struct StandardFunction<C> {
    name: Arc<str>,
    body: Box<StandardBody<C>>,
}

impl<C: Context> StandardFunction<C> {
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&mut C, &[Node]) -> Result<ValueInfo> + Send + Sync + 'static,
    {
        StandardFunction {
            name: name.into(),
            body: Box::new(body),
        }
    }
}

impl<C: Context> Function<C> for StandardFunction<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut C, args: &[Node]) -> Result<ValueInfo> {
        (self.body)(ctx, args)
    }
}

impl<C> fmt::Debug for StandardFunction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Native function callable with evaluated arguments.
pub trait NativeFn<Args, R>: Send + Sync + 'static {
    const ARITY: usize;

    fn call(&self, function: &str, evaluator: &mut Evaluator, args: ArgBuffer) -> Result<R>;
}

/// Native function taking the context as its first parameter.
pub trait ContextFn<C, Args, R>: Send + Sync + 'static {
    const ARITY: usize;

    fn call(&self, function: &str, ctx: &mut C, args: ArgBuffer) -> Result<R>;
}

/// Converts and binds argument `index`.
fn bind_arg<T: FromValue>(
    function: &str,
    index: usize,
    evaluator: &Evaluator,
    value: Option<Value>,
) -> Result<T> {
    let value = evaluator.convert_value(value.unwrap_or_default(), TypeId::of::<T>())?;
    let found = value.kind();
    T::from_value(value).ok_or_else(|| argument_type(function, index, T::type_label(), found).into())
}

macro_rules! impl_native_fn {
    ($arity:literal; $($index:literal $arg:ident),*) => {
        impl<Fun, R, $($arg,)*> NativeFn<($($arg,)*), R> for Fun
        where
            Fun: Fn($($arg),*) -> R + Send + Sync + 'static,
            $($arg: FromValue,)*
        {
            const ARITY: usize = $arity;

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, function: &str, evaluator: &mut Evaluator, args: ArgBuffer) -> Result<R> {
                let mut args = args.into_iter();
                $(let $arg = bind_arg::<$arg>(function, $index, evaluator, args.next())?;)*
                Ok((self)($($arg),*))
            }
        }

        impl<C, Fun, R, $($arg,)*> ContextFn<C, ($($arg,)*), R> for Fun
        where
            C: Context,
            Fun: Fn(&mut C, $($arg),*) -> R + Send + Sync + 'static,
            $($arg: FromValue,)*
        {
            const ARITY: usize = $arity;

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn call(&self, function: &str, ctx: &mut C, args: ArgBuffer) -> Result<R> {
                let mut args = args.into_iter();
                $(let $arg = bind_arg::<$arg>(function, $index, ctx.evaluator(), args.next())?;)*
                Ok((self)(ctx, $($arg),*))
            }
        }
    };
}

impl_native_fn!(0;);
impl_native_fn!(1; 0 A0);
impl_native_fn!(2; 0 A0, 1 A1);
impl_native_fn!(3; 0 A0, 1 A1, 2 A2);
impl_native_fn!(4; 0 A0, 1 A1, 2 A2, 3 A3);
impl_native_fn!(5; 0 A0, 1 A1, 2 A2, 3 A3, 4 A4);
impl_native_fn!(6; 0 A0, 1 A1, 2 A2, 3 A3, 4 A4, 5 A5);

type NativeCall<C> = dyn Fn(&mut C, &str, ArgBuffer) -> Result<ValueInfo> + Send + Sync;

/// Native Rust function adapted to the instruction calling convention.
///
/// Arguments beyond the native arity are ignored. Missing trailing
/// arguments take the values given to [`with_defaults`](Self::with_defaults);
/// anything else missing fails before any argument is evaluated.
pub struct ConvertedFunction<C> {
    name: Arc<str>,
    arity: usize,
    needs_context: bool,
    defaults: Vec<Value>,
    call: Box<NativeCall<C>>,
}

impl<C: Context> ConvertedFunction<C> {
    pub fn new<Args, R, F>(name: impl Into<Arc<str>>, native: F) -> Self
    where
        Args: 'static,
        R: IntoReturn,
        F: NativeFn<Args, R>,
    {
        let call = move |ctx: &mut C, function: &str, args: ArgBuffer| {
            let evaluator = ctx.evaluator();
            let result = native.call(function, evaluator, args)?;
            result.into_return(function, evaluator)
        };
        ConvertedFunction {
            name: name.into(),
            arity: F::ARITY,
            needs_context: false,
            defaults: Vec::new(),
            call: Box::new(call),
        }
    }

    pub fn with_context<Args, R, F>(name: impl Into<Arc<str>>, native: F) -> Self
    where
        Args: 'static,
        R: IntoReturn,
        F: ContextFn<C, Args, R>,
    {
        let call = move |ctx: &mut C, function: &str, args: ArgBuffer| {
            let result = native.call(function, ctx, args)?;
            result.into_return(function, ctx.evaluator())
        };
        ConvertedFunction {
            name: name.into(),
            arity: F::ARITY,
            needs_context: true,
            defaults: Vec::new(),
            call: Box::new(call),
        }
    }

    /// Default values for the trailing parameters, in parameter order.
    #[must_use]
    pub fn with_defaults(mut self, defaults: impl IntoIterator<Item = Value>) -> Self {
        self.defaults = defaults.into_iter().collect();
        let excess = self.defaults.len().saturating_sub(self.arity);
        self.defaults.drain(..excess);
        self
    }

    /// Native parameters, not counting the context.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn needs_context(&self) -> bool {
        self.needs_context
    }

    pub fn required_arguments(&self) -> usize {
        self.arity - self.defaults.len()
    }
}

impl<C: Context> Function<C> for ConvertedFunction<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, ctx: &mut C, args: &[Node]) -> Result<ValueInfo> {
        let required = self.required_arguments();
        if args.len() < required {
            return Err(insufficient_arguments(&self.name, required, args.len()).into());
        }

        let mut values = ArgBuffer::with_capacity(self.arity);
        for arg in args.iter().take(self.arity) {
            values.push(ctx.evaluator().eval_value(arg)?);
        }
        let missing = self.arity - values.len();
        let first_default = self.defaults.len() - missing;
        values.extend(self.defaults[first_default..].iter().cloned());

        (self.call)(ctx, &self.name, values)
    }
}

impl<C> fmt::Debug for ConvertedFunction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("needs_context", &self.needs_context)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
