//! CDL IR - data types shared by every stage of the engine.
//!
//! This crate contains:
//! - [`Span`] for byte ranges in instruction text
//! - [`Token`] / [`TokenKind`] produced by the lexer
//! - [`OpCode`], the closed operator set understood by the evaluator
//! - [`ValueKind`] and [`Value`], the tagged runtime value model
//! - [`HostObject`] / [`ObjectRef`], the seam through which host types enter
//! - [`Node`], the expression tree built by the parser
//!
//! Nothing here evaluates anything; the types are deliberately inert so the
//! parser can be used without pulling in the evaluation stack.

/// Compile-time assertion that a type has a specific size.
///
/// Used to keep hot-path types from growing unnoticed.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod ast;
mod host;
mod op;
mod span;
mod token;
mod value;

pub use ast::Node;
pub use host::{AsAny, HostCollection, HostObject, MemberSelector, ObjectRef};
pub use op::OpCode;
pub use span::Span;
pub use token::{Token, TokenKind};
pub use value::{Value, ValueKind};
