//! Native stack guard for the recursive passes of the engine.
//!
//! Expression trees are walked recursively three times over their lifetime:
//! once by the parser when it splices nested list and object literals, once
//! by the optimizer while folding, and once per execution by the evaluator.
//! Host-supplied text can nest arbitrarily deep, so each of those walks wraps
//! its recursive step in [`ensure_sufficient_stack`].
//!
//! On native targets the `stacker` crate allocates a fresh segment when the
//! remaining stack drops under [`RED_ZONE`]. On `wasm32` the guard is a plain
//! call.

/// Remaining stack below which a new segment is allocated (128KB).
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (1MB).
pub const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the native stack first if it is nearly exhausted.
///
/// ```text
/// fn eval_node(&mut self, node: &Node) -> EvalResult<ValueInfo> {
///     ensure_sufficient_stack(|| self.eval_node_inner(node))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
