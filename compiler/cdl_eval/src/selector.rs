//! Host-provided identifier resolution.
//!
//! Identifiers are not declared in CDL source; every name is resolved by
//! asking the registered [`ValueSelector`]s, most recently registered first.

use cdl_ir::{ObjectRef, Value};

/// Resolves (and optionally assigns) identifiers for the evaluator.
///
/// `owner` is `Some` for the right-hand side of a member access whose owner
/// does not resolve members itself.
pub trait ValueSelector: Send + Sync {
    fn select_value(&self, owner: Option<&ObjectRef>, name: &str) -> Option<Value>;

    /// Stores `value` under `name`. Returns `false` when this selector does
    /// not own the identifier.
    fn assign_value(&self, owner: Option<&ObjectRef>, name: &str, value: &Value) -> bool {
        let _ = (owner, name, value);
        false
    }
}

/// Handle returned by selector registration, used to unregister.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SelectorId(pub(crate) u32);

/// Read-only selector backed by a closure.
pub struct FnSelector<F>(pub F);

impl<F> ValueSelector for FnSelector<F>
where
    F: Fn(Option<&ObjectRef>, &str) -> Option<Value> + Send + Sync,
{
    fn select_value(&self, owner: Option<&ObjectRef>, name: &str) -> Option<Value> {
        (self.0)(owner, name)
    }
}
