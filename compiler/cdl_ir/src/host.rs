//! Host object seam.
//!
//! Host applications hand arbitrary Rust values to expressions by
//! implementing [`HostObject`]. The engine only ever sees them through an
//! [`ObjectRef`], and asks two optional capability questions:
//!
//! - [`HostObject::as_collection`]: answers `.Count` and `obj.3` indexing
//! - [`HostObject::as_member_selector`]: resolves `obj.name` itself instead
//!   of going through the globally registered value selectors
//!
//! Typed vectors (`Vec<i32>`, `Vec<f32>`, `Vec<bool>`, `Vec<String>`) and
//! untyped `Vec<Value>` are host objects out of the box; list literals
//! evaluate to them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{Value, ValueKind};

/// Upcast helper so `dyn HostObject` can be downcast to its concrete type.
///
/// Blanket-implemented for every `Any + Send + Sync` type.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A host value that can flow through expressions as an `Object`.
pub trait HostObject: AsAny + fmt::Debug {
    /// Name used in error messages and in the default string form.
    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Indexable view, if this object is a sequence.
    fn as_collection(&self) -> Option<&dyn HostCollection> {
        None
    }

    /// Member resolution owned by the object itself.
    fn as_member_selector(&self) -> Option<&dyn MemberSelector> {
        None
    }

    /// String form used when the object is concatenated onto a string.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Sequence capability of a host object.
pub trait HostCollection {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, `None` when out of range.
    fn element(&self, index: usize) -> Option<Value>;

    /// Kind shared by every element; `Object` for heterogeneous lists.
    fn element_kind(&self) -> ValueKind;
}

/// Member-resolution capability of a host object.
///
/// When the owner of a `.` access implements this, it is the only resolver
/// consulted for that access.
pub trait MemberSelector {
    fn select_member(&self, name: &str) -> Option<Value>;

    /// Write `value` to member `name`. Returns `false` if the member is not
    /// assignable. Objects are shared, so writes go through interior
    /// mutability.
    fn assign_member(&self, name: &str, value: &Value) -> bool {
        let _ = (name, value);
        false
    }
}

/// Strip the module path from a `std::any::type_name` string.
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Shared reference to a host object.
///
/// Equality is identity: two refs are equal when they point at the same
/// allocation.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn HostObject>);

impl ObjectRef {
    pub fn new<T: HostObject>(value: T) -> Self {
        ObjectRef(Arc::new(value))
    }

    pub fn from_arc(inner: Arc<dyn HostObject>) -> Self {
        ObjectRef(inner)
    }

    pub fn from_boxed(inner: Box<dyn HostObject>) -> Self {
        ObjectRef(Arc::from(inner))
    }

    /// Borrow as a trait object.
    ///
    /// Goes through `&dyn HostObject` explicitly: calling `as_any` on the
    /// `Arc` itself would pick the blanket impl for the `Arc`.
    #[inline]
    pub fn as_host(&self) -> &dyn HostObject {
        &*self.0
    }

    pub fn type_name(&self) -> &str {
        self.as_host().type_name()
    }

    pub fn as_collection(&self) -> Option<&dyn HostCollection> {
        self.as_host().as_collection()
    }

    pub fn as_member_selector(&self) -> Option<&dyn MemberSelector> {
        self.as_host().as_member_selector()
    }

    pub fn is<T: HostObject>(&self) -> bool {
        self.as_host().as_any().is::<T>()
    }

    pub fn downcast_ref<T: HostObject>(&self) -> Option<&T> {
        self.as_host().as_any().downcast_ref::<T>()
    }

    /// Owned handle to the concrete object, sharing the allocation.
    pub fn downcast<T: HostObject>(&self) -> Option<Arc<T>> {
        AsAny::into_any_arc(Arc::clone(&self.0)).downcast::<T>().ok()
    }

    /// `TypeId` of the concrete host type.
    pub fn concrete_type_id(&self) -> std::any::TypeId {
        self.as_host().as_any().type_id()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::as_ptr(&self.0).cast::<()>() == Arc::as_ptr(&other.0).cast::<()>()
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectRef").field(&self.as_host()).finish()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_host().describe(f)
    }
}

impl<T: HostObject> From<Arc<T>> for ObjectRef {
    fn from(inner: Arc<T>) -> Self {
        ObjectRef(inner)
    }
}

// Built-in collections

impl HostObject for Vec<i32> {
    fn type_name(&self) -> &str {
        "List<int>"
    }

    fn as_collection(&self) -> Option<&dyn HostCollection> {
        Some(self)
    }
}

impl HostCollection for Vec<i32> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<Value> {
        self.get(index).copied().map(Value::Int)
    }

    fn element_kind(&self) -> ValueKind {
        ValueKind::Int
    }
}

impl HostObject for Vec<f32> {
    fn type_name(&self) -> &str {
        "List<float>"
    }

    fn as_collection(&self) -> Option<&dyn HostCollection> {
        Some(self)
    }
}

impl HostCollection for Vec<f32> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<Value> {
        self.get(index).copied().map(Value::Float)
    }

    fn element_kind(&self) -> ValueKind {
        ValueKind::Float
    }
}

impl HostObject for Vec<bool> {
    fn type_name(&self) -> &str {
        "List<bool>"
    }

    fn as_collection(&self) -> Option<&dyn HostCollection> {
        Some(self)
    }
}

impl HostCollection for Vec<bool> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<Value> {
        self.get(index).copied().map(Value::Bool)
    }

    fn element_kind(&self) -> ValueKind {
        ValueKind::Bool
    }
}

impl HostObject for Vec<String> {
    fn type_name(&self) -> &str {
        "List<string>"
    }

    fn as_collection(&self) -> Option<&dyn HostCollection> {
        Some(self)
    }
}

impl HostCollection for Vec<String> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<Value> {
        self.get(index).map(|s| Value::from(s.as_str()))
    }

    fn element_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

impl HostObject for Vec<Value> {
    fn type_name(&self) -> &str {
        "List<object>"
    }

    fn as_collection(&self) -> Option<&dyn HostCollection> {
        Some(self)
    }
}

impl HostCollection for Vec<Value> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<Value> {
        self.get(index).cloned()
    }

    fn element_kind(&self) -> ValueKind {
        ValueKind::Object
    }
}
