//! Host-registered value conversions.
//!
//! A converter maps values of one Rust type to another, keyed by the pair of
//! `TypeId`s. Argument binding consults the registry before handing a value
//! to a native function, so a host can accept e.g. a `float` where its
//! function takes a custom object.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use cdl_ir::Value;
use rustc_hash::FxHashMap;

use crate::errors::EvalResult;

type Converter = Arc<dyn Fn(Value) -> EvalResult<Value> + Send + Sync>;

#[derive(Default, Clone)]
pub struct ConverterRegistry {
    converters: FxHashMap<(TypeId, TypeId), Converter>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a conversion from `S` to `D`, replacing any existing one.
    pub fn register<S, D, F>(&mut self, convert: F)
    where
        S: 'static,
        D: 'static,
        F: Fn(Value) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.converters
            .insert((TypeId::of::<S>(), TypeId::of::<D>()), Arc::new(convert));
    }

    /// Returns `true` if a conversion was registered.
    pub fn unregister<S: 'static, D: 'static>(&mut self) -> bool {
        self.converters
            .remove(&(TypeId::of::<S>(), TypeId::of::<D>()))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// Converts `value` toward the Rust type `target`.
    ///
    /// Values already of the target type, values with no Rust type (`Void`,
    /// `Null`) and pairs with no registered converter pass through unchanged.
    pub fn convert(&self, value: Value, target: TypeId) -> EvalResult<Value> {
        let Some(source) = source_type_id(&value) else {
            return Ok(value);
        };
        if source == target {
            return Ok(value);
        }
        match self.converters.get(&(source, target)) {
            Some(convert) => convert(value),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("len", &self.converters.len())
            .finish()
    }
}

/// Rust type a value is stored as.
pub fn source_type_id(value: &Value) -> Option<TypeId> {
    match value {
        Value::Void | Value::Null => None,
        Value::Int(_) => Some(TypeId::of::<i32>()),
        Value::Float(_) => Some(TypeId::of::<f32>()),
        Value::Bool(_) => Some(TypeId::of::<bool>()),
        Value::Str(_) => Some(TypeId::of::<String>()),
        Value::Object(obj) => Some(obj.concrete_type_id()),
    }
}
