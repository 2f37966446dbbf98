//! Moving values between the evaluation stack and native Rust types.
//!
//! [`FromValue`] turns a popped [`Value`] into a native argument or result;
//! [`IntoReturn`] pushes a native return value back onto the stack.

use std::fmt::Display;
use std::sync::Arc;

use cdl_eval::{Evaluator, ValueInfo};
use cdl_ir::{HostObject, ObjectRef, Value, ValueKind};

use crate::error::{native_failure, return_type_mismatch, Result};

/// Native type that can be read from a [`Value`].
pub trait FromValue: Sized + 'static {
    /// Kind a value must have to be returned as `Self` from
    /// [`Instruction::execute_as`](crate::Instruction::execute_as). `None`
    /// accepts any kind.
    fn expected_kind() -> Option<ValueKind>;

    /// Conversion used for arguments and results. Lenient where the
    /// language is: `float` parameters accept `int`, `string` parameters
    /// accept any scalar.
    fn from_value(value: Value) -> Option<Self>;

    fn type_label() -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl FromValue for i32 {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Int)
    }

    /// Floats round half to even.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(v),
            Value::Float(v) => {
                let rounded = v.round_ties_even();
                let in_range = rounded >= -2_147_483_648.0 && rounded < 2_147_483_648.0;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "range checked, value already rounded"
                )]
                let narrowed = rounded as i32;
                in_range.then_some(narrowed)
            }
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Float)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            Value::Int(v) => Some(cdl_eval::promote(v)),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Bool)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for String {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::String)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.to_string()),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn expected_kind() -> Option<ValueKind> {
        None
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for ObjectRef {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Object)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

/// `null` binds to `None`.
impl FromValue for Option<ObjectRef> {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Object)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(obj) => Some(Some(obj)),
            Value::Null => Some(None),
            _ => None,
        }
    }
}

impl<T: HostObject> FromValue for Arc<T> {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Object)
    }

    fn from_value(value: Value) -> Option<Self> {
        value.as_object()?.downcast::<T>()
    }
}

impl FromValue for () {
    fn expected_kind() -> Option<ValueKind> {
        Some(ValueKind::Void)
    }

    fn from_value(value: Value) -> Option<Self> {
        matches!(value, Value::Void).then_some(())
    }
}

/// Native return value that can be pushed onto the stack.
pub trait IntoReturn: 'static {
    fn into_return(self, function: &str, evaluator: &mut Evaluator) -> Result<ValueInfo>;
}

impl IntoReturn for () {
    fn into_return(self, _: &str, _: &mut Evaluator) -> Result<ValueInfo> {
        Ok(ValueInfo::VOID)
    }
}

impl IntoReturn for i32 {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_int(self)?)
    }
}

impl IntoReturn for f32 {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_float(self)?)
    }
}

impl IntoReturn for bool {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_bool(self)?)
    }
}

impl IntoReturn for String {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_value(Value::from(self))?)
    }
}

impl IntoReturn for &'static str {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_value(Value::from(self))?)
    }
}

impl IntoReturn for Value {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_value(self)?)
    }
}

impl IntoReturn for ObjectRef {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_value(Value::Object(self))?)
    }
}

impl IntoReturn for Option<ObjectRef> {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        let value = self.map_or(Value::Null, Value::Object);
        Ok(evaluator.push_value(value)?)
    }
}

impl<T: HostObject> IntoReturn for Arc<T> {
    fn into_return(self, _: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        Ok(evaluator.push_value(Value::Object(ObjectRef::from(self)))?)
    }
}

/// `Err` becomes a [`BindingError::NativeFailure`](crate::BindingError).
impl<R: IntoReturn, E: Display + 'static> IntoReturn for std::result::Result<R, E> {
    fn into_return(self, function: &str, evaluator: &mut Evaluator) -> Result<ValueInfo> {
        match self {
            Ok(value) => value.into_return(function, evaluator),
            Err(err) => Err(native_failure(function, err).into()),
        }
    }
}

/// Pops the value `info` describes as a `T`, checking its kind first.
pub fn pop_as<T: FromValue>(evaluator: &mut Evaluator, info: ValueInfo) -> Result<T> {
    if let Some(expected) = T::expected_kind() {
        if expected != info.kind {
            evaluator.remove_top(info)?;
            return Err(return_type_mismatch(T::type_label(), info.kind).into());
        }
    }
    let value = evaluator.pop_value(info)?;
    T::from_value(value).ok_or_else(|| return_type_mismatch(T::type_label(), info.kind).into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests can panic")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BindingError;
    use crate::Error;

    #[derive(Debug)]
    struct Probe;

    impl HostObject for Probe {}

    #[test]
    fn float_to_int_rounds_half_to_even() {
        assert_eq!(i32::from_value(Value::Float(2.5)), Some(2));
        assert_eq!(i32::from_value(Value::Float(3.5)), Some(4));
        assert_eq!(i32::from_value(Value::Float(-0.5)), Some(0));
        assert_eq!(i32::from_value(Value::Float(1e10)), None);
    }

    #[test]
    fn lenient_argument_conversions() {
        assert_eq!(f32::from_value(Value::Int(3)), Some(3.0));
        assert_eq!(String::from_value(Value::Float(0.5)), Some("0.5".to_string()));
        assert_eq!(bool::from_value(Value::Int(1)), None);
        assert_eq!(Option::<ObjectRef>::from_value(Value::Null), Some(None));
    }

    #[test]
    fn host_objects_downcast() {
        let value = Value::Object(ObjectRef::new(Probe));
        assert!(Arc::<Probe>::from_value(value.clone()).is_some());
        assert!(Arc::<Vec<i32>>::from_value(value).is_none());
    }

    #[test]
    fn pop_as_checks_the_kind() {
        let mut ev = Evaluator::default();
        let info = ev.push_int(3).unwrap();
        assert!(matches!(
            pop_as::<f32>(&mut ev, info),
            Err(Error::Binding(BindingError::ReturnTypeMismatch {
                found: ValueKind::Int,
                ..
            }))
        ));
        assert!(ev.stack().is_empty());

        let info = ev.push_value(Value::from("s")).unwrap();
        assert_eq!(pop_as::<Value>(&mut ev, info), Ok(Value::from("s")));
    }

    #[test]
    fn native_errors_name_the_function() {
        let mut ev = Evaluator::default();
        let result: std::result::Result<i32, String> = Err("boom".into());
        assert_eq!(
            result.into_return("Explode", &mut ev),
            Err(Error::Binding(BindingError::NativeFailure {
                function: "Explode".into(),
                message: "boom".into()
            }))
        );
    }
}
