//! Runtime value model.
//!
//! Every value the engine produces has one of six [`ValueKind`]s. Scalars
//! (`Int`, `Float`, `Bool`) live unboxed in the evaluation stack arena;
//! strings and objects live in its object table. [`Value`] is the owned form
//! used when a value leaves the stack: popped results, selector answers,
//! converter inputs and folded literals.

use std::fmt;
use std::sync::Arc;

use crate::ObjectRef;

/// Closed tag set driving every dispatch in evaluation and conversion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Void,
    Int,
    Float,
    Bool,
    String,
    Object,
}

impl ValueKind {
    /// Element kind for a list type tag such as `int[1, 2]`.
    ///
    /// Only the four primitive names are recognised (case-insensitively);
    /// any other tag, including none, produces an untyped object list.
    pub fn from_type_name(name: &str) -> ValueKind {
        if name.eq_ignore_ascii_case("int") {
            ValueKind::Int
        } else if name.eq_ignore_ascii_case("float") {
            ValueKind::Float
        } else if name.eq_ignore_ascii_case("bool") {
            ValueKind::Bool
        } else if name.eq_ignore_ascii_case("string") {
            ValueKind::String
        } else {
            ValueKind::Object
        }
    }

    /// Stored unboxed in the stack arena.
    pub const fn is_scalar(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float | ValueKind::Bool)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Void => "void",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An owned runtime value.
///
/// `Null` is an object-kinded value with no referent.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Void,
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(Arc<str>),
    Object(ObjectRef),
    Null,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Void => ValueKind::Void,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Str(_) => ValueKind::String,
            Value::Object(_) | Value::Null => ValueKind::Object,
        }
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(v)
    }
}

/// Formats the value the way string concatenation sees it.
///
/// Floats use the shortest round-trip digits (`12`, `0.5`) and switch to
/// exponent form for large or tiny magnitudes (`1E+08`, `1E-05`). Bools
/// print as `true`/`false`, `Void` prints nothing.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write_float(f, *v),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => write!(f, "{obj}"),
            Value::Null => f.write_str("null"),
        }
    }
}

/// Fewest integer digits that force exponent form, unless the round-trip
/// digits alone are longer.
const FLOAT_FIXED_DIGITS: usize = 7;

fn write_float(f: &mut fmt::Formatter<'_>, v: f32) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("NaN");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "Infinity" } else { "-Infinity" });
    }

    // `{:e}` yields the shortest round-trip digits, e.g. `1.5e8`.
    let scientific = format!("{:e}", v.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    let integer_digits = exponent + 1;
    let limit = i32::try_from(digits.len().max(FLOAT_FIXED_DIGITS)).unwrap_or(i32::MAX);
    if integer_digits <= limit && integer_digits >= -3 {
        return write!(f, "{v}");
    }

    if v.is_sign_negative() {
        f.write_str("-")?;
    }
    let (lead, rest) = digits.split_at(1);
    f.write_str(lead)?;
    if !rest.is_empty() {
        write!(f, ".{rest}")?;
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    write!(f, "E{sign}{:02}", exponent.unsigned_abs())
}

#[cfg(test)]
mod tests;
