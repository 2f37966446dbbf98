use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_kinds() {
    assert_eq!(Value::Int(1).kind(), ValueKind::Int);
    assert_eq!(Value::Float(1.0).kind(), ValueKind::Float);
    assert_eq!(Value::from("a").kind(), ValueKind::String);
    assert_eq!(Value::Null.kind(), ValueKind::Object);
    assert_eq!(Value::Void.kind(), ValueKind::Void);
}

#[test]
fn test_type_name_tags() {
    assert_eq!(ValueKind::from_type_name("int"), ValueKind::Int);
    assert_eq!(ValueKind::from_type_name("Float"), ValueKind::Float);
    assert_eq!(ValueKind::from_type_name("BOOL"), ValueKind::Bool);
    assert_eq!(ValueKind::from_type_name("string"), ValueKind::String);
    assert_eq!(ValueKind::from_type_name("Enemy"), ValueKind::Object);
    assert_eq!(ValueKind::from_type_name(""), ValueKind::Object);
}

#[test]
fn test_display_formats() {
    assert_eq!(Value::Int(-4).to_string(), "-4");
    assert_eq!(Value::Float(12.0).to_string(), "12");
    assert_eq!(Value::Float(0.5).to_string(), "0.5");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::Str(Arc::from("x")).to_string(), "x");
    assert_eq!(Value::Null.to_string(), "null");
    assert_eq!(Value::Void.to_string(), "");
}

#[test]
fn test_float_display_switches_to_exponent() {
    let show = |v: f32| Value::Float(v).to_string();
    assert_eq!(show(1e8), "1E+08");
    assert_eq!(show(-1.5e8), "-1.5E+08");
    assert_eq!(show(1e7), "1E+07");
    assert_eq!(show(1_234_567.0), "1234567");
    assert_eq!(show(12_345_678.0), "12345678");
    assert_eq!(show(0.0001), "0.0001");
    assert_eq!(show(0.000_01), "1E-05");
    assert_eq!(show(2.5e-7), "2.5E-07");
    assert_eq!(show(0.0), "0");
}

#[test]
fn test_float_display_non_finite() {
    assert_eq!(Value::Float(f32::INFINITY).to_string(), "Infinity");
    assert_eq!(Value::Float(f32::NEG_INFINITY).to_string(), "-Infinity");
    assert_eq!(Value::Float(f32::NAN).to_string(), "NaN");
}

#[test]
fn test_accessors() {
    assert_eq!(Value::Int(3).as_int(), Some(3));
    assert_eq!(Value::Int(3).as_float(), None);
    assert_eq!(Value::from("s").as_str(), Some("s"));
    assert!(Value::Null.is_null());
    assert!(Value::Null.as_object().is_none());
}

#[test]
fn test_scalar_kinds() {
    assert!(ValueKind::Int.is_scalar());
    assert!(ValueKind::Bool.is_scalar());
    assert!(!ValueKind::String.is_scalar());
    assert!(!ValueKind::Void.is_scalar());
}
