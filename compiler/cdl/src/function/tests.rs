#![allow(clippy::unwrap_used, reason = "tests can panic")]

use cdl_ir::{ObjectRef, ValueKind};
use cdl_parse::Parser;
use pretty_assertions::assert_eq;

use super::*;
use crate::binding::pop_as;
use crate::{BasicContext, BindingError, Error};

fn args(text: &str) -> Vec<Node> {
    let tokens = cdl_lexer::tokenize(text).unwrap();
    Parser::new().parse_parameter_list(&tokens).unwrap()
}

fn call<T: FromValue>(
    function: &dyn Function<BasicContext>,
    ctx: &mut BasicContext,
    text: &str,
) -> Result<T> {
    let info = function.invoke(ctx, &args(text))?;
    pop_as(ctx.evaluator(), info)
}

#[test]
fn standard_function_sees_raw_arguments() {
    let count = StandardFunction::new("Count", |ctx: &mut BasicContext, args: &[Node]| {
        let len = i32::try_from(args.len()).unwrap_or(i32::MAX);
        Ok(ctx.evaluator().push_int(len)?)
    });
    let mut ctx = BasicContext::new();
    assert_eq!(count.name(), "Count");
    assert_eq!(call::<i32>(&count, &mut ctx, "1, undefined_name, 3"), Ok(3));
}

#[test]
fn converted_function_binds_mixed_arguments() {
    let f = ConvertedFunction::<BasicContext>::new("f", |a: i32, b: f32, add: bool| {
        let a = cdl_eval::promote(a);
        if add { a + b } else { a * b }
    });
    assert_eq!(f.arity(), 3);
    assert!(!f.needs_context());

    let mut ctx = BasicContext::new();
    assert_eq!(call::<f32>(&f, &mut ctx, "12, 12.0, false"), Ok(144.0));
    assert_eq!(call::<f32>(&f, &mut ctx, "1, 2, true"), Ok(3.0));
    assert!(ctx.evaluator().stack().is_empty());
}

#[test]
fn float_arguments_round_into_int_parameters() {
    let f = ConvertedFunction::<BasicContext>::new("Twice", |a: i32| a * 2);
    let mut ctx = BasicContext::new();
    assert_eq!(call::<i32>(&f, &mut ctx, "2.5"), Ok(4));
    assert_eq!(call::<i32>(&f, &mut ctx, "3.5"), Ok(8));
}

#[test]
fn context_parameter_is_supplied() {
    let f = ConvertedFunction::<BasicContext>::with_context("Depth", |ctx: &mut BasicContext, extra: i32| {
        let depth = i32::try_from(ctx.evaluator().stack().len()).unwrap_or(i32::MAX);
        depth + extra
    });
    assert!(f.needs_context());
    assert_eq!(f.arity(), 1);

    let mut ctx = BasicContext::new();
    assert_eq!(call::<i32>(&f, &mut ctx, "10"), Ok(10));
}

#[test]
fn insufficient_arguments_fail_before_evaluation() {
    let f = ConvertedFunction::<BasicContext>::new("f", |a: i32, b: i32, c: i32| a + b + c);
    let mut ctx = BasicContext::new();
    let err = f.invoke(&mut ctx, &args("undefined_name")).unwrap_err();
    assert_eq!(
        err,
        Error::Binding(BindingError::InsufficientArguments {
            function: "f".into(),
            needed: 3,
            given: 1,
        })
    );
    assert_eq!(
        err.to_string(),
        "insufficient argument count for `f`: 3 required, 1 given"
    );
}

#[test]
fn trailing_defaults_fill_missing_arguments() {
    let f = ConvertedFunction::<BasicContext>::new("Scale", |x: f32, factor: f32, offset: f32| {
        x * factor + offset
    })
    .with_defaults([Value::Float(2.0), Value::Float(0.5)]);
    assert_eq!(f.required_arguments(), 1);

    let mut ctx = BasicContext::new();
    assert_eq!(call::<f32>(&f, &mut ctx, "3"), Ok(6.5));
    assert_eq!(call::<f32>(&f, &mut ctx, "3, 3"), Ok(9.5));
    assert_eq!(call::<f32>(&f, &mut ctx, "3, 3, 1"), Ok(10.0));
    assert!(f.invoke(&mut ctx, &[]).is_err());
}

#[test]
fn extra_arguments_are_ignored() {
    let f = ConvertedFunction::<BasicContext>::new("Id", |a: i32| a);
    let mut ctx = BasicContext::new();
    assert_eq!(call::<i32>(&f, &mut ctx, "7, 8, 9"), Ok(7));
}

#[test]
fn mismatched_argument_kind_names_the_position() {
    let f = ConvertedFunction::<BasicContext>::new("Not", |a: bool| !a);
    let mut ctx = BasicContext::new();
    let err = f.invoke(&mut ctx, &args("\"yes\"")).unwrap_err();
    assert!(matches!(
        err,
        Error::Binding(BindingError::ArgumentType {
            index: 0,
            found: ValueKind::String,
            ..
        })
    ));
}

#[test]
fn registered_converter_feeds_native_parameters() {
    let f = ConvertedFunction::<BasicContext>::new("Not", |a: bool| !a);
    let mut ctx = BasicContext::new();
    ctx.evaluator()
        .register_value_converter::<i32, bool, _>(|v| Ok(Value::Bool(v.as_int() != Some(0))));
    assert_eq!(call::<bool>(&f, &mut ctx, "0"), Ok(true));
    assert_eq!(call::<bool>(&f, &mut ctx, "5"), Ok(false));
}

#[test]
fn return_kinds_are_pushed_by_type() {
    let mut ctx = BasicContext::new();

    let unit = ConvertedFunction::<BasicContext>::new("Nothing", || {});
    assert_eq!(unit.invoke(&mut ctx, &[]), Ok(ValueInfo::VOID));

    let text = ConvertedFunction::<BasicContext>::new("Join", |a: String, b: String| a + &b);
    assert_eq!(call::<String>(&text, &mut ctx, "\"n=\", 4"), Ok("n=4".to_string()));

    let list = ConvertedFunction::<BasicContext>::new("Range", |n: i32| {
        ObjectRef::new((0..n).collect::<Vec<i32>>())
    });
    let obj = call::<ObjectRef>(&list, &mut ctx, "3").unwrap();
    assert_eq!(obj.downcast_ref::<Vec<i32>>(), Some(&vec![0, 1, 2]));

    let nothing = ConvertedFunction::<BasicContext>::new("Find", |_: i32| None::<ObjectRef>);
    assert_eq!(call::<Value>(&nothing, &mut ctx, "1"), Ok(Value::Null));
}

#[test]
fn native_errors_surface_as_binding_errors() {
    let f = ConvertedFunction::<BasicContext>::new("Checked", |a: i32| {
        if a < 0 { Err("negative input") } else { Ok(a) }
    });
    let mut ctx = BasicContext::new();
    assert_eq!(call::<i32>(&f, &mut ctx, "4"), Ok(4));
    assert_eq!(
        call::<i32>(&f, &mut ctx, "-1"),
        Err(Error::Binding(BindingError::NativeFailure {
            function: "Checked".into(),
            message: "negative input".into(),
        }))
    );
}
