//! Property tests for arithmetic evaluation.
//!
//! Expressions are generated from int and float literals joined by the
//! arithmetic operators, fully parenthesized so the generated text fixes the
//! tree shape. Results are compared through their `Debug` form so `NaN`
//! compares equal to itself.

#![allow(clippy::unwrap_used, reason = "tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use cdl::{BasicContext, Context, Interpreter, InterpreterBuilder, Value};
use proptest::prelude::*;

// -- Strategies --

fn literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..100_i32).prop_map(|v| v.to_string()),
        (0..100_u16, 1..10_u8).prop_map(|(whole, frac)| format!("{whole}.{frac}")),
    ]
}

fn operator() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["+", "-", "*", "/", "%", "^"])
}

fn expression() -> impl Strategy<Value = String> {
    literal().prop_recursive(4, 32, 2, |inner| {
        (inner.clone(), operator(), inner).prop_map(|(l, op, r)| format!("({l} {op} {r})"))
    })
}

// -- Helpers --

fn eager(text: &str) -> String {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::new();
    format!("{:?}", interp.evaluate_expression::<Value>(&mut ctx, text))
}

fn folded(text: &str) -> String {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::new();
    let result = interp
        .build_instruction(&mut ctx, &format!("Evaluate: {text}"))
        .and_then(|instruction| instruction.execute_as::<Value>(&mut ctx));
    format!("{result:?}")
}

fn unfolded(text: &str) -> String {
    let mut interp: Interpreter<BasicContext> =
        InterpreterBuilder::new().optimize_on_build(false).build();
    let mut ctx = BasicContext::new();
    format!("{:?}", interp.execute_as::<Value>(&mut ctx, &format!("Evaluate: {text}")))
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(text in expression()) {
        prop_assert_eq!(eager(&text), eager(&text));
    }

    #[test]
    fn folding_matches_eager_evaluation(text in expression()) {
        let expected = eager(&text);
        prop_assert_eq!(folded(&text), expected.clone());
        prop_assert_eq!(unfolded(&text), expected);
    }

    #[test]
    fn power_is_left_associative(a in 0..6_i32, b in 0..4_i32, c in 0..3_i32) {
        let chained = eager(&format!("{a} ^ {b} ^ {c}"));
        prop_assert_eq!(chained, eager(&format!("({a} ^ {b}) ^ {c}")));
    }

    #[test]
    fn cached_instructions_repeat_their_result(text in expression()) {
        let mut interp = Interpreter::<BasicContext>::new();
        let mut ctx = BasicContext::new();
        let source = format!("Evaluate: {text}");
        let first = format!("{:?}", interp.execute_as::<Value>(&mut ctx, &source));
        let second = format!("{:?}", interp.execute_as::<Value>(&mut ctx, &source));
        prop_assert_eq!(first, second);
        prop_assert!(ctx.evaluator().stack().is_empty());
    }
}
