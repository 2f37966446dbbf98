#![allow(clippy::unwrap_used, reason = "tests can panic")]

use cdl_ir::Value;
use pretty_assertions::assert_eq;

use super::*;
use crate::errors::CapacityError;

fn small(arena_bytes: usize, object_slots: usize) -> EvaluationStack {
    EvaluationStack::new(
        StackConfig::default()
            .with_arena_bytes(arena_bytes)
            .with_object_slots(object_slots),
    )
}

#[test]
fn scalars_pop_in_reverse_order() {
    let mut stack = EvaluationStack::default();
    assert_eq!(stack.push_scalar(7_i32), Ok(0));
    assert_eq!(stack.push_scalar(true), Ok(4));
    assert_eq!(stack.push_scalar(2.5_f32), Ok(5));
    assert_eq!(stack.len(), 9);

    assert_eq!(stack.pop_scalar::<f32>(), Ok(2.5));
    assert_eq!(stack.pop_scalar::<bool>(), Ok(true));
    assert_eq!(stack.pop_scalar::<i32>(), Ok(7));
    assert!(stack.is_empty());
}

#[test]
fn get_scalar_reads_without_popping() {
    let mut stack = EvaluationStack::default();
    let a = stack.push_scalar(-3_i32).unwrap();
    let b = stack.push_scalar(false).unwrap();
    assert_eq!(stack.get_scalar::<i32>(a), Ok(-3));
    assert_eq!(stack.get_scalar::<bool>(b), Ok(false));
    assert_eq!(stack.len(), 5);
}

#[test]
fn get_scalar_rejects_dead_offsets() {
    let mut stack = EvaluationStack::default();
    stack.push_scalar(1_i32).unwrap();
    assert!(matches!(
        stack.get_scalar::<i32>(4),
        Err(CapacityError::InvalidOffset { offset: 4, len: 4 })
    ));
    assert!(matches!(
        stack.get_scalar::<i32>(-1),
        Err(CapacityError::InvalidOffset { .. })
    ));
}

#[test]
fn objects_share_the_arena_order() {
    let mut stack = EvaluationStack::default();
    stack.push_scalar(1_i32).unwrap();
    let s = stack.push_object(Value::from("hi")).unwrap();
    assert_eq!(s, 4);
    assert_eq!(stack.object_count(), 1);
    assert_eq!(stack.get_object(s), Ok(&Value::from("hi")));

    assert_eq!(stack.pop_object(), Ok(Value::from("hi")));
    assert_eq!(stack.pop_scalar::<i32>(), Ok(1));
    assert_eq!(stack.object_count(), 0);
}

#[test]
fn popping_an_int_as_object_is_detected() {
    let mut stack = EvaluationStack::default();
    stack.push_object(Value::from("a")).unwrap();
    stack.push_scalar(0_i32).unwrap();
    stack.push_scalar(5_i32).unwrap();
    assert_eq!(
        stack.pop_object(),
        Err(CapacityError::ObjectIndexMismatch {
            stored: 5,
            objects: 1
        })
    );
    // The failed pop leaves the stack untouched.
    assert_eq!(stack.len(), 12);
}

#[test]
fn arena_overflow_reports_free_space() {
    let mut stack = small(6, 4);
    stack.push_scalar(1_i32).unwrap();
    assert_eq!(
        stack.push_scalar(2_i32),
        Err(CapacityError::ArenaOverflow {
            requested: 4,
            available: 2,
            capacity: 6
        })
    );
    assert_eq!(stack.push_scalar(true), Ok(4));
}

#[test]
fn object_table_overflow() {
    let mut stack = small(64, 2);
    stack.push_object(Value::from("a")).unwrap();
    stack.push_object(Value::from("b")).unwrap();
    assert_eq!(
        stack.push_object(Value::from("c")),
        Err(CapacityError::ObjectTableOverflow { capacity: 2 })
    );
    assert_eq!(stack.len(), 8);
}

#[test]
fn object_push_fails_cleanly_when_arena_is_full() {
    let mut stack = small(2, 8);
    assert!(matches!(
        stack.push_object(Value::from("a")),
        Err(CapacityError::ArenaOverflow { .. })
    ));
    assert_eq!(stack.object_count(), 0);
}

#[test]
fn underflow_on_empty_stack() {
    let mut stack = EvaluationStack::default();
    assert_eq!(
        stack.pop_scalar::<i32>(),
        Err(CapacityError::Underflow {
            requested: 4,
            available: 0
        })
    );
    assert!(stack.pop_object().is_err());
}

#[test]
fn reset_to_mark_discards_both_regions() {
    let mut stack = EvaluationStack::default();
    stack.push_scalar(1_i32).unwrap();
    let mark = stack.mark();
    stack.push_object(Value::from("x")).unwrap();
    stack.push_scalar(2.0_f32).unwrap();

    stack.reset_to(mark);
    assert_eq!(stack.len(), 4);
    assert_eq!(stack.object_count(), 0);
    assert_eq!(stack.pop_scalar::<i32>(), Ok(1));
}

#[test]
fn clear_empties_everything() {
    let mut stack = EvaluationStack::default();
    stack.push_object(Value::from("x")).unwrap();
    stack.push_scalar(9_i32).unwrap();
    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.object_count(), 0);
}

#[test]
fn default_sizes() {
    let stack = EvaluationStack::default();
    assert_eq!(stack.capacity(), 4096);
    assert_eq!(stack.object_capacity(), 128);
}
