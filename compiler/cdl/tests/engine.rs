//! End-to-end tests of the public surface: hosts register functions,
//! selectors and initializers, then run instruction text.

#![allow(clippy::unwrap_used, reason = "tests can panic")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cdl::{
    BasicContext, BindingError, CapacityError, Context, DefaultInitializer, Error, EvalError,
    Evaluator, HostObject, Instruction, Interpreter, InterpreterBuilder, MemberSelector, Node,
    ObjectRef, PrintHandler, StackConfig, Value, ValueInfo,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

#[derive(Debug, Default, Clone, PartialEq)]
struct Vec2 {
    x: f32,
    y: f32,
}

impl HostObject for Vec2 {
    fn as_member_selector(&self) -> Option<&dyn MemberSelector> {
        Some(self)
    }
}

impl MemberSelector for Vec2 {
    fn select_member(&self, name: &str) -> Option<Value> {
        match name {
            "X" => Some(Value::Float(self.x)),
            "Y" => Some(Value::Float(self.y)),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Player {
    health: Mutex<i32>,
    name: String,
}

impl HostObject for Player {
    fn as_member_selector(&self) -> Option<&dyn MemberSelector> {
        Some(self)
    }
}

impl MemberSelector for Player {
    fn select_member(&self, name: &str) -> Option<Value> {
        match name {
            "Health" => Some(Value::Int(*self.health.lock())),
            "Name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }

    fn assign_member(&self, name: &str, value: &Value) -> bool {
        match (name, value) {
            ("Health", Value::Int(v)) => {
                *self.health.lock() = *v;
                true
            }
            _ => false,
        }
    }
}

fn number(value: &Value) -> Option<f32> {
    value.as_float().or_else(|| value.as_int().map(cdl_eval::promote))
}

fn world() -> (BasicContext, Arc<Player>) {
    let player = Arc::new(Player {
        health: Mutex::new(100),
        name: "ada".to_string(),
    });
    let mut ctx = BasicContext::new();
    let ev = ctx.evaluator();
    let owner = ObjectRef::from(Arc::clone(&player));
    ev.register_value_selector_fn(move |scope, name| match (scope, name) {
        (None, "player") => Some(Value::Object(owner.clone())),
        (None, "gravity") => Some(Value::Float(9.81)),
        _ => None,
    });
    ev.register_object_initializer(
        "Vec2",
        DefaultInitializer::<Vec2, _>::new(|v: &mut Vec2, field: &str, value: Value| {
            let number = number(&value).ok_or(EvalError::InvalidFieldInit)?;
            match field {
                "X" => v.x = number,
                "Y" => v.y = number,
                _ => return Err(EvalError::InvalidFieldInit),
            }
            Ok(())
        }),
    );
    (ctx, player)
}

#[test]
fn mixed_signature_function_with_folded_parameters() {
    let mut interp = Interpreter::<BasicContext>::new();
    interp.register_native_function("f", |a: i32, b: f32, add: bool| {
        let a = cdl_eval::promote(a);
        if add { a + b } else { a * b }
    });
    let mut ctx = BasicContext::new();
    let text = "f: (2*3+3)*2/3 + (1+2)*2, 2^3+4.0, false";

    let instruction = interp.build_instruction(&mut ctx, text).unwrap();
    assert_eq!(
        instruction.parameters(),
        &[Node::Int(12), Node::Float(12.0), Node::Bool(false)]
    );
    assert_eq!(instruction.execute_as::<f32>(&mut ctx), Ok(144.0));
    assert_eq!(interp.execute_as::<f32>(&mut ctx, text), Ok(144.0));
    assert!(ctx.evaluator().stack().is_empty());
}

#[test]
fn reference_arithmetic() {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::new();
    let cases = [
        ("(1 + 2 + 3 + 2 ^ 2) / 2 * 2 ^ 2 % 100", 20),
        ("((1 + 2 + 3 + 2 ^ 2) / 2) ^ 2 ^ 2 % 100", 25),
        ("2^3^2", 64),
        ("7 / 2", 3),
        ("-7 / 2", -3),
    ];
    for (text, expected) in cases {
        assert_eq!(interp.evaluate_expression::<i32>(&mut ctx, text), Ok(expected), "{text}");
    }
    assert_eq!(interp.evaluate_expression::<f32>(&mut ctx, "7 / 2.0"), Ok(3.5));
    assert_eq!(interp.evaluate_expression::<bool>(&mut ctx, "0.1 + 0.2 == 0.3"), Ok(true));
}

#[test]
fn logical_operators_short_circuit() {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::new();
    let ticks = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&ticks);
    ctx.evaluator().register_value_selector_fn(move |_, name| {
        (name == "tick").then(|| {
            seen.fetch_add(1, Ordering::SeqCst);
            Value::Bool(true)
        })
    });

    assert_eq!(interp.execute_as::<bool>(&mut ctx, "Evaluate: false && tick"), Ok(false));
    assert_eq!(interp.execute_as::<bool>(&mut ctx, "Evaluate: true || tick"), Ok(true));
    assert_eq!(ticks.load(Ordering::SeqCst), 0);

    assert_eq!(interp.execute_as::<bool>(&mut ctx, "Evaluate: true && tick"), Ok(true));
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[test]
fn variables_are_never_folded() {
    let (mut ctx, player) = world();
    let mut interp = Interpreter::<BasicContext>::new();
    let instruction = interp
        .build_instruction(&mut ctx, "Evaluate: player.Health + 1 * 2")
        .unwrap();
    assert!(matches!(instruction.parameters(), [Node::Expression { .. }]));

    assert_eq!(instruction.execute_as::<i32>(&mut ctx), Ok(102));
    *player.health.lock() = 10;
    assert_eq!(instruction.execute_as::<i32>(&mut ctx), Ok(12));
}

#[test]
fn host_objects_flow_through_functions() {
    let (mut ctx, player) = world();
    let mut interp = Interpreter::<BasicContext>::new();
    interp.register_native_function("Length", |v: Arc<Vec2>| v.x.hypot(v.y));
    interp.register_native_function("Greet", |p: Arc<Player>, greeting: String| {
        format!("{greeting}, {}", p.name)
    });
    interp.register_native_function("Damage", |p: Arc<Player>, amount: i32| {
        let mut health = p.health.lock();
        *health -= amount;
        *health
    });

    assert_eq!(
        interp.execute_as::<f32>(&mut ctx, "Length: Vec2{ X = 3, Y = 2 * 2 }"),
        Ok(5.0)
    );
    assert_eq!(
        interp.execute_as::<String>(&mut ctx, "Greet: player, \"hi\""),
        Ok("hi, ada".to_string())
    );
    assert_eq!(interp.execute_as::<i32>(&mut ctx, "Damage: player, 30"), Ok(70));
    assert_eq!(*player.health.lock(), 70);

    let err = interp.execute(&mut ctx, "Length: player").unwrap_err();
    assert!(matches!(
        err,
        Error::Binding(BindingError::ArgumentType { index: 0, .. })
    ));
}

#[test]
fn member_assignment_writes_back() {
    let (mut ctx, player) = world();
    let mut interp = Interpreter::<BasicContext>::new();
    assert_eq!(
        interp.execute_as::<i32>(&mut ctx, "Evaluate: player.Health = 5 * 5"),
        Ok(25)
    );
    assert_eq!(*player.health.lock(), 25);
    assert_eq!(
        interp.execute(&mut ctx, "Evaluate: gravity = 1.0"),
        Err(Error::Eval(EvalError::UnassignableIdentifier {
            name: "gravity".into()
        }))
    );
}

#[test]
fn lists_answer_count_and_index() {
    let mut interp = Interpreter::<BasicContext>::new();
    interp.register_native_function("Sum", |values: ObjectRef| {
        values
            .downcast_ref::<Vec<i32>>()
            .map_or(0, |v| v.iter().sum::<i32>())
    });
    let mut ctx = BasicContext::new();
    assert_eq!(interp.execute_as::<i32>(&mut ctx, "Sum: int[1, 2, 3 * 3]"), Ok(12));
    assert_eq!(
        interp.evaluate_expression::<i32>(&mut ctx, "int[4, 5, 6].Count"),
        Ok(3)
    );
    assert_eq!(interp.evaluate_expression::<i32>(&mut ctx, "int[4, 5, 6].2"), Ok(6));
}

#[test]
fn print_goes_through_the_handler() {
    let out = PrintHandler::buffer();
    let mut interp: Interpreter<BasicContext> = InterpreterBuilder::new()
        .print_handler(Arc::clone(&out))
        .build();
    let (mut ctx, _player) = world();
    interp
        .execute(&mut ctx, "Print: player.Name + \" has \" + player.Health + \" hp\"")
        .unwrap();
    interp.execute(&mut ctx, "Print: 1 > 2").unwrap();
    assert_eq!(out.output(), "ada has 100 hp\nfalse\n");
}

#[test]
fn errors_name_what_failed() {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::new();

    let err = interp.execute(&mut ctx, "Evaluate: speed * 2").unwrap_err();
    assert!(err.to_string().contains("speed"), "{err}");

    let err = interp.execute(&mut ctx, "Evaluate: 1 + true").unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::BinaryTypeMismatch { .. })));

    assert!(matches!(
        interp.execute(&mut ctx, "Evaluate: (1 + 2"),
        Err(Error::Parse(_))
    ));
    assert!(matches!(
        interp.execute(&mut ctx, "Evaluate: \"open"),
        Err(Error::Lex(_))
    ));
    assert!(ctx.evaluator().stack().is_empty());
}

#[test]
fn capacity_limits_fail_instead_of_growing() {
    let mut interp = Interpreter::<BasicContext>::new();
    let mut ctx = BasicContext::with_config(StackConfig::default().with_object_slots(0));
    assert!(matches!(
        interp.execute(&mut ctx, "Evaluate: \"text\""),
        Err(Error::Eval(EvalError::Capacity(CapacityError::ObjectTableOverflow { .. })))
    ));
    assert_eq!(interp.execute_as::<i32>(&mut ctx, "Evaluate: 1 + 2"), Ok(3));
}

/// Host context carrying its own state next to the evaluator.
#[derive(Default)]
struct Game {
    evaluator: Evaluator,
    score: i32,
    executed: Vec<String>,
    results: Vec<ValueInfo>,
}

impl Context for Game {
    fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    fn on_execute_instruction(&mut self, instruction: &Instruction<Self>) {
        self.executed.push(instruction.source().to_string());
    }

    fn on_instruction_evaluated(&mut self, _instruction: &Instruction<Self>, result: ValueInfo) {
        self.results.push(result);
    }
}

#[test]
fn custom_context_state_and_hooks() {
    let mut interp = Interpreter::<Game>::new();
    interp.register_native_function_with_context("AddScore", |game: &mut Game, points: i32| {
        game.score += points;
        game.score
    });
    interp.register_standard_function("Reset", |game: &mut Game, _args: &[Node]| {
        game.score = 0;
        Ok(ValueInfo::VOID)
    });

    let mut game = Game::default();
    assert_eq!(interp.execute_as::<i32>(&mut game, "AddScore: 10"), Ok(10));
    assert_eq!(interp.execute_as::<i32>(&mut game, "AddScore: 2 * 3 -> neg"), Ok(-16));
    interp.execute(&mut game, "Reset").unwrap();

    assert_eq!(game.score, 0);
    assert_eq!(
        game.executed,
        ["AddScore: 10", "AddScore: 2 * 3 -> neg", "Reset"]
    );
    assert_eq!(game.results.len(), 3);
    assert!(game.results[2].is_void());
}
