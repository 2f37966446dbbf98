use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_only_literals_are_const() {
    assert!(Node::Int(1).is_const());
    assert!(Node::string("a").is_const());
    assert!(Node::Null.is_const());
    assert!(!Node::variable("x").is_const());
    assert!(!Node::binary(OpCode::Add, Node::Int(1), Node::Int(2)).is_const());
    assert!(!Node::List {
        element: ValueKind::Int,
        elements: Box::new([])
    }
    .is_const());
}

#[test]
fn test_value_round_trip_through_literals() {
    for value in [
        Value::Int(7),
        Value::Float(1.5),
        Value::Bool(false),
        Value::from("s"),
        Value::Null,
    ] {
        let node = Node::from_value(value.clone());
        assert_eq!(node.and_then(|n| n.literal_value()), Some(value));
    }
    assert_eq!(Node::from_value(Value::Void), None);
}

#[test]
fn test_display_is_parenthesised() {
    let node = Node::binary(
        OpCode::Mult,
        Node::binary(OpCode::Add, Node::Int(1), Node::Int(2)),
        Node::unary(OpCode::Neg, Node::variable("x")),
    );
    assert_eq!(node.to_string(), "((1 + 2) * (-x))");
}

#[test]
fn test_display_structures() {
    let member = Node::binary(OpCode::Member, Node::variable("a"), Node::variable("Count"));
    assert_eq!(member.to_string(), "a.Count");

    let list = Node::List {
        element: ValueKind::Float,
        elements: Box::new([Node::Float(1.0), Node::Float(2.5)]),
    };
    assert_eq!(list.to_string(), "float[1.0, 2.5]");

    let init = Node::ObjectInit {
        type_name: "Vec2".into(),
        fields: Box::new([Node::binary(OpCode::Assign, Node::variable("x"), Node::Int(1))]),
    };
    assert_eq!(init.to_string(), "Vec2{(x = 1)}");

    let tern = Node::ternary(Node::Bool(true), Node::Int(1), Node::Int(2));
    assert_eq!(tern.to_string(), "(true ? 1 : 2)");
}

#[test]
fn test_size_counts_all_nodes() {
    let node = Node::binary(
        OpCode::Add,
        Node::Int(1),
        Node::List {
            element: ValueKind::Int,
            elements: Box::new([Node::Int(2), Node::Int(3)]),
        },
    );
    assert_eq!(node.size(), 5);
    assert_eq!(node.operands().len(), 2);
}
