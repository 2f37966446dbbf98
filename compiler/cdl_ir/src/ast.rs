//! Expression tree.
//!
//! Nodes own their children (`Box<[Node]>`); an instruction owns its
//! parameter trees outright and never shares subtrees. After optimization
//! the tree is only read.

use std::fmt;
use std::sync::Arc;

use crate::{ObjectRef, OpCode, Value, ValueKind};

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    // Literals
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(Arc<str>),
    /// The `null` literal.
    Null,
    /// An object produced by constant folding.
    Object(ObjectRef),

    /// `Type{ field = expr, ... }`. Each field is an `Assign` expression.
    ObjectInit {
        type_name: Arc<str>,
        fields: Box<[Node]>,
    },

    /// `tag[expr, ...]`. `element` is `Object` for untagged lists.
    List {
        element: ValueKind,
        elements: Box<[Node]>,
    },

    /// Identifier resolved through the value selectors.
    Variable(Arc<str>),

    /// Operator application; `operands.len() == op.operand_count()`.
    Expression {
        op: OpCode,
        operands: Box<[Node]>,
    },
}

impl Node {
    pub fn variable(name: impl Into<Arc<str>>) -> Self {
        Node::Variable(name.into())
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Node::Str(s.into())
    }

    pub fn unary(op: OpCode, operand: Node) -> Self {
        Node::Expression {
            op,
            operands: Box::new([operand]),
        }
    }

    pub fn binary(op: OpCode, left: Node, right: Node) -> Self {
        Node::Expression {
            op,
            operands: Box::new([left, right]),
        }
    }

    pub fn ternary(cond: Node, then: Node, otherwise: Node) -> Self {
        Node::Expression {
            op: OpCode::Ternary,
            operands: Box::new([cond, then, otherwise]),
        }
    }

    /// Literal node: evaluating it has no side effects and no dependencies.
    ///
    /// Only literals qualify. Variables, constructors and operator nodes are
    /// never constant in themselves; the optimizer folds an operator node
    /// once all its operands are.
    pub fn is_const(&self) -> bool {
        matches!(
            self,
            Node::Int(_)
                | Node::Float(_)
                | Node::Bool(_)
                | Node::Str(_)
                | Node::Null
                | Node::Object(_)
        )
    }

    /// Value of a literal node.
    pub fn literal_value(&self) -> Option<Value> {
        match self {
            Node::Int(v) => Some(Value::Int(*v)),
            Node::Float(v) => Some(Value::Float(*v)),
            Node::Bool(v) => Some(Value::Bool(*v)),
            Node::Str(s) => Some(Value::Str(Arc::clone(s))),
            Node::Null => Some(Value::Null),
            Node::Object(obj) => Some(Value::Object(obj.clone())),
            _ => None,
        }
    }

    /// Literal node holding `value`; `None` for `Void`.
    pub fn from_value(value: Value) -> Option<Node> {
        Some(match value {
            Value::Void => return None,
            Value::Int(v) => Node::Int(v),
            Value::Float(v) => Node::Float(v),
            Value::Bool(v) => Node::Bool(v),
            Value::Str(s) => Node::Str(s),
            Value::Object(obj) => Node::Object(obj),
            Value::Null => Node::Null,
        })
    }

    /// Operands of an operator node, empty for everything else.
    pub fn operands(&self) -> &[Node] {
        match self {
            Node::Expression { operands, .. } => operands,
            _ => &[],
        }
    }

    /// Number of nodes in this tree, including `self`.
    pub fn size(&self) -> usize {
        let children: &[Node] = match self {
            Node::Expression { operands, .. } => operands,
            Node::List { elements, .. } => elements,
            Node::ObjectInit { fields, .. } => fields,
            _ => &[],
        };
        1 + children.iter().map(Node::size).sum::<usize>()
    }
}

/// Fully parenthesised source form, used in logs and error messages.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Int(v) => write!(f, "{v}"),
            Node::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            Node::Bool(v) => write!(f, "{v}"),
            Node::Str(s) => write!(f, "{s:?}"),
            Node::Null => f.write_str("null"),
            Node::Object(obj) => write!(f, "<{}>", obj.type_name()),
            Node::Variable(name) => f.write_str(name),
            Node::ObjectInit { type_name, fields } => {
                write!(f, "{type_name}{{")?;
                write_list(f, fields)?;
                f.write_str("}")
            }
            Node::List { element, elements } => {
                if *element != ValueKind::Object {
                    write!(f, "{element}")?;
                }
                f.write_str("[")?;
                write_list(f, elements)?;
                f.write_str("]")
            }
            Node::Expression { op, operands } => match &operands[..] {
                [a] => write!(f, "({op}{a})"),
                [a, b] if *op == OpCode::Member => write!(f, "{a}.{b}"),
                [a, b] => write!(f, "({a} {op} {b})"),
                [c, a, b] => write!(f, "({c} ? {a} : {b})"),
                _ => write!(f, "<{op}/{}>", operands.len()),
            },
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{node}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
