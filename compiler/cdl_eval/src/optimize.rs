//! Constant folding.
//!
//! An operator node whose operands are all literals (after folding them
//! first) is evaluated once and replaced by the literal it produced. List and
//! object constructors are never folded themselves, only their children.
//! Nodes that evaluate to `Void` are kept as they are.

use cdl_ir::Node;
use cdl_stack::ensure_sufficient_stack;

use crate::errors::EvalResult;
use crate::Evaluator;

impl Evaluator {
    /// Returns `node` with every constant subtree folded.
    ///
    /// Evaluation errors in a constant subtree (`1 / 0`) are returned rather
    /// than deferred to execution. The stack is left as it was either way.
    pub fn optimize(&mut self, node: Node) -> EvalResult<Node> {
        ensure_sufficient_stack(|| self.optimize_inner(node))
    }

    fn optimize_inner(&mut self, node: Node) -> EvalResult<Node> {
        match node {
            Node::Expression { op, operands } => {
                let operands = self.optimize_all(operands)?;
                let node = Node::Expression { op, operands };
                if node.operands().iter().all(Node::is_const) {
                    self.fold(node)
                } else {
                    Ok(node)
                }
            }
            Node::List { element, elements } => Ok(Node::List {
                element,
                elements: self.optimize_all(elements)?,
            }),
            Node::ObjectInit { type_name, fields } => Ok(Node::ObjectInit {
                type_name,
                fields: self.optimize_all(fields)?,
            }),
            leaf => Ok(leaf),
        }
    }

    fn optimize_all(&mut self, nodes: Box<[Node]>) -> EvalResult<Box<[Node]>> {
        nodes
            .into_vec()
            .into_iter()
            .map(|node| self.optimize(node))
            .collect()
    }

    fn fold(&mut self, node: Node) -> EvalResult<Node> {
        let mark = self.stack().mark();
        let folded = self.eval(&node).and_then(|info| self.pop_value(info));
        match folded {
            Ok(value) => match Node::from_value(value) {
                Some(literal) => {
                    tracing::trace!(%node, %literal, "folded constant");
                    Ok(literal)
                }
                None => Ok(node),
            },
            Err(err) => {
                self.stack_mut().reset_to(mark);
                Err(err)
            }
        }
    }
}
