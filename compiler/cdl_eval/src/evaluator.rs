//! Tree-walking evaluator.
//!
//! [`Evaluator::eval`] evaluates a node and leaves its result on the
//! evaluation stack, returning the [`ValueInfo`] that describes it. Every
//! operator pops what its operands pushed before pushing its own result, so
//! after a successful `eval` the stack holds exactly one more value than
//! before. A failed `eval` may leave partial results behind; callers that
//! keep the evaluator alive restore a [`StackMark`](crate::StackMark).

use std::any::TypeId;
use std::sync::Arc;

use cdl_ir::{Node, ObjectRef, OpCode, Value, ValueKind};
use cdl_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;

use crate::convert::ConverterRegistry;
use crate::errors::{
    index_out_of_range, invalid_arity, invalid_assignment_target, invalid_field_init,
    invalid_member_operand, invalid_member_owner, null_reference, ternary_condition,
    type_mismatch, unassignable_identifier, undefined_identifier, unknown_member,
    unknown_object_type, EvalError, EvalResult,
};
use crate::initializer::ObjectInitializer;
use crate::operators::{evaluate_binary, promote};
use crate::selector::{FnSelector, SelectorId, ValueSelector};
use crate::stack::{EvaluationStack, StackConfig};
use crate::unary_operators::evaluate_unary;
use crate::ValueInfo;

pub struct Evaluator {
    stack: EvaluationStack,
    selectors: Vec<(SelectorId, Box<dyn ValueSelector>)>,
    next_selector: u32,
    initializers: FxHashMap<Arc<str>, Arc<dyn ObjectInitializer>>,
    converters: ConverterRegistry,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::with_config(StackConfig::default())
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("stack", &self.stack)
            .field("selectors", &self.selectors.len())
            .field("initializers", &self.initializers.len())
            .field("converters", &self.converters)
            .finish()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StackConfig) -> Self {
        Evaluator {
            stack: EvaluationStack::new(config),
            selectors: Vec::new(),
            next_selector: 0,
            initializers: FxHashMap::default(),
            converters: ConverterRegistry::new(),
        }
    }

    pub fn stack(&self) -> &EvaluationStack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut EvaluationStack {
        &mut self.stack
    }

    // Registration

    /// Adds a selector. Later selectors are consulted before earlier ones.
    pub fn register_value_selector(&mut self, selector: impl ValueSelector + 'static) -> SelectorId {
        let id = SelectorId(self.next_selector);
        self.next_selector = self.next_selector.wrapping_add(1);
        self.selectors.push((id, Box::new(selector)));
        id
    }

    /// Adds a read-only selector backed by a closure.
    pub fn register_value_selector_fn<F>(&mut self, select: F) -> SelectorId
    where
        F: Fn(Option<&ObjectRef>, &str) -> Option<Value> + Send + Sync + 'static,
    {
        self.register_value_selector(FnSelector(select))
    }

    pub fn unregister_value_selector(&mut self, id: SelectorId) -> bool {
        let before = self.selectors.len();
        self.selectors.retain(|(existing, _)| *existing != id);
        self.selectors.len() != before
    }

    /// Registers the initializer for `Type{...}` literals of `type_name`.
    /// Returns `true` if it replaced an earlier registration.
    pub fn register_object_initializer(
        &mut self,
        type_name: impl Into<Arc<str>>,
        initializer: impl ObjectInitializer + 'static,
    ) -> bool {
        self.initializers
            .insert(type_name.into(), Arc::new(initializer))
            .is_some()
    }

    pub fn unregister_object_initializer(&mut self, type_name: &str) -> bool {
        self.initializers.remove(type_name).is_some()
    }

    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    pub fn register_value_converter<S, D, F>(&mut self, convert: F)
    where
        S: 'static,
        D: 'static,
        F: Fn(Value) -> EvalResult<Value> + Send + Sync + 'static,
    {
        self.converters.register::<S, D, F>(convert);
    }

    pub fn unregister_value_converter<S: 'static, D: 'static>(&mut self) -> bool {
        self.converters.unregister::<S, D>()
    }

    pub fn convert_value(&self, value: Value, target: TypeId) -> EvalResult<Value> {
        self.converters.convert(value, target)
    }

    // Evaluation

    /// Evaluates `node`, leaving its value on the stack.
    pub fn eval(&mut self, node: &Node) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(node))
    }

    fn eval_inner(&mut self, node: &Node) -> EvalResult {
        match node {
            Node::Int(v) => self.push_int(*v),
            Node::Float(v) => self.push_float(*v),
            Node::Bool(v) => self.push_bool(*v),
            Node::Str(s) => self.push_value(Value::Str(Arc::clone(s))),
            Node::Null => self.push_value(Value::Null),
            Node::Object(obj) => self.push_value(Value::Object(obj.clone())),
            Node::Variable(name) => self.select_value(None, name),
            Node::List { element, elements } => self.eval_list(*element, elements),
            Node::ObjectInit { type_name, fields } => self.eval_object_init(type_name, fields),
            Node::Expression { op, operands } => self.eval_expression(*op, operands),
        }
    }

    fn eval_expression(&mut self, op: OpCode, operands: &[Node]) -> EvalResult {
        if operands.len() != op.operand_count() {
            return Err(invalid_arity(op, operands.len()));
        }
        match (op, operands) {
            (OpCode::Ternary, [cond, then, otherwise]) => self.eval_ternary(cond, then, otherwise),
            (OpCode::Member, [owner, member]) => self.eval_member(owner, member),
            (OpCode::Assign, [target, value]) => self.eval_assign(target, value),
            (OpCode::And | OpCode::Or, [left, right]) => self.eval_logical(op, left, right),
            (op, [operand]) => {
                let value = self.eval_value(operand)?;
                let result = evaluate_unary(op, value)?;
                self.push_value(result)
            }
            (op, [left, right]) => {
                let left = self.eval_value(left)?;
                let right = self.eval_value(right)?;
                let result = evaluate_binary(op, left, right)?;
                self.push_value(result)
            }
            (op, operands) => Err(invalid_arity(op, operands.len())),
        }
    }

    /// `&&` and `||` skip their right operand when the left decides.
    fn eval_logical(&mut self, op: OpCode, left: &Node, right: &Node) -> EvalResult {
        let left = self.eval_value(left)?;
        match (op, &left) {
            (OpCode::And, Value::Bool(false)) => return self.push_bool(false),
            (OpCode::Or, Value::Bool(true)) => return self.push_bool(true),
            _ => {}
        }
        let right = self.eval_value(right)?;
        let result = evaluate_binary(op, left, right)?;
        self.push_value(result)
    }

    fn eval_ternary(&mut self, cond: &Node, then: &Node, otherwise: &Node) -> EvalResult {
        let info = self.eval(cond)?;
        if info.kind != ValueKind::Bool {
            self.remove_top(info)?;
            return Err(ternary_condition(info.kind));
        }
        let taken = if self.stack.pop_scalar::<bool>()? {
            then
        } else {
            otherwise
        };
        self.eval(taken)
    }

    fn eval_member(&mut self, owner: &Node, member: &Node) -> EvalResult {
        let owner = self.eval_member_owner(owner)?;
        match member {
            Node::Variable(name) => self.select_value(Some(&owner), name),
            Node::Int(index) => self.list_element(&owner, *index),
            _ => Err(invalid_member_operand()),
        }
    }

    fn eval_member_owner(&mut self, node: &Node) -> EvalResult<ObjectRef> {
        match self.eval_value(node)? {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(null_reference()),
            other => Err(invalid_member_owner(other.kind())),
        }
    }

    fn eval_assign(&mut self, target: &Node, value: &Node) -> EvalResult {
        match target {
            Node::Variable(name) => {
                let value = self.eval_value(value)?;
                self.assign_value(None, name, value)
            }
            Node::Expression {
                op: OpCode::Member,
                operands,
            } => match &operands[..] {
                [owner, Node::Variable(name)] => {
                    let owner = self.eval_member_owner(owner)?;
                    let value = self.eval_value(value)?;
                    self.assign_value(Some(&owner), name, value)
                }
                _ => Err(invalid_assignment_target()),
            },
            _ => Err(invalid_assignment_target()),
        }
    }

    /// Writes through the owner's member selector if it has one, otherwise
    /// through the registered selectors. Leaves `value` on the stack.
    fn assign_value(&mut self, owner: Option<&ObjectRef>, name: &str, value: Value) -> EvalResult {
        let accepted = match owner.and_then(ObjectRef::as_member_selector) {
            Some(members) => members.assign_member(name, &value),
            None => self
                .selectors
                .iter()
                .rev()
                .any(|(_, selector)| selector.assign_value(owner, name, &value)),
        };
        if !accepted {
            return Err(unassignable_identifier(name));
        }
        tracing::trace!(name, owner = owner.map(ObjectRef::type_name), "assigned");
        self.push_value(value)
    }

    fn eval_list(&mut self, element: ValueKind, items: &[Node]) -> EvalResult {
        let list = match element {
            ValueKind::Int => ObjectRef::new(self.eval_all(items, Self::eval_int)?),
            ValueKind::Float => ObjectRef::new(self.eval_all(items, Self::eval_float)?),
            ValueKind::Bool => ObjectRef::new(self.eval_all(items, Self::eval_bool)?),
            ValueKind::String => ObjectRef::new(
                self.eval_all(items, |ev, item| ev.eval_str(item).map(|s| s.to_string()))?,
            ),
            ValueKind::Object | ValueKind::Void => {
                ObjectRef::new(self.eval_all(items, Self::eval_value)?)
            }
        };
        self.push_value(Value::Object(list))
    }

    fn eval_all<T>(
        &mut self,
        items: &[Node],
        mut eval: impl FnMut(&mut Self, &Node) -> EvalResult<T>,
    ) -> EvalResult<Vec<T>> {
        items.iter().map(|item| eval(self, item)).collect()
    }

    fn eval_object_init(&mut self, type_name: &str, fields: &[Node]) -> EvalResult {
        if type_name.is_empty() {
            return Err(EvalError::MissingObjectType);
        }
        let initializer = self
            .initializers
            .get(type_name)
            .cloned()
            .ok_or_else(|| unknown_object_type(type_name))?;
        let mut instance = initializer.create_instance();
        for field in fields {
            let Node::Expression {
                op: OpCode::Assign,
                operands,
            } = field
            else {
                return Err(invalid_field_init());
            };
            let [Node::Variable(name), expr] = &operands[..] else {
                return Err(invalid_field_init());
            };
            let value = self.eval_value(expr)?;
            initializer.set_field(&mut *instance, name, value)?;
        }
        self.push_value(Value::Object(ObjectRef::from_boxed(instance)))
    }

    // Identifier resolution

    /// Resolves `name`, optionally as a member of `owner`, and pushes it.
    pub fn select_value(&mut self, owner: Option<&ObjectRef>, name: &str) -> EvalResult {
        if let Some(owner) = owner {
            if let Some(collection) = owner.as_collection() {
                if name == "Count" {
                    let len = collection.len();
                    return self.push_int(i32::try_from(len).unwrap_or(i32::MAX));
                }
            }
            if let Some(members) = owner.as_member_selector() {
                return match members.select_member(name) {
                    Some(value) => self.push_value(value),
                    None => Err(unknown_member(owner, name)),
                };
            }
        }

        let found = self
            .selectors
            .iter()
            .rev()
            .find_map(|(_, selector)| selector.select_value(owner, name));
        match (found, owner) {
            (Some(Value::Int(index)), Some(owner)) if owner.as_collection().is_some() => {
                self.list_element(owner, index)
            }
            (Some(value), _) => self.push_value(value),
            (None, Some(owner)) => Err(unknown_member(owner, name)),
            (None, None) => Err(undefined_identifier(name)),
        }
    }

    /// Pushes element `index` of `collection`. Indexing something that is
    /// not a collection yields `Void`.
    pub fn list_element(&mut self, collection: &ObjectRef, index: i32) -> EvalResult {
        let Some(list) = collection.as_collection() else {
            tracing::debug!(
                type_name = collection.type_name(),
                index,
                "indexed a non-collection object"
            );
            return Ok(ValueInfo::VOID);
        };
        let element = usize::try_from(index)
            .ok()
            .and_then(|i| list.element(i))
            .ok_or_else(|| index_out_of_range(index, list.len()))?;
        self.push_value(element)
    }

    // Typed evaluation

    /// Evaluates `node` and pops its value.
    pub fn eval_value(&mut self, node: &Node) -> EvalResult<Value> {
        let info = self.eval(node)?;
        self.pop_value(info)
    }

    pub fn eval_int(&mut self, node: &Node) -> EvalResult<i32> {
        let info = self.eval(node)?;
        match info.kind {
            ValueKind::Int => Ok(self.stack.pop_scalar()?),
            found => {
                self.remove_top(info)?;
                Err(type_mismatch(ValueKind::Int, found))
            }
        }
    }

    /// Accepts `int` as well, promoting it.
    pub fn eval_float(&mut self, node: &Node) -> EvalResult<f32> {
        let info = self.eval(node)?;
        match info.kind {
            ValueKind::Float => Ok(self.stack.pop_scalar()?),
            ValueKind::Int => Ok(promote(self.stack.pop_scalar()?)),
            found => {
                self.remove_top(info)?;
                Err(type_mismatch(ValueKind::Float, found))
            }
        }
    }

    pub fn eval_bool(&mut self, node: &Node) -> EvalResult<bool> {
        let info = self.eval(node)?;
        match info.kind {
            ValueKind::Bool => Ok(self.stack.pop_scalar()?),
            found => {
                self.remove_top(info)?;
                Err(type_mismatch(ValueKind::Bool, found))
            }
        }
    }

    pub fn eval_str(&mut self, node: &Node) -> EvalResult<Arc<str>> {
        match self.eval_value(node)? {
            Value::Str(s) => Ok(s),
            other => Err(type_mismatch(ValueKind::String, other.kind())),
        }
    }

    /// Evaluates `node` to its string form, whatever its kind.
    pub fn eval_string(&mut self, node: &Node) -> EvalResult<String> {
        let info = self.eval(node)?;
        self.pop_value_as_string(info)
    }

    pub fn eval_object(&mut self, node: &Node) -> EvalResult<ObjectRef> {
        match self.eval_value(node)? {
            Value::Object(obj) => Ok(obj),
            Value::Null => Err(null_reference()),
            other => Err(type_mismatch(ValueKind::Object, other.kind())),
        }
    }

    // Stack access

    pub fn push_int(&mut self, value: i32) -> EvalResult {
        let offset = self.stack.push_scalar(value)?;
        Ok(ValueInfo::new(ValueKind::Int, offset))
    }

    pub fn push_float(&mut self, value: f32) -> EvalResult {
        let offset = self.stack.push_scalar(value)?;
        Ok(ValueInfo::new(ValueKind::Float, offset))
    }

    pub fn push_bool(&mut self, value: bool) -> EvalResult {
        let offset = self.stack.push_scalar(value)?;
        Ok(ValueInfo::new(ValueKind::Bool, offset))
    }

    pub fn push_value(&mut self, value: Value) -> EvalResult {
        match value {
            Value::Void => Ok(ValueInfo::VOID),
            Value::Int(v) => self.push_int(v),
            Value::Float(v) => self.push_float(v),
            Value::Bool(v) => self.push_bool(v),
            Value::Str(_) => {
                let offset = self.stack.push_object(value)?;
                Ok(ValueInfo::new(ValueKind::String, offset))
            }
            Value::Object(_) | Value::Null => {
                let offset = self.stack.push_object(value)?;
                Ok(ValueInfo::new(ValueKind::Object, offset))
            }
        }
    }

    /// Pops the value `info` describes. `info` must describe the top value.
    pub fn pop_value(&mut self, info: ValueInfo) -> EvalResult<Value> {
        let value = match info.kind {
            ValueKind::Void => Value::Void,
            ValueKind::Int => Value::Int(self.stack.pop_scalar()?),
            ValueKind::Float => Value::Float(self.stack.pop_scalar()?),
            ValueKind::Bool => Value::Bool(self.stack.pop_scalar()?),
            ValueKind::String | ValueKind::Object => self.stack.pop_object()?,
        };
        Ok(value)
    }

    /// Reads the value `info` describes without popping it.
    pub fn get_value(&self, info: ValueInfo) -> EvalResult<Value> {
        let value = match info.kind {
            ValueKind::Void => Value::Void,
            ValueKind::Int => Value::Int(self.stack.get_scalar(info.offset)?),
            ValueKind::Float => Value::Float(self.stack.get_scalar(info.offset)?),
            ValueKind::Bool => Value::Bool(self.stack.get_scalar(info.offset)?),
            ValueKind::String | ValueKind::Object => self.stack.get_object(info.offset)?.clone(),
        };
        Ok(value)
    }

    pub fn pop_value_as_string(&mut self, info: ValueInfo) -> EvalResult<String> {
        Ok(self.pop_value(info)?.to_string())
    }

    pub fn get_value_as_string(&self, info: ValueInfo) -> EvalResult<String> {
        Ok(self.get_value(info)?.to_string())
    }

    /// Discards the value `info` describes.
    pub fn remove_top(&mut self, info: ValueInfo) -> EvalResult<()> {
        self.pop_value(info).map(drop)
    }

    /// Empties the evaluation stack.
    pub fn clear_stack(&mut self) {
        self.stack.clear();
    }
}
