//! Selector evaluation over a [`Tree`].
//!
//! Results are node ids in document order. Filters see the tree through the
//! same ids, so a match can be mutated through the tree afterwards.

use overlay_tree::{Node, NodeId, Scalar, Tree};
use regex::Regex;
use tracing::debug;

use crate::ast::*;
use crate::dialect::Dialect;
use crate::error::EvalError;

type EvalResult<T> = Result<T, EvalError>;

/// A comparison operand after evaluation.
enum Value<'a> {
    /// An empty node list.
    Nothing,
    Node(NodeId),
    Scalar(&'a Scalar),
    Owned(Scalar),
}

pub(crate) struct Evaluator<'t> {
    tree: &'t Tree,
    /// Node addressed by `$`.
    root: NodeId,
    dialect: Dialect,
}

impl<'t> Evaluator<'t> {
    pub(crate) fn new(tree: &'t Tree, root: NodeId, dialect: Dialect) -> Self {
        Self {
            tree,
            root,
            dialect,
        }
    }

    pub(crate) fn query(&self, query: &Query, current: NodeId) -> EvalResult<Vec<NodeId>> {
        let start = match query.root {
            QueryRoot::Root => self.root,
            QueryRoot::Current => current,
        };
        let mut nodes = vec![start];
        for segment in &query.segments {
            let mut next = Vec::new();
            for node in nodes {
                if segment.descendant {
                    for descendant in self.descendants(node) {
                        self.select(descendant, &segment.selectors, &mut next)?;
                    }
                } else {
                    self.select(node, &segment.selectors, &mut next)?;
                }
            }
            nodes = next;
        }
        Ok(nodes)
    }

    /// `node` followed by every node below it, pre-order. Mapping keys are
    /// not part of the value tree and are skipped.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.values(id).into_iter().rev());
        }
        out
    }

    fn values(&self, id: NodeId) -> Vec<NodeId> {
        match self.tree.get(id) {
            Node::Sequence(items) => items.clone(),
            Node::Mapping(entries) => entries.iter().map(|e| e.value).collect(),
            _ => Vec::new(),
        }
    }

    fn select(&self, node: NodeId, selectors: &[Selector], out: &mut Vec<NodeId>) -> EvalResult<()> {
        if let Node::Alias(name) = self.tree.get(node) {
            return Err(EvalError::Alias(name.clone()));
        }
        for selector in selectors {
            self.apply(node, selector, out)?;
        }
        Ok(())
    }

    fn apply(&self, node: NodeId, selector: &Selector, out: &mut Vec<NodeId>) -> EvalResult<()> {
        match (selector, self.tree.get(node)) {
            (Selector::Name(name), Node::Mapping(_)) => {
                out.extend(self.tree.mapping_value(node, name));
            }
            (Selector::Index(index), Node::Sequence(items)) => {
                if let Some(i) = normalize_index(*index, items.len()) {
                    out.push(items[i]);
                }
            }
            (Selector::Slice { start, end, step }, Node::Sequence(items)) => {
                out.extend(
                    slice_indices(*start, *end, *step, items.len())
                        .into_iter()
                        .filter_map(|i| items.get(i).copied()),
                );
            }
            (Selector::Wildcard, Node::Sequence(_) | Node::Mapping(_)) => {
                out.extend(self.values(node));
            }
            (Selector::Filter(filter), Node::Sequence(items)) => {
                for item in items {
                    if self.test(filter, *item)? {
                        out.push(*item);
                    }
                }
            }
            (Selector::Filter(filter), Node::Mapping(entries)) => match self.dialect {
                Dialect::Rfc9535 => {
                    for entry in entries {
                        if self.test(filter, entry.value)? {
                            out.push(entry.value);
                        }
                    }
                }
                // Legacy filters test a mapping as a whole.
                Dialect::Legacy => {
                    if self.test(filter, node)? {
                        out.push(node);
                    }
                }
            },
            _ => {}
        }
        Ok(())
    }

    fn test(&self, filter: &Filter, current: NodeId) -> EvalResult<bool> {
        match filter {
            Filter::Or(left, right) => Ok(self.test(left, current)? || self.test(right, current)?),
            Filter::And(left, right) => Ok(self.test(left, current)? && self.test(right, current)?),
            Filter::Not(inner) => Ok(!self.test(inner, current)?),
            Filter::Exists(query) => Ok(!self.query(query, current)?.is_empty()),
            Filter::Compare { op, left, right } => {
                let left = self.comparable(left, current)?;
                let right = self.comparable(right, current)?;
                Ok(self.compare(*op, &left, &right))
            }
            Filter::Function(call) => self.logical(call, current),
            Filter::RegexMatch { subject, regex } => {
                let subject = self.comparable(subject, current)?;
                Ok(self.as_str(&subject).is_some_and(|s| regex.is_match(s)))
            }
        }
    }

    fn comparable<'a>(&'a self, comparable: &'a Comparable, current: NodeId) -> EvalResult<Value<'a>> {
        match comparable {
            Comparable::Literal(scalar) => Ok(Value::Scalar(scalar)),
            Comparable::Query(query) => self.first(query, current),
            Comparable::Function(call) => self.value_function(call, current),
        }
    }

    fn first(&self, query: &Query, current: NodeId) -> EvalResult<Value<'_>> {
        Ok(match self.query(query, current)?.first() {
            Some(node) => Value::Node(*node),
            None => Value::Nothing,
        })
    }

    fn argument<'a>(&'a self, arg: Option<&'a FunctionArg>, current: NodeId) -> EvalResult<Value<'a>> {
        match arg {
            Some(FunctionArg::Literal(scalar)) => Ok(Value::Scalar(scalar)),
            Some(FunctionArg::Query(query)) => self.first(query, current),
            Some(FunctionArg::Function(call)) => self.value_function(call, current),
            None => Ok(Value::Nothing),
        }
    }

    fn nodes_argument(&self, arg: Option<&FunctionArg>, current: NodeId) -> EvalResult<Vec<NodeId>> {
        match arg {
            Some(FunctionArg::Query(query)) => self.query(query, current),
            _ => Ok(Vec::new()),
        }
    }

    fn value_function(&self, call: &FunctionCall, current: NodeId) -> EvalResult<Value<'_>> {
        let first = call.args.first();
        Ok(match call.function {
            Function::Length => {
                let len = match &self.argument(first, current)? {
                    Value::Node(id) => match self.tree.get(*id) {
                        Node::Sequence(items) => Some(items.len()),
                        Node::Mapping(entries) => Some(entries.len()),
                        Node::Scalar(Scalar::String(s)) => Some(s.chars().count()),
                        _ => None,
                    },
                    Value::Scalar(Scalar::String(s)) | Value::Owned(Scalar::String(s)) => {
                        Some(s.chars().count())
                    }
                    _ => None,
                };
                match len {
                    Some(len) => Value::Owned(Scalar::from(len as i64)),
                    None => Value::Nothing,
                }
            }
            Function::Count => {
                let count = self.nodes_argument(first, current)?.len();
                Value::Owned(Scalar::from(count as i64))
            }
            Function::Value => match self.nodes_argument(first, current)?.as_slice() {
                [node] => Value::Node(*node),
                _ => Value::Nothing,
            },
            Function::Match | Function::Search => {
                Value::Owned(Scalar::Bool(self.logical(call, current)?))
            }
        })
    }

    fn logical(&self, call: &FunctionCall, current: NodeId) -> EvalResult<bool> {
        let anchored = match call.function {
            Function::Match => true,
            Function::Search => false,
            _ => return Ok(!matches!(self.value_function(call, current)?, Value::Nothing)),
        };
        let subject = self.argument(call.args.first(), current)?;
        let pattern = self.argument(call.args.get(1), current)?;
        let (Some(subject), Some(pattern)) = (self.as_str(&subject), self.as_str(&pattern)) else {
            return Ok(false);
        };
        let source = if anchored {
            format!("^(?:{pattern})$")
        } else {
            pattern.to_string()
        };
        match Regex::new(&source) {
            Ok(regex) => Ok(regex.is_match(subject)),
            Err(err) => {
                debug!(pattern, error = %err, "invalid regular expression in filter");
                Ok(false)
            }
        }
    }

    fn scalar<'a>(&'a self, value: &'a Value<'a>) -> Option<&'a Scalar> {
        match value {
            Value::Node(id) => self.tree.get(*id).as_scalar(),
            Value::Scalar(scalar) => Some(*scalar),
            Value::Owned(scalar) => Some(scalar),
            Value::Nothing => None,
        }
    }

    fn as_str<'a>(&'a self, value: &'a Value<'a>) -> Option<&'a str> {
        self.scalar(value).and_then(Scalar::as_str)
    }

    fn compare(&self, op: CompareOp, left: &Value<'_>, right: &Value<'_>) -> bool {
        match op {
            CompareOp::Eq => self.equal(left, right),
            CompareOp::Ne => !self.equal(left, right),
            CompareOp::Lt => self.less(left, right),
            CompareOp::Le => self.less(left, right) || self.equal(left, right),
            CompareOp::Gt => self.less(right, left),
            CompareOp::Ge => self.less(right, left) || self.equal(left, right),
        }
    }

    fn equal(&self, left: &Value<'_>, right: &Value<'_>) -> bool {
        match (left, right) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Nothing, _) | (_, Value::Nothing) => false,
            _ => match (self.scalar(left), self.scalar(right)) {
                (Some(a), Some(b)) => scalar_eq(a, b),
                (None, None) => match (left, right) {
                    (Value::Node(a), Value::Node(b)) => self.tree.semantic_eq(*a, self.tree, *b),
                    _ => false,
                },
                _ => false,
            },
        }
    }

    fn less(&self, left: &Value<'_>, right: &Value<'_>) -> bool {
        let (Some(a), Some(b)) = (self.scalar(left), self.scalar(right)) else {
            return false;
        };
        match (a, b) {
            (Scalar::Number(_), Scalar::Number(_)) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x < y,
                _ => false,
            },
            (Scalar::String(x), Scalar::String(y)) => x < y,
            _ => false,
        }
    }
}

fn scalar_eq(a: &Scalar, b: &Scalar) -> bool {
    match (a, b) {
        (Scalar::Number(_), Scalar::Number(_)) => a.as_f64() == b.as_f64(),
        _ => a == b,
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { len + index } else { index };
    (0..len).contains(&i).then_some(i as usize)
}

/// Selected positions of a slice, in selection order.
fn slice_indices(start: Option<i64>, end: Option<i64>, step: Option<i64>, len: usize) -> Vec<usize> {
    let len = len as i64;
    let step = step.unwrap_or(1);
    let normalize = |i: i64| if i >= 0 { i } else { len + i };
    let mut out = Vec::new();
    if step > 0 {
        let lower = start.map_or(0, normalize).clamp(0, len);
        let upper = end.map_or(len, normalize).clamp(0, len);
        let mut i = lower;
        while i < upper {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    } else if step < 0 {
        let upper = start.map_or(len - 1, normalize).clamp(-1, len - 1);
        let lower = end.map_or(-len - 1, normalize).clamp(-1, len - 1);
        let mut i = upper;
        while lower < i {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
    }
    out
}
