//! The arena-backed document tree.
//!
//! A [`Tree`] owns every node it contains in a flat `Vec<Node>`. Nodes refer
//! to their children by [`NodeId`], which doubles as node identity. Nodes that
//! are detached by a removal or replaced by a merge stay in the arena but are
//! no longer reachable from the root.

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{TreeError, TreeResult};
use crate::node::{Entry, Node, NodeId, NodeKind, Scalar};

/// A document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty document (a `Document` root with no body).
    pub fn new() -> Self {
        Self::with_root(Node::Document(None))
    }

    /// A tree whose root is the given node. Children of `node` must be
    /// allocated afterwards with [`Tree::alloc`] and linked by the caller.
    pub fn with_root(node: Node) -> Self {
        Self {
            nodes: vec![node],
            root: NodeId::new(0),
        }
    }

    /// Build a document tree from a plain value. The root is a `Document`
    /// node whose body is the imported value.
    pub fn from_value(value: &Value) -> Self {
        let mut tree = Self::new();
        let body = tree.import(value);
        tree.nodes[0] = Node::Document(Some(body));
        tree
    }

    /// Parse YAML (or JSON) text into a document tree.
    ///
    /// Input without any content (blank or only comments) is an empty
    /// document rather than a document holding `null`.
    pub fn from_yaml_str(input: &str) -> TreeResult<Self> {
        let blank = input.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::new());
        }
        let value: Value = serde_yaml::from_str(input)?;
        Ok(Self::from_value(&value))
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The first non-document node below the root, if any.
    ///
    /// This is the node that the `$` selector addresses.
    pub fn body(&self) -> Option<NodeId> {
        let mut current = self.root;
        loop {
            match self.get(current) {
                Node::Document(Some(child)) => current = *child,
                Node::Document(None) => return None,
                _ => return Some(current),
            }
        }
    }

    /// Number of nodes in the arena, including detached ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutably borrow a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Replace the content of a node in place, keeping its identity.
    pub fn set(&mut self, id: NodeId, node: Node) {
        self.nodes[id.index()] = node;
    }

    /// Allocate a new, unattached node.
    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Kind of the node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).kind()
    }

    /// Key text of a scalar node, `None` for any other kind.
    pub fn key_text(&self, id: NodeId) -> Option<String> {
        self.get(id).as_scalar().map(Scalar::key_text)
    }

    /// Look up the value node stored under `key` in a mapping node.
    pub fn mapping_value(&self, mapping: NodeId, key: &str) -> Option<NodeId> {
        match self.get(mapping) {
            Node::Mapping(entries) => entries
                .iter()
                .find(|e| self.key_text(e.key).as_deref() == Some(key))
                .map(|e| e.value),
            _ => None,
        }
    }

    /// Import a plain value as a new, unattached subtree and return its root.
    ///
    /// YAML tags are dropped; the tagged value itself is imported.
    pub fn import(&mut self, value: &Value) -> NodeId {
        let node = match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Node::Scalar(Scalar::Number(n.clone())),
            Value::String(s) => Node::Scalar(Scalar::String(s.clone())),
            Value::Sequence(items) => {
                let children = items.iter().map(|item| self.import(item)).collect();
                Node::Sequence(children)
            }
            Value::Mapping(map) => {
                let entries = map
                    .iter()
                    .map(|(k, v)| Entry::new(self.import(k), self.import(v)))
                    .collect();
                Node::Mapping(entries)
            }
            Value::Tagged(tagged) => {
                debug!(tag = %tagged.tag, "dropping YAML tag on import");
                return self.import(&tagged.value);
            }
        };
        self.alloc(node)
    }

    /// Convert a subtree into the plain value representation.
    ///
    /// Documents convert to their body (or null when empty). Aliases cannot
    /// be converted.
    pub fn to_value(&self, id: NodeId) -> TreeResult<Value> {
        match self.get(id) {
            Node::Scalar(s) => Ok(s.to_value()),
            Node::Sequence(items) => items
                .iter()
                .map(|item| self.to_value(*item))
                .collect::<TreeResult<Vec<_>>>()
                .map(Value::Sequence),
            Node::Mapping(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for entry in entries {
                    map.insert(self.to_value(entry.key)?, self.to_value(entry.value)?);
                }
                Ok(Value::Mapping(map))
            }
            Node::Document(Some(body)) => self.to_value(*body),
            Node::Document(None) => Ok(Value::Null),
            Node::Alias(_) => Err(TreeError::UnsupportedNodeKind(NodeKind::Alias)),
        }
    }

    /// Emit the document as YAML. An empty document emits nothing.
    pub fn to_yaml_string(&self) -> TreeResult<String> {
        match self.body() {
            Some(body) => Ok(serde_yaml::to_string(&self.to_value(body)?)?),
            None => Ok(String::new()),
        }
    }

    /// Emit the document as pretty-printed JSON.
    pub fn to_json_string(&self) -> TreeResult<String> {
        let value = match self.body() {
            Some(body) => self.to_value(body)?,
            None => Value::Null,
        };
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Structural equality that is sensitive to mapping key order.
    ///
    /// Two subtrees are `deep_eq` exactly when they serialize identically.
    pub fn deep_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        self.compare(a, other, b, true)
    }

    /// Structural equality that ignores mapping key order.
    pub fn semantic_eq(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        self.compare(a, other, b, false)
    }

    fn compare(&self, a: NodeId, other: &Tree, b: NodeId, ordered: bool) -> bool {
        match (self.get(a), other.get(b)) {
            (Node::Scalar(x), Node::Scalar(y)) => x == y,
            (Node::Alias(x), Node::Alias(y)) => x == y,
            (Node::Document(x), Node::Document(y)) => match (x, y) {
                (Some(x), Some(y)) => self.compare(*x, other, *y, ordered),
                (None, None) => true,
                _ => false,
            },
            (Node::Sequence(xs), Node::Sequence(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys)
                        .all(|(x, y)| self.compare(*x, other, *y, ordered))
            }
            (Node::Mapping(xs), Node::Mapping(ys)) if xs.len() == ys.len() => {
                if ordered {
                    xs.iter().zip(ys).all(|(x, y)| {
                        self.compare(x.key, other, y.key, ordered)
                            && self.compare(x.value, other, y.value, ordered)
                    })
                } else {
                    xs.iter().all(|x| {
                        let Some(key) = self.key_text(x.key) else {
                            return false;
                        };
                        ys.iter()
                            .find(|y| other.key_text(y.key).as_deref() == Some(key.as_str()))
                            .is_some_and(|y| self.compare(x.value, other, y.value, ordered))
                    })
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(input: &str) -> Tree {
        Tree::from_yaml_str(input).unwrap()
    }

    #[test]
    fn from_value_wraps_body_in_document() {
        let tree = yaml("a: 1\nb: [x, y]\n");
        assert_eq!(tree.kind(tree.root()), NodeKind::Document);
        let body = tree.body().unwrap();
        assert_eq!(tree.kind(body), NodeKind::Mapping);
        let b = tree.mapping_value(body, "b").unwrap();
        assert_eq!(tree.kind(b), NodeKind::Sequence);
    }

    #[test]
    fn value_roundtrip_preserves_key_order() {
        let text = "zeta: 1\nalpha: 2\nmid:\n- 3\n- q: r\n";
        let tree = yaml(text);
        assert_eq!(tree.to_yaml_string().unwrap(), text);
    }

    #[test]
    fn alias_cannot_be_converted() {
        let tree = Tree::with_root(Node::Alias("anchor".into()));
        assert!(matches!(
            tree.to_value(tree.root()),
            Err(TreeError::UnsupportedNodeKind(NodeKind::Alias))
        ));
    }

    #[test]
    fn empty_document_emits_nothing() {
        let tree = Tree::new();
        assert!(tree.body().is_none());
        assert_eq!(tree.to_yaml_string().unwrap(), "");
        assert_eq!(tree.to_json_string().unwrap(), "null");
    }

    #[test]
    fn blank_input_is_an_empty_document() {
        assert!(yaml("").body().is_none());
        assert!(yaml("# only a comment\n\n").body().is_none());
        let null = yaml("~\n");
        assert_eq!(null.kind(null.body().unwrap()), NodeKind::Scalar);
    }

    #[test]
    fn json_output() {
        let tree = yaml("{\"a\": [1, true, null]}");
        assert_eq!(
            tree.to_json_string().unwrap(),
            "{\n  \"a\": [\n    1,\n    true,\n    null\n  ]\n}"
        );
    }

    #[test]
    fn deep_eq_is_order_sensitive_semantic_eq_is_not() {
        let a = yaml("a: 1\nb: 2\n");
        let b = yaml("b: 2\na: 1\n");
        assert!(!a.deep_eq(a.root(), &b, b.root()));
        assert!(a.semantic_eq(a.root(), &b, b.root()));
        assert!(a.deep_eq(a.root(), &a.clone(), a.root()));
    }

    #[test]
    fn identical_values_have_distinct_ids() {
        let tree = yaml("- same\n- same\n");
        let Node::Sequence(items) = tree.get(tree.body().unwrap()) else {
            panic!("expected sequence");
        };
        assert_ne!(items[0], items[1]);
        assert!(tree.deep_eq(items[0], &tree, items[1]));
    }

    #[test]
    fn numeric_keys_match_by_key_text() {
        let tree = yaml("200: ok\n");
        let body = tree.body().unwrap();
        assert!(tree.mapping_value(body, "200").is_some());
    }

    #[test]
    fn set_keeps_identity() {
        let mut tree = yaml("a: 1\n");
        let body = tree.body().unwrap();
        let a = tree.mapping_value(body, "a").unwrap();
        tree.set(a, Node::Scalar(Scalar::from("changed")));
        assert_eq!(tree.mapping_value(body, "a"), Some(a));
        assert_eq!(tree.to_yaml_string().unwrap(), "a: changed\n");
    }
}
