use std::fmt;

use serde_yaml::{Number, Value};

/// Identity of a node within a [`Tree`](crate::Tree).
///
/// Two structurally identical nodes at different positions have different
/// ids. Selectors and the parent index key on this identity, never on value
/// equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a node, without its content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
    Document,
    Alias,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scalar => "scalar",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Document => "document",
            Self::Alias => "alias",
        };
        f.write_str(name)
    }
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Scalar {
    /// The text used to compare mapping keys and to name path steps.
    ///
    /// `200` and `"200"` produce the same key text.
    pub fn key_text(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Borrow the string content, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value as `f64`, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Convert into the plain value representation.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(Number::from(n))
    }
}

/// One key/value pair of a mapping. Both halves are nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: NodeId,
    pub value: NodeId,
}

impl Entry {
    pub fn new(key: NodeId, value: NodeId) -> Self {
        Self { key, value }
    }

    /// Returns `true` if `node` is either the key or the value of this pair.
    pub fn holds(&self, node: NodeId) -> bool {
        self.key == node || self.value == node
    }
}

/// A document tree node.
///
/// Composite nodes refer to their children by [`NodeId`]; no node refers to
/// its parent. See [`ParentIndex`](crate::ParentIndex).
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<NodeId>),
    /// Ordered pairs; keys are unique by key text.
    Mapping(Vec<Entry>),
    /// Single (optional) body.
    Document(Option<NodeId>),
    /// Reference to an anchored node. Kept by name only and never resolved.
    Alias(String),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(_) => NodeKind::Scalar,
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
            Self::Document(_) => NodeKind::Document,
            Self::Alias(_) => NodeKind::Alias,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Every direct child in document order. Mapping keys come before their
    /// values.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Sequence(items) => items.clone(),
            Self::Mapping(entries) => entries.iter().flat_map(|e| [e.key, e.value]).collect(),
            Self::Document(Some(body)) => vec![*body],
            Self::Document(None) | Self::Scalar(_) | Self::Alias(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_text_unifies_numbers_and_strings() {
        assert_eq!(Scalar::from(200_i64).key_text(), Scalar::from("200").key_text());
        assert_eq!(Scalar::Null.key_text(), "null");
        assert_eq!(Scalar::from(true).key_text(), "true");
    }

    #[test]
    fn scalar_equality_is_typed() {
        assert_ne!(Scalar::from(1_i64), Scalar::from("1"));
        assert_eq!(Scalar::from("a"), Scalar::String("a".into()));
    }

    #[test]
    fn mapping_children_interleave_keys_and_values() {
        let node = Node::Mapping(vec![
            Entry::new(NodeId::new(1), NodeId::new(2)),
            Entry::new(NodeId::new(3), NodeId::new(4)),
        ]);
        let ids: Vec<usize> = node.children().into_iter().map(NodeId::index).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn entry_holds_key_or_value() {
        let entry = Entry::new(NodeId::new(7), NodeId::new(8));
        assert!(entry.holds(NodeId::new(7)));
        assert!(entry.holds(NodeId::new(8)));
        assert!(!entry.holds(NodeId::new(9)));
    }

    #[test]
    fn kind_display() {
        assert_eq!(Node::Alias("a".into()).kind().to_string(), "alias");
        assert_eq!(Node::Document(None).kind(), NodeKind::Document);
    }
}
