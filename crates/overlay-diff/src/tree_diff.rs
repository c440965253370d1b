//! Tree-level diff: walk two document trees in lock-step and emit one action
//! per differing position.
//!
//! Mapping entries are matched by key text. Entries only on the right become
//! an update of the mapping that adds the key; entries only on the left
//! become a removal. Sequences of equal length are compared position by
//! position; any other sequence change replaces the whole sequence.

use std::collections::{HashMap, HashSet};

use overlay_path::Path;
use overlay_schema::Action;
use overlay_tree::{Entry, Node, NodeId, Tree};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{DiffError, DiffResult};

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TreeDiff {
    /// Actions that turn the left tree into the right one, in walk order.
    pub actions: Vec<Action>,
    /// Positions that were skipped, with the reason.
    pub notices: Vec<String>,
}

impl TreeDiff {
    /// Create an empty tree diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

/// Compare two document trees.
pub fn diff_trees(left: &Tree, right: &Tree) -> DiffResult<TreeDiff> {
    let mut walker = Walker {
        left,
        right,
        diff: TreeDiff::new(),
    };
    let root = Path::root();
    match (left.body(), right.body()) {
        (None, None) => {}
        (None, Some(body)) => {
            let value = walker.convert(&root, body)?;
            walker.push(Action::update(root.render(), value));
        }
        (Some(_), None) => walker.push(Action::remove(root.render())),
        (Some(l), Some(r)) => walker.walk(&root, l, r)?,
    }
    debug!(
        actions = walker.diff.actions.len(),
        notices = walker.diff.notices.len(),
        "compared trees"
    );
    Ok(walker.diff)
}

struct Walker<'a> {
    left: &'a Tree,
    right: &'a Tree,
    diff: TreeDiff,
}

impl<'a> Walker<'a> {
    fn walk(&mut self, path: &Path, left: NodeId, right: NodeId) -> DiffResult<()> {
        let (l, r) = (self.left, self.right);
        match (l.get(left), r.get(right)) {
            (Node::Alias(name), _) | (_, Node::Alias(name)) => {
                let notice = format!("{path}: alias *{name} is not supported by compare, skipped");
                warn!(path = %path, alias = %name, "skipping alias node");
                self.diff.notices.push(notice);
            }
            (Node::Document(inner), _) => match *inner {
                Some(inner) => self.walk(path, inner, right)?,
                None => self.replace(path, right)?,
            },
            (_, Node::Document(inner)) => match *inner {
                Some(inner) => self.walk(path, left, inner)?,
                None => self.push(Action::update(path.render(), Value::Null)),
            },
            (Node::Scalar(a), Node::Scalar(b)) => {
                if a != b {
                    self.replace(path, right)?;
                }
            }
            (Node::Mapping(a), Node::Mapping(b)) => self.walk_mapping(path, a, b)?,
            (Node::Sequence(a), Node::Sequence(b)) if a.len() == b.len() => {
                for (i, (x, y)) in a.iter().zip(b).enumerate() {
                    self.walk(&path.with_index(i), *x, *y)?;
                }
            }
            _ => self.replace(path, right)?,
        }
        Ok(())
    }

    fn walk_mapping(&mut self, path: &Path, left: &[Entry], right: &[Entry]) -> DiffResult<()> {
        let (l, r) = (self.left, self.right);
        let by_key: HashMap<String, NodeId> = left
            .iter()
            .filter_map(|e| l.key_text(e.key).map(|k| (k, e.value)))
            .collect();

        let mut seen = HashSet::with_capacity(right.len());
        for entry in right {
            let Some(key) = r.key_text(entry.key) else {
                self.notice(path, "non-scalar mapping key skipped");
                continue;
            };
            match by_key.get(&key) {
                Some(&value) => self.walk(&path.with_key(key.as_str()), value, entry.value)?,
                None => self.add(path, entry)?,
            }
            seen.insert(key);
        }

        for entry in left {
            if let Some(key) = l.key_text(entry.key) {
                if !seen.contains(&key) {
                    self.push(Action::remove(path.with_key(key).render()));
                }
            }
        }
        Ok(())
    }

    /// An entry that exists only on the right: merge `{key: value}` into the
    /// mapping at `path`. The key keeps its original scalar type.
    fn add(&mut self, path: &Path, entry: &Entry) -> DiffResult<()> {
        let r = self.right;
        let key = r.to_value(entry.key).map_err(|source| DiffError::Convert {
            path: path.render(),
            source,
        })?;
        let child = match r.key_text(entry.key) {
            Some(text) => path.with_key(text),
            None => path.clone(),
        };
        let value = self.convert(&child, entry.value)?;
        let mut update = Mapping::with_capacity(1);
        update.insert(key, value);
        self.push(Action::update(path.render(), Value::Mapping(update)));
        Ok(())
    }

    fn replace(&mut self, path: &Path, right: NodeId) -> DiffResult<()> {
        let value = self.convert(path, right)?;
        self.push(Action::update(path.render(), value));
        Ok(())
    }

    fn convert(&self, path: &Path, node: NodeId) -> DiffResult<Value> {
        self.right.to_value(node).map_err(|source| DiffError::Convert {
            path: path.render(),
            source,
        })
    }

    fn notice(&mut self, path: &Path, reason: &str) {
        warn!(path = %path, reason, "compare notice");
        self.diff.notices.push(format!("{path}: {reason}"));
    }

    fn push(&mut self, action: Action) {
        self.diff.actions.push(action);
    }
}
