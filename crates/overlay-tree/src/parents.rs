//! Child-to-parent lookup over a tree snapshot.
//!
//! The tree type has no parent pointers, so structural removal first builds a
//! [`ParentIndex`] with one full walk from the root. The index describes the
//! tree as it was when built; after a structural mutation it must be rebuilt
//! before it is consulted for nodes outside the current batch.

use std::collections::HashMap;

use crate::node::NodeId;
use crate::tree::Tree;

/// Maps every reachable node to the composite node that contains it.
///
/// Mapping keys and mapping values both map to the mapping itself.
#[derive(Clone, Debug, Default)]
pub struct ParentIndex {
    parents: HashMap<NodeId, NodeId>,
}

impl ParentIndex {
    /// Walk the whole tree below `root` and record each child's parent.
    pub fn build(tree: &Tree, root: NodeId) -> Self {
        let mut parents = HashMap::new();
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            for child in tree.get(parent).children() {
                parents.insert(child, parent);
                stack.push(child);
            }
        }
        Self { parents }
    }

    /// The parent of `node`, or `None` for the root and unknown nodes.
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(&node).copied()
    }

    /// Number of nodes that have a recorded parent.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[test]
    fn records_every_child() {
        let tree = Tree::from_yaml_str("a:\n  b: [1, 2]\nc: 3\n").unwrap();
        let index = ParentIndex::build(&tree, tree.root());
        let body = tree.body().unwrap();

        assert_eq!(index.parent_of(tree.root()), None);
        assert_eq!(index.parent_of(body), Some(tree.root()));

        let a = tree.mapping_value(body, "a").unwrap();
        let b = tree.mapping_value(a, "b").unwrap();
        assert_eq!(index.parent_of(a), Some(body));
        assert_eq!(index.parent_of(b), Some(a));

        let Node::Sequence(items) = tree.get(b) else {
            panic!("expected sequence");
        };
        for item in items {
            assert_eq!(index.parent_of(*item), Some(b));
        }
        // body, three key/value pairs, two sequence items
        assert_eq!(index.len(), 1 + 6 + 2);
    }

    #[test]
    fn keys_and_values_share_the_mapping_parent() {
        let tree = Tree::from_yaml_str("k: v\n").unwrap();
        let index = ParentIndex::build(&tree, tree.root());
        let body = tree.body().unwrap();
        let Node::Mapping(entries) = tree.get(body) else {
            panic!("expected mapping");
        };
        assert_eq!(index.parent_of(entries[0].key), Some(body));
        assert_eq!(index.parent_of(entries[0].value), Some(body));
    }

    #[test]
    fn detached_nodes_are_unknown() {
        let mut tree = Tree::from_yaml_str("a: 1\n").unwrap();
        let orphan = tree.alloc(Node::Sequence(Vec::new()));
        let index = ParentIndex::build(&tree, tree.root());
        assert_eq!(index.parent_of(orphan), None);
    }
}
