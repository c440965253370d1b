//! Structural removal through a [`ParentIndex`].

use overlay_tree::{Node, NodeId, ParentIndex, Tree};
use tracing::debug;

use crate::error::{PatchError, PatchResult};

/// Remove every node in `nodes`, in order.
///
/// The parent index is built once, before any mutation, so all lookups see
/// the tree as it was when the targets were selected.
pub fn remove_all(tree: &mut Tree, nodes: &[NodeId]) -> PatchResult<()> {
    if nodes.is_empty() {
        return Ok(());
    }
    let index = ParentIndex::build(tree, tree.root());
    for &node in nodes {
        remove_node(tree, &index, node)?;
    }
    Ok(())
}

/// Detach `node` from its parent.
///
/// A mapping loses the whole pair `node` belongs to, whether `node` is the
/// key or the value. A node that is no longer among its parent's children
/// (already removed) is left alone.
pub fn remove_node(tree: &mut Tree, index: &ParentIndex, node: NodeId) -> PatchResult<()> {
    let parent = index
        .parent_of(node)
        .ok_or(PatchError::ParentNotFound(node))?;

    let removed = match tree.get_mut(parent) {
        Node::Mapping(entries) => match entries.iter().position(|e| e.holds(node)) {
            Some(i) => {
                entries.remove(i);
                true
            }
            None => false,
        },
        Node::Sequence(items) => match items.iter().position(|&item| item == node) {
            Some(i) => {
                items.remove(i);
                true
            }
            None => false,
        },
        Node::Document(body) if *body == Some(node) => {
            *body = None;
            true
        }
        Node::Document(_) => false,
        other => {
            return Err(PatchError::UnsupportedParent {
                node,
                kind: other.kind(),
            })
        }
    };

    if !removed {
        debug!(%node, %parent, "node already detached from its parent");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use overlay_tree::{NodeKind, Scalar};

    use super::*;

    fn yaml(text: &str) -> Tree {
        Tree::from_yaml_str(text).unwrap()
    }

    #[test]
    fn removes_mapping_pair_by_value() {
        let mut tree = yaml("a: 1\nb: 2\nc: 3\n");
        let b = tree.mapping_value(tree.body().unwrap(), "b").unwrap();
        remove_all(&mut tree, &[b]).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "a: 1\nc: 3\n");
    }

    #[test]
    fn removes_mapping_pair_by_key() {
        let mut tree = yaml("a: 1\nb: 2\n");
        let body = tree.body().unwrap();
        let Node::Mapping(entries) = tree.get(body) else {
            panic!("expected mapping");
        };
        let key_a = entries[0].key;
        remove_all(&mut tree, &[key_a]).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "b: 2\n");
    }

    #[test]
    fn removes_sequence_elements_against_the_original_index() {
        let mut tree = yaml("- a\n- b\n- c\n- d\n");
        let Node::Sequence(items) = tree.get(tree.body().unwrap()).clone() else {
            panic!("expected sequence");
        };
        remove_all(&mut tree, &[items[1], items[2]]).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "- a\n- d\n");
    }

    #[test]
    fn removing_the_body_empties_the_document() {
        let mut tree = yaml("a: 1\n");
        let body = tree.body().unwrap();
        remove_all(&mut tree, &[body]).unwrap();
        assert!(tree.body().is_none());
        assert_eq!(tree.to_yaml_string().unwrap(), "");
    }

    #[test]
    fn nested_and_outer_removal_in_one_batch() {
        let mut tree = yaml("a:\n  b: 1\nc: 2\n");
        let body = tree.body().unwrap();
        let a = tree.mapping_value(body, "a").unwrap();
        let b = tree.mapping_value(a, "b").unwrap();
        remove_all(&mut tree, &[a, b]).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "c: 2\n");
    }

    #[test]
    fn second_removal_of_the_same_node_is_harmless() {
        let mut tree = yaml("a: 1\nb: 2\n");
        let a = tree.mapping_value(tree.body().unwrap(), "a").unwrap();
        let index = ParentIndex::build(&tree, tree.root());
        remove_node(&mut tree, &index, a).unwrap();
        remove_node(&mut tree, &index, a).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "b: 2\n");
    }

    #[test]
    fn root_has_no_parent() {
        let mut tree = Tree::with_root(Node::Mapping(Vec::new()));
        let root = tree.root();
        assert!(matches!(
            remove_all(&mut tree, &[root]),
            Err(PatchError::ParentNotFound(id)) if id == root
        ));
    }

    #[test]
    fn scalar_parent_is_unsupported() {
        let mut tree = Tree::with_root(Node::Scalar(Scalar::Null));
        let child = tree.alloc(Node::Scalar(Scalar::from("x")));
        // Fabricate an index in which a scalar claims a child.
        let mut index_tree = Tree::with_root(Node::Sequence(Vec::new()));
        let _ = index_tree.alloc(Node::Scalar(Scalar::Null));
        index_tree.set(index_tree.root(), Node::Sequence(vec![child]));
        let index = ParentIndex::build(&index_tree, index_tree.root());

        let err = remove_node(&mut tree, &index, child).unwrap_err();
        assert!(matches!(
            err,
            PatchError::UnsupportedParent { kind: NodeKind::Scalar, .. }
        ));
    }
}
