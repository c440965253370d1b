//! Deep merge of an update document into a tree node.
//!
//! Dispatch is on the target's kind:
//!
//! - kinds differ: the target takes the update's node wholesale;
//! - scalar: the target takes the update's value;
//! - mapping: keys are merged recursively, new keys are appended;
//! - sequence: the target is replaced by the update's elements;
//! - document: the update is merged into the body, or becomes the body of an
//!   empty document.

use std::collections::HashMap;

use overlay_tree::{Entry, Node, NodeId, Tree};
use serde_yaml::Value;

/// Merge `update` into `target`, mutating the tree in place.
///
/// The update is imported fresh on every call, so merging one update into
/// several targets never shares nodes between them.
pub fn merge(tree: &mut Tree, target: NodeId, update: &Value) {
    let source = tree.import(update);
    merge_nodes(tree, target, source);
}

fn merge_nodes(tree: &mut Tree, target: NodeId, source: NodeId) {
    match (tree.get(target), tree.get(source)) {
        (Node::Mapping(existing), Node::Mapping(incoming)) => {
            let mut by_key: HashMap<String, NodeId> = existing
                .iter()
                .filter_map(|e| tree.key_text(e.key).map(|k| (k, e.value)))
                .collect();
            let incoming = incoming.clone();

            for entry in incoming {
                let key = tree.key_text(entry.key);
                match key.as_ref().and_then(|k| by_key.get(k)) {
                    Some(&value) => merge_nodes(tree, value, entry.value),
                    None => {
                        if let Node::Mapping(entries) = tree.get_mut(target) {
                            entries.push(Entry::new(entry.key, entry.value));
                        }
                        if let Some(key) = key {
                            by_key.insert(key, entry.value);
                        }
                    }
                }
            }
        }
        (Node::Document(None), _) => tree.set(target, Node::Document(Some(source))),
        (Node::Document(Some(body)), _) => {
            let body = *body;
            merge_nodes(tree, body, source);
        }
        _ => {
            let node = tree.get(source).clone();
            tree.set(target, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Tree {
        Tree::from_yaml_str(text).unwrap()
    }

    fn value(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn merged(doc: &str, update: &str) -> String {
        let mut tree = yaml(doc);
        let body = tree.body().unwrap();
        merge(&mut tree, body, &value(update));
        tree.to_yaml_string().unwrap()
    }

    #[test]
    fn mapping_merge_preserves_unrelated_keys() {
        assert_eq!(merged("a: 1\n", "b: 2"), "a: 1\nb: 2\n");
    }

    #[test]
    fn mapping_merge_is_deep() {
        assert_eq!(
            merged("info:\n  title: t\n  version: 1\nz: 0\n", "info:\n  version: 2\n  contact: me"),
            "info:\n  title: t\n  version: 2\n  contact: me\nz: 0\n"
        );
    }

    #[test]
    fn scalar_target_takes_the_new_value() {
        assert_eq!(merged("old\n", "new"), "new\n");
    }

    #[test]
    fn sequences_are_replaced() {
        assert_eq!(merged("xs: [1, 2]\n", "xs: [3]"), "xs:\n- 3\n");
        // Re-applying is idempotent.
        assert_eq!(merged("xs: [3]\n", "xs: [3]"), "xs:\n- 3\n");
    }

    #[test]
    fn kind_mismatch_replaces_the_target() {
        assert_eq!(merged("a: {b: 1}\n", "a: text"), "a: text\n");
        assert_eq!(merged("a: text\n", "a: {b: 1}"), "a:\n  b: 1\n");
    }

    #[test]
    fn empty_document_takes_the_update_as_body() {
        let mut tree = Tree::new();
        let root = tree.root();
        merge(&mut tree, root, &value("a: 1"));
        assert_eq!(tree.to_yaml_string().unwrap(), "a: 1\n");
        assert_eq!(tree.kind(tree.root()), overlay_tree::NodeKind::Document);

        merge(&mut tree, root, &value("b: 2"));
        assert_eq!(tree.to_yaml_string().unwrap(), "a: 1\nb: 2\n");
    }

    #[test]
    fn null_update_sets_null() {
        assert_eq!(merged("a: 1\n", "a: null"), "a: null\n");
    }

    #[test]
    fn numeric_keys_merge_with_string_keys() {
        assert_eq!(
            merged("responses:\n  '200': {description: ok}\n", "responses: {200: {x: 1}}"),
            "responses:\n  '200':\n    description: ok\n    x: 1\n"
        );
    }

    #[test]
    fn targets_do_not_share_merged_nodes() {
        let mut tree = yaml("a: {}\nb: {}\n");
        let body = tree.body().unwrap();
        let a = tree.mapping_value(body, "a").unwrap();
        let b = tree.mapping_value(body, "b").unwrap();
        let update = value("child: {x: 1}");
        merge(&mut tree, a, &update);
        merge(&mut tree, b, &update);

        let a_child = tree.mapping_value(a, "child").unwrap();
        let b_child = tree.mapping_value(b, "child").unwrap();
        assert_ne!(a_child, b_child);

        merge(&mut tree, a_child, &value("x: 2"));
        assert_eq!(tree.to_yaml_string().unwrap(), "a:\n  child:\n    x: 2\nb:\n  child:\n    x: 1\n");
    }
}
