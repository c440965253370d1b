//! Resolving an action's target to nodes, with the dialect compatibility
//! check.
//!
//! Under the legacy dialect the target is also compiled as RFC 9535 so that
//! overlays can be migrated. That second compilation never changes which
//! nodes are selected; it only produces warnings.

use overlay_path::{Dialect, JsonPath};
use overlay_schema::JSONPATH_FLAG_KEY;
use overlay_tree::{NodeId, Tree};

use crate::error::PatchResult;

/// Nodes selected by a target, plus compatibility warnings.
#[derive(Debug, Default)]
pub struct Resolved {
    /// Selected nodes in document order, without duplicates.
    pub nodes: Vec<NodeId>,
    pub warnings: Vec<String>,
    /// The target is `$` alone.
    pub selects_root: bool,
}

/// Select the nodes that `target` names in `tree`. `number` is the 1-based
/// action position used in warnings.
pub fn resolve(tree: &Tree, target: &str, dialect: Dialect, number: usize) -> PatchResult<Resolved> {
    let selector = JsonPath::compile(target, dialect)?;
    let nodes = dedup(selector.query(tree)?);
    let mut resolved = Resolved {
        nodes,
        warnings: Vec::new(),
        selects_root: selector.selects_root(),
    };

    if dialect == Dialect::Legacy {
        match JsonPath::compile(target, Dialect::Rfc9535) {
            Err(err) => resolved.warnings.push(format!(
                "action {number}: {err}; rewrite the target and set {JSONPATH_FLAG_KEY}: {}",
                Dialect::RFC9535_FLAG
            )),
            Ok(rfc) => {
                // An evaluation failure here also fails under legacy rules,
                // which already returned above.
                if let Ok(rfc_nodes) = rfc.query(tree) {
                    let rfc_nodes = dedup(rfc_nodes);
                    if rfc_nodes != resolved.nodes {
                        resolved.warnings.push(format!(
                            "action {number}: target {target:?} selects {} node(s) under legacy rules but {} under rfc9535",
                            resolved.nodes.len(),
                            rfc_nodes.len()
                        ));
                    }
                }
            }
        }
    }

    Ok(resolved)
}

fn dedup(nodes: Vec<NodeId>) -> Vec<NodeId> {
    let mut seen = std::collections::HashSet::with_capacity(nodes.len());
    nodes.into_iter().filter(|id| seen.insert(*id)).collect()
}
