//! Applying an overlay's actions to a document tree.

use overlay_schema::{Action, Overlay};
use overlay_tree::{NodeId, Tree};
use tracing::{debug, info, warn};

use crate::error::{PatchError, PatchResult};
use crate::merge::merge;
use crate::remove::remove_all;
use crate::target::{resolve, Resolved};

/// Result of [`apply_to_strict`].
///
/// Every action has been performed, whatever its own validation outcome.
#[derive(Debug, Default)]
pub struct StrictOutcome {
    /// Non-fatal findings in action order.
    pub warnings: Vec<String>,
    /// All errors combined into one [`PatchError::Strict`], if there were any.
    pub error: Option<PatchError>,
}

impl StrictOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the warnings and keep the error.
    pub fn into_result(self) -> PatchResult<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Apply every action of `overlay` to `tree`, in order.
///
/// The first error aborts. Actions already applied stay applied. Warnings
/// are logged.
pub fn apply_to(tree: &mut Tree, overlay: &Overlay) -> PatchResult<()> {
    let dialect = overlay.dialect();
    for (i, action) in overlay.actions.iter().enumerate() {
        if action.target.is_empty() {
            continue;
        }
        let resolved = resolve(tree, &action.target, dialect, i + 1)?;
        for warning in &resolved.warnings {
            warn!(action = i + 1, target = %action.target, "{warning}");
        }
        let nodes = targets(tree, action, &resolved);
        debug!(
            action = i + 1,
            target = %action.target,
            matched = nodes.len(),
            "applying action"
        );
        perform(tree, action, &nodes)?;
    }
    info!(actions = overlay.actions.len(), "overlay applied");
    Ok(())
}

/// Apply every action of `overlay`, collecting problems instead of stopping.
///
/// A target that matches nothing is an error. An update that leaves every
/// node it matched unchanged is a warning.
pub fn apply_to_strict(tree: &mut Tree, overlay: &Overlay) -> StrictOutcome {
    let dialect = overlay.dialect();
    let total = overlay.actions.len();
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for (i, action) in overlay.actions.iter().enumerate() {
        if action.target.is_empty() {
            continue;
        }
        let resolved = match resolve(tree, &action.target, dialect, i + 1) {
            Ok(resolved) => resolved,
            Err(err) => {
                errors.push(err.to_string());
                continue;
            }
        };
        let nodes = targets(tree, action, &resolved);
        warnings.extend(resolved.warnings);

        if nodes.is_empty() {
            errors.push(
                PatchError::ZeroMatch {
                    target: action.target.clone(),
                }
                .to_string(),
            );
            continue;
        }

        let before = (!action.remove && action.update.is_some()).then(|| tree.clone());
        if let Err(err) = perform(tree, action, &nodes) {
            errors.push(err.to_string());
            continue;
        }
        if let Some(before) = before {
            if unchanged(&before, tree, &nodes) {
                warnings.push(format!(
                    "update action ({} / {total}) target={}: does nothing",
                    i + 1,
                    action.target
                ));
            }
        }
    }

    let error = (!errors.is_empty()).then(|| PatchError::Strict(errors));
    StrictOutcome { warnings, error }
}

/// The nodes an action acts on. An update of `$` on an empty document acts
/// on the document itself, so the update becomes its body.
fn targets(tree: &Tree, action: &Action, resolved: &Resolved) -> Vec<NodeId> {
    let fills_empty_document = resolved.nodes.is_empty()
        && resolved.selects_root
        && !action.remove
        && action.update.is_some()
        && tree.body().is_none();
    if fills_empty_document {
        vec![tree.root()]
    } else {
        resolved.nodes.clone()
    }
}

fn perform(tree: &mut Tree, action: &Action, nodes: &[NodeId]) -> PatchResult<()> {
    if action.remove {
        return remove_all(tree, nodes);
    }
    if let Some(update) = &action.update {
        for &node in nodes {
            merge(tree, node, update);
        }
    }
    Ok(())
}

fn unchanged(before: &Tree, after: &Tree, nodes: &[NodeId]) -> bool {
    nodes.iter().all(|&id| before.deep_eq(id, after, id))
}
