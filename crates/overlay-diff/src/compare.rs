//! Building an overlay document from a tree comparison.

use std::path::Path as FsPath;

use overlay_schema::Overlay;
use overlay_tree::Tree;
use tracing::{debug, warn};
use url::Url;

use crate::error::DiffResult;
use crate::tree_diff::diff_trees;

/// Version written to `info.version` of generated overlays.
pub const GENERATED_VERSION: &str = "0.0.0";

/// Metadata for a generated overlay.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub title: String,
    /// Location of the left document, written to `extends`.
    pub extends: Option<String>,
}

impl CompareOptions {
    /// Options titled `Overlay <left> => <right>`, without `extends`.
    pub fn named(left: &str, right: &str) -> Self {
        Self {
            title: format!("Overlay {left} => {right}"),
            extends: None,
        }
    }

    /// Options for two files. `extends` is the `file://` URL of the left
    /// file when its absolute path can be determined.
    pub fn for_files(left: &FsPath, right: &FsPath) -> Self {
        let mut options = Self::named(&left.display().to_string(), &right.display().to_string());
        options.extends = std::path::absolute(left)
            .ok()
            .and_then(|abs| Url::from_file_path(abs).ok())
            .map(String::from);
        options
    }
}

/// Compare two trees and wrap the resulting actions in an overlay that turns
/// `left` into `right`. Skipped positions are logged as warnings.
pub fn compare(left: &Tree, right: &Tree, options: &CompareOptions) -> DiffResult<Overlay> {
    let diff = diff_trees(left, right)?;
    for notice in &diff.notices {
        warn!(notice = %notice, "compare skipped a position");
    }
    debug!(title = %options.title, actions = diff.len(), "generated overlay");

    let mut overlay = Overlay::new(options.title.clone(), GENERATED_VERSION);
    overlay.extends = options.extends.clone();
    overlay.actions = diff.actions;
    Ok(overlay)
}
