use overlay_path::JsonPath;
use url::Url;

use crate::error::ValidationErrors;
use crate::overlay::{Overlay, OVERLAY_VERSION};

impl Overlay {
    /// Check the document for structural problems, reporting all of them.
    ///
    /// Targets are compiled under the overlay's own dialect.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.version != OVERLAY_VERSION {
            errors.push(format!(
                "overlay version must be {OVERLAY_VERSION:?}, got {:?}",
                self.version
            ));
        }
        if self.info.title.is_empty() {
            errors.push("info.title must not be empty");
        }
        if self.info.version.is_empty() {
            errors.push("info.version must not be empty");
        }
        // An empty `extends` is the same as none.
        if let Some(extends) = self.extends.as_deref().filter(|e| !e.is_empty()) {
            if let Err(err) = Url::parse(extends) {
                errors.push(format!("extends {extends:?} is not a valid URL: {err}"));
            }
        }

        if self.actions.is_empty() {
            errors.push("overlay must define at least one action");
        }
        let dialect = self.dialect();
        for (i, action) in self.actions.iter().enumerate() {
            let n = i + 1;
            if action.target.is_empty() {
                errors.push(format!("action {n}: target must not be empty"));
            } else if let Err(err) = JsonPath::compile(&action.target, dialect) {
                errors.push(format!("action {n}: {err}"));
            }
            if action.remove && action.update.is_some() {
                errors.push(format!("action {n}: remove and update are mutually exclusive"));
            }
        }

        errors.into_result()
    }
}
