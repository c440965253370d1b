//! The overlay document model.
//!
//! Typed fields cover the known schema. Any other key of an [`Overlay`],
//! [`Info`] or [`Action`] lands in that object's `extensions` map and is
//! written back after the typed fields, in the order it was read.

use indexmap::IndexMap;
use overlay_path::Dialect;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::SchemaResult;

/// Opaque extension fields, keyed by name in document order.
pub type Extensions = IndexMap<String, Value>;

/// The only overlay format version this crate writes and accepts.
pub const OVERLAY_VERSION: &str = "1.0.0";

/// Key of the compatibility flag that selects the selector dialect.
pub const JSONPATH_FLAG_KEY: &str = "x-speakeasy-jsonpath";

/// An overlay document: metadata plus an ordered list of actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    /// Format version (`overlay:`).
    #[serde(rename = "overlay", default)]
    pub version: String,

    /// Compatibility flag; `rfc9535` selects the RFC 9535 grammar.
    #[serde(
        rename = "x-speakeasy-jsonpath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub jsonpath: Option<String>,

    #[serde(default)]
    pub info: Info,

    /// URL of the document this overlay applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    #[serde(default)]
    pub actions: Vec<Action>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub version: String,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// One targeted edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Selector expression naming the nodes to edit.
    #[serde(default)]
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Document merged into each target. `update: null` is `Some(Null)`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub update: Option<Value>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub remove: bool,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Maps a present field to `Some`, even when its value is null. Absent
/// fields fall back to `default` and stay `None`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Overlay {
    /// A new overlay with the current format version and no actions.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            version: OVERLAY_VERSION.to_string(),
            jsonpath: None,
            info: Info {
                title: title.into(),
                version: version.into(),
                extensions: Extensions::new(),
            },
            extends: None,
            actions: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    /// Parse an overlay from YAML or JSON text.
    pub fn parse_str(input: &str) -> SchemaResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Parse an overlay from a reader.
    pub fn from_reader(reader: impl std::io::Read) -> SchemaResult<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Emit the overlay as YAML.
    pub fn to_yaml_string(&self) -> SchemaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The selector dialect chosen by the compatibility flag.
    pub fn dialect(&self) -> Dialect {
        Dialect::from_flag(self.jsonpath.as_deref())
    }
}

impl Action {
    /// An action that merges `update` into every node `target` selects.
    pub fn update(target: impl Into<String>, update: Value) -> Self {
        Self {
            target: target.into(),
            update: Some(update),
            ..Self::default()
        }
    }

    /// An action that removes every node `target` selects.
    pub fn remove(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            remove: true,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
