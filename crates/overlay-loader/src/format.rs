use std::fmt;
use std::io::Write;
use std::str::FromStr;

use overlay_tree::Tree;
use serde::{Deserialize, Serialize};

use crate::error::{LoaderError, LoaderResult};

/// Output encoding of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Yaml,
    Json,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => f.write_str("yaml"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for Format {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(LoaderError::UnknownFormat(s.to_string())),
        }
    }
}

/// Write `tree` to `writer` in the given format. JSON output ends with a
/// newline.
pub fn write_document(tree: &Tree, format: Format, mut writer: impl Write) -> LoaderResult<()> {
    match format {
        Format::Yaml => writer.write_all(tree.to_yaml_string()?.as_bytes())?,
        Format::Json => {
            writer.write_all(tree.to_json_string()?.as_bytes())?;
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()?;
    Ok(())
}
