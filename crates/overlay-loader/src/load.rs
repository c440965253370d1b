//! Reading overlays and documents from the file system.

use std::fs;
use std::path::{Path, PathBuf};

use overlay_schema::Overlay;
use overlay_tree::Tree;
use tracing::debug;
use url::Url;

use crate::error::{LoaderError, LoaderResult};

/// Read and parse an overlay file.
pub fn load_overlay(path: impl AsRef<Path>) -> LoaderResult<Overlay> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| LoaderError::OpenOverlay {
        path: path.to_path_buf(),
        source,
    })?;
    let overlay = Overlay::from_reader(file).map_err(|source| LoaderError::ParseOverlay {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), actions = overlay.actions.len(), "loaded overlay");
    Ok(overlay)
}

/// Read and parse a YAML or JSON document. Mapping key order is kept.
pub fn load_specification(path: impl AsRef<Path>) -> LoaderResult<Tree> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoaderError::OpenSpecification {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = Tree::from_yaml_str(&text).map_err(|source| LoaderError::ParseSpecification {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), nodes = tree.len(), "loaded document");
    Ok(tree)
}

/// The local path named by the overlay's `extends` URL.
///
/// Only `file://` URLs resolve.
pub fn extends_path(overlay: &Overlay) -> LoaderResult<PathBuf> {
    let extends = match overlay.extends.as_deref() {
        Some(extends) if !extends.is_empty() => extends,
        _ => return Err(LoaderError::MissingExtends),
    };
    let url = Url::parse(extends).map_err(|source| LoaderError::InvalidExtends {
        url: extends.to_string(),
        source,
    })?;
    if url.scheme() != "file" {
        return Err(LoaderError::UnsupportedScheme(extends.to_string()));
    }
    url.to_file_path()
        .map_err(|()| LoaderError::NotLocal(extends.to_string()))
}

/// Load the document named by the overlay's `extends` URL.
pub fn load_extends_specification(overlay: &Overlay) -> LoaderResult<Tree> {
    load_specification(extends_path(overlay)?)
}

/// Load the document at `path` when given, otherwise the one the overlay
/// extends. Returns the tree and the path it was read from.
pub fn load_either_specification(
    path: Option<&Path>,
    overlay: &Overlay,
) -> LoaderResult<(Tree, PathBuf)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => extends_path(overlay)?,
    };
    let tree = load_specification(&path)?;
    Ok((tree, path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn extending(url: Option<&str>) -> Overlay {
        let mut overlay = Overlay::new("t", "1");
        overlay.extends = url.map(String::from);
        overlay
    }

    #[test]
    fn loads_yaml_and_json_documents() {
        let yaml = file("b: 1\na: [x]\n");
        let tree = load_specification(yaml.path()).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "b: 1\na:\n- x\n");

        let json = file("{\"b\": 1, \"a\": [\"x\"]}");
        let tree = load_specification(json.path()).unwrap();
        assert_eq!(tree.to_yaml_string().unwrap(), "b: 1\na:\n- x\n");
    }

    #[test]
    fn missing_document_names_the_path() {
        let err = load_specification("/no/such/spec.yaml").unwrap_err();
        assert!(matches!(err, LoaderError::OpenSpecification { .. }));
        assert!(err.to_string().starts_with("failed to open schema from path \"/no/such/spec.yaml\""));
    }

    #[test]
    fn malformed_document_names_the_path() {
        let bad = file("a: [1, 2\n");
        let err = load_specification(bad.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseSpecification { .. }));
        assert!(err.to_string().contains(&format!("{:?}", bad.path())));
    }

    #[test]
    fn loads_overlays() {
        let overlay = file(
            "overlay: 1.0.0\ninfo:\n  title: t\n  version: 1.0.0\nactions:\n  - target: $.a\n    remove: true\n",
        );
        let overlay = load_overlay(overlay.path()).unwrap();
        assert_eq!(overlay.actions.len(), 1);
        assert!(overlay.actions[0].remove);
    }

    #[test]
    fn overlay_errors_name_the_path() {
        let err = load_overlay("/no/such/overlay.yaml").unwrap_err();
        assert_eq!(
            err.to_string().split(':').next().unwrap(),
            "failed to open overlay file at path \"/no/such/overlay.yaml\""
        );

        let bad = file("actions: 3\n");
        let err = load_overlay(bad.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseOverlay { .. }));
        assert!(err.to_string().starts_with("failed to parse overlay from path"));
    }

    #[test]
    fn extends_must_be_a_local_file_url() {
        assert!(matches!(extends_path(&extending(None)), Err(LoaderError::MissingExtends)));
        assert!(matches!(
            extends_path(&extending(Some("not a url"))),
            Err(LoaderError::InvalidExtends { .. })
        ));
        let err = extends_path(&extending(Some("https://example.com/spec.yaml"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "only file:// extends URLs are supported, not \"https://example.com/spec.yaml\""
        );
        assert_eq!(
            extends_path(&extending(Some("file:///tmp/spec.yaml"))).unwrap(),
            PathBuf::from("/tmp/spec.yaml")
        );
    }

    #[test]
    fn either_prefers_the_explicit_path() {
        let explicit = file("a: explicit\n");
        let extended = file("a: extended\n");
        let url = Url::from_file_path(extended.path()).unwrap();
        let overlay = extending(Some(url.as_str()));

        let (tree, path) = load_either_specification(Some(explicit.path()), &overlay).unwrap();
        assert_eq!(path, explicit.path());
        assert_eq!(tree.to_yaml_string().unwrap(), "a: explicit\n");

        let (tree, path) = load_either_specification(None, &overlay).unwrap();
        assert_eq!(path, extended.path());
        assert_eq!(tree.to_yaml_string().unwrap(), "a: extended\n");

        assert!(load_either_specification(None, &extending(None)).is_err());
    }
}
