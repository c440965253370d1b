use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use overlay_diff::{compare, CompareOptions};
use overlay_loader::{load_either_specification, load_overlay, load_specification, write_document};
use overlay_patch::{apply_to, apply_to_strict};
use overlay_schema::Overlay;
use overlay_tree::Tree;
use tracing::info;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli, config: &CliConfig) -> anyhow::Result<()> {
    match cli.command {
        Command::Apply(args) => cmd_apply(args, config),
        Command::Compare(args) => cmd_compare(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn cmd_apply(args: ApplyArgs, config: &CliConfig) -> anyhow::Result<()> {
    let strict = args.strict || config.strict;
    let mut warnings = Vec::new();
    let applied = apply_file(&args.overlay, args.document.as_deref(), strict, &mut warnings);
    // Warnings are reported even when strict application fails.
    for warning in &warnings {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    let applied = applied?;
    write_document(&applied.tree, config.format, io::stdout().lock())
        .with_context(|| format!("failed to write document {:?}", applied.document))
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let overlay = compare_files(&args.left, &args.right)?;
    print!("{}", overlay.to_yaml_string().context("failed to format overlay")?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    validate_file(&args.overlay)?;
    println!("{}", format!("Overlay file {:?} is valid.", args.overlay).green());
    Ok(())
}

/// A patched document and the file it was read from.
#[derive(Debug)]
pub struct Applied {
    pub tree: Tree,
    pub document: PathBuf,
}

/// Load an overlay and its document, then apply one to the other.
///
/// Strict-mode warnings are pushed onto `warnings` whether or not the
/// application succeeds.
pub fn apply_file(
    overlay_path: &Path,
    document: Option<&Path>,
    strict: bool,
    warnings: &mut Vec<String>,
) -> anyhow::Result<Applied> {
    let overlay = load_overlay(overlay_path)?;
    let (mut tree, document) = load_either_specification(document, &overlay)?;
    info!(overlay = %overlay_path.display(), document = %document.display(), strict, "applying overlay");

    let applied = if strict {
        let outcome = apply_to_strict(&mut tree, &overlay);
        warnings.extend(outcome.warnings.iter().cloned());
        outcome.into_result()
    } else {
        apply_to(&mut tree, &overlay)
    };
    applied.with_context(|| format!("failed to apply overlay {overlay_path:?} to document {document:?}"))?;

    Ok(Applied { tree, document })
}

/// The overlay that turns the document at `left` into the one at `right`.
pub fn compare_files(left: &Path, right: &Path) -> anyhow::Result<Overlay> {
    let left_tree = load_specification(left)?;
    let right_tree = load_specification(right)?;
    compare(&left_tree, &right_tree, &CompareOptions::for_files(left, right))
        .with_context(|| format!("failed to compare {left:?} and {right:?}"))
}

/// Load an overlay and check it, listing every problem on failure.
pub fn validate_file(path: &Path) -> anyhow::Result<()> {
    let overlay = load_overlay(path)?;
    if let Err(errors) = overlay.validate() {
        let mut report = String::new();
        for error in errors.errors() {
            report.push_str("\n  - ");
            report.push_str(error);
        }
        bail!("Overlay file {path:?} failed validation:{report}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SPEC: &str = "openapi: 3.1.0\ninfo:\n  title: Pets\n  version: 1.0.0\npaths:\n  /pets: {}\n";

    fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn overlay_text(extends: Option<&Path>, actions: &str) -> String {
        let extends = extends
            .map(|p| format!("extends: file://{}\n", p.display()))
            .unwrap_or_default();
        format!("overlay: 1.0.0\ninfo:\n  title: t\n  version: 1.0.0\n{extends}actions:\n{actions}")
    }

    #[test]
    fn apply_explicit_document() {
        let dir = tempfile::tempdir().unwrap();
        let spec = write(&dir, "spec.yaml", SPEC);
        let overlay = write(
            &dir,
            "overlay.yaml",
            &overlay_text(None, "  - target: $.info\n    update:\n      title: Renamed\n"),
        );

        let applied = apply_file(&overlay, Some(&spec), false, &mut Vec::new()).unwrap();
        assert_eq!(applied.document, spec);
        let info = applied.tree.to_yaml_string().unwrap();
        assert!(info.contains("title: Renamed"));
        assert!(info.contains("version: 1.0.0"));
    }

    #[test]
    fn apply_follows_extends() {
        let dir = tempfile::tempdir().unwrap();
        let spec = write(&dir, "spec.yaml", SPEC);
        let overlay = write(
            &dir,
            "overlay.yaml",
            &overlay_text(Some(&spec), "  - target: $.paths['/pets']\n    remove: true\n"),
        );

        let applied = apply_file(&overlay, None, false, &mut Vec::new()).unwrap();
        assert_eq!(applied.document, spec);
        assert!(applied.tree.to_yaml_string().unwrap().ends_with("paths: {}\n"));
    }

    #[test]
    fn strict_apply_reports_problems() {
        let dir = tempfile::tempdir().unwrap();
        let spec = write(&dir, "spec.yaml", SPEC);
        let no_op = write(
            &dir,
            "no-op.yaml",
            &overlay_text(None, "  - target: $.openapi\n    update: 3.1.0\n"),
        );
        let mut warnings = Vec::new();
        apply_file(&no_op, Some(&spec), true, &mut warnings).unwrap();
        assert_eq!(warnings, vec!["update action (1 / 1) target=$.openapi: does nothing"]);

        let missing = write(
            &dir,
            "missing.yaml",
            &overlay_text(None, "  - target: $.nope\n    remove: true\n"),
        );
        let err = apply_file(&missing, Some(&spec), true, &mut Vec::new()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("missing.yaml"), "{message}");
        assert!(message.contains("did not match any targets"), "{message}");

        // Not strict: a target that matches nothing is fine.
        assert!(apply_file(&missing, Some(&spec), false, &mut Vec::new()).is_ok());
    }

    #[test]
    fn strict_failure_keeps_no_op_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let spec = write(&dir, "spec.yaml", SPEC);
        let overlay = write(
            &dir,
            "mixed.yaml",
            &overlay_text(
                None,
                "  - target: $.missing\n    remove: true\n  - target: $.openapi\n    update: 3.1.0\n",
            ),
        );

        let mut warnings = Vec::new();
        let err = apply_file(&overlay, Some(&spec), true, &mut warnings).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("error applying overlay (strict)"), "{message}");
        assert!(message.contains("did not match any targets"), "{message}");
        assert_eq!(warnings, vec!["update action (2 / 2) target=$.openapi: does nothing"]);
    }

    #[test]
    fn compare_writes_title_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "a.yaml", "a: 1\n");
        let right = write(&dir, "b.yaml", "a: 1\nb: 2\n");

        let overlay = compare_files(&left, &right).unwrap();
        assert_eq!(
            overlay.info.title,
            format!("Overlay {} => {}", left.display(), right.display())
        );
        assert_eq!(overlay.extends, Some(format!("file://{}", left.display())));
        assert_eq!(overlay.actions.len(), 1);
        assert_eq!(overlay.actions[0].target, "$");
    }

    #[test]
    fn compare_reports_the_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "a.yaml", "a: 1\n");
        let err = compare_files(&left, &dir.path().join("gone.yaml")).unwrap_err();
        assert!(err.to_string().contains("gone.yaml"));
    }

    #[test]
    fn validate_lists_every_problem() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(&dir, "good.yaml", &overlay_text(None, "  - target: $.a\n    remove: true\n"));
        assert!(validate_file(&good).is_ok());

        let bad = write(
            &dir,
            "bad.yaml",
            "overlay: 2.0.0\ninfo:\n  title: ''\n  version: 1.0.0\nactions: []\n",
        );
        let message = validate_file(&bad).unwrap_err().to_string();
        assert!(message.starts_with(&format!("Overlay file {bad:?} failed validation:")));
        assert!(message.contains("\n  - overlay version must be \"1.0.0\", got \"2.0.0\""));
        assert!(message.contains("\n  - info.title must not be empty"));
        assert!(message.contains("\n  - overlay must define at least one action"));
    }
}
