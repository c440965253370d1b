use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use overlay_loader::Format;

#[derive(Parser)]
#[command(
    name = "overlay",
    about = "Apply, compare, and validate document overlays",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format for documents (yaml or json)
    #[arg(long, global = true)]
    pub format: Option<Format>,

    /// Settings file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply an overlay to a document. Without a document, the overlay's
    /// extends URL is loaded (local files only).
    Apply(ApplyArgs),
    /// Print an overlay that turns the first document into the second
    Compare(CompareArgs),
    /// Check that an overlay is well formed
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct ApplyArgs {
    pub overlay: PathBuf,
    pub document: Option<PathBuf>,
    /// Fail on targets that match nothing and warn on updates that change nothing
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub overlay: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apply() {
        let cli = Cli::try_parse_from(["overlay", "apply", "o.yaml"]).unwrap();
        if let Command::Apply(args) = cli.command {
            assert_eq!(args.overlay, PathBuf::from("o.yaml"));
            assert!(args.document.is_none());
            assert!(!args.strict);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_apply_strict_with_document() {
        let cli = Cli::try_parse_from(["overlay", "apply", "--strict", "o.yaml", "spec.json"]).unwrap();
        if let Command::Apply(args) = cli.command {
            assert!(args.strict);
            assert_eq!(args.document, Some(PathBuf::from("spec.json")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_compare() {
        let cli = Cli::try_parse_from(["overlay", "compare", "a.yaml", "b.yaml"]).unwrap();
        if let Command::Compare(args) = cli.command {
            assert_eq!(args.left, PathBuf::from("a.yaml"));
            assert_eq!(args.right, PathBuf::from("b.yaml"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn compare_needs_two_documents() {
        assert!(Cli::try_parse_from(["overlay", "compare", "a.yaml"]).is_err());
    }

    #[test]
    fn parse_validate() {
        let cli = Cli::try_parse_from(["overlay", "validate", "o.yaml"]).unwrap();
        assert!(matches!(cli.command, Command::Validate(_)));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "overlay", "validate", "o.yaml", "--verbose", "--format", "json", "--config", "overlay.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, Some(Format::Json));
        assert_eq!(cli.config, Some(PathBuf::from("overlay.toml")));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["overlay", "--format", "xml", "validate", "o.yaml"]).is_err());
    }
}
