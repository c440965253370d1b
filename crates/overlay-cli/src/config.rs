use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use overlay_loader::Format;
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::cli::Cli;

/// Settings read from the `--config` file. Command-line flags win.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Apply overlays in strict mode even without `--strict`.
    pub strict: bool,
    /// Output format for documents.
    pub format: Format,
    /// Log level for stderr output (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            strict: false,
            format: Format::Yaml,
            log_level: "warn".into(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path:?}"))?;
        toml::from_str(&text).with_context(|| format!("failed to parse config file {path:?}"))
    }

    /// The config file (if any) with the command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(format) = cli.format {
            config.format = format;
        }
        if cli.verbose {
            config.log_level = "debug".into();
        }
        config
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("invalid log level {:?}", config.log_level))?;
        Ok(config)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::WARN)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_config() {
        let c = CliConfig::default();
        assert!(!c.strict);
        assert_eq!(c.format, Format::Yaml);
        assert_eq!(c.level_filter(), LevelFilter::WARN);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let file = config_file("strict = true\n");
        let c = CliConfig::load(file.path()).unwrap();
        assert!(c.strict);
        assert_eq!(c.format, Format::Yaml);
        assert_eq!(c.log_level, "warn");
    }

    #[test]
    fn flags_override_the_file() {
        let file = config_file("format = \"yaml\"\nlog_level = \"error\"\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "overlay", "--config", path, "--format", "json", "--verbose", "validate", "o.yaml",
        ])
        .unwrap();
        let c = CliConfig::resolve(&cli).unwrap();
        assert_eq!(c.format, Format::Json);
        assert_eq!(c.level_filter(), LevelFilter::DEBUG);
    }

    #[test]
    fn bad_files_are_reported() {
        let file = config_file("format = \"xml\"\n");
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config file"));

        let file = config_file("log_level = \"loud\"\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["overlay", "--config", path, "validate", "o.yaml"]).unwrap();
        assert!(CliConfig::resolve(&cli).is_err());
    }
}
