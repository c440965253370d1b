use clap::Parser;

mod cli;
mod commands;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::CliConfig::resolve(&cli)?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.level_filter())
        .init();
    commands::run_command(cli, &config)
}
