//! Telelink CLI - Command-line interface for the Telelink analysis engines.

use clap::Parser;
use std::path::Path;
use telelink_cli::commands;
use telelink_cli::config::OutputFormat;
use telelink_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> telelink_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().map(Path::new);
    let format: Option<OutputFormat> = cli.format.map(Into::into);
    let no_color = cli.no_color;

    // Explicit config file, or ~/.telelink/config.toml if present
    let setup = || -> telelink_cli::Result<(Config, Formatter)> {
        let config = Config::resolve(config_path)?;
        let format = format.unwrap_or(config.settings.format);
        let color_enabled = !no_color && config.settings.color;
        Ok((config, Formatter::new(format, color_enabled)))
    };

    match cli.command {
        // Runs without loading, so `config init` works while the file is missing or invalid
        Command::Config(args) => {
            let formatter = Formatter::new(format.unwrap_or(OutputFormat::Table), !no_color);
            commands::execute_config(args, config_path, &formatter).await?
        }
        Command::Chains(args) => {
            let (config, formatter) = setup()?;
            commands::execute_chains(args, &config.engine, &formatter).await?
        }
        Command::Changes(args) => {
            let (_, formatter) = setup()?;
            commands::execute_changes(args, &formatter).await?
        }
        Command::Companions(args) => {
            let (_, formatter) = setup()?;
            commands::execute_companions(args, &formatter).await?
        }
        Command::Locations(args) => {
            let (config, formatter) = setup()?;
            commands::execute_locations(args, &config.engine, &formatter).await?
        }
        Command::Relocation(args) => {
            let (config, formatter) = setup()?;
            commands::execute_relocation(args, &config.engine, &formatter).await?
        }
        Command::Links(args) => {
            let (_, formatter) = setup()?;
            commands::execute_links(args, &formatter).await?
        }
        Command::Frequent(args) => {
            let (config, formatter) = setup()?;
            commands::execute_frequent(args, &config.engine, &formatter).await?
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for piped JSON
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
