//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::{Path, PathBuf};

/// Execute the config command.
///
/// `path` is the `--config` override; without it the default location is used.
pub async fn execute_config(args: ConfigArgs, path: Option<&Path>, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            let written = init_config(path, force)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote default configuration to {}", written.display()))
            );
        }
        ConfigAction::Show => {
            let config = Config::resolve(path)?;
            println!("{}", formatter.format_config(&config)?);
        }
    }
    Ok(())
}

/// Write a default configuration file and return where it went.
fn init_config(path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => Config::path()?,
    };
    if target.exists() && !force {
        return Err(CliError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        )));
    }

    let defaults = Config::default();
    match path {
        Some(path) => defaults.save_to(path)?,
        None => defaults.save()?,
    }
    tracing::debug!(path = %target.display(), "default configuration written");
    Ok(target)
}
