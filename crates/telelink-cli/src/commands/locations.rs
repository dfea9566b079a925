//! Location and relocation command implementations.

use super::run_query;
use crate::cli::{LocationsArgs, RelocationArgs};
use crate::error::{CliError, Result};
use crate::input::EventFile;
use crate::output::Formatter;
use telelink_engine::{detect_relocation, dominant_locations, relocation_diff, EngineConfig};

/// Execute the locations command.
pub async fn execute_locations(args: LocationsArgs, engine: &EngineConfig, formatter: &Formatter) -> Result<()> {
    let top = args.top.unwrap_or(engine.top_n_home_locations);
    if top == 0 {
        return Err(CliError::InvalidInput("--top must be at least 1".to_string()));
    }
    let formatter = *formatter;
    let subject = args.subject;

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        formatter.format_locations(&dominant_locations(events, &subject, top)?)
    })
    .await?;

    println!("{}", output);
    Ok(())
}

/// Execute the relocation command.
///
/// With `--to` and `--at` the diff is taken around that move; otherwise the
/// first sustained move is detected.
pub async fn execute_relocation(args: RelocationArgs, engine: &EngineConfig, formatter: &Formatter) -> Result<()> {
    let formatter = *formatter;
    let config = engine.clone();
    let subject = args.subject;
    let target = match (args.to, args.at) {
        (Some(location), Some(at)) => Some((location, at)),
        (None, None) => None,
        _ => {
            return Err(CliError::InvalidInput(
                "--to and --at must be given together".to_string(),
            ))
        }
    };

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        let diff = match &target {
            Some((location, at)) => relocation_diff(events, &subject, location, *at, &config)?,
            None => detect_relocation(events, &subject, &config)?,
        };
        formatter.format_relocation(&diff)
    })
    .await?;

    println!("{}", output);
    Ok(())
}
