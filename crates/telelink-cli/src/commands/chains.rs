//! Chains command implementation.

use super::run_query;
use crate::cli::ChainsArgs;
use crate::error::{CliError, Result};
use crate::input::EventFile;
use crate::output::Formatter;
use telelink_domain::PartyPair;
use telelink_engine::{segment_all, segment_pair, Chain, EngineConfig};

/// Execute the chains command.
pub async fn execute_chains(args: ChainsArgs, engine: &EngineConfig, formatter: &Formatter) -> Result<()> {
    let config = chain_config(&args, engine);
    let pair = args.pair.as_deref().map(parse_pair).transpose()?;
    let formatter = *formatter;

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| match &pair {
        Some(pair) => {
            let chains = segment_pair(events, pair, &config)?;
            let refs: Vec<&Chain<'_>> = chains.iter().collect();
            formatter.format_chains(&refs)
        }
        None => {
            let by_pair = segment_all(events, &config)?;
            let refs: Vec<&Chain<'_>> = by_pair.values().flatten().collect();
            formatter.format_chains(&refs)
        }
    })
    .await?;

    println!("{}", output);
    Ok(())
}

/// Apply command-line overrides to the configured thresholds.
fn chain_config(args: &ChainsArgs, engine: &EngineConfig) -> EngineConfig {
    let mut config = engine.clone();
    if let Some(minutes) = args.max_gap_mins {
        config = config.with_max_gap_minutes(minutes);
    }
    if let Some(length) = args.min_length {
        config.min_chain_length = length;
    }
    config
}

fn parse_pair(parties: &[String]) -> Result<PartyPair> {
    match parties {
        [a, b] => Ok(PartyPair::new(a.as_str(), b.as_str())),
        _ => Err(CliError::InvalidInput(format!(
            "--pair takes exactly two parties, got {}",
            parties.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::InputArgs;

    fn args(max_gap_mins: Option<i64>, min_length: Option<usize>) -> ChainsArgs {
        ChainsArgs {
            input: InputArgs { input: "-".to_string() },
            pair: None,
            max_gap_mins,
            min_length,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let config = chain_config(&args(Some(15), Some(3)), &EngineConfig::default());
        assert_eq!(config.max_gap_secs, 900);
        assert_eq!(config.min_chain_length, 3);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let base = EngineConfig::default();
        assert_eq!(chain_config(&args(None, None), &base), base);
    }

    #[test]
    fn test_parse_pair() {
        let pair = parse_pair(&["018".to_string(), "017".to_string()]).unwrap();
        assert_eq!(pair.first(), "017");
        assert!(parse_pair(&["017".to_string()]).is_err());
    }
}
