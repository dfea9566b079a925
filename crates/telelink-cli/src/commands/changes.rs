//! Change-point and companion command implementations.

use super::run_query;
use crate::cli::{ChangesArgs, CompanionsArgs};
use crate::error::Result;
use crate::input::EventFile;
use crate::output::Formatter;
use std::collections::BTreeMap;
use telelink_engine::{attribute_holders, change_points, change_points_by_subject, companion_usage};

/// Execute the changes command.
pub async fn execute_changes(args: ChangesArgs, formatter: &Formatter) -> Result<()> {
    let formatter = *formatter;
    let subject = args.subject;

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        let changes = match subject {
            Some(subject) => {
                let list = change_points(events.iter().filter(|e| e.subject == subject));
                let mut one = BTreeMap::new();
                if !list.is_empty() {
                    one.insert(subject, list);
                }
                one
            }
            None => change_points_by_subject(events),
        };
        formatter.format_change_points(&changes)
    })
    .await?;

    println!("{}", output);
    Ok(())
}

/// Execute the companions command.
pub async fn execute_companions(args: CompanionsArgs, formatter: &Formatter) -> Result<()> {
    let formatter = *formatter;
    let reverse = args.reverse;

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        if reverse {
            formatter.format_usage("Value", &attribute_holders(events))
        } else {
            formatter.format_usage("Subject", &companion_usage(events))
        }
    })
    .await?;

    println!("{}", output);
    Ok(())
}
