//! Link graph and frequent-contact command implementations.

use super::run_query;
use crate::cli::{FrequentArgs, LinksArgs};
use crate::error::Result;
use crate::input::EventFile;
use crate::output::Formatter;
use telelink_domain::InteractionEvent;
use telelink_engine::{frequent_contacts, top_contacts, EngineConfig, LinkGraph};

/// Build the graph and drop suppressed nodes.
fn build_graph(events: &[InteractionEvent], exclude: &[String]) -> LinkGraph {
    exclude
        .iter()
        .fold(LinkGraph::build(events), |graph, id| graph.without_node(id))
}

/// Execute the links command.
pub async fn execute_links(args: LinksArgs, formatter: &Formatter) -> Result<()> {
    let formatter = *formatter;
    let exclude = args.exclude;

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        formatter.format_graph(&build_graph(events, &exclude))
    })
    .await?;

    println!("{}", output);
    Ok(())
}

/// Execute the frequent command.
pub async fn execute_frequent(args: FrequentArgs, engine: &EngineConfig, formatter: &Formatter) -> Result<()> {
    let formatter = *formatter;
    let min = args.min.unwrap_or(engine.frequent_contact_min_interactions);
    let limit = args.limit.unwrap_or(usize::MAX);
    let (subject, exclude) = (args.subject, args.exclude);

    let output = run_query(EventFile::from_arg(&args.input.input), move |events| {
        let graph = build_graph(events, &exclude);
        match &subject {
            Some(subject) => {
                let mut contacts = top_contacts(&graph, subject, usize::MAX);
                contacts.retain(|c| c.link.count >= min);
                contacts.truncate(limit);
                formatter.format_contacts(subject, &contacts)
            }
            None => {
                let mut pairs = frequent_contacts(&graph, min);
                pairs.truncate(limit);
                formatter.format_pairs(&pairs)
            }
        }
    })
    .await?;

    println!("{}", output);
    Ok(())
}
