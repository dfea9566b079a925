//! Output formatting for the CLI.

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use telelink_engine::{
    Analysis, Chain, ChainStats, ChangePoint, CompanionUsage, Contact, DirectedLink, LinkGraph,
    LocationRank, NodeSummary, PairSummary, RelocationDiff,
};

/// Output formatter.
#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// Chains plus their summary, as emitted in JSON mode
#[derive(Serialize)]
struct ChainReport<'r, 'a> {
    stats: ChainStats,
    chains: &'r [&'r Chain<'a>],
}

/// Link graph as emitted in JSON mode
#[derive(Serialize)]
struct GraphReport<'g> {
    nodes: &'g BTreeMap<String, NodeSummary>,
    edges: Vec<DirectedLink>,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format interaction chains.
    pub fn format_chains(&self, chains: &[&Chain<'_>]) -> Result<String> {
        let stats = ChainStats::from_chains(chains.iter().copied());
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&ChainReport { stats, chains })?),
            OutputFormat::Quiet => Ok(chains
                .iter()
                .map(|c| format!("{}\t{}\t{}", c.parties(), time(c.started_at()), c.depth()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if chains.is_empty() {
                    return Ok(self.colorize("No chains found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Parties", "Depth", "Started", "Ended", "Span", "Active", "Max gap"]);
                for chain in chains {
                    builder.push_record([
                        chain.parties().to_string(),
                        chain.depth().to_string(),
                        time(chain.started_at()),
                        time(chain.ended_at()),
                        secs(chain.span().num_seconds()),
                        format!("{:.0}", chain.active_duration()),
                        secs(chain.max_internal_gap().num_seconds()),
                    ]);
                }

                let summary = format!(
                    "{} chain(s), deepest {}, mean depth {:.1}",
                    stats.chain_count, stats.deepest, stats.mean_depth
                );
                Ok(format!("{}\n{}", self.table(builder), self.info(&summary)))
            }
        }
    }

    /// Format change points per subject.
    pub fn format_change_points(&self, changes: &BTreeMap<String, Vec<ChangePoint>>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(changes)?),
            OutputFormat::Quiet => Ok(changes
                .iter()
                .flat_map(|(subject, list)| {
                    list.iter()
                        .map(move |c| format!("{}\t{}\t{}", subject, c.new_value, time(c.changed_at)))
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if changes.is_empty() {
                    return Ok(self.colorize("No changes found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Subject", "From", "To", "Changed at", "Previous run", "Events"]);
                for (subject, list) in changes {
                    for change in list {
                        builder.push_record([
                            subject.clone(),
                            change.previous_value.clone(),
                            change.new_value.clone(),
                            time(change.changed_at),
                            format!(
                                "{} .. {}",
                                time(change.previous_value_first_seen),
                                time(change.previous_value_last_seen)
                            ),
                            change.previous_event_count.to_string(),
                        ]);
                    }
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a usage table (subject → values or value → subjects).
    pub fn format_usage(&self, key_header: &str, usage: &BTreeMap<String, Vec<CompanionUsage>>) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(usage)?),
            OutputFormat::Quiet => Ok(usage
                .iter()
                .filter(|(_, values)| values.len() > 1)
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if usage.is_empty() {
                    return Ok(self.colorize("No attribute values found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record([key_header, "Value", "Events", "First seen", "Last seen"]);
                for (key, values) in usage {
                    let key_cell = if values.len() > 1 {
                        self.colorize(key, "magenta")
                    } else {
                        key.clone()
                    };
                    for value in values {
                        builder.push_record([
                            key_cell.clone(),
                            value.value.clone(),
                            value.event_count.to_string(),
                            opt_time(value.first_seen),
                            opt_time(value.last_seen),
                        ]);
                    }
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format a subject's dominant locations.
    pub fn format_locations(&self, ranks: &Analysis<Vec<LocationRank>>) -> Result<String> {
        let ranks = match (self.format, ranks) {
            (OutputFormat::Json, _) => return Ok(serde_json::to_string_pretty(ranks)?),
            (_, Analysis::InsufficientData { reason }) => return Ok(self.insufficient(reason)),
            (_, Analysis::Computed(ranks)) => ranks,
        };

        if self.format == OutputFormat::Quiet {
            return Ok(ranks.iter().map(|r| r.location.clone()).collect::<Vec<_>>().join("\n"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Rank", "Location", "Label", "Events", "First seen", "Last seen"]);
        for rank in ranks {
            builder.push_record([
                rank.rank.to_string(),
                rank.location.clone(),
                rank.label.clone().unwrap_or_else(|| "-".to_string()),
                rank.event_count.to_string(),
                opt_time(rank.first_seen),
                opt_time(rank.last_seen),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a relocation contact diff.
    pub fn format_relocation(&self, diff: &Analysis<RelocationDiff>) -> Result<String> {
        let diff = match (self.format, diff) {
            (OutputFormat::Json, _) => return Ok(serde_json::to_string_pretty(diff)?),
            (_, Analysis::InsufficientData { reason }) => return Ok(self.insufficient(reason)),
            (_, Analysis::Computed(diff)) => diff,
        };

        if self.format == OutputFormat::Quiet {
            return Ok(diff.new_contacts.iter().cloned().collect::<Vec<_>>().join("\n"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Contact", "Status"]);
        for contact in &diff.maintained_contacts {
            builder.push_record([contact.clone(), self.colorize("maintained", "green")]);
        }
        for contact in &diff.new_contacts {
            builder.push_record([contact.clone(), self.colorize("new", "cyan")]);
        }

        let header = format!(
            "{} moved to {} at {} (home: {}; {} home contact(s))",
            diff.subject,
            diff.new_location,
            time(diff.shift_timestamp),
            diff.home_locations.join(", "),
            diff.home_contacts.len()
        );
        Ok(format!("{}\n{}", self.info(&header), self.table(builder)))
    }

    /// Format the directed link graph.
    pub fn format_graph(&self, graph: &LinkGraph) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&GraphReport {
                nodes: graph.nodes(),
                edges: graph.links(),
            })?),
            OutputFormat::Quiet => Ok(graph
                .edges()
                .map(|(source, target, link)| format!("{}\t{}\t{}", source, target, link.count))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if graph.edge_count() == 0 {
                    return Ok(self.colorize("No links found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Source", "Target", "Count", "Measure", "Kinds", "First seen", "Last seen"]);
                for (source, target, link) in graph.edges() {
                    builder.push_record([
                        source.to_string(),
                        target.to_string(),
                        link.count.to_string(),
                        format!("{:.2}", link.total_measure),
                        link.distinct_kinds.iter().cloned().collect::<Vec<_>>().join(","),
                        opt_time(link.first_seen),
                        opt_time(link.last_seen),
                    ]);
                }

                let summary = format!("{} node(s), {} edge(s)", graph.nodes().len(), graph.edge_count());
                let mut out = format!("{}\n{}", self.table(builder), self.info(&summary));
                if graph.skipped() > 0 {
                    let note = format!("{} event(s) without counterpart skipped", graph.skipped());
                    out.push('\n');
                    out.push_str(&self.warning(&note));
                }
                Ok(out)
            }
        }
    }

    /// Format frequent contact pairs.
    pub fn format_pairs(&self, pairs: &[PairSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(pairs)?),
            OutputFormat::Quiet => Ok(pairs.iter().map(|p| p.pair.to_string()).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if pairs.is_empty() {
                    return Ok(self.colorize("No frequent contacts found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Party A", "Party B", "A→B", "B→A", "Total", "Measure", "Last seen"]);
                for p in pairs {
                    builder.push_record([
                        p.pair.first().to_string(),
                        p.pair.second().to_string(),
                        p.a_to_b.to_string(),
                        p.b_to_a.to_string(),
                        p.link.count.to_string(),
                        format!("{:.2}", p.link.total_measure),
                        opt_time(p.link.last_seen),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format one subject's top contacts.
    pub fn format_contacts(&self, subject: &str, contacts: &[Contact]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(contacts)?),
            OutputFormat::Quiet => Ok(contacts
                .iter()
                .map(|c| c.counterpart.clone())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if contacts.is_empty() {
                    return Ok(self.colorize(&format!("No contacts found for {}.", subject), "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Counterpart", "Sent", "Received", "Total", "Measure", "Kinds"]);
                for c in contacts {
                    builder.push_record([
                        c.counterpart.clone(),
                        c.sent.to_string(),
                        c.received.to_string(),
                        c.link.count.to_string(),
                        format!("{:.2}", c.link.total_measure),
                        c.link.distinct_kinds.iter().cloned().collect::<Vec<_>>().join(","),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format the effective configuration.
    ///
    /// JSON mode emits JSON; the other modes emit the TOML file contents.
    pub fn format_config(&self, config: &Config) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(config)?),
            OutputFormat::Table | OutputFormat::Quiet => toml::to_string_pretty(config)
                .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e))),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn insufficient(&self, reason: &str) -> String {
        if self.format == OutputFormat::Quiet {
            return String::new();
        }
        self.warning(&format!("Insufficient data: {}", reason))
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn opt_time(at: Option<DateTime<Utc>>) -> String {
    at.map(time).unwrap_or_else(|| "-".to_string())
}

fn secs(total: i64) -> String {
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}h{:02}m{:02}s", h, m, s)
    } else if m > 0 {
        format!("{}m{:02}s", m, s)
    } else {
        format!("{}s", s)
    }
}
