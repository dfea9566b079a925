//! Link aggregation
//!
//! Folds dyadic events into a directed weighted multigraph. Edges are keyed by
//! `(source, target)` following each event's direction; node summaries are
//! derived from the edges touching the node. Sentinel counterparts (a system
//! account, an "external" placeholder) are aggregated like any other node and
//! can be dropped afterwards with [`LinkGraph::without_node`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use telelink_domain::{InteractionEvent, PartyPair};

/// Accumulated statistics for one edge or pair
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSummary {
    /// Number of events
    pub count: usize,
    /// Summed measure
    pub total_measure: f64,
    /// Every `kind` label observed
    pub distinct_kinds: BTreeSet<String>,
    /// Earliest timestamp, if any event had one
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest timestamp, if any event had one
    pub last_seen: Option<DateTime<Utc>>,
}

impl LinkSummary {
    fn add(&mut self, event: &InteractionEvent) {
        self.count += 1;
        self.total_measure += event.measure_or_zero();
        if let Some(kind) = event.kind.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            self.distinct_kinds.insert(kind.to_string());
        }
        if let Some(ts) = event.timestamp {
            self.first_seen = Some(self.first_seen.map_or(ts, |f| f.min(ts)));
            self.last_seen = Some(self.last_seen.map_or(ts, |l| l.max(ts)));
        }
    }

    fn merge(&mut self, other: &LinkSummary) {
        self.count += other.count;
        self.total_measure += other.total_measure;
        self.distinct_kinds.extend(other.distinct_kinds.iter().cloned());
        self.first_seen = min_opt(self.first_seen, other.first_seen);
        self.last_seen = max_opt(self.last_seen, other.last_seen);
    }
}

fn min_opt(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn max_opt(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Per-node totals derived from the edges touching the node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeSummary {
    /// Events the node took part in
    pub interaction_count: usize,
    /// Measure on edges leaving the node
    pub outgoing_measure: f64,
    /// Measure on edges entering the node
    pub incoming_measure: f64,
    /// `incoming_measure - outgoing_measure`
    pub net_measure: f64,
    /// Distinct other nodes linked in either direction
    pub distinct_counterparts: usize,
}

/// One directed edge, flattened for output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectedLink {
    /// Initiating party
    pub source: String,
    /// Receiving party
    pub target: String,
    /// Edge statistics
    #[serde(flatten)]
    pub summary: LinkSummary,
}

/// Both directions of a pair folded together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairSummary {
    /// The two parties
    pub pair: PartyPair,
    /// Events from `pair.first()` to `pair.second()`
    pub a_to_b: usize,
    /// Events from `pair.second()` to `pair.first()`
    pub b_to_a: usize,
    /// Totals over both directions
    #[serde(flatten)]
    pub link: LinkSummary,
}

/// One counterpart of a chosen subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contact {
    /// The other party
    pub counterpart: String,
    /// Events from the subject to the counterpart
    pub sent: usize,
    /// Events from the counterpart to the subject
    pub received: usize,
    /// Totals over both directions
    #[serde(flatten)]
    pub link: LinkSummary,
}

/// Directed weighted multigraph of parties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkGraph {
    nodes: BTreeMap<String, NodeSummary>,
    edges: BTreeMap<(String, String), LinkSummary>,
    skipped: usize,
}

impl LinkGraph {
    /// Aggregate every dyadic event
    ///
    /// Events without a counterpart are skipped and counted. Timestamps are
    /// optional.
    pub fn build<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a InteractionEvent>,
    {
        let mut edges: BTreeMap<(String, String), LinkSummary> = BTreeMap::new();
        let mut skipped = 0;

        for event in events {
            let Some((source, target)) = event.endpoints() else {
                skipped += 1;
                continue;
            };
            edges
                .entry((source.to_string(), target.to_string()))
                .or_default()
                .add(event);
        }

        if skipped > 0 {
            tracing::debug!(skipped, "non-dyadic events left out of link graph");
        }

        let mut graph = Self::from_edges(edges);
        graph.skipped = skipped;
        tracing::debug!(nodes = graph.nodes.len(), edges = graph.edges.len(), "link graph built");
        graph
    }

    fn from_edges(edges: BTreeMap<(String, String), LinkSummary>) -> Self {
        let mut nodes: BTreeMap<String, NodeSummary> = BTreeMap::new();
        let mut neighbours: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

        for ((source, target), link) in &edges {
            let out = nodes.entry(source.clone()).or_default();
            out.interaction_count += link.count;
            out.outgoing_measure += link.total_measure;

            let inc = nodes.entry(target.clone()).or_default();
            inc.incoming_measure += link.total_measure;

            // a self-loop is one interaction of one node
            if source != target {
                inc.interaction_count += link.count;
                neighbours.entry(source.clone()).or_default().insert(target.as_str());
                neighbours.entry(target.clone()).or_default().insert(source.as_str());
            }
        }

        for (id, node) in nodes.iter_mut() {
            node.net_measure = node.incoming_measure - node.outgoing_measure;
            node.distinct_counterparts = neighbours.get(id).map_or(0, BTreeSet::len);
        }
        drop(neighbours);

        Self {
            nodes,
            edges,
            skipped: 0,
        }
    }

    /// Node summaries keyed by party id
    pub fn nodes(&self) -> &BTreeMap<String, NodeSummary> {
        &self.nodes
    }

    /// Summary of one node
    pub fn node(&self, id: &str) -> Option<&NodeSummary> {
        self.nodes.get(id)
    }

    /// Summary of the edge `source -> target`
    pub fn edge(&self, source: &str, target: &str) -> Option<&LinkSummary> {
        self.edges.get(&(source.to_string(), target.to_string()))
    }

    /// Directed edges ordered by `(source, target)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &LinkSummary)> {
        self.edges
            .iter()
            .map(|((s, t), link)| (s.as_str(), t.as_str(), link))
    }

    /// Directed edges as owned output rows
    pub fn links(&self) -> Vec<DirectedLink> {
        self.edges()
            .map(|(source, target, summary)| DirectedLink {
                source: source.to_string(),
                target: target.to_string(),
                summary: summary.clone(),
            })
            .collect()
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Events left out for lacking a counterpart
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Fold both directions of each pair into one summary
    pub fn pair_summaries(&self) -> BTreeMap<PartyPair, PairSummary> {
        let mut pairs: BTreeMap<PartyPair, PairSummary> = BTreeMap::new();
        for (source, target, link) in self.edges() {
            let pair = PartyPair::new(source, target);
            let forward = pair.first() == source;
            let entry = pairs.entry(pair.clone()).or_insert_with(|| PairSummary {
                pair,
                a_to_b: 0,
                b_to_a: 0,
                link: LinkSummary::default(),
            });
            if forward {
                entry.a_to_b += link.count;
            } else {
                entry.b_to_a += link.count;
            }
            entry.link.merge(link);
        }
        pairs
    }

    /// Copy of the graph with one node and its edges removed
    ///
    /// Node summaries of the remaining parties are recomputed.
    pub fn without_node(&self, id: &str) -> LinkGraph {
        let edges = self
            .edges
            .iter()
            .filter(|((s, t), _)| s != id && t != id)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut graph = Self::from_edges(edges);
        graph.skipped = self.skipped;
        graph
    }
}

fn by_volume(a: &LinkSummary, b: &LinkSummary) -> std::cmp::Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| b.total_measure.total_cmp(&a.total_measure))
}

/// Pairs with at least `min_interactions` events, busiest first
///
/// Sorted by event count, then total measure, both descending; remaining
/// ties keep pair order.
pub fn frequent_contacts(graph: &LinkGraph, min_interactions: usize) -> Vec<PairSummary> {
    let mut pairs: Vec<PairSummary> = graph
        .pair_summaries()
        .into_values()
        .filter(|p| p.link.count >= min_interactions)
        .collect();
    pairs.sort_by(|a, b| by_volume(&a.link, &b.link));
    pairs
}

/// A subject's `k` busiest counterparts
pub fn top_contacts(graph: &LinkGraph, subject: &str, k: usize) -> Vec<Contact> {
    let mut contacts: Vec<Contact> = graph
        .pair_summaries()
        .into_values()
        .filter_map(|p| {
            let counterpart = p.pair.other(subject)?.to_string();
            let subject_is_first = p.pair.first() == subject;
            let (sent, received) = if subject_is_first {
                (p.a_to_b, p.b_to_a)
            } else {
                (p.b_to_a, p.a_to_b)
            };
            Some(Contact {
                counterpart,
                sent,
                received,
                link: p.link,
            })
        })
        .collect();
    contacts.sort_by(|a, b| by_volume(&a.link, &b.link));
    contacts.truncate(k);
    contacts
}
