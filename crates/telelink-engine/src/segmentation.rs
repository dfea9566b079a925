//! Gap segmentation - interaction chains between two parties
//!
//! A chain is a run of events between the same two parties in which no two
//! consecutive events are further apart than `max_gap`. Runs shorter than
//! `min_chain_length` are discarded.
//!
//! ```text
//! t=0   t=30          t=200
//!  |-----|              |
//!  chain (depth 2)      singleton, dropped
//! ```

use crate::grouping::{group_by, time_ordered, Timed};
use crate::{EngineConfig, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use telelink_domain::{span, InteractionEvent, PartyPair};

/// One event inside a chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainEntry<'a> {
    /// The source event
    pub event: &'a InteractionEvent,

    /// Silence until the next event of the chain; `None` on the last entry
    #[serde(rename = "gap_to_next_secs", serialize_with = "span::as_opt_secs")]
    pub gap_to_next: Option<Duration>,
}

/// A contiguous run of interactions between two parties
///
/// Immutable once produced. Borrows its events from the input slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain<'a> {
    parties: PartyPair,
    entries: Vec<ChainEntry<'a>>,
    depth: usize,
    active_duration: f64,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    #[serde(rename = "span_secs", serialize_with = "span::as_secs")]
    span: Duration,
}

impl<'a> Chain<'a> {
    /// Build a chain from a non-empty, time-ordered run
    fn from_run(parties: PartyPair, run: &[Timed<'a>]) -> Option<Self> {
        let first = run.first()?;
        let last = run.last()?;

        let entries = run
            .iter()
            .enumerate()
            .map(|(i, t)| ChainEntry {
                event: t.event,
                gap_to_next: run.get(i + 1).map(|next| next.at - t.at),
            })
            .collect();

        Some(Self {
            parties,
            entries,
            depth: run.len(),
            active_duration: run.iter().map(|t| t.event.measure_or_zero()).sum(),
            started_at: first.at,
            ended_at: last.at,
            span: last.at - first.at,
        })
    }

    /// The two parties of the chain
    pub fn parties(&self) -> &PartyPair {
        &self.parties
    }

    /// Events of the chain in time order
    pub fn entries(&self) -> &[ChainEntry<'a>] {
        &self.entries
    }

    /// Number of events
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Sum of the events' measures (talk time, bytes, amount)
    pub fn active_duration(&self) -> f64 {
        self.active_duration
    }

    /// Timestamp of the first event
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Timestamp of the last event
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    /// Wall-clock time from first to last event
    pub fn span(&self) -> Duration {
        self.span
    }

    /// Largest gap inside the chain, zero for a single-event chain
    pub fn max_internal_gap(&self) -> Duration {
        self.entries
            .iter()
            .filter_map(|e| e.gap_to_next)
            .max()
            .unwrap_or_else(Duration::zero)
    }
}

/// Split time-ordered events into runs separated by gaps over `max_gap`
///
/// No pair filtering and no length filter: every timed event lands in exactly
/// one run. Records without a timestamp are excluded first.
pub fn chain_candidates<'a, I>(events: I, max_gap: Duration) -> Vec<Vec<Timed<'a>>>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
{
    let ordered = time_ordered(events);
    let mut runs: Vec<Vec<Timed<'a>>> = Vec::new();
    let mut current: Vec<Timed<'a>> = Vec::new();

    for timed in ordered.events {
        if let Some(prev) = current.last() {
            let gap = timed.at - prev.at;
            if gap > max_gap {
                tracing::trace!(gap_secs = gap.num_seconds(), depth = current.len(), "chain boundary");
                runs.push(std::mem::take(&mut current));
            }
        }
        current.push(timed);
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Chains between the two parties of `pair`
///
/// Events of other pairs and non-dyadic events in `events` are ignored. A pair
/// with no valid events yields no chains.
pub fn segment_pair<'a>(
    events: &'a [InteractionEvent],
    pair: &PartyPair,
    config: &EngineConfig,
) -> Result<Vec<Chain<'a>>> {
    config.validate()?;
    Ok(segment_validated(
        events.iter().filter(|e| e.involves(pair)),
        pair,
        config,
    ))
}

/// Chains for every pair in the dataset
///
/// Pairs whose runs are all shorter than `min_chain_length` are omitted.
pub fn segment_all<'a>(
    events: &'a [InteractionEvent],
    config: &EngineConfig,
) -> Result<BTreeMap<PartyPair, Vec<Chain<'a>>>> {
    config.validate()?;

    let by_pair = group_by(events, |e| e.pair());
    let mut out = BTreeMap::new();
    for (pair, pair_events) in by_pair {
        let chains = segment_validated(pair_events, &pair, config);
        if !chains.is_empty() {
            out.insert(pair, chains);
        }
    }

    tracing::debug!(
        events = events.len(),
        pairs = out.len(),
        chains = out.values().map(Vec::len).sum::<usize>(),
        "segmented all pairs"
    );
    Ok(out)
}

fn segment_validated<'a, I>(events: I, pair: &PartyPair, config: &EngineConfig) -> Vec<Chain<'a>>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
{
    chain_candidates(events, config.max_gap())
        .into_iter()
        .filter(|run| run.len() >= config.min_chain_length)
        .filter_map(|run| Chain::from_run(pair.clone(), &run))
        .collect()
}

/// Summary over a list of chains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStats {
    /// Number of chains
    pub chain_count: usize,
    /// Largest depth
    pub deepest: usize,
    /// Mean depth, 0 for no chains
    pub mean_depth: f64,
    /// Longest wall-clock span
    #[serde(rename = "longest_span_secs", serialize_with = "span::as_secs")]
    pub longest_span: Duration,
    /// Sum of active durations
    pub total_active_duration: f64,
}

impl ChainStats {
    /// Summarize chains
    pub fn from_chains<'c, 'a: 'c, I>(chains: I) -> Self
    where
        I: IntoIterator<Item = &'c Chain<'a>>,
    {
        let mut stats = Self {
            chain_count: 0,
            deepest: 0,
            mean_depth: 0.0,
            longest_span: Duration::zero(),
            total_active_duration: 0.0,
        };
        let mut total_depth = 0usize;

        for chain in chains {
            stats.chain_count += 1;
            total_depth += chain.depth();
            stats.deepest = stats.deepest.max(chain.depth());
            stats.longest_span = stats.longest_span.max(chain.span());
            stats.total_active_duration += chain.active_duration();
        }
        if stats.chain_count > 0 {
            stats.mean_depth = total_depth as f64 / stats.chain_count as f64;
        }
        stats
    }
}
