//! Grouping and ranking primitives
//!
//! Every higher-level engine is built from these: group events by a key,
//! tally count/sum/first-seen/last-seen per key, rank the tallies. Maps are
//! `BTreeMap` so results iterate in the key's natural order and repeated runs
//! produce identical output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use telelink_domain::InteractionEvent;

/// An event paired with its (present) timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timed<'a> {
    /// The event's timestamp
    pub at: DateTime<Utc>,
    /// The event itself
    pub event: &'a InteractionEvent,
}

/// Events with a usable timestamp, in time order
#[derive(Debug, Clone, Default)]
pub struct TimeOrdered<'a> {
    /// Ascending by timestamp; equal timestamps keep input order
    pub events: Vec<Timed<'a>>,

    /// Records dropped for having no timestamp
    pub excluded: usize,
}

/// Drop records without a timestamp and stable-sort the rest ascending
pub fn time_ordered<'a, I>(events: I) -> TimeOrdered<'a>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
{
    let mut excluded = 0;
    let mut kept = Vec::new();
    for event in events {
        match event.timestamp {
            Some(at) => kept.push(Timed { at, event }),
            None => excluded += 1,
        }
    }

    // sort_by_key is stable: ties stay in input order
    kept.sort_by_key(|t| t.at);

    if excluded > 0 {
        tracing::debug!(excluded, kept = kept.len(), "dropped records without timestamp");
    }

    TimeOrdered {
        events: kept,
        excluded,
    }
}

/// Group events by key, preserving input order inside each group
///
/// Events for which `key_fn` returns `None` are left out.
pub fn group_by<'a, K, I, F>(events: I, mut key_fn: F) -> BTreeMap<K, Vec<&'a InteractionEvent>>
where
    K: Ord,
    I: IntoIterator<Item = &'a InteractionEvent>,
    F: FnMut(&'a InteractionEvent) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<&'a InteractionEvent>> = BTreeMap::new();
    for event in events {
        if let Some(key) = key_fn(event) {
            groups.entry(key).or_default().push(event);
        }
    }
    groups
}

/// Per-key accumulator produced by [`tally`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    /// Number of events
    pub count: usize,

    /// Sum of measures; non-finite measures count as zero
    pub sum: f64,

    /// Earliest timestamp among the events, if any had one
    pub first_seen: Option<DateTime<Utc>>,

    /// Latest timestamp among the events, if any had one
    pub last_seen: Option<DateTime<Utc>>,

    /// Input position of the first event with this key
    #[serde(skip)]
    pub first_index: usize,
}

impl Tally {
    fn new(first_index: usize) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            first_seen: None,
            last_seen: None,
            first_index,
        }
    }

    fn add(&mut self, timestamp: Option<DateTime<Utc>>, measure: f64) {
        self.count += 1;
        if measure.is_finite() {
            self.sum += measure;
        }
        if let Some(ts) = timestamp {
            self.first_seen = Some(self.first_seen.map_or(ts, |f| f.min(ts)));
            self.last_seen = Some(self.last_seen.map_or(ts, |l| l.max(ts)));
        }
    }
}

/// Tally events per key using each event's own measure
pub fn tally<'a, K, I, F>(events: I, key_fn: F) -> BTreeMap<K, Tally>
where
    K: Ord,
    I: IntoIterator<Item = &'a InteractionEvent>,
    F: FnMut(&'a InteractionEvent) -> Option<K>,
{
    tally_by(events, key_fn, InteractionEvent::measure_or_zero)
}

/// Tally events per key with a caller-supplied measure
pub fn tally_by<'a, K, I, F, M>(events: I, mut key_fn: F, measure_fn: M) -> BTreeMap<K, Tally>
where
    K: Ord,
    I: IntoIterator<Item = &'a InteractionEvent>,
    F: FnMut(&'a InteractionEvent) -> Option<K>,
    M: Fn(&InteractionEvent) -> f64,
{
    let mut tallies: BTreeMap<K, Tally> = BTreeMap::new();
    for (index, event) in events.into_iter().enumerate() {
        if let Some(key) = key_fn(event) {
            tallies
                .entry(key)
                .or_insert_with(|| Tally::new(index))
                .add(event.timestamp, measure_fn(event));
        }
    }
    tallies
}

/// Which tally field orders a ranking (always descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Event count
    Count,
    /// Summed measure
    Sum,
}

/// How equal tallies are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Natural order of the key
    KeyOrder,
    /// Key whose first event appeared earlier in the input wins
    FirstOccurrence,
}

/// One entry of a ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<K> {
    /// 1-based position
    pub rank: usize,
    /// Grouping key
    pub key: K,
    /// Accumulated values for the key
    #[serde(flatten)]
    pub tally: Tally,
}

/// Rank tallies and keep the first `k`
///
/// Ordering is strictly by the chosen field, descending; anything equal on
/// that field falls back to `tie`.
pub fn top_k<K>(tallies: &BTreeMap<K, Tally>, k: usize, by: RankBy, tie: TieBreak) -> Vec<Ranked<K>>
where
    K: Ord + Clone,
{
    if k == 0 {
        return Vec::new();
    }

    let mut entries: Vec<(&K, &Tally)> = tallies.iter().collect();
    if tie == TieBreak::FirstOccurrence {
        entries.sort_by_key(|(_, t)| t.first_index);
    }
    entries.sort_by(|(_, a), (_, b)| compare_desc(a, b, by));

    entries
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, (key, tally))| Ranked {
            rank: i + 1,
            key: key.clone(),
            tally: tally.clone(),
        })
        .collect()
}

fn compare_desc(a: &Tally, b: &Tally, by: RankBy) -> Ordering {
    match by {
        RankBy::Count => b.count.cmp(&a.count),
        RankBy::Sum => b.sum.total_cmp(&a.sum),
    }
}
