//! Change-point detection over a keyed attribute
//!
//! Used for device ↔ SIM history (which IMSI an IMEI carried over time, or the
//! reverse) and for any other attribute whose evolution matters. Every
//! transition is kept: `A → B → A` yields two change points, not a net diff.

use crate::grouping::{group_by, tally_by, time_ordered};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use telelink_domain::InteractionEvent;

/// A maximal run of consecutive events sharing one attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRun {
    /// The attribute value
    pub value: String,
    /// Timestamp of the run's first event
    pub first_seen: DateTime<Utc>,
    /// Timestamp of the run's last event
    pub last_seen: DateTime<Utc>,
    /// Events in the run
    pub event_count: usize,
}

/// A timestamped transition of the attribute value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePoint {
    /// Value before the change
    pub previous_value: String,
    /// Value after the change
    pub new_value: String,
    /// First timestamp carrying the new value
    pub changed_at: DateTime<Utc>,
    /// Start of the run that just closed
    pub previous_value_first_seen: DateTime<Utc>,
    /// End of the run that just closed
    pub previous_value_last_seen: DateTime<Utc>,
    /// Events in the run that just closed
    pub previous_event_count: usize,
}

/// Run-length history of an attribute, in time order
///
/// Events without a timestamp or with a blank value are skipped.
pub fn attribute_runs<'a, I, F>(events: I, value_fn: F) -> Vec<AttributeRun>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
    F: Fn(&'a InteractionEvent) -> Option<&'a str>,
{
    let ordered = time_ordered(events);
    let mut runs: Vec<AttributeRun> = Vec::new();

    for timed in ordered.events {
        let Some(value) = value_fn(timed.event).map(str::trim).filter(|v| !v.is_empty()) else {
            continue;
        };

        if let Some(run) = runs.last_mut().filter(|r| r.value == value) {
            run.last_seen = timed.at;
            run.event_count += 1;
            continue;
        }
        runs.push(AttributeRun {
            value: value.to_string(),
            first_seen: timed.at,
            last_seen: timed.at,
            event_count: 1,
        });
    }

    runs
}

/// Change points of a caller-selected attribute for one subject's events
pub fn change_points_by<'a, I, F>(events: I, value_fn: F) -> Vec<ChangePoint>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
    F: Fn(&'a InteractionEvent) -> Option<&'a str>,
{
    attribute_runs(events, value_fn)
        .windows(2)
        .map(|w| ChangePoint {
            previous_value: w[0].value.clone(),
            new_value: w[1].value.clone(),
            changed_at: w[1].first_seen,
            previous_value_first_seen: w[0].first_seen,
            previous_value_last_seen: w[0].last_seen,
            previous_event_count: w[0].event_count,
        })
        .collect()
}

/// Change points of `attribute_value` for one subject's events
pub fn change_points<'a, I>(events: I) -> Vec<ChangePoint>
where
    I: IntoIterator<Item = &'a InteractionEvent>,
{
    change_points_by(events, InteractionEvent::attribute)
}

/// Change points of `attribute_value` for every subject
///
/// Subjects whose value never changed are omitted.
pub fn change_points_by_subject(events: &[InteractionEvent]) -> BTreeMap<String, Vec<ChangePoint>> {
    let mut out = BTreeMap::new();
    for (subject, subject_events) in group_by(events, |e| Some(e.subject.as_str())) {
        let changes = change_points(subject_events);
        if !changes.is_empty() {
            out.insert(subject.to_string(), changes);
        }
    }
    tracing::debug!(subjects = out.len(), "change points computed");
    out
}

/// One companion value observed for a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionUsage {
    /// The companion identifier
    pub value: String,
    /// Events carrying it
    pub event_count: usize,
    /// Earliest timestamp, if any event had one
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest timestamp, if any event had one
    pub last_seen: Option<DateTime<Utc>>,
}

/// Every companion value each subject used (device → SIMs)
///
/// Counting does not need timestamps, so untimed events still count. Entries
/// are ordered by first sighting, untimed-only values last.
pub fn companion_usage(events: &[InteractionEvent]) -> BTreeMap<String, Vec<CompanionUsage>> {
    usage_table(events, |e| Some(e.subject.as_str()), InteractionEvent::attribute)
}

/// Every subject each companion value appeared with (SIM → devices)
pub fn attribute_holders(events: &[InteractionEvent]) -> BTreeMap<String, Vec<CompanionUsage>> {
    usage_table(events, InteractionEvent::attribute, |e| Some(e.subject.as_str()))
}

fn usage_table<'a, K, V>(events: &'a [InteractionEvent], key_fn: K, value_fn: V) -> BTreeMap<String, Vec<CompanionUsage>>
where
    K: Fn(&'a InteractionEvent) -> Option<&'a str>,
    V: Fn(&'a InteractionEvent) -> Option<&'a str>,
{
    let mut out = BTreeMap::new();
    for (key, key_events) in group_by(events, |e| key_fn(e).map(str::trim).filter(|k| !k.is_empty())) {
        let tallies = tally_by(key_events, |e| value_fn(e).map(str::trim).filter(|v| !v.is_empty()), |_| 0.0);
        if tallies.is_empty() {
            continue;
        }

        let mut usages: Vec<CompanionUsage> = tallies
            .into_iter()
            .map(|(value, t)| CompanionUsage {
                value: value.to_string(),
                event_count: t.count,
                first_seen: t.first_seen,
                last_seen: t.last_seen,
            })
            .collect();
        usages.sort_by_key(|u| (u.first_seen.is_none(), u.first_seen));

        out.insert(key.to_string(), usages);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn seen(device: &str, sim: &str, secs: i64) -> InteractionEvent {
        InteractionEvent::bare(device).at(t(secs)).with_attribute(sim)
    }

    #[test]
    fn test_single_change() {
        let events = vec![seen("imei1", "SIM1", 1), seen("imei1", "SIM1", 2), seen("imei1", "SIM2", 3)];
        let changes = change_points(&events);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous_value, "SIM1");
        assert_eq!(changes[0].new_value, "SIM2");
        assert_eq!(changes[0].changed_at, t(3));
        assert_eq!(changes[0].previous_value_first_seen, t(1));
        assert_eq!(changes[0].previous_value_last_seen, t(2));
        assert_eq!(changes[0].previous_event_count, 2);
    }

    #[test]
    fn test_alternation_keeps_every_transition() {
        let events = vec![
            seen("d", "A", 1),
            seen("d", "A", 2),
            seen("d", "B", 3),
            seen("d", "B", 4),
            seen("d", "A", 5),
        ];
        let changes = change_points(&events);

        assert_eq!(changes.len(), 2);
        assert_eq!((changes[0].previous_value.as_str(), changes[0].new_value.as_str()), ("A", "B"));
        assert_eq!(changes[0].previous_value_last_seen, t(2));
        assert_eq!((changes[1].previous_value.as_str(), changes[1].new_value.as_str()), ("B", "A"));
        assert_eq!(changes[1].previous_value_first_seen, t(3));
        assert_eq!(changes[1].previous_value_last_seen, t(4));
        assert_eq!(changes[1].changed_at, t(5));
    }

    #[test]
    fn test_first_value_never_changes() {
        let events = vec![seen("d", "A", 1)];
        assert!(change_points(&events).is_empty());
        assert!(change_points(&Vec::new()).is_empty());
    }

    #[test]
    fn test_blank_and_untimed_values_skipped() {
        let mut untimed = seen("d", "Z", 0);
        untimed.timestamp = None;
        let events = vec![
            seen("d", "A", 1),
            seen("d", "  ", 2),
            InteractionEvent::bare("d").at(t(3)),
            untimed,
            seen("d", "A", 4),
        ];
        assert!(change_points(&events).is_empty());

        let runs = attribute_runs(&events, InteractionEvent::attribute);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].event_count, 2);
        assert_eq!(runs[0].last_seen, t(4));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let events = vec![seen("d", "B", 3), seen("d", "A", 1), seen("d", "A", 2)];
        let changes = change_points(&events);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].previous_value, "A");
    }

    #[test]
    fn test_other_attribute_via_value_fn() {
        let events = vec![
            seen("d", "S", 1).with_location("10-1"),
            seen("d", "S", 2).with_location("10-2"),
        ];
        let changes = change_points_by(&events, InteractionEvent::location);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_value, "10-2");
    }

    #[test]
    fn test_by_subject_omits_stable_subjects() {
        let events = vec![
            seen("d1", "A", 1),
            seen("d2", "X", 1),
            seen("d1", "B", 2),
            seen("d2", "X", 2),
        ];
        let by_subject = change_points_by_subject(&events);
        assert_eq!(by_subject.len(), 1);
        assert_eq!(by_subject["d1"].len(), 1);
    }

    #[test]
    fn test_companion_usage_and_holders() {
        let mut untimed = seen("imei1", "SIM9", 0);
        untimed.timestamp = None;
        let events = vec![
            seen("imei1", "SIM2", 20),
            seen("imei1", "SIM1", 10),
            untimed,
            seen("imei2", "SIM1", 30),
            seen("imei1", "SIM1", 15),
        ];

        let usage = companion_usage(&events);
        let imei1: Vec<_> = usage["imei1"].iter().map(|u| u.value.as_str()).collect();
        assert_eq!(imei1, vec!["SIM1", "SIM2", "SIM9"]);
        assert_eq!(usage["imei1"][0].event_count, 2);
        assert_eq!(usage["imei1"][0].first_seen, Some(t(10)));
        assert_eq!(usage["imei1"][0].last_seen, Some(t(15)));

        let holders = attribute_holders(&events);
        let sim1: Vec<_> = holders["SIM1"].iter().map(|u| u.value.as_str()).collect();
        assert_eq!(sim1, vec!["imei1", "imei2"]);
    }
}
