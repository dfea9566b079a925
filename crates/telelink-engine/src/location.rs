//! Dominant locations and relocation contact diffs
//!
//! (a) Rank a subject's location keys by how often they occur.
//! (b) Around a shift to a new location, split the subject's counterparts
//!     into those kept from home and those first contacted at the new place.
//!
//! Time windows: home contacts are taken strictly before the shift, new
//! location contacts on or after it, so the shift moment belongs to the new
//! location.

use crate::grouping::{tally, time_ordered, top_k, RankBy, TieBreak, Timed};
use crate::{EngineConfig, EngineError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use telelink_domain::{Analysis, InteractionEvent};

/// Fewest location-bearing events any location analysis accepts
const MIN_LOCATION_EVENTS: usize = 2;

/// One ranked location of a subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRank {
    /// 1-based position
    pub rank: usize,
    /// Location key
    pub location: String,
    /// First non-empty label seen for the key
    pub label: Option<String>,
    /// Events at the location
    pub event_count: usize,
    /// Earliest timestamp at the location
    pub first_seen: Option<DateTime<Utc>>,
    /// Latest timestamp at the location
    pub last_seen: Option<DateTime<Utc>>,
}

/// Contact sets before and after a move
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelocationDiff {
    /// Subject analysed
    pub subject: String,
    /// Dominant locations before the shift, best first
    pub home_locations: Vec<String>,
    /// Location moved to
    pub new_location: String,
    /// First sighting at the new location
    pub shift_timestamp: DateTime<Utc>,
    /// Counterparts contacted from home before the shift
    pub home_contacts: BTreeSet<String>,
    /// New-location counterparts never contacted from home
    pub new_contacts: BTreeSet<String>,
    /// New-location counterparts also contacted from home
    pub maintained_contacts: BTreeSet<String>,
}

impl RelocationDiff {
    /// Every counterpart seen at the new location on or after the shift
    pub fn new_location_contacts(&self) -> BTreeSet<&str> {
        self.new_contacts
            .iter()
            .chain(self.maintained_contacts.iter())
            .map(String::as_str)
            .collect()
    }
}

fn located_events<'a>(events: &'a [InteractionEvent], subject: &'a str) -> impl Iterator<Item = &'a InteractionEvent> {
    events
        .iter()
        .filter(move |e| e.subject == subject && e.location().is_some())
}

/// Rank a subject's locations by event count
///
/// Ties keep the order in which locations first appear in the input.
/// Untimed events still count. Fewer than two location-bearing events is
/// insufficient data.
pub fn dominant_locations(
    events: &[InteractionEvent],
    subject: &str,
    top_n: usize,
) -> Result<Analysis<Vec<LocationRank>>> {
    if top_n == 0 {
        return Err(EngineError::InvalidConfig {
            field: "top_n_home_locations",
            reason: "must be greater than 0".to_string(),
        });
    }

    let located: Vec<&InteractionEvent> = located_events(events, subject).collect();
    if located.len() < MIN_LOCATION_EVENTS {
        return Ok(insufficient_locations(subject, located.len()));
    }

    let mut labels: BTreeMap<&str, &str> = BTreeMap::new();
    for event in &located {
        if let (Some(location), Some(label)) = (event.location(), event.label()) {
            labels.entry(location).or_insert(label);
        }
    }

    let tallies = tally(located.iter().copied(), InteractionEvent::location);
    let ranked = top_k(&tallies, top_n, RankBy::Count, TieBreak::FirstOccurrence)
        .into_iter()
        .map(|r| LocationRank {
            rank: r.rank,
            location: r.key.to_string(),
            label: labels.get(r.key).map(|l| l.to_string()),
            event_count: r.tally.count,
            first_seen: r.tally.first_seen,
            last_seen: r.tally.last_seen,
        })
        .collect();

    Ok(Analysis::Computed(ranked))
}

/// Contact diff for an explicitly chosen new location and shift time
///
/// Home locations are the top `top_n_home_locations` of the subject's events
/// strictly before `shift_at`, excluding `new_location` itself.
pub fn relocation_diff(
    events: &[InteractionEvent],
    subject: &str,
    new_location: &str,
    shift_at: DateTime<Utc>,
    config: &EngineConfig,
) -> Result<Analysis<RelocationDiff>> {
    config.validate()?;

    let ordered = time_ordered(located_events(events, subject));
    if ordered.events.len() < MIN_LOCATION_EVENTS {
        return Ok(insufficient_locations(subject, ordered.events.len()));
    }

    Ok(diff_around(events, subject, &ordered.events, new_location, shift_at, config))
}

/// Find the first sustained move to a new location and diff around it
///
/// A location qualifies when it was not the subject's first location, it is
/// the most frequent location from its first sighting onward, and it has at
/// least `relocation_min_events` events in that window.
pub fn detect_relocation(
    events: &[InteractionEvent],
    subject: &str,
    config: &EngineConfig,
) -> Result<Analysis<RelocationDiff>> {
    config.validate()?;

    let ordered = time_ordered(located_events(events, subject)).events;
    if ordered.len() < MIN_LOCATION_EVENTS {
        return Ok(insufficient_locations(subject, ordered.len()));
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (idx, timed) in ordered.iter().enumerate() {
        let Some(location) = timed.event.location() else {
            continue;
        };
        if !seen.insert(location) || idx == 0 {
            continue;
        }

        let after = &ordered[idx..];
        let tallies = tally(after.iter().map(|t| t.event), InteractionEvent::location);
        let leader = top_k(&tallies, 1, RankBy::Count, TieBreak::FirstOccurrence);
        let sustained = leader
            .first()
            .is_some_and(|r| r.key == location && r.tally.count >= config.relocation_min_events);

        if sustained {
            tracing::debug!(subject, location, shift = %timed.at, "relocation detected");
            return Ok(diff_around(events, subject, &ordered, location, timed.at, config));
        }
    }

    Ok(Analysis::insufficient(format!(
        "no sustained move to a new location for {}",
        subject
    )))
}

fn diff_around(
    events: &[InteractionEvent],
    subject: &str,
    ordered: &[Timed<'_>],
    new_location: &str,
    shift_at: DateTime<Utc>,
    config: &EngineConfig,
) -> Analysis<RelocationDiff> {
    let (before, after): (Vec<&Timed<'_>>, Vec<&Timed<'_>>) =
        ordered.iter().partition(|t| t.at < shift_at);

    // Ranked in input order so ties resolve as in `dominant_locations`
    let home_tallies = tally(
        located_events(events, subject).filter(|e| e.timestamp.is_some_and(|at| at < shift_at)),
        |e| e.location().filter(|l| *l != new_location),
    );
    let home_locations: Vec<String> = top_k(
        &home_tallies,
        config.top_n_home_locations,
        RankBy::Count,
        TieBreak::FirstOccurrence,
    )
    .into_iter()
    .map(|r| r.key.to_string())
    .collect();

    if home_locations.is_empty() {
        return Analysis::insufficient(format!(
            "no home location for {} before {}",
            subject, shift_at
        ));
    }

    let home_contacts: BTreeSet<String> = before
        .iter()
        .filter(|t| t.event.location().is_some_and(|l| home_locations.iter().any(|h| h == l)))
        .filter_map(|t| t.event.counterpart_id())
        .map(str::to_string)
        .collect();

    let new_location_contacts: BTreeSet<String> = after
        .iter()
        .filter(|t| t.event.location() == Some(new_location))
        .filter_map(|t| t.event.counterpart_id())
        .map(str::to_string)
        .collect();

    let (maintained_contacts, new_contacts): (BTreeSet<String>, BTreeSet<String>) = new_location_contacts
        .into_iter()
        .partition(|c| home_contacts.contains(c));

    Analysis::Computed(RelocationDiff {
        subject: subject.to_string(),
        home_locations,
        new_location: new_location.to_string(),
        shift_timestamp: shift_at,
        home_contacts,
        new_contacts,
        maintained_contacts,
    })
}

fn insufficient_locations<T>(subject: &str, found: usize) -> Analysis<T> {
    Analysis::insufficient(format!(
        "{} has {} location event(s), at least {} needed",
        subject, found, MIN_LOCATION_EVENTS
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(hours: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(hours)
    }

    fn at(subject: &str, other: &str, loc: &str, hours: i64) -> InteractionEvent {
        InteractionEvent::new(subject, other, t(hours)).with_location(loc)
    }

    #[test]
    fn test_dominant_ranking_and_labels() {
        let events = vec![
            at("s", "x", "10-1", 0),
            at("s", "x", "10-2", 1).with_location_label("Market Rd"),
            at("s", "x", "10-2", 2).with_location_label("ignored"),
            at("s", "x", "10-1", 3),
            at("s", "x", "10-3", 4),
            at("s", "x", "10-2", 5),
            at("other", "x", "10-3", 6),
        ];
        let ranks = dominant_locations(&events, "s", 3).unwrap().computed().unwrap();

        let keys: Vec<_> = ranks.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(keys, vec!["10-2", "10-1", "10-3"]);
        assert_eq!(ranks[0].event_count, 3);
        assert_eq!(ranks[0].label.as_deref(), Some("Market Rd"));
        assert_eq!(ranks[1].label, None);
        assert_eq!(ranks[0].first_seen, Some(t(1)));
    }

    #[test]
    fn test_dominant_ties_follow_first_occurrence() {
        let events = vec![
            at("s", "x", "Z-9", 0),
            at("s", "x", "A-1", 1),
            at("s", "x", "Z-9", 2),
            at("s", "x", "A-1", 3),
        ];
        let ranks = dominant_locations(&events, "s", 1).unwrap().computed().unwrap();
        assert_eq!(ranks.len(), 1);
        assert_eq!(ranks[0].location, "Z-9");
    }

    #[test]
    fn test_padded_location_keys_merge() {
        let events = vec![
            at("s", "x", " 470-01-1001", 0),
            at("s", "x", "470-01-1001", 1),
            at("s", "x", "470-01-1002", 2),
        ];
        let ranks = dominant_locations(&events, "s", 3).unwrap().computed().unwrap();
        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks[0].location, "470-01-1001");
        assert_eq!(ranks[0].event_count, 2);
    }

    #[test]
    fn test_dominant_insufficient_data() {
        let events = vec![at("s", "x", "10-1", 0), InteractionEvent::new("s", "y", t(1))];
        let result = dominant_locations(&events, "s", 3).unwrap();
        assert!(matches!(result, Analysis::InsufficientData { .. }));
        assert!(dominant_locations(&events, "s", 0).is_err());
    }

    fn moved() -> Vec<InteractionEvent> {
        vec![
            at("s", "mum", "HOME", 0),
            at("s", "boss", "WORK", 1),
            at("s", "mum", "HOME", 2),
            at("s", "friend", "HOME", 3),
            at("s", "mum", "NEW", 10),
            at("s", "landlord", "NEW", 11),
            at("s", "boss", "WORK", 12),
            at("s", "grocer", "NEW", 13),
        ]
    }

    #[test]
    fn test_relocation_diff_explicit() {
        let events = moved();
        let diff = relocation_diff(&events, "s", "NEW", t(10), &EngineConfig::default())
            .unwrap()
            .computed()
            .unwrap();

        assert_eq!(diff.home_locations, vec!["HOME".to_string(), "WORK".to_string()]);
        assert_eq!(diff.shift_timestamp, t(10));
        let maintained: Vec<_> = diff.maintained_contacts.iter().map(String::as_str).collect();
        let new: Vec<_> = diff.new_contacts.iter().map(String::as_str).collect();
        assert_eq!(maintained, vec!["mum"]);
        assert_eq!(new, vec!["grocer", "landlord"]);
        assert!(diff.home_contacts.contains("boss"));
    }

    #[test]
    fn test_home_ties_follow_input_order() {
        // Input order puts LB first, time order puts LA first
        let events = vec![
            at("s", "bob", "LB", 5),
            at("s", "amy", "LA", 1),
            at("s", "amy", "NEW", 10),
            at("s", "bob", "NEW", 11),
        ];
        let config = EngineConfig {
            top_n_home_locations: 1,
            ..Default::default()
        };

        let dominant = dominant_locations(&events[..2], "s", 1).unwrap().computed().unwrap();
        assert_eq!(dominant[0].location, "LB");

        let diff = relocation_diff(&events, "s", "NEW", t(10), &config)
            .unwrap()
            .computed()
            .unwrap();
        assert_eq!(diff.home_locations, vec!["LB".to_string()]);
        assert_eq!(diff.maintained_contacts, BTreeSet::from(["bob".to_string()]));
        assert_eq!(diff.new_contacts, BTreeSet::from(["amy".to_string()]));
    }

    #[test]
    fn test_shift_moment_belongs_to_new_location() {
        // A home-location event exactly at the shift is not a home contact
        let mut events = moved();
        events.push(at("s", "stranger", "HOME", 10));
        events.push(at("s", "stranger", "NEW", 14));

        let diff = relocation_diff(&events, "s", "NEW", t(10), &EngineConfig::default())
            .unwrap()
            .computed()
            .unwrap();
        assert!(diff.new_contacts.contains("stranger"));
        assert!(!diff.home_contacts.contains("stranger"));
    }

    #[test]
    fn test_detect_relocation() {
        let events = moved();
        let diff = detect_relocation(&events, "s", &EngineConfig::default())
            .unwrap()
            .computed()
            .unwrap();
        assert_eq!(diff.new_location, "NEW");
        assert_eq!(diff.shift_timestamp, t(10));
        assert_eq!(diff.maintained_contacts.len(), 1);
    }

    #[test]
    fn test_detect_ignores_brief_visit() {
        let events = vec![
            at("s", "a", "HOME", 0),
            at("s", "b", "VISIT", 1),
            at("s", "a", "HOME", 2),
            at("s", "a", "HOME", 3),
        ];
        let result = detect_relocation(&events, "s", &EngineConfig::default()).unwrap();
        assert!(!result.is_computed());
    }

    #[test]
    fn test_relocation_insufficient_cases() {
        let single = vec![at("s", "a", "HOME", 0)];
        let config = EngineConfig::default();
        assert!(!relocation_diff(&single, "s", "NEW", t(1), &config).unwrap().is_computed());
        assert!(!detect_relocation(&single, "s", &config).unwrap().is_computed());

        // Nothing before the shift means no home
        let only_new = vec![at("s", "a", "NEW", 5), at("s", "b", "NEW", 6)];
        assert!(!relocation_diff(&only_new, "s", "NEW", t(5), &config).unwrap().is_computed());
    }

    #[test]
    fn test_relocation_rejects_invalid_config() {
        let config = EngineConfig {
            top_n_home_locations: 0,
            ..Default::default()
        };
        assert!(relocation_diff(&moved(), "s", "NEW", t(10), &config).is_err());
        assert!(detect_relocation(&moved(), "s", &config).is_err());
    }
}
