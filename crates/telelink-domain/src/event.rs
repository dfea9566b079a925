//! Event module - the unit of input every engine consumes

use crate::PartyPair;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which way an interaction flowed relative to its subject
///
/// Record exports encode this differently (MOC/MTC call types, debit/credit
/// columns, uplink/downlink). Ingestion normalizes all of them to this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Subject acted toward counterpart (originated call, sent SMS, debit)
    #[default]
    Outgoing,

    /// Counterpart acted toward subject (terminated call, received SMS, credit)
    Incoming,
}

impl Direction {
    /// Get the direction name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
        }
    }

    /// Parse a direction from the labels found in telecom exports
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "outgoing" | "out" | "moc" | "debit" | "sent" => Some(Direction::Outgoing),
            "incoming" | "in" | "mtc" | "credit" | "received" => Some(Direction::Incoming),
            _ => None,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid direction: {}", s))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One time-stamped interaction record
///
/// "Subject acted toward counterpart at timestamp", with an optional
/// magnitude. Fields the source export could not supply are `None`; an
/// unparsable timestamp is represented as `None` by ingestion and the record is
/// then excluded from every time-ordered algorithm.
///
/// Unknown fields are rejected when deserializing, so loosely-typed rows are
/// caught at the ingestion boundary rather than inside an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InteractionEvent {
    /// Identifier the analysis is keyed on (phone number, account, device)
    pub subject: String,

    /// The other party, absent for non-dyadic records such as location pings
    #[serde(default)]
    pub counterpart: Option<String>,

    /// Event time
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Non-negative magnitude: seconds, bytes or currency units
    #[serde(default)]
    pub measure: Option<f64>,

    /// Secondary attribute tracked over time (companion IMSI/IMEI, handset)
    #[serde(default)]
    pub attribute_value: Option<String>,

    /// Coarse location key, e.g. `<lac>-<cell>`
    #[serde(default)]
    pub location_key: Option<String>,

    /// Free-text label for the location (site name, address)
    #[serde(default)]
    pub location_label: Option<String>,

    /// Category label carried through for display
    #[serde(default)]
    pub kind: Option<String>,

    /// Flow direction relative to the subject; `None` reads as outgoing
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl InteractionEvent {
    /// Create a dyadic event with every optional attribute unset
    ///
    /// # Examples
    ///
    /// ```
    /// use telelink_domain::InteractionEvent;
    /// use chrono::{TimeZone, Utc};
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    /// let event = InteractionEvent::new("8801711000001", "8801811000002", at)
    ///     .with_measure(42.0)
    ///     .with_kind("voice");
    /// assert_eq!(event.measure_or_zero(), 42.0);
    /// ```
    pub fn new(subject: impl Into<String>, counterpart: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            counterpart: Some(counterpart.into()),
            timestamp: Some(timestamp),
            ..Self::bare(String::new())
        }
    }

    /// Create an event carrying only a subject
    ///
    /// Used for pings and attribute observations that have no counterpart.
    pub fn bare(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            counterpart: None,
            timestamp: None,
            measure: None,
            attribute_value: None,
            location_key: None,
            location_label: None,
            kind: None,
            direction: None,
        }
    }

    /// Set the timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the measure
    pub fn with_measure(mut self, measure: f64) -> Self {
        self.measure = Some(measure);
        self
    }

    /// Set the tracked attribute value
    pub fn with_attribute(mut self, value: impl Into<String>) -> Self {
        self.attribute_value = Some(value.into());
        self
    }

    /// Set the location key
    pub fn with_location(mut self, key: impl Into<String>) -> Self {
        self.location_key = Some(key.into());
        self
    }

    /// Set the location label
    pub fn with_location_label(mut self, label: impl Into<String>) -> Self {
        self.location_label = Some(label.into());
        self
    }

    /// Set the kind label
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Set the direction
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Measure usable in sums
    ///
    /// Missing, NaN, infinite and negative measures all read as zero.
    pub fn measure_or_zero(&self) -> f64 {
        match self.measure {
            Some(m) if m.is_finite() && m > 0.0 => m,
            _ => 0.0,
        }
    }

    /// Direction with the outgoing default applied
    pub fn direction_or_default(&self) -> Direction {
        self.direction.unwrap_or_default()
    }

    /// Counterpart, trimmed, with blank strings read as absent
    pub fn counterpart_id(&self) -> Option<&str> {
        non_blank(self.counterpart.as_deref())
    }

    /// Attribute value, trimmed, with blank strings read as absent
    pub fn attribute(&self) -> Option<&str> {
        non_blank(self.attribute_value.as_deref())
    }

    /// Location key, trimmed, with blank strings read as absent
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location_key.as_deref())
    }

    /// Location label, trimmed, with blank strings read as absent
    pub fn label(&self) -> Option<&str> {
        non_blank(self.location_label.as_deref())
    }

    /// Unordered pair of parties, if the event is dyadic
    pub fn pair(&self) -> Option<PartyPair> {
        self.counterpart_id()
            .map(|other| PartyPair::new(self.subject.as_str(), other))
    }

    /// Oriented `(source, target)` of the interaction, if dyadic
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        let other = self.counterpart_id()?;
        Some(match self.direction_or_default() {
            Direction::Outgoing => (self.subject.as_str(), other),
            Direction::Incoming => (other, self.subject.as_str()),
        })
    }

    /// Whether the event is between exactly the two parties of `pair`
    pub fn involves(&self, pair: &PartyPair) -> bool {
        self.pair().as_ref() == Some(pair)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_measure_or_zero() {
        let base = InteractionEvent::new("a", "b", t(0));
        assert_eq!(base.measure_or_zero(), 0.0);
        assert_eq!(base.clone().with_measure(12.5).measure_or_zero(), 12.5);
        assert_eq!(base.clone().with_measure(f64::NAN).measure_or_zero(), 0.0);
        assert_eq!(base.clone().with_measure(f64::INFINITY).measure_or_zero(), 0.0);
        assert_eq!(base.with_measure(-3.0).measure_or_zero(), 0.0);
    }

    #[test]
    fn test_blank_fields_read_as_absent() {
        let event = InteractionEvent::new("a", "  ", t(0))
            .with_attribute("")
            .with_location(" ");

        assert!(event.counterpart_id().is_none());
        assert!(event.attribute().is_none());
        assert!(event.location().is_none());
        assert!(event.pair().is_none());
    }

    #[test]
    fn test_accessors_trim_padding() {
        let event = InteractionEvent::new("a", " b ", t(0))
            .with_attribute(" 356938035643809")
            .with_location("470-01-1001 ")
            .with_location_label("\tMarket Rd");

        assert_eq!(event.counterpart_id(), Some("b"));
        assert_eq!(event.attribute(), Some("356938035643809"));
        assert_eq!(event.location(), Some("470-01-1001"));
        assert_eq!(event.label(), Some("Market Rd"));
        assert_eq!(event.pair(), InteractionEvent::new("a", "b", t(1)).pair());
    }

    #[test]
    fn test_endpoints_follow_direction() {
        let out = InteractionEvent::new("a", "b", t(0));
        assert_eq!(out.endpoints(), Some(("a", "b")));

        let inc = out.clone().with_direction(Direction::Incoming);
        assert_eq!(inc.endpoints(), Some(("b", "a")));
        assert_eq!(out.pair(), inc.pair());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::parse("MOC"), Some(Direction::Outgoing));
        assert_eq!(Direction::parse("credit"), Some(Direction::Incoming));
        assert_eq!("Incoming".parse::<Direction>(), Ok(Direction::Incoming));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let ok = r#"{"subject":"a","counterpart":"b","timestamp":"2024-03-01T09:30:00Z","measure":30}"#;
        let event: InteractionEvent = serde_json::from_str(ok).unwrap();
        assert_eq!(event.counterpart_id(), Some("b"));
        assert_eq!(event.measure_or_zero(), 30.0);

        let extra = r#"{"subject":"a","imei_guess":"x"}"#;
        assert!(serde_json::from_str::<InteractionEvent>(extra).is_err());
    }

    #[test]
    fn test_deserialize_null_timestamp() {
        let json = r#"{"subject":"a","counterpart":"b","timestamp":null,"direction":"incoming"}"#;
        let event: InteractionEvent = serde_json::from_str(json).unwrap();
        assert!(event.timestamp.is_none());
        assert_eq!(event.direction_or_default(), Direction::Incoming);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    proptest! {
        /// Property: summable measure is never negative and never NaN
        #[test]
        fn test_measure_or_zero_is_summable(m in proptest::num::f64::ANY) {
            let at = Utc.timestamp_opt(0, 0).unwrap();
            let event = InteractionEvent::new("a", "b", at).with_measure(m);
            let v = event.measure_or_zero();
            prop_assert!(v.is_finite());
            prop_assert!(v >= 0.0);
        }

        /// Property: flipping direction reverses endpoints but keeps the pair
        #[test]
        fn test_direction_flip(a in "[0-9]{4,11}", b in "[0-9]{4,11}") {
            let at = Utc.timestamp_opt(0, 0).unwrap();
            let out = InteractionEvent::new(a.clone(), b.clone(), at);
            let inc = out.clone().with_direction(Direction::Incoming);

            let (s1, t1) = out.endpoints().unwrap();
            let (s2, t2) = inc.endpoints().unwrap();
            prop_assert_eq!((s1, t1), (t2, s2));
            prop_assert_eq!(out.pair(), inc.pair());
        }
    }
}
