//! Span helpers - serialize `chrono::Duration` as whole seconds
//!
//! chrono ships no serde support for durations. Derived entities expose spans
//! and gaps as seconds so downstream tables and charts need no conversion.

use chrono::Duration;
use serde::Serializer;

/// Serialize a duration as signed whole seconds
///
/// Use with `#[serde(serialize_with = "telelink_domain::span::as_secs")]`.
pub fn as_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

/// Serialize an optional duration as signed whole seconds or null
pub fn as_opt_secs<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => s.serialize_some(&d.num_seconds()),
        None => s.serialize_none(),
    }
}
