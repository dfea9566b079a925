//! Analysis outcome module
//!
//! Not having enough data is an expected state for forensic datasets, so it is
//! a value here rather than an error.

use serde::Serialize;

/// Result of an analysis that may lack the data it needs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Analysis<T> {
    /// The analysis produced a result
    Computed(T),

    /// Too few usable events to produce a meaningful result
    InsufficientData {
        /// What was missing, for display
        reason: String,
    },
}

impl<T> Analysis<T> {
    /// Build an insufficient-data outcome
    pub fn insufficient(reason: impl Into<String>) -> Self {
        Analysis::InsufficientData {
            reason: reason.into(),
        }
    }

    /// Whether a result was computed
    pub fn is_computed(&self) -> bool {
        matches!(self, Analysis::Computed(_))
    }

    /// The computed value, if any
    pub fn computed(self) -> Option<T> {
        match self {
            Analysis::Computed(v) => Some(v),
            Analysis::InsufficientData { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computed_accessors() {
        let a = Analysis::Computed(3);
        assert!(a.is_computed());
        assert_eq!(a.computed(), Some(3));
    }

    #[test]
    fn test_insufficient_has_no_value() {
        let a: Analysis<i32> = Analysis::insufficient("fewer than 2 location events");
        assert!(!a.is_computed());
        assert_eq!(a.clone().computed(), None);
        assert_eq!(
            a,
            Analysis::InsufficientData {
                reason: "fewer than 2 location events".to_string()
            }
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Analysis::<u8>::insufficient("none")).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["result"]["reason"], "none");
    }
}
