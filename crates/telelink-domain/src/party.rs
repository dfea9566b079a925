//! Party pair module - unordered keys for dyadic analysis

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unordered pair of party identifiers
///
/// The two ids are stored in lexicographic order, so `(a, b)` and `(b, a)`
/// produce the same key. Chains and pair summaries are keyed on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyPair {
    first: String,
    second: String,
}

impl PartyPair {
    /// Create a pair from two identifiers in any order
    ///
    /// # Examples
    ///
    /// ```
    /// use telelink_domain::PartyPair;
    ///
    /// assert_eq!(PartyPair::new("b", "a"), PartyPair::new("a", "b"));
    /// assert_eq!(PartyPair::new("b", "a").first(), "a");
    /// ```
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The lexicographically smaller party
    pub fn first(&self) -> &str {
        &self.first
    }

    /// The lexicographically larger party
    pub fn second(&self) -> &str {
        &self.second
    }

    /// The party opposite `party`, if `party` belongs to the pair
    pub fn other(&self, party: &str) -> Option<&str> {
        if self.first == party {
            Some(&self.second)
        } else if self.second == party {
            Some(&self.first)
        } else {
            None
        }
    }
}

impl fmt::Display for PartyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: argument order never changes the key
        #[test]
        fn test_pair_symmetry(a in "[a-z0-9]{1,12}", b in "[a-z0-9]{1,12}") {
            let ab = PartyPair::new(a.clone(), b.clone());
            let ba = PartyPair::new(b.clone(), a.clone());
            prop_assert_eq!(&ab, &ba);
            prop_assert!(ab.first() <= ab.second());
            prop_assert_eq!(ab.other(&a), Some(b.as_str()));
        }
    }
}
