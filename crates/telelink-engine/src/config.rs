//! Configuration for engine queries
//!
//! Defines the gap threshold, chain filter and ranking cutoffs.

use crate::{EngineError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration shared by every engine
///
/// # Examples
///
/// ```
/// use telelink_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.max_gap_secs, 3600);
/// assert_eq!(config.min_chain_length, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Longest silence (seconds) allowed inside one chain, inclusive
    /// Default: 3600 (60 minutes)
    #[serde(default = "default_max_gap_secs")]
    pub max_gap_secs: i64,

    /// Chains with fewer events are discarded
    /// Default: 2
    #[serde(default = "default_min_chain_length")]
    pub min_chain_length: usize,

    /// How many dominant locations count as "home"
    /// Default: 3
    #[serde(default = "default_top_n_home_locations")]
    pub top_n_home_locations: usize,

    /// Pairs below this many interactions are not frequent contacts
    /// Default: 2
    #[serde(default = "default_frequent_contact_min_interactions")]
    pub frequent_contact_min_interactions: usize,

    /// Events a new location needs from its first sighting on to count as a
    /// sustained relocation
    /// Default: 2
    #[serde(default = "default_relocation_min_events")]
    pub relocation_min_events: usize,
}

fn default_max_gap_secs() -> i64 {
    3600
}

fn default_min_chain_length() -> usize {
    2
}

fn default_top_n_home_locations() -> usize {
    3
}

fn default_frequent_contact_min_interactions() -> usize {
    2
}

fn default_relocation_min_events() -> usize {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_gap_secs: default_max_gap_secs(),
            min_chain_length: default_min_chain_length(),
            top_n_home_locations: default_top_n_home_locations(),
            frequent_contact_min_interactions: default_frequent_contact_min_interactions(),
            relocation_min_events: default_relocation_min_events(),
        }
    }
}

/// Wrapper matching the `[engine]` table of a config file
#[derive(Debug, Default, Deserialize, Serialize)]
struct EngineSection {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    /// Get the gap threshold as a Duration
    ///
    /// Saturates at the largest representable Duration; `validate()` rejects
    /// such values.
    pub fn max_gap(&self) -> Duration {
        Duration::try_seconds(self.max_gap_secs).unwrap_or_else(Duration::max_value)
    }

    /// Set the gap threshold in minutes
    pub fn with_max_gap_minutes(mut self, minutes: i64) -> Self {
        self.max_gap_secs = minutes.saturating_mul(60);
        self
    }

    /// Validate the configuration
    ///
    /// Every engine entry point calls this before touching the events.
    pub fn validate(&self) -> Result<()> {
        if self.max_gap_secs <= 0 {
            return Err(EngineError::InvalidConfig {
                field: "max_gap_secs",
                reason: format!("must be greater than 0, got {}", self.max_gap_secs),
            });
        }
        if Duration::try_seconds(self.max_gap_secs).is_none() {
            return Err(EngineError::InvalidConfig {
                field: "max_gap_secs",
                reason: format!("{} seconds is out of range", self.max_gap_secs),
            });
        }
        if self.min_chain_length == 0 {
            return Err(EngineError::InvalidConfig {
                field: "min_chain_length",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.top_n_home_locations == 0 {
            return Err(EngineError::InvalidConfig {
                field: "top_n_home_locations",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.relocation_min_events == 0 {
            return Err(EngineError::InvalidConfig {
                field: "relocation_min_events",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Load configuration from the `[engine]` table of a TOML document
    ///
    /// Missing keys fall back to their defaults. The result is validated.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let section: EngineSection = toml::from_str(toml_str)?;
        section.engine.validate()?;
        Ok(section.engine)
    }

    /// Serialize configuration as an `[engine]` TOML table
    pub fn to_toml(&self) -> Result<String> {
        let section = EngineSection {
            engine: self.clone(),
        };
        Ok(toml::to_string_pretty(&section)?)
    }
}
