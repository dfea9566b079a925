//! Error types for engine operations

use thiserror::Error;

/// Errors that can occur when invoking an engine
///
/// Only caller mistakes are errors. Malformed records are dropped and counted,
/// and too-little-data is reported through `Analysis::InsufficientData`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A configuration value is out of range
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration text could not be parsed or rendered
    #[error("Configuration error: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(e: toml::ser::Error) -> Self {
        EngineError::Toml(e.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
