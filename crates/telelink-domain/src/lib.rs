//! Telelink Domain Layer
//!
//! This crate defines the canonical shape of interaction records and the
//! small value types every Telelink engine shares. It holds no algorithms;
//! the engines in `telelink-engine` are pure functions over these types.
//!
//! ## Key Concepts
//!
//! - **InteractionEvent**: one record, "subject acted toward counterpart at time T"
//! - **Direction**: orientation of the record relative to its subject
//! - **PartyPair**: unordered key for everything computed between two parties
//! - **Analysis**: tagged outcome distinguishing results from insufficient data
//!
//! ## Dependencies
//!
//! Only `chrono` (timestamps) and `serde` (the ingestion and presentation
//! boundary). No I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod outcome;
pub mod party;
pub mod span;
pub mod traits;

// Re-exports for convenience
pub use event::{Direction, InteractionEvent};
pub use outcome::Analysis;
pub use party::PartyPair;
pub use traits::EventSource;
