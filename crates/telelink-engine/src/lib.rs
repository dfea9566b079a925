//! Telelink Engine
//!
//! Temporal aggregation and linkage over interaction records.
//!
//! # Overview
//!
//! Every engine is a pure, synchronous function over an in-memory slice of
//! [`InteractionEvent`]s:
//! - **Gap segmentation**: interaction chains between two parties
//! - **Change points**: how a keyed attribute (device ↔ SIM) evolved over time
//! - **Dominant locations**: where a subject is usually seen, and who they
//!   kept or gained as contacts after moving
//! - **Link aggregation**: directed weighted graph of who interacts with whom
//!
//! Results borrow from the input where they point at events, so the input
//! slice must outlive them. Records without the field an engine needs are
//! dropped and counted, never treated as errors; too little data is reported
//! as [`Analysis::InsufficientData`].
//!
//! # Usage
//!
//! ```
//! use telelink_engine::{segment_all, EngineConfig, LinkGraph, frequent_contacts};
//! use telelink_domain::InteractionEvent;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
//! let events = vec![
//!     InteractionEvent::new("A", "B", t0),
//!     InteractionEvent::new("B", "A", t0 + Duration::minutes(10)),
//!     InteractionEvent::new("A", "B", t0 + Duration::hours(5)),
//! ];
//!
//! let config = EngineConfig::default();
//! let chains = segment_all(&events, &config)?;
//! assert_eq!(chains.values().map(Vec::len).sum::<usize>(), 1);
//!
//! let graph = LinkGraph::build(&events);
//! let frequent = frequent_contacts(&graph, config.frequent_contact_min_interactions);
//! assert_eq!(frequent[0].link.count, 3);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! The engines share one configuration, loadable from TOML:
//!
//! ```toml
//! [engine]
//! max_gap_secs = 3600
//! min_chain_length = 2
//! top_n_home_locations = 3
//! frequent_contact_min_interactions = 2
//! relocation_min_events = 2
//! ```

#![warn(missing_docs)]

mod change_point;
mod config;
mod error;
pub mod grouping;
mod links;
mod location;
mod segmentation;

pub use change_point::{
    attribute_holders, attribute_runs, change_points, change_points_by, change_points_by_subject,
    companion_usage, AttributeRun, ChangePoint, CompanionUsage,
};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use grouping::{top_k, RankBy, Ranked, Tally, TieBreak};
pub use links::{
    frequent_contacts, top_contacts, Contact, DirectedLink, LinkGraph, LinkSummary, NodeSummary,
    PairSummary,
};
pub use location::{
    detect_relocation, dominant_locations, relocation_diff, LocationRank, RelocationDiff,
};
pub use segmentation::{
    chain_candidates, segment_all, segment_pair, Chain, ChainEntry, ChainStats,
};

pub use telelink_domain::{Analysis, InteractionEvent};
