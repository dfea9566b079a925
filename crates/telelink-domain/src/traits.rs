//! Trait definitions for external interactions
//!
//! Engines take plain slices of events; the collaborators that produce those
//! events live outside the core and implement these traits.

use crate::InteractionEvent;

/// Supplies already-normalized events
///
/// Implemented by ingestion front ends (file loaders, fixtures). Header
/// detection, date parsing and column mapping happen behind this trait.
pub trait EventSource {
    /// Error type for loading
    type Error;

    /// Load the complete, finite batch of events
    fn load_events(&self) -> Result<Vec<InteractionEvent>, Self::Error>;
}

