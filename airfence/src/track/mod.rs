//! Aircraft tracks.
//!
//! A track is the latest known state of one aircraft, keyed by its
//! identifier. Tracks are overwritten in place on every inbound update and
//! are never removed; the stale track reaper only marks them inactive so
//! their history stays available for inspection.

mod model;
mod store;

pub use model::{AircraftClass, ControlStation, Track, TrackStatus, TrackUpdate, Velocity};
pub use store::TrackStore;
