//! Airfence - geofence intrusion detection for aircraft tracks
//!
//! This library maintains a set of circular, time-windowed notification
//! zones and a set of moving aircraft tracks, and emits typed alerts when a
//! track enters or leaves a zone, when a zone activates or expires, and when
//! a track goes stale.
//!
//! The core ([`engine`], [`zone`], [`track`], [`intrusion`], [`reaper`],
//! [`alert`]) is synchronous and never reads a clock or touches the network.
//! [`scheduler`] drives it from a single tokio task; [`sim`] and [`feed`]
//! supply traffic.

pub mod alert;
pub mod clock;
pub mod config;
pub mod coord;
pub mod engine;
pub mod error;
pub mod feed;
pub mod intrusion;
pub mod reaper;
pub mod scheduler;
pub mod sim;
pub mod track;
pub mod zone;

pub use alert::{AlertDispatcher, AlertEvent, AlertKind, AlertSink, Topic};
pub use engine::{EngineConfig, GeofenceEngine};
pub use error::{GeofenceError, Result};
pub use scheduler::{SchedulerConfig, SchedulerHandle, SweepScheduler};
pub use track::{AircraftClass, TrackUpdate};
pub use zone::ZoneDefinition;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_not_empty() {
        assert!(!VERSION.is_empty());
    }
}
