//! Engine configuration.

use std::collections::HashSet;
use std::time::Duration;

use crate::reaper::DEFAULT_TRACK_TIMEOUT_SECS;
use crate::track::AircraftClass;

/// Classes that produce entry alerts by default.
pub const DEFAULT_NOTIFY_CLASSES: [AircraftClass; 2] =
    [AircraftClass::Uav, AircraftClass::MannedAc];

/// Configuration for [`GeofenceEngine`](super::GeofenceEngine).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Time without updates after which a track is evicted.
    pub track_timeout: Duration,

    /// Classes whose entry into a zone is reported.
    pub notify_classes: HashSet<AircraftClass>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            track_timeout: Duration::from_secs(DEFAULT_TRACK_TIMEOUT_SECS),
            notify_classes: DEFAULT_NOTIFY_CLASSES.into_iter().collect(),
        }
    }
}

impl EngineConfig {
    /// Set the stale-track timeout.
    pub fn with_track_timeout(mut self, timeout: Duration) -> Self {
        self.track_timeout = timeout;
        self
    }

    /// Replace the notify-eligible class set.
    pub fn with_notify_classes(
        mut self,
        classes: impl IntoIterator<Item = AircraftClass>,
    ) -> Self {
        self.notify_classes = classes.into_iter().collect();
        self
    }

    /// Track timeout in seconds, on the same timeline as `now`.
    pub fn track_timeout_secs(&self) -> f64 {
        self.track_timeout.as_secs_f64()
    }
}
