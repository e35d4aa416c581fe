//! Alert event types.

use std::fmt;

use serde::Serialize;

use crate::error::GeofenceError;
use crate::track::AircraftClass;

/// Delivery channel for an alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Catch-all channel.
    General,
    /// Channel scoped to one zone identifier.
    Zone(String),
}

impl Topic {
    pub fn zone(id: impl Into<String>) -> Self {
        Topic::Zone(id.into())
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::General => write!(f, "alert"),
            Topic::Zone(id) => write!(f, "alert.{}", id),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Entered,
    Departed,
    Stale,
    ZoneActivated,
    ZoneExpired,
    ZoneCreated,
    ZoneDeleted,
    ZoneCreateFailed,
    ZoneDeleteFailed,
    TrackRejected,
}

impl AlertKind {
    /// Failures reported to operators rather than zone subscribers.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AlertKind::ZoneCreateFailed | AlertKind::ZoneDeleteFailed | AlertKind::TrackRejected
        )
    }
}

/// A single alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub zone_id: Option<String>,
    pub track_id: Option<String>,
    pub message: String,
    /// Host clock time, in seconds.
    pub time: f64,
}

impl AlertEvent {
    pub fn entered(zone_id: &str, track_id: &str, class: AircraftClass, time: f64) -> Self {
        Self::crossing(AlertKind::Entered, "entered", zone_id, track_id, class, time)
    }

    pub fn departed(zone_id: &str, track_id: &str, class: AircraftClass, time: f64) -> Self {
        Self::crossing(AlertKind::Departed, "departed", zone_id, track_id, class, time)
    }

    fn crossing(
        kind: AlertKind,
        verb: &str,
        zone_id: &str,
        track_id: &str,
        class: AircraftClass,
        time: f64,
    ) -> Self {
        Self {
            kind,
            zone_id: Some(zone_id.to_string()),
            track_id: Some(track_id.to_string()),
            message: format!(
                "A {} ({}) has {} notification zone: {}",
                class, track_id, verb, zone_id
            ),
            time,
        }
    }

    pub fn stale(track_id: &str, time: f64) -> Self {
        Self {
            kind: AlertKind::Stale,
            zone_id: None,
            track_id: Some(track_id.to_string()),
            message: format!("Track {} is stale, marked inactive", track_id),
            time,
        }
    }

    pub fn zone_activated(zone_id: &str, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneActivated,
            zone_id,
            format!("Zone {} is now active", zone_id),
            time,
        )
    }

    pub fn zone_expired(zone_id: &str, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneExpired,
            zone_id,
            format!("Zone {} has expired", zone_id),
            time,
        )
    }

    pub fn zone_created(zone_id: &str, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneCreated,
            zone_id,
            format!("Created notification zone: {}", zone_id),
            time,
        )
    }

    pub fn zone_deleted(zone_id: &str, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneDeleted,
            zone_id,
            format!("Deleted notification zone: {}", zone_id),
            time,
        )
    }

    pub fn zone_create_failed(zone_id: &str, error: &GeofenceError, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneCreateFailed,
            zone_id,
            format!("Failed to create notification zone {}: {}", zone_id, error),
            time,
        )
    }

    pub fn zone_delete_failed(zone_id: &str, error: &GeofenceError, time: f64) -> Self {
        Self::zone(
            AlertKind::ZoneDeleteFailed,
            zone_id,
            format!("Failed to delete notification zone {}: {}", zone_id, error),
            time,
        )
    }

    pub fn track_rejected(track_id: &str, error: &GeofenceError, time: f64) -> Self {
        Self {
            kind: AlertKind::TrackRejected,
            zone_id: None,
            track_id: (!track_id.is_empty()).then(|| track_id.to_string()),
            message: format!("Rejected track update '{}': {}", track_id, error),
            time,
        }
    }

    fn zone(kind: AlertKind, zone_id: &str, message: String, time: f64) -> Self {
        Self {
            kind,
            zone_id: Some(zone_id.to_string()),
            track_id: None,
            message,
            time,
        }
    }

    /// Channel this alert is published on.
    ///
    /// Zone-scoped alerts go to the zone's channel (and thereby to general
    /// subscribers too). Failures and stale tracks go to the general channel
    /// only.
    pub fn topic(&self) -> Topic {
        match &self.zone_id {
            Some(id) if !self.kind.is_failure() => Topic::Zone(id.clone()),
            _ => Topic::General,
        }
    }
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[t={:.1}] {}", self.time, self.message)
    }
}
