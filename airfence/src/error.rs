//! Error types for the geofence core.
//!
//! Every failure path in the core is typed. `NotFound`, `DuplicateId` and
//! `InvalidInput` are returned to the caller of the mutating operation and
//! are also published as alerts on the general channel. `SinkFailure` never
//! leaves the alert dispatcher; it only appears inside a
//! [`DeliveryReport`](crate::alert::DeliveryReport).

use std::fmt;

use thiserror::Error;

use crate::coord::CoordError;

/// Kind of entity referenced by a [`GeofenceError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A notification zone.
    Zone,
    /// An aircraft track.
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Zone => write!(f, "zone"),
            EntityKind::Track => write!(f, "track"),
        }
    }
}

/// Errors produced by the geofence core.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeofenceError {
    /// Lookup or delete of an unknown zone or track.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Zone creation with an identifier that is already in use.
    #[error("duplicate zone id: {0}")]
    DuplicateId(String),

    /// Malformed track update or zone definition.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A registered alert sink failed to accept an event.
    #[error("alert sink '{sink}' failed: {reason}")]
    SinkFailure { sink: String, reason: String },

    /// The sweep scheduler has shut down and no longer accepts commands.
    #[error("sweep scheduler is not running")]
    SchedulerStopped,
}

impl GeofenceError {
    /// Shorthand for a missing zone.
    pub fn zone_not_found(id: impl Into<String>) -> Self {
        GeofenceError::NotFound {
            kind: EntityKind::Zone,
            id: id.into(),
        }
    }

    /// Shorthand for a missing track.
    pub fn track_not_found(id: impl Into<String>) -> Self {
        GeofenceError::NotFound {
            kind: EntityKind::Track,
            id: id.into(),
        }
    }
}

impl From<CoordError> for GeofenceError {
    fn from(e: CoordError) -> Self {
        GeofenceError::InvalidInput(e.to_string())
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, GeofenceError>;
