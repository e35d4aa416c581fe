//! Track data types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::{ensure_finite, GeoPoint};
use crate::error::{GeofenceError, Result};

/// Class of aircraft reported by a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftClass {
    /// Unmanned aerial vehicle.
    Uav,
    /// Crewed aircraft, typically from an ADS-B feed.
    MannedAc,
    /// Class not reported.
    #[default]
    Unknown,
}

impl AircraftClass {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AircraftClass::Uav => "uav",
            AircraftClass::MannedAc => "manned_ac",
            AircraftClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AircraftClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AircraftClass {
    type Err = GeofenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "uav" => Ok(AircraftClass::Uav),
            "manned_ac" => Ok(AircraftClass::MannedAc),
            "unknown" => Ok(AircraftClass::Unknown),
            other => Err(GeofenceError::InvalidInput(format!(
                "unknown aircraft class '{}'",
                other
            ))),
        }
    }
}

/// Whether a track is still being refreshed by its feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackStatus {
    Active,
    Inactive,
}

/// Velocity vector of a track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// Heading in degrees from true north.
    pub heading: f64,
    /// Ground speed in the feed's units.
    pub speed: f64,
    /// Climb rate, positive up.
    pub climb_rate: f64,
}

/// Position of the ground control station.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlStation {
    pub position: GeoPoint,
    pub altitude: f64,
}

/// Inbound position report for one aircraft.
///
/// Field set follows the Remote ID broadcast: identity, position, velocity,
/// control station location and a time mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackUpdate {
    pub id: String,
    #[serde(default)]
    pub class: AircraftClass,
    pub latitude: f64,
    pub longitude: f64,
    /// Above-ground-level altitude in meters.
    pub agl_altitude: f64,
    #[serde(default)]
    pub heading: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub climb_rate: f64,
    #[serde(default)]
    pub control_latitude: f64,
    #[serde(default)]
    pub control_longitude: f64,
    #[serde(default)]
    pub control_altitude: f64,
    /// Host clock time of the report, in seconds.
    pub event_time: f64,
}

impl TrackUpdate {
    /// Create an update with position and time; everything else zeroed.
    pub fn new(
        id: impl Into<String>,
        class: AircraftClass,
        position: GeoPoint,
        agl_altitude: f64,
        event_time: f64,
    ) -> Self {
        Self {
            id: id.into(),
            class,
            latitude: position.latitude,
            longitude: position.longitude,
            agl_altitude,
            heading: 0.0,
            speed: 0.0,
            climb_rate: 0.0,
            control_latitude: 0.0,
            control_longitude: 0.0,
            control_altitude: 0.0,
            event_time,
        }
    }

    /// Set the velocity vector.
    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.heading = velocity.heading;
        self.speed = velocity.speed;
        self.climb_rate = velocity.climb_rate;
        self
    }

    /// Set the control station location.
    pub fn with_control_station(mut self, station: ControlStation) -> Self {
        self.control_latitude = station.position.latitude;
        self.control_longitude = station.position.longitude;
        self.control_altitude = station.altitude;
        self
    }

    /// Reported position.
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Reject updates with a missing identifier or non-finite fields.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(GeofenceError::InvalidInput(
                "track update has an empty identifier".to_string(),
            ));
        }
        self.position().validate()?;
        ensure_finite("agl_altitude", self.agl_altitude)?;
        ensure_finite("event_time", self.event_time)?;
        ensure_finite("heading", self.heading)?;
        ensure_finite("speed", self.speed)?;
        ensure_finite("climb_rate", self.climb_rate)?;
        ensure_finite("control_latitude", self.control_latitude)?;
        ensure_finite("control_longitude", self.control_longitude)?;
        ensure_finite("control_altitude", self.control_altitude)?;
        Ok(())
    }
}

/// Latest known state of one aircraft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub class: AircraftClass,
    pub position: GeoPoint,
    /// Above-ground-level altitude in meters.
    pub agl_altitude: f64,
    pub velocity: Velocity,
    pub control_station: ControlStation,
    /// Host clock time of the most recent update, in seconds.
    pub last_update: f64,
    pub status: TrackStatus,
}

impl Track {
    /// Build an active track from a validated update.
    pub(crate) fn from_update(update: &TrackUpdate) -> Self {
        let mut track = Self {
            id: update.id.clone(),
            class: update.class,
            position: GeoPoint::default(),
            agl_altitude: 0.0,
            velocity: Velocity::default(),
            control_station: ControlStation::default(),
            last_update: update.event_time,
            status: TrackStatus::Active,
        };
        track.apply(update);
        track
    }

    /// Overwrite every positional field and reactivate the track.
    pub(crate) fn apply(&mut self, update: &TrackUpdate) {
        self.class = update.class;
        self.position = update.position();
        self.agl_altitude = update.agl_altitude;
        self.velocity = Velocity {
            heading: update.heading,
            speed: update.speed,
            climb_rate: update.climb_rate,
        };
        self.control_station = ControlStation {
            position: GeoPoint::new(update.control_latitude, update.control_longitude),
            altitude: update.control_altitude,
        };
        self.last_update = update.event_time;
        self.status = TrackStatus::Active;
    }

    pub fn is_active(&self) -> bool {
        self.status == TrackStatus::Active
    }

    /// Seconds since the last update at `now`.
    pub fn age(&self, now: f64) -> f64 {
        now - self.last_update
    }
}
