//! Zone data types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coord::{ensure_finite, GeoPoint};
use crate::error::{GeofenceError, Result};

/// Activation status of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    /// Defined but its window has not been entered yet.
    Created,
    /// Inside its activation window; intrusions are evaluated.
    Active,
    /// Past its window; membership has been cleared.
    Expired,
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneStatus::Created => write!(f, "created"),
            ZoneStatus::Active => write!(f, "active"),
            ZoneStatus::Expired => write!(f, "expired"),
        }
    }
}

/// Request to create a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    #[serde(alias = "ID")]
    pub id: String,
    #[serde(default)]
    pub start_time: f64,
    pub end_time: f64,
    #[serde(alias = "center_lat")]
    pub center_latitude: f64,
    #[serde(alias = "center_lon")]
    pub center_longitude: f64,
    /// Radius in meters.
    pub radius: f64,
}

impl ZoneDefinition {
    pub fn new(
        id: impl Into<String>,
        window: (f64, f64),
        center: GeoPoint,
        radius: f64,
    ) -> Self {
        Self {
            id: id.into(),
            start_time: window.0,
            end_time: window.1,
            center_latitude: center.latitude,
            center_longitude: center.longitude,
            radius,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.center_latitude, self.center_longitude)
    }

    /// Reject empty identifiers, bad centers, negative radii and inverted
    /// windows.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(GeofenceError::InvalidInput(
                "zone definition has an empty identifier".to_string(),
            ));
        }
        self.center().validate()?;
        ensure_finite("radius", self.radius)?;
        ensure_finite("start_time", self.start_time)?;
        ensure_finite("end_time", self.end_time)?;
        if self.radius < 0.0 {
            return Err(GeofenceError::InvalidInput(format!(
                "zone {} has negative radius {}",
                self.id, self.radius
            )));
        }
        if self.start_time > self.end_time {
            return Err(GeofenceError::InvalidInput(format!(
                "zone {} window starts at {} after it ends at {}",
                self.id, self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

/// A notification zone and its current occupants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    id: String,
    start_time: f64,
    end_time: f64,
    center: GeoPoint,
    radius: f64,
    status: ZoneStatus,
    members: BTreeSet<String>,
}

impl Zone {
    /// Build a zone in `Created` state with no members.
    pub(crate) fn from_definition(def: &ZoneDefinition) -> Self {
        Self {
            id: def.id.clone(),
            start_time: def.start_time,
            end_time: def.end_time,
            center: def.center(),
            radius: def.radius,
            status: ZoneStatus::Created,
            members: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn status(&self) -> ZoneStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ZoneStatus::Active
    }

    /// Whether `now` lies inside the closed activation window.
    pub fn window_contains(&self, now: f64) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    /// Identifiers of tracks currently inside, in sorted order.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.members.contains(track_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(super) fn set_status(&mut self, status: ZoneStatus) {
        self.status = status;
    }

    /// Add a member. Returns `true` if it was not already present.
    pub(crate) fn insert_member(&mut self, track_id: &str) -> bool {
        self.members.insert(track_id.to_string())
    }

    /// Remove a member. Returns `true` if it was present.
    pub(crate) fn remove_member(&mut self, track_id: &str) -> bool {
        self.members.remove(track_id)
    }

    /// Drop every member, returning the removed identifiers.
    pub(crate) fn clear_members(&mut self) -> Vec<String> {
        std::mem::take(&mut self.members).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def() -> ZoneDefinition {
        ZoneDefinition::new("Z1", (0.0, 3600.0), GeoPoint::new(0.0, 0.0), 1000.0)
    }

    mod zone_definition {
        use super::*;

        #[test]
        fn test_valid_definition() {
            assert!(def().validate().is_ok());
        }

        #[test]
        fn test_negative_radius_rejected() {
            let mut d = def();
            d.radius = -1.0;
            assert!(matches!(d.validate(), Err(GeofenceError::InvalidInput(_))));
        }

        #[test]
        fn test_deserialize_short_keys() {
            let json = r#"{"ID": "gvasend", "start_time": 0, "end_time": 7200,
                "center_lat": 38.9, "center_lon": -77.0, "radius": 5000}"#;
            let d: ZoneDefinition = serde_json::from_str(json).unwrap();
            assert_eq!(d.id, "gvasend");
            assert_eq!(d.center(), GeoPoint::new(38.9, -77.0));
        }

        #[test]
        fn test_zero_radius_allowed() {
            let mut d = def();
            d.radius = 0.0;
            assert!(d.validate().is_ok());
        }

        #[test]
        fn test_inverted_window_rejected() {
            let mut d = def();
            d.start_time = 10.0;
            d.end_time = 5.0;
            assert!(matches!(d.validate(), Err(GeofenceError::InvalidInput(_))));
        }

        #[test]
        fn test_bad_center_rejected() {
            let mut d = def();
            d.center_latitude = 123.0;
            assert!(matches!(d.validate(), Err(GeofenceError::InvalidInput(_))));
        }

        #[test]
        fn test_deserialize_defaults_start_time() {
            let json = r#"{"id":"Z","end_time":60,"center_latitude":1,"center_longitude":2,"radius":5}"#;
            let d: ZoneDefinition = serde_json::from_str(json).unwrap();
            assert_eq!(d.start_time, 0.0);
            assert_eq!(d.center(), GeoPoint::new(1.0, 2.0));
        }
    }

    mod zone {
        use super::*;

        #[test]
        fn test_new_zone_is_created_and_empty() {
            let z = Zone::from_definition(&def());
            assert_eq!(z.status(), ZoneStatus::Created);
            assert_eq!(z.member_count(), 0);
            assert_eq!(z.radius(), 1000.0);
        }

        #[test]
        fn test_window_is_closed_interval() {
            let z = Zone::from_definition(&def());
            assert!(z.window_contains(0.0));
            assert!(z.window_contains(3600.0));
            assert!(!z.window_contains(-0.1));
            assert!(!z.window_contains(3600.1));
        }

        #[test]
        fn test_membership_mutators() {
            let mut z = Zone::from_definition(&def());
            assert!(z.insert_member("T2"));
            assert!(z.insert_member("T1"));
            assert!(!z.insert_member("T1"));
            assert_eq!(z.members().collect::<Vec<_>>(), vec!["T1", "T2"]);

            assert!(z.remove_member("T2"));
            assert!(!z.remove_member("T2"));

            assert_eq!(z.clear_members(), vec!["T1".to_string()]);
            assert_eq!(z.member_count(), 0);
        }
    }
}
