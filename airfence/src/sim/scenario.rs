//! Scenario description.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ScenarioError;
use crate::coord::GeoPoint;
use crate::feed::AdsbArea;
use crate::zone::ZoneDefinition;

/// Performance envelope of one UAV model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UavModel {
    /// Maximum ground speed, km/h.
    pub max_speed: f64,
    /// Maximum endurance, minutes.
    pub endurance: f64,
}

/// A complete simulation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Simulated seconds to run for.
    #[serde(alias = "scenario_duration")]
    pub duration: f64,
    pub lower_left_lat: f64,
    pub lower_left_lon: f64,
    pub upper_right_lat: f64,
    pub upper_right_lon: f64,
    /// Standard deviation of launch positions around the area centre, degrees.
    pub loc_std_dev: f64,
    #[serde(default)]
    pub start_number_uav: usize,
    /// Seconds between consecutive launches.
    #[serde(default)]
    pub average_uav_arrival_time: f64,
    #[serde(default)]
    pub uav_models: BTreeMap<String, UavModel>,
    #[serde(default, alias = "notification_zones")]
    pub zones: Vec<ZoneDefinition>,
    /// RNG seed. Runs with the same seed generate the same traffic.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub adsb: Option<AdsbArea>,
}

impl Scenario {
    /// Read and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a scenario from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.lower_left_lat > self.upper_right_lat || self.lower_left_lon > self.upper_right_lon
        {
            return Err(ScenarioError::Invalid(
                "lower-left corner must be south-west of upper-right corner".to_string(),
            ));
        }
        for corner in [
            GeoPoint::new(self.lower_left_lat, self.lower_left_lon),
            GeoPoint::new(self.upper_right_lat, self.upper_right_lon),
        ] {
            corner
                .validate()
                .map_err(|e| ScenarioError::Invalid(e.to_string()))?;
        }
        if !(self.loc_std_dev.is_finite() && self.loc_std_dev >= 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "loc_std_dev must be non-negative, got {}",
                self.loc_std_dev
            )));
        }
        if self.average_uav_arrival_time < 0.0 || !self.average_uav_arrival_time.is_finite() {
            return Err(ScenarioError::Invalid(
                "average_uav_arrival_time must be non-negative".to_string(),
            ));
        }
        if self.start_number_uav > 0 && self.uav_models.is_empty() {
            return Err(ScenarioError::Invalid(
                "uav_models must not be empty when start_number_uav > 0".to_string(),
            ));
        }
        for (name, model) in &self.uav_models {
            if !(model.max_speed.is_finite() && model.endurance.is_finite())
                || model.max_speed <= 0.0
                || model.endurance <= 0.0
            {
                return Err(ScenarioError::Invalid(format!(
                    "uav model '{}' needs positive max_speed and endurance",
                    name
                )));
            }
        }
        for zone in &self.zones {
            zone.validate()?;
        }
        Ok(())
    }

    /// Centre of the survey area.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.lower_left_lat + self.upper_right_lat) / 2.0,
            (self.lower_left_lon + self.upper_right_lon) / 2.0,
        )
    }
}
