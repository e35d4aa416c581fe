//! Scenario simulation.
//!
//! Generates synthetic UAV traffic over a survey area and feeds it into a
//! running [`SweepScheduler`](crate::scheduler::SweepScheduler), so the
//! geofence engine can be exercised without a live feed.
//!
//! - [`Scenario`]: JSON description of the area, UAV models and zones.
//! - [`UavGenerator`]: seeded random launch schedule.
//! - [`SimulatedUav`]: dead-reckoned kinematics for one UAV.
//! - [`SimulationRunner`]: paces the traffic against a [`Clock`](crate::clock::Clock).

mod generator;
mod runner;
mod scenario;
mod uav;

pub use generator::{Launch, UavGenerator};
pub use runner::{SimulationRunner, SimulationSummary, SIM_PACE_DELAY, UAV_UPDATE_INTERVAL_SECS};
pub use scenario::{Scenario, UavModel};
pub use uav::{SimulatedUav, DEFAULT_CLIMB_RATE};

use std::path::PathBuf;

use thiserror::Error;

use crate::error::GeofenceError;

/// Errors loading or running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Geofence(#[from] GeofenceError),
}
