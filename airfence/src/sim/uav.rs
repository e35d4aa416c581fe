//! Kinematics of one simulated UAV.

use crate::coord::{destination, GeoPoint};
use crate::track::{AircraftClass, ControlStation, TrackUpdate, Velocity};

/// Climb rate given to generated UAVs, m/s. Ten meters per update interval.
pub const DEFAULT_CLIMB_RATE: f64 = 10.0 / super::UAV_UPDATE_INTERVAL_SECS;

/// A UAV flying a constant heading until its endurance runs out.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedUav {
    pub id: String,
    pub model: String,
    pub position: GeoPoint,
    /// Above-ground-level altitude, meters.
    pub agl_altitude: f64,
    /// Degrees from true north.
    pub heading: f64,
    /// Ground speed, km/h.
    pub speed: f64,
    /// Meters per second, positive up.
    pub climb_rate: f64,
    /// Remaining endurance, minutes.
    pub endurance: f64,
    /// Launch point, reported as the control station.
    pub control_station: ControlStation,
    landed: bool,
}

impl SimulatedUav {
    /// Create a UAV at its launch point. The control station is the launch
    /// position.
    pub fn launch(
        id: impl Into<String>,
        model: impl Into<String>,
        position: GeoPoint,
        agl_altitude: f64,
        heading: f64,
        speed: f64,
        endurance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            position,
            agl_altitude,
            heading,
            speed,
            climb_rate: DEFAULT_CLIMB_RATE,
            endurance,
            control_station: ControlStation {
                position,
                altitude: agl_altitude,
            },
            landed: false,
        }
    }

    pub fn with_climb_rate(mut self, climb_rate: f64) -> Self {
        self.climb_rate = climb_rate;
        self
    }

    pub fn is_landed(&self) -> bool {
        self.landed
    }

    /// Advance by `dt` seconds.
    ///
    /// Burns endurance first. If it is exhausted the UAV lands in place:
    /// altitude, speed and climb drop to zero and later steps do nothing.
    pub fn step(&mut self, dt: f64) {
        if self.landed {
            return;
        }

        self.endurance -= dt / 60.0;
        if self.endurance <= 0.0 {
            self.agl_altitude = 0.0;
            self.speed = 0.0;
            self.climb_rate = 0.0;
            self.landed = true;
            return;
        }

        let distance_m = self.speed / 3.6 * dt;
        self.position = destination(self.position, self.heading, distance_m);
        self.agl_altitude += self.climb_rate * dt;
    }

    /// Position report stamped at `event_time`.
    pub fn report(&self, event_time: f64) -> TrackUpdate {
        TrackUpdate::new(
            self.id.clone(),
            AircraftClass::Uav,
            self.position,
            self.agl_altitude,
            event_time,
        )
        .with_velocity(Velocity {
            heading: self.heading,
            speed: self.speed,
            climb_rate: self.climb_rate,
        })
        .with_control_station(self.control_station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::geodesic_distance;

    fn uav() -> SimulatedUav {
        SimulatedUav::launch("quad-0", "quad", GeoPoint::new(0.0, 0.0), 100.0, 90.0, 36.0, 2.0)
    }

    #[test]
    fn test_step_moves_along_heading() {
        let mut u = uav();
        u.step(30.0);

        // 36 km/h for 30 s is 300 m
        let moved = geodesic_distance(GeoPoint::new(0.0, 0.0), u.position);
        assert!((moved - 300.0).abs() < 3.0, "moved {}", moved);
        assert!(u.position.longitude > 0.0);
        assert!((u.agl_altitude - 110.0).abs() < 1e-9);
        assert!((u.endurance - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_lands_when_endurance_exhausted() {
        let mut u = uav();
        for _ in 0..3 {
            u.step(30.0);
        }
        assert!(!u.is_landed());

        u.step(30.0);
        assert!(u.is_landed());
        assert_eq!(u.agl_altitude, 0.0);
        assert_eq!(u.speed, 0.0);

        let parked = u.position;
        u.step(30.0);
        assert_eq!(u.position, parked);
    }

    #[test]
    fn test_report_carries_control_station() {
        let mut u = uav();
        u.step(30.0);
        let r = u.report(60.0);
        assert_eq!(r.id, "quad-0");
        assert_eq!(r.class, AircraftClass::Uav);
        assert_eq!(r.event_time, 60.0);
        assert_eq!(r.control_latitude, 0.0);
        assert_eq!(r.control_altitude, 100.0);
        assert_eq!(r.speed, 36.0);
        assert!(r.validate().is_ok());
    }
}
