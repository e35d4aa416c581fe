//! Random UAV traffic.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::scenario::Scenario;
use super::uav::SimulatedUav;
use super::ScenarioError;
use crate::coord::{GeoPoint, MAX_LAT, MIN_LAT};

/// Lowest speed and endurance drawn for a generated UAV.
const MIN_DRAW: f64 = 10.0;

/// Launch altitude range, meters AGL.
const LAUNCH_ALTITUDE: (f64, f64) = (10.0, 1000.0);

/// A UAV and the simulated time it takes off.
#[derive(Debug, Clone, PartialEq)]
pub struct Launch {
    pub time: f64,
    pub uav: SimulatedUav,
}

/// Seeded generator of UAV launches for a scenario.
pub struct UavGenerator {
    rng: StdRng,
    models: Vec<(String, f64, f64)>,
    latitude: Normal<f64>,
    longitude: Normal<f64>,
    count: usize,
    spacing: f64,
}

impl UavGenerator {
    /// Build a generator. `seed` overrides the scenario's own seed; with
    /// neither, the RNG is seeded from the OS.
    pub fn new(scenario: &Scenario, seed: Option<u64>) -> Result<Self, ScenarioError> {
        let rng = match seed.or(scenario.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let center = scenario.center();
        let normal = |mean: f64| {
            Normal::new(mean, scenario.loc_std_dev)
                .map_err(|e| ScenarioError::Invalid(format!("loc_std_dev: {}", e)))
        };

        Ok(Self {
            rng,
            models: scenario
                .uav_models
                .iter()
                .map(|(name, m)| (name.clone(), m.max_speed, m.endurance))
                .collect(),
            latitude: normal(center.latitude)?,
            longitude: normal(center.longitude)?,
            count: scenario.start_number_uav,
            spacing: scenario.average_uav_arrival_time,
        })
    }

    /// Every launch in the scenario, in time order.
    ///
    /// UAV `n` (zero-based) takes off at `(n + 1) * average_uav_arrival_time`
    /// and is named `<model>-<n>`.
    pub fn schedule(&mut self) -> Vec<Launch> {
        (0..self.count)
            .filter_map(|n| {
                let time = (n + 1) as f64 * self.spacing;
                self.generate(n).map(|uav| Launch { time, uav })
            })
            .collect()
    }

    fn generate(&mut self, n: usize) -> Option<SimulatedUav> {
        let (name, max_speed, max_endurance) = self.models.choose(&mut self.rng)?.clone();

        let speed = draw(&mut self.rng, MIN_DRAW, max_speed);
        let endurance = draw(&mut self.rng, MIN_DRAW, max_endurance);
        let heading = self.rng.random_range(0.0..360.0);
        let latitude = self.latitude.sample(&mut self.rng).clamp(MIN_LAT, MAX_LAT);
        let longitude = wrap_longitude(self.longitude.sample(&mut self.rng));
        let altitude = draw(&mut self.rng, LAUNCH_ALTITUDE.0, LAUNCH_ALTITUDE.1);

        Some(SimulatedUav::launch(
            format!("{}-{}", name, n),
            name,
            GeoPoint::new(latitude, longitude),
            altitude,
            heading,
            speed,
            endurance,
        ))
    }
}

/// Uniform draw in `[lo, hi]`; `lo` when the range is empty.
fn draw(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        Scenario::from_json(
            r#"{
            "duration": 3600,
            "lower_left_lat": 38.8, "lower_left_lon": -77.2,
            "upper_right_lat": 39.0, "upper_right_lon": -76.9,
            "loc_std_dev": 0.05,
            "start_number_uav": 5,
            "average_uav_arrival_time": 60,
            "uav_models": {
                "quad": {"max_speed": 60, "endurance": 25},
                "fixed_wing": {"max_speed": 120, "endurance": 90}
            }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_schedule_is_spaced_and_named() {
        let launches = UavGenerator::new(&scenario(), Some(1)).unwrap().schedule();
        assert_eq!(launches.len(), 5);
        for (n, launch) in launches.iter().enumerate() {
            assert_eq!(launch.time, (n + 1) as f64 * 60.0);
            assert!(launch.uav.id.ends_with(&format!("-{}", n)));
            assert!(launch.uav.id.starts_with(&launch.uav.model));
        }
    }

    #[test]
    fn test_same_seed_same_traffic() {
        let a = UavGenerator::new(&scenario(), Some(42)).unwrap().schedule();
        let b = UavGenerator::new(&scenario(), Some(42)).unwrap().schedule();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draws_respect_model_envelope() {
        let s = scenario();
        for launch in UavGenerator::new(&s, Some(9)).unwrap().schedule() {
            let model = s.uav_models[&launch.uav.model];
            let u = &launch.uav;
            assert!(u.speed >= MIN_DRAW && u.speed <= model.max_speed);
            assert!(u.endurance >= MIN_DRAW && u.endurance <= model.endurance);
            assert!((0.0..360.0).contains(&u.heading));
            assert!(u.agl_altitude >= 10.0 && u.agl_altitude <= 1000.0);
        }
    }

    #[test]
    fn test_no_models_no_launches() {
        let mut s = scenario();
        s.start_number_uav = 0;
        s.uav_models.clear();
        assert!(UavGenerator::new(&s, None).unwrap().schedule().is_empty());
    }

    #[test]
    fn test_wrap_longitude() {
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(45.0), 45.0);
    }
}
