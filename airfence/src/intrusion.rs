//! Intrusion evaluation for a single (zone, track) pair.
//!
//! The inside-predicate combines a geodesic range check with a coarse
//! "airborne" check: above-ground-level altitude must be strictly positive.
//! AGL is not geometric altitude; the predicate deliberately keeps this
//! limitation rather than reconciling the two.
//!
//! Entry is filtered by aircraft class, departure is not. A member whose
//! class is no longer notify-eligible still produces a departure when it
//! leaves.

use std::collections::HashSet;

use tracing::trace;

use crate::coord::geodesic_distance;
use crate::track::{AircraftClass, Track};
use crate::zone::Zone;

/// Membership change produced by [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Departed,
}

/// Whether `track` is inside `zone`.
///
/// True iff the geodesic distance from the zone center is strictly less
/// than the radius and AGL altitude is strictly greater than zero.
pub fn inside(zone: &Zone, track: &Track) -> bool {
    if track.agl_altitude <= 0.0 {
        return false;
    }
    geodesic_distance(zone.center(), track.position) < zone.radius()
}

/// Evaluate one pair and update the zone's membership.
///
/// Returns the transition that occurred, if any. Evaluating a stable pair
/// again returns `None`, so each physical crossing yields one transition.
/// Pairs where either side is inactive are left alone.
pub fn evaluate(
    zone: &mut Zone,
    track: &Track,
    notify_classes: &HashSet<AircraftClass>,
) -> Option<Transition> {
    if !zone.is_active() || !track.is_active() {
        return None;
    }

    let is_inside = inside(zone, track);
    let is_member = zone.contains(&track.id);

    match (is_inside, is_member) {
        (true, false) if notify_classes.contains(&track.class) => {
            zone.insert_member(&track.id);
            Some(Transition::Entered)
        }
        (false, true) => {
            zone.remove_member(&track.id);
            Some(Transition::Departed)
        }
        _ => {
            trace!(zone_id = %zone.id(), track_id = %track.id, is_inside, "No transition");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{destination, GeoPoint};
    use crate::track::{TrackStatus, TrackUpdate};
    use crate::zone::{advance, ZoneDefinition};

    fn active_zone(radius: f64) -> Zone {
        let mut zone = Zone::from_definition(&ZoneDefinition::new(
            "Z1",
            (0.0, 3600.0),
            GeoPoint::new(0.0, 0.0),
            radius,
        ));
        advance(&mut zone, 0.0);
        zone
    }

    /// Track `distance_m` due east of the origin.
    fn track_at(class: AircraftClass, distance_m: f64, altitude: f64) -> Track {
        let position = destination(GeoPoint::new(0.0, 0.0), 90.0, distance_m);
        Track::from_update(&TrackUpdate::new("T1", class, position, altitude, 0.0))
    }

    fn default_classes() -> HashSet<AircraftClass> {
        [AircraftClass::Uav, AircraftClass::MannedAc].into_iter().collect()
    }

    mod inside_predicate {
        use super::*;

        #[test]
        fn test_inside_when_close_and_airborne() {
            let zone = active_zone(1000.0);
            assert!(inside(&zone, &track_at(AircraftClass::Uav, 500.0, 50.0)));
        }

        #[test]
        fn test_outside_when_far() {
            let zone = active_zone(1000.0);
            assert!(!inside(&zone, &track_at(AircraftClass::Uav, 2000.0, 50.0)));
        }

        #[test]
        fn test_outside_when_on_ground() {
            let zone = active_zone(1000.0);
            assert!(!inside(&zone, &track_at(AircraftClass::Uav, 0.0, 0.0)));
            assert!(!inside(&zone, &track_at(AircraftClass::Uav, 0.0, -5.0)));
        }

        #[test]
        fn test_boundary_is_exclusive() {
            let zone = active_zone(0.0);
            // Distance 0 is not strictly less than radius 0
            assert!(!inside(&zone, &track_at(AircraftClass::Uav, 0.0, 50.0)));
        }

        #[test]
        fn test_uses_meters_not_degrees() {
            // 0.005 degrees of longitude at the equator is ~556m
            let zone = active_zone(600.0);
            let track = Track::from_update(&TrackUpdate::new(
                "T1",
                AircraftClass::Uav,
                GeoPoint::new(0.0, 0.005),
                10.0,
                0.0,
            ));
            assert!(inside(&zone, &track));

            let zone = active_zone(500.0);
            assert!(!inside(&zone, &track));
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn test_entry_then_idempotent() {
            let mut zone = active_zone(1000.0);
            let track = track_at(AircraftClass::Uav, 500.0, 50.0);
            let classes = default_classes();

            assert_eq!(
                evaluate(&mut zone, &track, &classes),
                Some(Transition::Entered)
            );
            assert!(zone.contains("T1"));

            for _ in 0..5 {
                assert_eq!(evaluate(&mut zone, &track, &classes), None);
            }
        }

        #[test]
        fn test_departure_then_idempotent() {
            let mut zone = active_zone(1000.0);
            let classes = default_classes();
            evaluate(&mut zone, &track_at(AircraftClass::Uav, 500.0, 50.0), &classes);

            let outside = track_at(AircraftClass::Uav, 1500.0, 50.0);
            assert_eq!(
                evaluate(&mut zone, &outside, &classes),
                Some(Transition::Departed)
            );
            assert!(!zone.contains("T1"));
            assert_eq!(evaluate(&mut zone, &outside, &classes), None);
        }

        #[test]
        fn test_landing_inside_is_departure() {
            let mut zone = active_zone(1000.0);
            let classes = default_classes();
            evaluate(&mut zone, &track_at(AircraftClass::Uav, 500.0, 50.0), &classes);

            let landed = track_at(AircraftClass::Uav, 500.0, 0.0);
            assert_eq!(
                evaluate(&mut zone, &landed, &classes),
                Some(Transition::Departed)
            );
        }

        #[test]
        fn test_ineligible_class_never_enters() {
            let mut zone = active_zone(1000.0);
            let track = track_at(AircraftClass::Unknown, 100.0, 50.0);
            assert_eq!(evaluate(&mut zone, &track, &default_classes()), None);
            assert!(!zone.contains("T1"));
        }

        /// Quirk: departure is reported regardless of class.
        #[test]
        fn test_departure_ignores_class_filter() {
            let mut zone = active_zone(1000.0);
            let classes = default_classes();
            evaluate(&mut zone, &track_at(AircraftClass::Uav, 100.0, 50.0), &classes);

            // Same id now reports an ineligible class, outside the zone
            let reclassified = track_at(AircraftClass::Unknown, 5000.0, 50.0);
            assert_eq!(
                evaluate(&mut zone, &reclassified, &classes),
                Some(Transition::Departed)
            );
        }

        #[test]
        fn test_inactive_zone_is_ignored() {
            let mut zone = Zone::from_definition(&ZoneDefinition::new(
                "Z1",
                (100.0, 200.0),
                GeoPoint::new(0.0, 0.0),
                1000.0,
            ));
            let track = track_at(AircraftClass::Uav, 10.0, 50.0);
            assert_eq!(evaluate(&mut zone, &track, &default_classes()), None);
        }

        #[test]
        fn test_inactive_track_is_ignored() {
            let mut zone = active_zone(1000.0);
            let mut track = track_at(AircraftClass::Uav, 10.0, 50.0);
            track.status = TrackStatus::Inactive;
            assert_eq!(evaluate(&mut zone, &track, &default_classes()), None);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_repeated_evaluation_emits_at_most_one_transition(
                distance in 0.0..3000.0_f64,
                altitude in -10.0..500.0_f64,
                repeats in 2usize..10,
            ) {
                let mut zone = active_zone(1000.0);
                let track = track_at(AircraftClass::Uav, distance, altitude);
                let classes = default_classes();

                let transitions = (0..repeats)
                    .filter_map(|_| evaluate(&mut zone, &track, &classes))
                    .count();
                prop_assert!(transitions <= 1);
                prop_assert_eq!(zone.contains("T1"), inside(&zone, &track));
            }

            #[test]
            fn test_membership_tracks_predicate_across_moves(
                path in proptest::collection::vec((0.0..2500.0_f64, -5.0..200.0_f64), 1..20),
            ) {
                let mut zone = active_zone(1000.0);
                let classes = default_classes();
                let mut entered = 0usize;
                let mut departed = 0usize;

                for (distance, altitude) in path {
                    let track = track_at(AircraftClass::Uav, distance, altitude);
                    match evaluate(&mut zone, &track, &classes) {
                        Some(Transition::Entered) => entered += 1,
                        Some(Transition::Departed) => departed += 1,
                        None => {}
                    }
                    prop_assert_eq!(zone.contains("T1"), inside(&zone, &track));
                }
                // Entries and departures alternate starting with an entry
                prop_assert!(entered == departed || entered == departed + 1);
            }
        }
    }
}
