//! Zone status transitions driven by the activation window.

use super::model::{Zone, ZoneStatus};

/// A status change produced by [`advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleTransition {
    /// The zone entered its window.
    Activated,
    /// The zone left its window; `cleared` lists the members dropped.
    Expired { cleared: Vec<String> },
}

/// Advance a zone's status for time `now`.
///
/// - `Active` with `now > end_time` becomes `Expired` and loses all members.
/// - `Created` or `Expired` with `start_time <= now <= end_time` becomes
///   `Active`. An expired zone whose window is satisfied again (clock rewind,
///   reusable window) re-activates.
/// - Anything else is a no-op.
///
/// Each crossing yields exactly one transition; calling again with the same
/// or a later `now` on the far side of the boundary returns `None`.
pub fn advance(zone: &mut Zone, now: f64) -> Option<LifecycleTransition> {
    match zone.status() {
        ZoneStatus::Active if now > zone.end_time() => {
            zone.set_status(ZoneStatus::Expired);
            let cleared = zone.clear_members();
            Some(LifecycleTransition::Expired { cleared })
        }
        ZoneStatus::Created | ZoneStatus::Expired if zone.window_contains(now) => {
            zone.set_status(ZoneStatus::Active);
            Some(LifecycleTransition::Activated)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::GeoPoint;
    use crate::zone::ZoneDefinition;

    fn zone(start: f64, end: f64) -> Zone {
        Zone::from_definition(&ZoneDefinition::new(
            "Z1",
            (start, end),
            GeoPoint::new(0.0, 0.0),
            1000.0,
        ))
    }

    #[test]
    fn test_created_before_window_is_noop() {
        let mut z = zone(100.0, 200.0);
        assert_eq!(advance(&mut z, 50.0), None);
        assert_eq!(z.status(), ZoneStatus::Created);
    }

    #[test]
    fn test_created_after_window_stays_created() {
        let mut z = zone(100.0, 200.0);
        assert_eq!(advance(&mut z, 250.0), None);
        assert_eq!(z.status(), ZoneStatus::Created);
    }

    #[test]
    fn test_activation_at_window_start() {
        let mut z = zone(100.0, 200.0);
        assert_eq!(advance(&mut z, 100.0), Some(LifecycleTransition::Activated));
        assert_eq!(z.status(), ZoneStatus::Active);

        // Still inside: no repeat
        assert_eq!(advance(&mut z, 150.0), None);
        assert_eq!(advance(&mut z, 200.0), None);
    }

    #[test]
    fn test_expiry_clears_members_once() {
        let mut z = zone(0.0, 3600.0);
        advance(&mut z, 0.0);
        z.insert_member("T1");
        z.insert_member("T2");

        assert_eq!(
            advance(&mut z, 3700.0),
            Some(LifecycleTransition::Expired {
                cleared: vec!["T1".to_string(), "T2".to_string()]
            })
        );
        assert_eq!(z.status(), ZoneStatus::Expired);
        assert_eq!(z.member_count(), 0);

        assert_eq!(advance(&mut z, 3800.0), None);
        assert_eq!(advance(&mut z, 99_999.0), None);
    }

    #[test]
    fn test_expired_zone_reactivates_on_rewind() {
        let mut z = zone(0.0, 100.0);
        advance(&mut z, 50.0);
        advance(&mut z, 150.0);
        assert_eq!(z.status(), ZoneStatus::Expired);

        assert_eq!(advance(&mut z, 10.0), Some(LifecycleTransition::Activated));
        assert_eq!(z.status(), ZoneStatus::Active);
    }

    #[test]
    fn test_zero_length_window() {
        let mut z = zone(10.0, 10.0);
        assert_eq!(advance(&mut z, 10.0), Some(LifecycleTransition::Activated));
        assert!(matches!(
            advance(&mut z, 10.5),
            Some(LifecycleTransition::Expired { .. })
        ));
    }
}
