//! The geofence engine.
//!
//! [`GeofenceEngine`] owns the track and zone stores and the alert
//! dispatcher, and exposes the two triggers that drive them:
//!
//! - [`handle_track_update`](GeofenceEngine::handle_track_update): upsert one
//!   track and evaluate it against every active zone.
//! - [`sweep`](GeofenceEngine::sweep): evict stale tracks, advance every
//!   zone's lifecycle, then re-evaluate every active zone against every
//!   active track.
//!
//! ```text
//!   TrackUpdate ──► TrackStore::upsert ──► evaluate(zone, track) ──┐
//!                                          for each active zone    │
//!                                                                  ▼
//!   sweep(now) ──► reap ──► advance(zone) ──► evaluate(...) ──► AlertDispatcher
//! ```
//!
//! The engine is not synchronized. Wrap it in a
//! [`SweepScheduler`](crate::scheduler::SweepScheduler) to drive it from
//! concurrent producers.
//!
//! # Example
//!
//! ```ignore
//! use airfence::engine::{EngineConfig, GeofenceEngine};
//!
//! let mut engine = GeofenceEngine::new(EngineConfig::default());
//! engine.create_zone(&zone_def, 0.0)?;
//! let alerts = engine.handle_track_update(&update)?;
//! let report = engine.sweep(30.0);
//! ```

mod config;

pub use config::{EngineConfig, DEFAULT_NOTIFY_CLASSES};

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alert::{AlertDispatcher, AlertEvent, AlertKind};
use crate::error::Result;
use crate::intrusion::{evaluate, Transition};
use crate::reaper::reap;
use crate::track::{Track, TrackStore, TrackUpdate};
use crate::zone::{advance, LifecycleTransition, Zone, ZoneDefinition, ZoneStatus, ZoneStore};

// =============================================================================
// Reports
// =============================================================================

/// Alerts produced by one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Time the sweep ran at.
    pub now: f64,
    /// Every alert emitted, in emission order.
    pub alerts: Vec<AlertEvent>,
}

impl SweepReport {
    /// Number of alerts of `kind`.
    pub fn count(&self, kind: AlertKind) -> usize {
        self.alerts.iter().filter(|a| a.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Read-only view of one zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSnapshot {
    pub id: String,
    pub status: ZoneStatus,
    pub members: Vec<String>,
}

impl From<&Zone> for ZoneSnapshot {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id().to_string(),
            status: zone.status(),
            members: zone.members().map(str::to_string).collect(),
        }
    }
}

/// Point-in-time copy of engine state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// Zones ordered by id.
    pub zones: Vec<ZoneSnapshot>,
    /// Tracks ordered by id.
    pub tracks: Vec<Track>,
}

impl EngineSnapshot {
    pub fn zone(&self, id: &str) -> Option<&ZoneSnapshot> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn track(&self, id: &str) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Owns all geofence state and emits alerts as it changes.
#[derive(Debug)]
pub struct GeofenceEngine {
    config: EngineConfig,
    tracks: TrackStore,
    zones: ZoneStore,
    dispatcher: Arc<AlertDispatcher>,
}

impl GeofenceEngine {
    /// Create an engine with its own dispatcher.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_dispatcher(config, Arc::new(AlertDispatcher::new()))
    }

    /// Create an engine publishing to an existing dispatcher.
    pub fn with_dispatcher(config: EngineConfig, dispatcher: Arc<AlertDispatcher>) -> Self {
        Self {
            config,
            tracks: TrackStore::new(),
            zones: ZoneStore::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dispatcher used for every alert. Subscribe sinks here.
    pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
        &self.dispatcher
    }

    pub fn tracks(&self) -> &TrackStore {
        &self.tracks
    }

    pub fn zones(&self) -> &ZoneStore {
        &self.zones
    }

    pub fn zone(&self, id: &str) -> Result<&Zone> {
        self.zones.get(id)
    }

    pub fn track(&self, id: &str) -> Result<&Track> {
        self.tracks.get(id)
    }

    /// Register a new zone in the `created` state.
    ///
    /// The zone is picked up by the next sweep. On failure a
    /// `ZoneCreateFailed` alert goes to the general channel and the error is
    /// returned.
    pub fn create_zone(&mut self, def: &ZoneDefinition, now: f64) -> Result<()> {
        match self.zones.create(def) {
            Ok(zone) => {
                info!(
                    zone_id = %zone.id(),
                    radius = zone.radius(),
                    start = zone.start_time(),
                    end = zone.end_time(),
                    "Zone created"
                );
                self.emit(AlertEvent::zone_created(&def.id, now));
                Ok(())
            }
            Err(e) => {
                warn!(zone_id = %def.id, error = %e, "Zone creation rejected");
                self.emit(AlertEvent::zone_create_failed(&def.id, &e, now));
                Err(e)
            }
        }
    }

    /// Remove a zone and its membership set.
    pub fn delete_zone(&mut self, id: &str, now: f64) -> Result<Zone> {
        match self.zones.delete(id) {
            Ok(zone) => {
                info!(zone_id = %id, members = zone.member_count(), "Zone deleted");
                self.emit(AlertEvent::zone_deleted(id, now));
                Ok(zone)
            }
            Err(e) => {
                warn!(zone_id = %id, error = %e, "Zone deletion rejected");
                self.emit(AlertEvent::zone_delete_failed(id, &e, now));
                Err(e)
            }
        }
    }

    /// Upsert a track and evaluate it against every active zone.
    ///
    /// Alerts are stamped with the update's event time. Returns the alerts
    /// emitted, in zone id order.
    pub fn handle_track_update(&mut self, update: &TrackUpdate) -> Result<Vec<AlertEvent>> {
        if let Err(e) = self.tracks.upsert(update) {
            warn!(track_id = %update.id, error = %e, "Track update rejected");
            let time = if update.event_time.is_finite() {
                update.event_time
            } else {
                0.0
            };
            self.emit(AlertEvent::track_rejected(&update.id, &e, time));
            return Err(e);
        }
        let track = self.tracks.get(&update.id)?;

        let mut alerts = Vec::new();
        for zone in self.zones.iter_mut().filter(|z| z.is_active()) {
            if let Some(transition) = evaluate(zone, track, &self.config.notify_classes) {
                alerts.push(crossing_alert(zone, track, transition, update.event_time));
            }
        }

        for alert in &alerts {
            self.emit(alert.clone());
        }
        Ok(alerts)
    }

    /// Run one periodic sweep at `now`.
    ///
    /// Stale tracks are evicted first, so a track that timed out never
    /// produces a departure. Then each zone's lifecycle is advanced and, if
    /// active, every active track is evaluated against it.
    pub fn sweep(&mut self, now: f64) -> SweepReport {
        let mut report = SweepReport {
            now,
            alerts: Vec::new(),
        };

        for stale in reap(
            &mut self.tracks,
            &mut self.zones,
            now,
            self.config.track_timeout_secs(),
        ) {
            report.alerts.push(AlertEvent::stale(&stale.track_id, now));
        }

        for zone in self.zones.iter_mut() {
            match advance(zone, now) {
                Some(LifecycleTransition::Activated) => {
                    info!(zone_id = %zone.id(), t = now, "Zone activated");
                    report.alerts.push(AlertEvent::zone_activated(zone.id(), now));
                }
                Some(LifecycleTransition::Expired { cleared }) => {
                    info!(
                        zone_id = %zone.id(),
                        t = now,
                        cleared = cleared.len(),
                        "Zone expired"
                    );
                    report.alerts.push(AlertEvent::zone_expired(zone.id(), now));
                }
                None => {}
            }

            if !zone.is_active() {
                continue;
            }
            for track in self.tracks.active() {
                if let Some(transition) = evaluate(zone, track, &self.config.notify_classes) {
                    report.alerts.push(crossing_alert(zone, track, transition, now));
                }
            }
        }

        for alert in &report.alerts {
            self.emit(alert.clone());
        }

        debug!(
            t = now,
            zones = self.zones.len(),
            tracks = self.tracks.len(),
            alerts = report.alerts.len(),
            "Sweep complete"
        );
        report
    }

    /// Copy the current zone and track state.
    pub fn snapshot(&self) -> EngineSnapshot {
        let mut tracks: Vec<Track> = self.tracks.iter().cloned().collect();
        tracks.sort_by(|a, b| a.id.cmp(&b.id));
        EngineSnapshot {
            zones: self.zones.iter().map(ZoneSnapshot::from).collect(),
            tracks,
        }
    }

    fn emit(&self, event: AlertEvent) {
        self.dispatcher.dispatch(&event);
    }
}

fn crossing_alert(zone: &Zone, track: &Track, transition: Transition, time: f64) -> AlertEvent {
    match transition {
        Transition::Entered => {
            info!(
                zone_id = %zone.id(),
                track_id = %track.id,
                class = %track.class,
                t = time,
                "Track entered zone"
            );
            AlertEvent::entered(zone.id(), &track.id, track.class, time)
        }
        Transition::Departed => {
            info!(
                zone_id = %zone.id(),
                track_id = %track.id,
                class = %track.class,
                t = time,
                "Track departed zone"
            );
            AlertEvent::departed(zone.id(), &track.id, track.class, time)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{CollectingSink, Topic};
    use crate::coord::{destination, GeoPoint};
    use crate::error::GeofenceError;
    use crate::track::AircraftClass;

    fn zone_def(id: &str) -> ZoneDefinition {
        ZoneDefinition::new(id, (0.0, 3600.0), GeoPoint::new(0.0, 0.0), 1000.0)
    }

    fn uav_at(id: &str, distance_m: f64, t: f64) -> TrackUpdate {
        let pos = destination(GeoPoint::new(0.0, 0.0), 90.0, distance_m);
        TrackUpdate::new(id, AircraftClass::Uav, pos, 50.0, t)
    }

    fn engine_with_sink() -> (GeofenceEngine, Arc<CollectingSink>) {
        let engine = GeofenceEngine::new(EngineConfig::default());
        let sink = Arc::new(CollectingSink::new("test"));
        engine.dispatcher().subscribe(Topic::General, sink.clone());
        (engine, sink)
    }

    mod zones {
        use super::*;

        #[test]
        fn test_create_emits_created_and_stays_created() {
            let (mut engine, sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();

            assert_eq!(engine.zone("Z1").unwrap().status(), ZoneStatus::Created);
            assert_eq!(sink.kinds(), vec![AlertKind::ZoneCreated]);
        }

        #[test]
        fn test_duplicate_create_is_reported_and_returned() {
            let (mut engine, sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();

            let err = engine.create_zone(&zone_def("Z1"), 1.0).unwrap_err();
            assert_eq!(err, GeofenceError::DuplicateId("Z1".to_string()));
            assert_eq!(
                sink.kinds(),
                vec![AlertKind::ZoneCreated, AlertKind::ZoneCreateFailed]
            );
        }

        #[test]
        fn test_delete_unknown_is_reported_and_returned() {
            let (mut engine, sink) = engine_with_sink();
            let err = engine.delete_zone("nope", 0.0).unwrap_err();
            assert_eq!(err, GeofenceError::zone_not_found("nope"));
            assert_eq!(sink.kinds(), vec![AlertKind::ZoneDeleteFailed]);
        }

        #[test]
        fn test_delete_removes_zone() {
            let (mut engine, sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            let removed = engine.delete_zone("Z1", 5.0).unwrap();
            assert_eq!(removed.id(), "Z1");
            assert!(engine.zones().is_empty());
            assert_eq!(sink.kinds().last(), Some(&AlertKind::ZoneDeleted));
        }

        #[test]
        fn test_invalid_zone_is_rejected() {
            let (mut engine, _sink) = engine_with_sink();
            let mut def = zone_def("Z1");
            def.radius = -5.0;
            assert!(matches!(
                engine.create_zone(&def, 0.0),
                Err(GeofenceError::InvalidInput(_))
            ));
            assert!(engine.zones().is_empty());
        }
    }

    mod updates {
        use super::*;
        use crate::alert::{AlertSink, SinkError};

        struct BrokenSink {
            panics: bool,
        }

        impl AlertSink for BrokenSink {
            fn name(&self) -> &str {
                "broken"
            }

            fn deliver(&self, _event: &AlertEvent) -> std::result::Result<(), SinkError> {
                if self.panics {
                    panic!("sink exploded");
                }
                Err(SinkError::new("downstream unavailable"))
            }
        }

        #[test]
        fn test_broken_sinks_do_not_disturb_evaluation() {
            let (mut engine, sink) = engine_with_sink();
            let dispatcher = engine.dispatcher().clone();
            dispatcher.subscribe(Topic::General, Arc::new(BrokenSink { panics: false }));
            dispatcher.subscribe(Topic::zone("Z1"), Arc::new(BrokenSink { panics: true }));

            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            engine.sweep(0.0);

            let alerts = engine.handle_track_update(&uav_at("T1", 500.0, 30.0)).unwrap();
            assert_eq!(alerts[0].kind, AlertKind::Entered);
            assert!(engine.zone("Z1").unwrap().contains("T1"));

            let alerts = engine.handle_track_update(&uav_at("T1", 1500.0, 60.0)).unwrap();
            assert_eq!(alerts[0].kind, AlertKind::Departed);
            assert_eq!(engine.zone("Z1").unwrap().member_count(), 0);

            assert_eq!(
                sink.kinds(),
                vec![
                    AlertKind::ZoneCreated,
                    AlertKind::ZoneActivated,
                    AlertKind::Entered,
                    AlertKind::Departed,
                ]
            );
        }

        #[test]
        fn test_update_before_activation_is_not_evaluated() {
            let (mut engine, _sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();

            let alerts = engine.handle_track_update(&uav_at("T1", 100.0, 0.0)).unwrap();
            assert!(alerts.is_empty());
            assert_eq!(engine.zone("Z1").unwrap().member_count(), 0);
        }

        #[test]
        fn test_entry_then_departure_on_event_path() {
            let (mut engine, sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            engine.sweep(0.0);

            let alerts = engine.handle_track_update(&uav_at("T1", 500.0, 30.0)).unwrap();
            assert_eq!(alerts.len(), 1);
            assert_eq!(alerts[0].kind, AlertKind::Entered);
            assert_eq!(alerts[0].time, 30.0);

            let alerts = engine.handle_track_update(&uav_at("T1", 600.0, 60.0)).unwrap();
            assert!(alerts.is_empty());

            let alerts = engine.handle_track_update(&uav_at("T1", 1500.0, 90.0)).unwrap();
            assert_eq!(alerts[0].kind, AlertKind::Departed);

            assert_eq!(
                sink.kinds(),
                vec![
                    AlertKind::ZoneCreated,
                    AlertKind::ZoneActivated,
                    AlertKind::Entered,
                    AlertKind::Departed,
                ]
            );
        }

        #[test]
        fn test_rejected_update_publishes_alert() {
            let (mut engine, sink) = engine_with_sink();
            let mut bad = uav_at("T1", 0.0, 10.0);
            bad.latitude = f64::INFINITY;

            assert!(engine.handle_track_update(&bad).is_err());
            assert_eq!(sink.kinds(), vec![AlertKind::TrackRejected]);
            assert!(engine.tracks().is_empty());
        }
    }

    mod sweeps {
        use super::*;

        #[test]
        fn test_sweep_catches_entry_missed_before_activation() {
            let (mut engine, _sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            engine.handle_track_update(&uav_at("T1", 100.0, 0.0)).unwrap();

            let report = engine.sweep(10.0);
            assert_eq!(report.count(AlertKind::ZoneActivated), 1);
            assert_eq!(report.count(AlertKind::Entered), 1);
            assert!(engine.zone("Z1").unwrap().contains("T1"));
        }

        #[test]
        fn test_stale_track_evicted_without_departure() {
            let (mut engine, _sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            engine.sweep(0.0);
            engine.handle_track_update(&uav_at("T1", 100.0, 30.0)).unwrap();

            let report = engine.sweep(260.0);
            assert_eq!(report.count(AlertKind::Stale), 1);
            assert_eq!(report.count(AlertKind::Departed), 0);
            assert!(!engine.zone("Z1").unwrap().contains("T1"));
            assert!(!engine.track("T1").unwrap().is_active());

            assert!(engine.sweep(290.0).is_empty());
        }

        #[test]
        fn test_expiry_clears_membership_once() {
            let (mut engine, _sink) = engine_with_sink();
            engine.create_zone(&zone_def("Z1"), 0.0).unwrap();
            engine.sweep(0.0);
            engine.handle_track_update(&uav_at("T1", 100.0, 3599.0)).unwrap();

            let report = engine.sweep(3700.0);
            assert_eq!(report.count(AlertKind::ZoneExpired), 1);
            assert_eq!(report.count(AlertKind::Entered), 0);
            assert_eq!(engine.zone("Z1").unwrap().member_count(), 0);

            assert_eq!(engine.sweep(3710.0).count(AlertKind::ZoneExpired), 0);
        }

        #[test]
        fn test_snapshot_is_sorted() {
            let (mut engine, _sink) = engine_with_sink();
            engine.create_zone(&zone_def("Zb"), 0.0).unwrap();
            engine.create_zone(&zone_def("Za"), 0.0).unwrap();
            engine.handle_track_update(&uav_at("T2", 0.0, 0.0)).unwrap();
            engine.handle_track_update(&uav_at("T1", 0.0, 0.0)).unwrap();
            engine.sweep(1.0);

            let snap = engine.snapshot();
            let zone_ids: Vec<_> = snap.zones.iter().map(|z| z.id.as_str()).collect();
            let track_ids: Vec<_> = snap.tracks.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(zone_ids, vec!["Za", "Zb"]);
            assert_eq!(track_ids, vec!["T1", "T2"]);
            assert_eq!(snap.zone("Za").unwrap().members, vec!["T1", "T2"]);
        }
    }
}
