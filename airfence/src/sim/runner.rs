//! Paces simulated traffic against a clock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::generator::{Launch, UavGenerator};
use super::scenario::Scenario;
use super::uav::SimulatedUav;
use super::ScenarioError;
use crate::clock::Clock;
use crate::error::GeofenceError;
use crate::scheduler::SchedulerHandle;
use crate::track::TrackUpdate;

/// Simulated seconds between position reports from one UAV.
pub const UAV_UPDATE_INTERVAL_SECS: f64 = 30.0;

/// Real time the runner idles between checks of the clock.
pub const SIM_PACE_DELAY: Duration = Duration::from_millis(100);

/// Counters for a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationSummary {
    pub zones_created: usize,
    pub launched: usize,
    pub landed: usize,
    pub updates_sent: usize,
    pub updates_rejected: usize,
}

struct Flight {
    uav: SimulatedUav,
    next_report: f64,
    /// The final zero-altitude report has been sent.
    done: bool,
}

/// Feeds a scenario's zones and UAV traffic to a scheduler.
pub struct SimulationRunner {
    scenario: Scenario,
    handle: SchedulerHandle,
    clock: Arc<dyn Clock>,
    pending: VecDeque<Launch>,
    flights: Vec<Flight>,
    summary: SimulationSummary,
}

impl SimulationRunner {
    pub fn new(
        scenario: Scenario,
        generator: &mut UavGenerator,
        handle: SchedulerHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pending = generator.schedule().into();
        Self {
            scenario,
            handle,
            clock,
            pending,
            flights: Vec::new(),
            summary: SimulationSummary::default(),
        }
    }

    pub fn summary(&self) -> SimulationSummary {
        self.summary
    }

    /// UAVs currently airborne.
    pub fn in_flight(&self) -> usize {
        self.flights.len()
    }

    /// Submit the scenario's zones. Rejected zones are logged and skipped.
    pub async fn create_zones(&mut self) -> Result<(), ScenarioError> {
        for zone in self.scenario.zones.clone() {
            let zone_id = zone.id.clone();
            match self.handle.create_zone(zone).await {
                Ok(()) => self.summary.zones_created += 1,
                Err(GeofenceError::SchedulerStopped) => {
                    return Err(GeofenceError::SchedulerStopped.into());
                }
                Err(e) => warn!(zone_id = %zone_id, error = %e, "Scenario zone rejected"),
            }
        }
        Ok(())
    }

    /// Process every launch and report due at or before `now`.
    ///
    /// Reports are stamped with their scheduled time, not `now`, so a run is
    /// reproducible regardless of pacing. Returns the number of updates sent.
    pub async fn advance_to(&mut self, now: f64) -> Result<usize, ScenarioError> {
        let now = now.min(self.scenario.duration);
        let mut sent = 0;

        while self.pending.front().is_some_and(|l| l.time <= now) {
            let Some(launch) = self.pending.pop_front() else {
                break;
            };
            info!(
                uav = %launch.uav.id,
                model = %launch.uav.model,
                t = launch.time,
                "UAV launched"
            );
            self.summary.launched += 1;
            self.flights.push(Flight {
                uav: launch.uav,
                next_report: launch.time,
                done: false,
            });
        }

        for i in 0..self.flights.len() {
            while !self.flights[i].done && self.flights[i].next_report <= now {
                let report = {
                    let flight = &mut self.flights[i];
                    let report = flight.uav.report(flight.next_report);
                    if flight.uav.is_landed() {
                        flight.done = true;
                    } else {
                        flight.uav.step(UAV_UPDATE_INTERVAL_SECS);
                        flight.next_report += UAV_UPDATE_INTERVAL_SECS;
                    }
                    report
                };
                self.submit(report).await?;
                sent += 1;
            }
        }

        let before = self.flights.len();
        self.flights.retain(|f| {
            if f.done {
                info!(uav = %f.uav.id, t = f.next_report, "UAV landed");
            }
            !f.done
        });
        self.summary.landed += before - self.flights.len();

        Ok(sent)
    }

    /// Run until the scenario duration elapses on the clock or `shutdown`
    /// is cancelled.
    pub async fn run(
        &mut self,
        shutdown: CancellationToken,
    ) -> Result<SimulationSummary, ScenarioError> {
        self.create_zones().await?;

        loop {
            let now = self.clock.now();
            self.advance_to(now).await?;
            if now >= self.scenario.duration {
                info!(t = now, "Scenario complete");
                break;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(t = now, "Scenario cancelled");
                    break;
                }
                _ = tokio::time::sleep(SIM_PACE_DELAY) => {}
            }
        }

        debug!(summary = ?self.summary, "Simulation finished");
        Ok(self.summary)
    }

    async fn submit(&mut self, report: TrackUpdate) -> Result<(), ScenarioError> {
        self.summary.updates_sent += 1;
        match self.handle.submit_track(report).await {
            Ok(_) => Ok(()),
            Err(GeofenceError::SchedulerStopped) => Err(GeofenceError::SchedulerStopped.into()),
            Err(e) => {
                self.summary.updates_rejected += 1;
                warn!(error = %e, "Simulated update rejected");
                Ok(())
            }
        }
    }
}
