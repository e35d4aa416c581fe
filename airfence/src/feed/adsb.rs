//! ADS-B Exchange v2 feed.
//!
//! Polls `<base>/lat/<lat>/lon/<lon>/dist/<nm>/` and submits every aircraft
//! with a position as a `manned_ac` track. Units are converted to the
//! crate's conventions: feet to meters, knots to km/h, ft/min to m/s.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::http::FeedClient;
use super::FeedError;
use crate::clock::Clock;
use crate::coord::GeoPoint;
use crate::error::GeofenceError;
use crate::scheduler::SchedulerHandle;
use crate::track::{AircraftClass, TrackUpdate, Velocity};

const FEET_TO_METERS: f64 = 0.3048;
const KNOTS_TO_KMH: f64 = 1.852;
const FPM_TO_MPS: f64 = 0.00508;

/// Centre and radius of an ADS-B query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdsbArea {
    pub lat: f64,
    pub lon: f64,
    /// Radius in nautical miles.
    pub radius: u32,
}

/// Top-level response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdsbResponse {
    #[serde(default)]
    pub ac: Vec<AdsbAircraft>,
}

/// One aircraft record. Only the fields used here are decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdsbAircraft {
    pub hex: String,
    #[serde(default)]
    pub flight: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Geometric altitude, feet.
    #[serde(default)]
    pub alt_geom: Option<f64>,
    #[serde(default)]
    pub true_heading: Option<f64>,
    /// Ground speed, knots.
    #[serde(default)]
    pub gs: Option<f64>,
    /// Geometric vertical rate, ft/min.
    #[serde(default)]
    pub geom_rate: Option<f64>,
}

impl AdsbAircraft {
    /// Call sign if broadcast, otherwise the ICAO hex address.
    pub fn track_id(&self) -> &str {
        self.flight
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(self.hex.trim())
    }

    /// Convert to a track update, or `None` without a position.
    ///
    /// Geometric altitude stands in for AGL; it is not terrain-corrected.
    pub fn to_track_update(&self, event_time: f64) -> Option<TrackUpdate> {
        let (lat, lon) = (self.lat?, self.lon?);
        let update = TrackUpdate::new(
            self.track_id(),
            AircraftClass::MannedAc,
            GeoPoint::new(lat, lon),
            self.alt_geom.unwrap_or(0.0) * FEET_TO_METERS,
            event_time,
        )
        .with_velocity(Velocity {
            heading: self.true_heading.unwrap_or(0.0),
            speed: self.gs.unwrap_or(0.0) * KNOTS_TO_KMH,
            climb_rate: self.geom_rate.unwrap_or(0.0) * FPM_TO_MPS,
        });
        Some(update)
    }
}

/// Outcome of one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub aircraft: usize,
    pub submitted: usize,
    pub skipped: usize,
    pub rejected: usize,
}

/// Periodically polls ADS-B Exchange and forwards aircraft to a scheduler.
pub struct AdsbPoller<C: FeedClient> {
    client: C,
    base_url: String,
    area: AdsbArea,
    poll_interval: Duration,
    handle: SchedulerHandle,
    clock: Arc<dyn Clock>,
}

impl<C: FeedClient> AdsbPoller<C> {
    pub fn new(
        client: C,
        base_url: impl Into<String>,
        area: AdsbArea,
        handle: SchedulerHandle,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            area,
            poll_interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            handle,
            clock,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Query URL for the configured area.
    pub fn url(&self) -> String {
        format!(
            "{}/lat/{:.6}/lon/{:.6}/dist/{}/",
            self.base_url, self.area.lat, self.area.lon, self.area.radius
        )
    }

    /// Fetch once and submit every aircraft with a position.
    ///
    /// Updates the engine rejects are counted, not returned as errors.
    pub async fn poll_once(&self) -> Result<PollSummary, FeedError> {
        let url = self.url();
        let body = self.client.get(&url).await?;
        let response: AdsbResponse = serde_json::from_slice(&body)?;
        let now = self.clock.now();

        let mut summary = PollSummary {
            aircraft: response.ac.len(),
            ..PollSummary::default()
        };
        for aircraft in &response.ac {
            let Some(update) = aircraft.to_track_update(now) else {
                summary.skipped += 1;
                continue;
            };
            match self.handle.submit_track(update).await {
                Ok(_) => summary.submitted += 1,
                Err(GeofenceError::SchedulerStopped) => {
                    return Err(GeofenceError::SchedulerStopped.into());
                }
                Err(e) => {
                    debug!(hex = %aircraft.hex, error = %e, "ADS-B aircraft rejected");
                    summary.rejected += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Poll until `shutdown` is cancelled or the scheduler stops.
    ///
    /// Transport and decode failures are logged and retried at the next
    /// interval.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            url = %self.url(),
            interval_secs = self.poll_interval.as_secs(),
            "ADS-B poller starting"
        );

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break,

                _ = ticker.tick() => match self.poll_once().await {
                    Ok(summary) => debug!(?summary, "ADS-B poll complete"),
                    Err(FeedError::Geofence(GeofenceError::SchedulerStopped)) => {
                        warn!("Scheduler stopped, ADS-B poller exiting");
                        break;
                    }
                    Err(e) => warn!(error = %e, "ADS-B poll failed"),
                },
            }
        }

        info!("ADS-B poller stopped");
    }
}
