//! `airfence monitor` - watch zones against the live ADS-B feed.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use airfence::clock::{Clock, ScaledClock};
use airfence::config::ConfigFile;
use airfence::coord::GeoPoint;
use airfence::feed::{AdsbArea, AdsbPoller, ReqwestFeedClient};
use airfence::{GeofenceEngine, SweepScheduler};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::common::{cancel_on_ctrlc, console_dispatcher, load_zones, resolve_settings};
use crate::error::CliError;

/// Arguments for the monitor command.
#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Zone definitions (JSON array)
    pub zones: PathBuf,

    /// Latitude of the query centre
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the query centre
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Query radius in nautical miles
    #[arg(long, default_value_t = 25)]
    pub radius: u32,

    /// ADS-B API base URL (overrides config)
    #[arg(long)]
    pub url: Option<String>,

    /// ADS-B API key (overrides config)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Seconds between polls (overrides config)
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds between sweeps (overrides config)
    #[arg(long)]
    pub sweep_interval: Option<u64>,

    /// Seconds without an update before a track is stale (overrides config)
    #[arg(long)]
    pub track_timeout: Option<u64>,

    /// Print alerts as JSON lines
    #[arg(long)]
    pub json: bool,
}

/// Run the monitor command until Ctrl+C.
pub async fn run(args: MonitorArgs) -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let zones = load_zones(&args.zones)?;
    let area = AdsbArea {
        lat: args.lat,
        lon: args.lon,
        radius: args.radius,
    };
    GeoPoint::new(area.lat, area.lon)
        .validate()
        .map_err(|e| CliError::Config(format!("Invalid query centre: {}", e)))?;

    let (engine_config, scheduler_config) =
        resolve_settings(&config, args.track_timeout, args.sweep_interval);
    let clock: Arc<dyn Clock> = Arc::new(ScaledClock::wall());
    let engine = GeofenceEngine::with_dispatcher(engine_config, console_dispatcher(args.json));
    let (scheduler, handle) = SweepScheduler::new(engine, Arc::clone(&clock), scheduler_config);

    let shutdown = CancellationToken::new();
    cancel_on_ctrlc(&shutdown)?;
    let scheduler_task = scheduler.spawn(shutdown.clone());

    for zone in zones {
        let zone_id = zone.id.clone();
        if let Err(e) = handle.create_zone(zone).await {
            warn!(zone_id = %zone_id, error = %e, "Zone rejected");
        }
    }

    let api_key = args.api_key.or_else(|| config.feed.adsb_api_key.clone());
    let url = args.url.unwrap_or_else(|| config.feed.adsb_url.clone());
    let interval = args.poll_interval.unwrap_or(config.feed.poll_interval_secs);

    let client = ReqwestFeedClient::new(api_key)?;
    let poller = AdsbPoller::new(client, url, area, handle, clock)
        .with_poll_interval(Duration::from_secs(interval.max(1)));

    info!("Monitoring; press Ctrl+C to stop");
    poller.run(shutdown.clone()).await;

    shutdown.cancel();
    let engine = scheduler_task.await?;
    let snapshot = engine.snapshot();
    println!(
        "Stopped with {} zones and {} tracks",
        snapshot.zones.len(),
        snapshot.tracks.len()
    );
    Ok(())
}
